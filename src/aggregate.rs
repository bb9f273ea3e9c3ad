//! Aggregation over a dataset
//!
//! All functions are pure: identical input yields identical output and the
//! dataset is only read.

use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::record::{Dataset, NumericField, Record};

/// Number of records per category, most frequent first.
///
/// Records without a category are not counted. Equal counts keep the order in
/// which categories first appear.
pub fn count_by_category(dataset: &Dataset) -> IndexMap<String, usize> {
    let mut counts = IndexMap::<String, usize>::new();
    for category in dataset.iter().filter_map(|record| record.category.as_deref()) {
        *counts.entry(category.to_owned()).or_default() += 1;
    }
    counts.sort_by(|_, a, _, b| b.cmp(a));
    counts
}

/// Mean of `field` per category, highest mean first.
///
/// Only non-missing values contribute. A category without any value for
/// `field` has no entry.
pub fn mean_by_category(dataset: &Dataset, field: NumericField) -> IndexMap<String, f64> {
    let mut sums = IndexMap::<&str, (f64, usize)>::new();
    for record in dataset {
        let (Some(category), Some(value)) = (record.category.as_deref(), record.numeric(field))
        else {
            continue;
        };
        let (sum, count) = sums.entry(category).or_default();
        *sum += value;
        *count += 1;
    }
    let mut means = sums
        .into_iter()
        .map(|(category, (sum, count))| (category.to_owned(), sum / count as f64))
        .collect::<IndexMap<_, _>>();
    means.sort_by(|ka, a, kb, b| b.total_cmp(a).then_with(|| ka.cmp(kb)));
    means
}

/// Mean of `field` over the whole dataset, if any record has it.
pub fn mean(dataset: &Dataset, field: NumericField) -> Option<f64> {
    let (sum, count) = dataset
        .iter()
        .filter_map(|record| record.numeric(field))
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Sum of `field` per calendar date, oldest first.
pub fn time_series(dataset: &Dataset, field: NumericField) -> Vec<(NaiveDate, f64)> {
    let mut sums = IndexMap::<NaiveDate, f64>::new();
    for record in dataset {
        let (Some(date), Some(value)) = (record.date, record.numeric(field)) else {
            continue;
        };
        *sums.entry(date).or_default() += value;
    }
    sums.sort_keys();
    sums.into_iter().collect()
}

/// Up to `n` records with the highest `field`.
///
/// Records missing `field` are not candidates. Ties keep dataset order.
pub fn top_n(dataset: &Dataset, field: NumericField, n: usize) -> Vec<&Record> {
    if n == 0 {
        return Vec::new();
    }
    let mut candidates = dataset
        .iter()
        .filter_map(|record| record.numeric(field).map(|value| (value, record)))
        .collect::<Vec<_>>();
    candidates.sort_by(|(a, _), (b, _)| b.total_cmp(a));
    candidates
        .into_iter()
        .take(n)
        .map(|(_, record)| record)
        .collect()
}
