//! Per-category drill-down
//!
//! Drill-down is "filter then re-aggregate": the summary reuses the functions in
//! [`crate::aggregate`] on the filtered subset.

use itertools::Itertools as _;
use serde::Serialize;

use crate::{
    aggregate,
    record::{Dataset, DiscountScale, NumericField, Record},
};

/// Number of records listed in [`CategorySummary::top_rated`].
pub const TOP_RATED: usize = 5;

/// Sorted distinct categories present in the dataset.
pub fn categories(dataset: &Dataset) -> Vec<String> {
    dataset
        .iter()
        .filter_map(|record| record.category.as_deref())
        .sorted_unstable()
        .dedup()
        .map(str::to_owned)
        .collect()
}

/// Records whose category is exactly `category`, in dataset order.
pub fn filter_by_category(dataset: &Dataset, category: &str) -> Dataset {
    dataset.subset(|record| record.category.as_deref() == Some(category))
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown category: {0}")]
pub struct UnknownCategory(pub String);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub total_products: usize,
    pub discount_scale: DiscountScale,
    pub average_discount: Option<f64>,
    pub average_rating: Option<f64>,
    pub top_rated: Vec<Record>,
}

/// Summary statistics for one selectable category.
pub fn summarize(dataset: &Dataset, category: &str) -> Result<CategorySummary, UnknownCategory> {
    if !categories(dataset).iter().any(|known| known == category) {
        return Err(UnknownCategory(category.to_owned()));
    }
    let subset = filter_by_category(dataset, category);
    Ok(CategorySummary {
        category: category.to_owned(),
        total_products: subset.len(),
        discount_scale: subset.discount_scale(),
        average_discount: aggregate::mean(&subset, NumericField::DiscountPercentage),
        average_rating: aggregate::mean(&subset, NumericField::Rating),
        top_rated: aggregate::top_n(&subset, NumericField::Rating, TOP_RATED)
            .into_iter()
            .cloned()
            .collect(),
    })
}
