use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    aggregate, drilldown,
    record::{Dataset, DiscountScale, NumericField},
};

/// Standard results shown once a dataset is loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub total_records: usize,
    pub discount_scale: DiscountScale,
    pub products_by_category: IndexMap<String, usize>,
    pub average_discount_by_category: IndexMap<String, f64>,
    pub average_rating_by_category: IndexMap<String, f64>,
    pub categories: Vec<String>,
}

impl Dashboard {
    pub fn compute(dataset: &Dataset) -> Self {
        Self {
            total_records: dataset.len(),
            discount_scale: dataset.discount_scale(),
            products_by_category: aggregate::count_by_category(dataset),
            average_discount_by_category: aggregate::mean_by_category(
                dataset,
                NumericField::DiscountPercentage,
            ),
            average_rating_by_category: aggregate::mean_by_category(dataset, NumericField::Rating),
            categories: drilldown::categories(dataset),
        }
    }
}
