//! Record model
//!
//! Typed representation of one sales/product entry and the dataset built from
//! a batch of them.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inclusive numeric range a field must fall in to be kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const NON_NEGATIVE: Bounds = Bounds {
        min: 0.0,
        max: f64::INFINITY,
    };
    pub const RATING: Bounds = Bounds { min: 0.0, max: 5.0 };

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

/// Field names as they appear in raw payloads, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    Category,
    ProductName,
    Price,
    Quantity,
    DiscountPercentage,
    Rating,
    Date,
}

impl FieldName {
    pub const ALL: [FieldName; 7] = [
        FieldName::Category,
        FieldName::ProductName,
        FieldName::Price,
        FieldName::Quantity,
        FieldName::DiscountPercentage,
        FieldName::Rating,
        FieldName::Date,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Category => "category",
            FieldName::ProductName => "product_name",
            FieldName::Price => "price",
            FieldName::Quantity => "quantity",
            FieldName::DiscountPercentage => "discount_percentage",
            FieldName::Rating => "rating",
            FieldName::Date => "date",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, FieldName::Category | FieldName::ProductName)
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit of `discount_percentage` for a whole batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountScale {
    /// Every observed value is at most 1.
    #[default]
    Fraction,
    /// Some value exceeds 1. Values are kept as given, never rescaled.
    Percentage,
}

impl DiscountScale {
    /// Percentage scale as soon as any observed value exceeds 1.
    pub fn infer(values: impl IntoIterator<Item = f64>) -> Self {
        if values.into_iter().any(|value| value > 1.0) {
            DiscountScale::Percentage
        } else {
            DiscountScale::Fraction
        }
    }
}

/// One sales/product entry. Every field may be missing after ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub category: Option<String>,
    pub product_name: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<u64>,
    pub discount_percentage: Option<f64>,
    pub rating: Option<f64>,
    pub date: Option<NaiveDate>,
}

/// Numeric selector used by aggregations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    Price,
    Quantity,
    DiscountPercentage,
    Rating,
    /// `price * quantity`
    Revenue,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown numeric field: {0}")]
pub struct UnknownNumericField(String);

impl FromStr for NumericField {
    type Err = UnknownNumericField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price" => Ok(NumericField::Price),
            "quantity" => Ok(NumericField::Quantity),
            "discount_percentage" => Ok(NumericField::DiscountPercentage),
            "rating" => Ok(NumericField::Rating),
            "revenue" => Ok(NumericField::Revenue),
            _ => Err(UnknownNumericField(s.to_owned())),
        }
    }
}

impl Record {
    pub fn numeric(&self, field: NumericField) -> Option<f64> {
        match field {
            NumericField::Price => self.price,
            NumericField::Quantity => self.quantity.map(|quantity| quantity as f64),
            NumericField::DiscountPercentage => self.discount_percentage,
            NumericField::Rating => self.rating,
            NumericField::Revenue => Some(self.price? * self.quantity? as f64),
        }
    }
}

/// Ordered batch of records in source order.
///
/// Consumers only ever see `&[Record]`; filtering produces a new dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    records: Vec<Record>,
    discount_scale: DiscountScale,
}

impl Dataset {
    pub(crate) fn new(records: Vec<Record>, discount_scale: DiscountScale) -> Self {
        Self {
            records,
            discount_scale,
        }
    }

    pub const fn empty() -> Self {
        Self {
            records: Vec::new(),
            discount_scale: DiscountScale::Fraction,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn discount_scale(&self) -> DiscountScale {
        self.discount_scale
    }

    /// Subset of this dataset, keeping its discount scale.
    pub(crate) fn subset(&self, predicate: impl Fn(&Record) -> bool) -> Self {
        Self {
            records: self
                .records
                .iter()
                .filter(|record| predicate(record))
                .cloned()
                .collect(),
            discount_scale: self.discount_scale,
        }
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
