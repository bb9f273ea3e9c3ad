//! Row-level ingestion warnings.
//!
//! A warning never aborts ingestion: the offending field is set to missing and
//! the warning is returned next to the dataset.

use serde::Serialize;

use crate::record::FieldName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningReason {
    /// The value could not be coerced to the field's type.
    TypeMismatch,
    /// The value was parsed but lies outside the field's bounds.
    OutOfRange,
    /// A required field is absent or null.
    MissingRequired,
}

impl std::fmt::Display for WarningReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningReason::TypeMismatch => f.write_str("type mismatch"),
            WarningReason::OutOfRange => f.write_str("out of range"),
            WarningReason::MissingRequired => f.write_str("missing required field"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestionWarning {
    pub row_index: usize,
    pub field: FieldName,
    pub raw_value: serde_json::Value,
    pub reason: WarningReason,
}

impl std::fmt::Display for IngestionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "row {}: {} ({}): {}",
            self.row_index, self.field, self.reason, self.raw_value
        )
    }
}

/// Warning sink scoped to a single row.
pub(crate) struct RowWarnings<'w> {
    row_index: usize,
    warnings: &'w mut Vec<IngestionWarning>,
}

impl<'w> RowWarnings<'w> {
    pub(crate) fn new(row_index: usize, warnings: &'w mut Vec<IngestionWarning>) -> Self {
        Self {
            row_index,
            warnings,
        }
    }

    pub(crate) fn push(
        &mut self,
        field: FieldName,
        raw_value: serde_json::Value,
        reason: WarningReason,
    ) {
        self.warnings.push(IngestionWarning {
            row_index: self.row_index,
            field,
            raw_value,
            reason,
        });
    }
}
