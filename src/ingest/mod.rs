//! Payload ingestion
//!
//! Turns an untyped payload (a sequence of flat key-value entries) into a
//! [`Dataset`]. Only a top-level shape mismatch aborts; every field-level
//! problem becomes an [`IngestionWarning`] and the field is left missing.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    record::{Bounds, Dataset, DiscountScale, FieldName, Record},
    warning::{IngestionWarning, RowWarnings, WarningReason},
};

pub mod validate;

use validate::Coerced;

/// A dataset together with the warnings raised while building it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ingested {
    pub dataset: Dataset,
    pub warnings: Vec<IngestionWarning>,
}

#[derive(Debug, thiserror::Error)]
pub enum MalformedPayload {
    #[error("Failed to decode payload: {0}")]
    Decode(serde_json::Error),
    #[error("Expected a sequence of entries, got {0}")]
    NotASequence(&'static str),
    #[error("Entry {index} is not a key-value object, got {kind}")]
    NotAnEntry { index: usize, kind: &'static str },
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decode JSON bytes and ingest them.
pub fn parse_bytes(bytes: &[u8]) -> Result<Ingested, MalformedPayload> {
    let payload = serde_json::from_slice(bytes).map_err(MalformedPayload::Decode)?;
    parse(payload)
}

pub fn parse(payload: Value) -> Result<Ingested, MalformedPayload> {
    let Value::Array(entries) = payload else {
        return Err(MalformedPayload::NotASequence(kind(&payload)));
    };
    let entries = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| match entry {
            Value::Object(entry) => Ok(entry),
            other => Err(MalformedPayload::NotAnEntry {
                index,
                kind: kind(&other),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parse_entries(&entries))
}

/// Ingest entries whose top-level shape is already known to be valid.
pub fn parse_entries(entries: &[Map<String, Value>]) -> Ingested {
    let scale = infer_discount_scale(entries);
    let mut warnings = Vec::new();
    let records = entries
        .iter()
        .enumerate()
        .map(|(row_index, entry)| {
            parse_row(entry, &mut RowWarnings::new(row_index, &mut warnings))
        })
        .collect::<Vec<_>>();
    debug!(
        rows = records.len(),
        warnings = warnings.len(),
        ?scale,
        "ingested payload"
    );
    Ingested {
        dataset: Dataset::new(records, scale),
        warnings,
    }
}

fn infer_discount_scale(entries: &[Map<String, Value>]) -> DiscountScale {
    DiscountScale::infer(
        entries
            .iter()
            .filter_map(|entry| entry.get(FieldName::DiscountPercentage.as_str()))
            .filter_map(|value| validate::coerce_real(value).ok().flatten()),
    )
}

fn parse_row(
    entry: &Map<String, Value>,
    warnings: &mut RowWarnings<'_>,
) -> Record {
    Record {
        category: field(entry, FieldName::Category, warnings, validate::coerce_string),
        product_name: field(
            entry,
            FieldName::ProductName,
            warnings,
            validate::coerce_string,
        ),
        price: field(entry, FieldName::Price, warnings, |value| {
            validate::coerce_bounded(value, Bounds::NON_NEGATIVE)
        }),
        quantity: field(entry, FieldName::Quantity, warnings, validate::coerce_count),
        discount_percentage: field(entry, FieldName::DiscountPercentage, warnings, |value| {
            validate::coerce_bounded(value, Bounds::NON_NEGATIVE)
        }),
        rating: field(entry, FieldName::Rating, warnings, |value| {
            validate::coerce_bounded(value, Bounds::RATING)
        }),
        date: field(entry, FieldName::Date, warnings, validate::coerce_date),
    }
}

fn field<T>(
    entry: &Map<String, Value>,
    name: FieldName,
    warnings: &mut RowWarnings<'_>,
    coerce: impl FnOnce(&Value) -> Coerced<T>,
) -> Option<T> {
    let value = entry.get(name.as_str()).unwrap_or(&Value::Null);
    match coerce(value) {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            if name.is_required() {
                warnings.push(name, value.clone(), WarningReason::MissingRequired);
            }
            None
        }
        Err(reason) => {
            warnings.push(name, value.clone(), reason);
            None
        }
    }
}
