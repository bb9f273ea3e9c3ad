//! Sales transaction ingestion, persistence and analytics.
//!
//! Raw payloads are validated into a [`Dataset`] by [`ingest`], persisted and
//! reloaded through [`gateway`], and summarized by [`aggregate`],
//! [`drilldown`] and [`dashboard`].

pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod drilldown;
pub mod gateway;
pub mod ingest;
pub mod record;
pub mod session;
pub mod warning;

#[cfg(test)]
mod tests;

pub use dashboard::Dashboard;
pub use ingest::{Ingested, MalformedPayload};
pub use record::{Dataset, DiscountScale, NumericField, Record};
pub use session::Session;
pub use warning::IngestionWarning;
