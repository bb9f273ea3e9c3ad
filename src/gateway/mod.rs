//! Persistence gateway
//!
//! Mediates between the core and the two external services: an object store
//! that receives raw uploads, and a queryable store that serves the cleaned
//! product rows. Both sit behind traits so the transports stay swappable.
//!
//! Stores are last-writer-wins: two uploads with the same name hint, from the
//! same or different sessions, silently overwrite each other.

use std::fmt::Display;

use bytes::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::ingest::{self, Ingested, MalformedPayload};

pub mod memory;
pub mod s3;
pub mod sqlite;

pub const DEFAULT_PREFIX: &str = "uploads";
pub const CONTENT_TYPE: &str = "application/json";

pub trait ObjectStore {
    type Error;
    fn put(
        &self,
        bucket: String,
        key: String,
        content_type: String,
        body: Bytes,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Untyped row as returned by the queryable store.
pub type Row = Map<String, Value>;

pub trait RowSource {
    type Error;
    fn execute_named_query(
        &self,
        query: NamedQuery,
    ) -> impl Future<Output = Result<Vec<Row>, Self::Error>> + Send;
}

/// Fixed projections the gateway is allowed to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedQuery {
    /// All cleaned product rows.
    ProductsCleaned,
}

impl NamedQuery {
    pub fn name(&self) -> &'static str {
        match self {
            NamedQuery::ProductsCleaned => "products_cleaned",
        }
    }

    pub fn statement(&self) -> &'static str {
        match self {
            NamedQuery::ProductsCleaned => "SELECT * FROM products_cleaned",
        }
    }
}

impl Display for NamedQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError<E> {
    #[error("Invalid object name: {0:?}")]
    InvalidName(String),
    #[error("Failed to put {key}: {error}")]
    Put { key: StorageKey, error: E },
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError<E> {
    #[error("Failed to execute query {query}: {error}")]
    Query { query: NamedQuery, error: E },
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError<E> {
    #[error("Malformed payload: {0}")]
    Malformed(MalformedPayload),
    #[error(transparent)]
    Store(StoreError<E>),
}

pub struct PersistenceGateway<O, Q> {
    objects: O,
    rows: Q,
    bucket: String,
    prefix: String,
}

impl<O, Q> PersistenceGateway<O, Q> {
    pub fn new(objects: O, rows: Q, bucket: impl Into<String>) -> Self {
        Self {
            objects,
            rows,
            bucket: bucket.into(),
            prefix: DEFAULT_PREFIX.to_owned(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn objects(&self) -> &O {
        &self.objects
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Deterministic key for a name hint: `{prefix}/{name_hint}`, hint used
    /// verbatim. Blank hints have no key.
    pub fn key_for(&self, name_hint: &str) -> Option<StorageKey> {
        if name_hint.trim().is_empty() {
            return None;
        }
        Some(StorageKey(format!("{}/{name_hint}", self.prefix)))
    }
}

impl<O: ObjectStore + Sync, Q: RowSource + Sync> PersistenceGateway<O, Q>
where
    O::Error: Display,
    Q::Error: Display,
{
    /// Upload raw payload bytes in a single put. Overwrites any object stored
    /// under the same name hint.
    pub async fn store(
        &self,
        payload: &[u8],
        name_hint: &str,
    ) -> Result<StorageKey, StoreError<O::Error>> {
        let key = self
            .key_for(name_hint)
            .ok_or_else(|| StoreError::InvalidName(name_hint.to_owned()))?;
        self.objects
            .put(
                self.bucket.clone(),
                key.0.clone(),
                CONTENT_TYPE.to_owned(),
                Bytes::copy_from_slice(payload),
            )
            .await
            .inspect_err(|error| {
                error!(%error, %key, bucket = %self.bucket, "Failed to store payload")
            })
            .map_err(|error| StoreError::Put {
                key: key.clone(),
                error,
            })?;
        info!(%key, bucket = %self.bucket, bytes = payload.len(), "stored payload");
        Ok(key)
    }

    /// Validate the payload shape, then store it. Malformed payloads are never
    /// stored.
    pub async fn upload(
        &self,
        payload: &[u8],
        name_hint: &str,
    ) -> Result<(Ingested, StorageKey), UploadError<O::Error>> {
        let ingested = ingest::parse_bytes(payload).map_err(UploadError::Malformed)?;
        let key = self
            .store(payload, name_hint)
            .await
            .map_err(UploadError::Store)?;
        Ok((ingested, key))
    }

    /// Load every cleaned product row and run it through ingestion coercion.
    pub async fn load(&self) -> Result<Ingested, LoadError<Q::Error>> {
        let query = NamedQuery::ProductsCleaned;
        let rows = self
            .rows
            .execute_named_query(query)
            .await
            .inspect_err(|error| error!(%error, %query, "Failed to load dataset"))
            .map_err(|error| LoadError::Query { query, error })?;
        let ingested = ingest::parse_entries(&rows);
        if !ingested.warnings.is_empty() {
            warn!(
                %query,
                warnings = ingested.warnings.len(),
                "loaded rows with coercion warnings"
            );
        }
        info!(%query, rows = ingested.dataset.len(), "loaded dataset");
        Ok(ingested)
    }
}
