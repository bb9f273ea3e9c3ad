//! Caller-held dashboard session.
//!
//! A session starts empty, holds the outcome of the last load, and is replaced
//! by the next load or discarded with [`Session::clear`]. The core keeps no
//! state of its own between calls.

use crate::{
    gateway::{LoadError, ObjectStore, PersistenceGateway, RowSource},
    ingest::Ingested,
    record::Dataset,
    warning::IngestionWarning,
};

static EMPTY: Dataset = Dataset::empty();

#[derive(Debug)]
pub enum Session<E> {
    Empty,
    Loaded(Ingested),
    Failed(E),
}

impl<E> Default for Session<E> {
    fn default() -> Self {
        Session::Empty
    }
}

impl<E> Session<E> {
    pub fn new() -> Self {
        Session::Empty
    }

    /// Replace the session with the outcome of a load.
    pub fn set(&mut self, outcome: Result<Ingested, E>) {
        *self = match outcome {
            Ok(ingested) => Session::Loaded(ingested),
            Err(error) => Session::Failed(error),
        };
    }

    pub fn clear(&mut self) {
        *self = Session::Empty;
    }

    /// The loaded dataset, or an empty one when nothing is loaded.
    pub fn dataset(&self) -> &Dataset {
        match self {
            Session::Loaded(ingested) => &ingested.dataset,
            Session::Empty | Session::Failed(_) => &EMPTY,
        }
    }

    pub fn warnings(&self) -> &[IngestionWarning] {
        match self {
            Session::Loaded(ingested) => &ingested.warnings,
            Session::Empty | Session::Failed(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            Session::Failed(error) => Some(error),
            Session::Empty | Session::Loaded(_) => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Session::Loaded(_))
    }
}

impl<E> Session<LoadError<E>> {
    /// Load through the gateway, replacing whatever the session held.
    pub async fn load<O, Q>(&mut self, gateway: &PersistenceGateway<O, Q>)
    where
        O: ObjectStore + Sync,
        O::Error: std::fmt::Display,
        Q: RowSource<Error = E> + Sync,
        E: std::fmt::Display,
    {
        self.set(gateway.load().await);
    }
}
