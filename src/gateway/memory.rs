//! In-process object store, used for local runs and tests.

use std::{collections::HashMap, convert::Infallible};

use bytes::Bytes;

use super::ObjectStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
}

#[derive(Default)]
pub struct Client {
    map: tokio::sync::Mutex<HashMap<(String, String), StoredObject>>,
}

impl Client {
    pub fn new() -> Self {
        Default::default()
    }

    pub async fn get(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.map
            .lock()
            .await
            .get(&(bucket.to_owned(), key.to_owned()))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.map.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.map.lock().await.is_empty()
    }
}

impl ObjectStore for Client {
    type Error = Infallible;

    async fn put(
        &self,
        bucket: String,
        key: String,
        content_type: String,
        body: Bytes,
    ) -> Result<(), Self::Error> {
        self.map
            .lock()
            .await
            .insert((bucket, key), StoredObject { body, content_type });
        Ok(())
    }
}
