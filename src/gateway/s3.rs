use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;

use crate::config::StorageConfig;

use super::ObjectStore;

pub struct Client {
    client: aws_sdk_s3::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to put object: {0}")]
    Put(String),
}

impl Client {
    /// Build a client from the ambient AWS environment, with optional endpoint
    /// and region overrides.
    pub async fn new(config: &StorageConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        if let Some(region) = &config.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.endpoint.is_some())
            .build();
        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
        }
    }
}

impl ObjectStore for Client {
    type Error = Error;

    async fn put(
        &self,
        bucket: String,
        key: String,
        content_type: String,
        body: Bytes,
    ) -> Result<(), Self::Error> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|error| Error::Put(error.to_string()))?;
        Ok(())
    }
}
