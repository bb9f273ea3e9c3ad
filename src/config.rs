use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::gateway::DEFAULT_PREFIX;

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_owned()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Deserialize, Clone, Debug)]
pub struct StorageConfig {
    pub bucket: String,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    pub endpoint: Option<String>,
    pub region: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
    /// Upper bound for a single store or load call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to read config {}: {error}", path.display())]
    Read {
        path: PathBuf,
        error: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(serde_yaml::Error),
    #[error("Invalid config: {0}")]
    Invalid(&'static str),
}

impl Config {
    pub async fn load(path: &Path) -> Result<Self, Error> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|error| Error::Read {
                path: path.to_owned(),
                error,
            })?;
        let config = Self::from_yaml(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, Error> {
        serde_yaml::from_str(content).map_err(Error::Parse)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.storage.bucket.trim().is_empty() {
            return Err(Error::Invalid("storage.bucket must not be empty"));
        }
        let prefix = &self.storage.prefix;
        if prefix.is_empty() || prefix.starts_with('/') || prefix.ends_with('/') {
            return Err(Error::Invalid(
                "storage.prefix must be non-empty without leading or trailing '/'",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Invalid("timeout_secs must be positive"));
        }
        Ok(())
    }
}
