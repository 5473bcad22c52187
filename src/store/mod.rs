//! Store module - object retrieval and source memoization

mod cache;
mod local;
mod s3;

pub use cache::{Clock, ManualClock, SystemClock, TableCache};
pub use local::LocalStore;
pub use s3::{sign_get, S3Store, SignedHeaders};

use crate::config::{AppConfig, SourceKind};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Request for {id} failed: {message}")]
    Request { id: SourceId, message: String },
    #[error("Object store returned HTTP {status} for {id}")]
    Status { id: SourceId, status: u16 },
    #[error("Failed to read {id}: {source}")]
    Io {
        id: SourceId,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid object store endpoint: {0}")]
    Endpoint(String),
}

/// Identity of a stored object: fixed bucket plus object key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId {
    pub bucket: String,
    pub key: String,
}

impl SourceId {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Read-only access to raw object bytes.
pub trait ObjectStore: Send + Sync {
    fn fetch(&self, id: &SourceId) -> Result<Vec<u8>, StoreError>;

    /// Short human-readable description for status lines.
    fn describe(&self) -> String;
}

/// Build the store selected by configuration.
pub fn store_from_config(config: &AppConfig) -> Result<Arc<dyn ObjectStore>, StoreError> {
    match config.source.kind {
        SourceKind::S3 => Ok(Arc::new(S3Store::from_config(config)?)),
        SourceKind::Local => {
            let dir = config
                .source
                .local_dir
                .clone()
                .ok_or_else(|| StoreError::Endpoint("source.local_dir is not set".to_string()))?;
            Ok(Arc::new(LocalStore::new(dir)))
        }
    }
}
