//! Error types for the record store.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error while {operation} at {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    /// The write failed but the previous record was restored from its backup.
    #[error("Operation failed, rolled back: {key}")]
    RolledBack {
        key: String,
        #[source]
        source: Box<StoreError>,
    },

    /// The write failed and the backup could not be moved back into place.
    /// The record at `key` needs manual recovery.
    #[error("Operation failed, could not roll back: {key} (write error: {write_error})")]
    Unrecoverable {
        key: String,
        write_error: Box<StoreError>,
        #[source]
        source: Box<StoreError>,
    },
}

impl StoreError {
    pub fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// True if a failed put left the previous record intact.
    pub fn is_rolled_back(&self) -> bool {
        matches!(self, StoreError::RolledBack { .. })
    }

    /// True if a failed put left its key in an indeterminate state.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, StoreError::Unrecoverable { .. })
    }
}

impl From<rmp_serde::encode::Error> for StoreError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for StoreError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        StoreError::Deserialization(e.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
