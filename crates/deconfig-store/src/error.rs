//! Error types for store operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error on a backing file or directory.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Record or collection name that cannot be mapped onto the backend.
    #[error("invalid record or collection name: {0:?}")]
    InvalidName(String),

    /// Decoded document whose root is not a mapping.
    #[error("document root is not a mapping")]
    NotAMapping,

    /// A hidden field was found populated in an export store.
    #[error(
        "hidden configuration found in export store for '{name}' at {path}; run `deconfig remove-hidden` to fix"
    )]
    HiddenConfiguration { name: String, path: String },
}

impl StoreError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
