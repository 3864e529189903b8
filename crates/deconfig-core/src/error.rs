//! Error types for the hide/restore engine.

use deconfig_store::StoreError;
use thiserror::Error;

/// Result type for deconfig operations.
pub type Result<T> = std::result::Result<T, DeconfigError>;

/// Errors that can occur while reading or writing through deconfig.
#[derive(Error, Debug)]
pub enum DeconfigError {
    /// A verified read found a hidden field populated in the export store.
    #[error(
        "hidden configuration found in export store for '{name}' at {path}; run `deconfig remove-hidden` to fix"
    )]
    ConsistencyViolation { name: String, path: String },

    /// Failure reported by the export or live store.
    #[error(transparent)]
    Backend(StoreError),
}

impl DeconfigError {
    /// Whether this error is recoverable by rewriting the record.
    pub fn is_violation(&self) -> bool {
        matches!(self, DeconfigError::ConsistencyViolation { .. })
    }
}

impl From<StoreError> for DeconfigError {
    fn from(err: StoreError) -> Self {
        match err {
            // A wrapped deconfig store surfaces violations through the store contract.
            StoreError::HiddenConfiguration { name, path } => {
                DeconfigError::ConsistencyViolation { name, path }
            }
            other => DeconfigError::Backend(other),
        }
    }
}

impl From<DeconfigError> for StoreError {
    fn from(err: DeconfigError) -> Self {
        match err {
            DeconfigError::ConsistencyViolation { name, path } => {
                StoreError::HiddenConfiguration { name, path }
            }
            DeconfigError::Backend(inner) => inner,
        }
    }
}
