//! Error types shared by every store engine.

use thiserror::Error;


/// Errors returned by the token and client stores.
///
/// A lookup miss is never an error; see [`crate::Lookup`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Malformed input from the caller. Retrying will not help.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// A unique key supplied on create is already taken.
    #[error("Conflict: {field} already exists")]
    Conflict { field: String },

    /// I/O, encoding or connectivity failure, including use after close.
    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl StoreError {
    /// Error returned by every operation on a closed store
    pub fn closed() -> Self {
        StoreError::Storage {
            message: "store is closed".to_string(),
        }
    }

    pub fn conflict(field: impl Into<String>) -> Self {
        StoreError::Conflict {
            field: field.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        StoreError::Storage {
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, StoreError::Storage { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
