//! Error types for the cart store.

use thiserror::Error;

/// Errors reported by a [`KeyValueStorage`](crate::KeyValueStorage) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend refused or could not serve the request.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Cart store error type.
#[derive(Debug, Error)]
pub enum CartError {
    /// The cart accessor was requested without a mounted provider.
    #[error("use_cart must be used within a CartProvider")]
    MissingProvider,

    /// Reading the persisted cart failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The persisted cart blob could not be parsed.
    #[error("Corrupt cart data under {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The background persistence task is no longer running.
    #[error("Cart persistence worker has stopped")]
    WorkerStopped,
}

/// A cart write that did not reach storage.
///
/// Published on the handle's error channel; see
/// [`CartHandle::persistence_errors`](crate::CartHandle::persistence_errors).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to persist cart under {key}: {message}")]
pub struct PersistError {
    /// Storage key the write targeted.
    pub key: String,
    /// Backend or serialization error message.
    pub message: String,
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
