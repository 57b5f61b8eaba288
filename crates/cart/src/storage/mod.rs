//! Key-value storage the cart is persisted to.
//!
//! The cart only needs a single string slot, so the collaborator interface is
//! deliberately small. Durability and atomicity are the backend's business.

mod file;
mod memory;

use async_trait::async_trait;

use crate::error::StorageError;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Asynchronous string key-value store.
#[async_trait]
pub trait KeyValueStorage: Send + Sync + 'static {
    /// Read the value under `key`, or `None` if nothing is stored there.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
