//! Durable key-value storage for the cart.
//!
//! Mirrors the browser local-storage contract: string values under string
//! keys, shared by every page (and every tab) of the site, with a per-origin
//! byte quota. Writes may fail; callers decide whether a failure matters.
//!
//! # Backends
//!
//! - [`MemoryStorage`] - In-process map; clones share the same data
//! - [`FileStorage`] - One file per key in a directory

use thiserror::Error;

pub mod file;
pub mod memory;

pub use file::{FileStorage, validate_key};
pub use memory::MemoryStorage;

/// Default per-origin quota, matching common browser limits.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Errors that can occur when reading or writing storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store cannot be used at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Filesystem operation failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The write would exceed the storage quota.
    #[error("storage quota exceeded: {required} bytes required, {quota} bytes allowed")]
    QuotaExceeded {
        /// Total bytes the store would hold after the write.
        required: usize,
        /// Configured quota.
        quota: usize,
    },

    /// The key cannot be used by this backend.
    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// The value could not be serialized.
    #[error("failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A string key-value store shared across pages.
///
/// Implementations must be safe to share between threads; the same store may
/// back several independent [`CartStore`](crate::cart_store::CartStore)
/// handles at once.
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, or `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written or the write would
    /// exceed the quota. A failed write leaves the previous value in place.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value under `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

/// Bytes a key/value pair counts against the quota.
pub(crate) const fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}
