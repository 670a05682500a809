//! Pluggable storage backends for application secrets.
//!
//! This module provides a trait-based storage system that allows different
//! backends to persist name → key-bytes pairs. The available backends depend
//! on the enabled features.

use crate::OtpError;
use async_trait::async_trait;

// Always available
mod memory;
pub use memory::MemoryStore;

// Feature-gated storage backends
#[cfg(feature = "sqlite-storage")]
mod sqlite;
#[cfg(feature = "sqlite-storage")]
pub use sqlite::SqliteStore;

#[cfg(feature = "redis-storage")]
mod redis;
#[cfg(feature = "redis-storage")]
pub use redis::RedisStore;

/// A stored application secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretEntry {
    /// Unique application name
    pub name: String,
    /// Decoded key bytes
    pub key: Vec<u8>,
}

/// Abstract storage backend for application secrets.
///
/// Each method is a self-contained atomic operation against the backend;
/// callers never need to group several calls into a transaction.
///
/// # Available Implementations
///
/// - [`MemoryStore`] - Always available, in-memory HashMap-based storage
/// - `SqliteStore` - Available with `sqlite-storage` feature, persistent SQLite storage
/// - `RedisStore` - Available with `redis-storage` feature, shared Redis storage
///
/// # Error Handling
///
/// Backend failures are reported as [`OtpError::StorageError`]. A lookup
/// miss in [`get`](SecretStore::get) is [`OtpError::NotFound`].
///
/// # Example Implementation
///
/// ```rust
/// use otpbase::storage::{SecretEntry, SecretStore};
/// use otpbase::OtpError;
/// use async_trait::async_trait;
/// use std::collections::BTreeMap;
/// use tokio::sync::Mutex;
///
/// #[derive(Default)]
/// pub struct OrderedStore {
///     data: Mutex<BTreeMap<String, Vec<u8>>>,
/// }
///
/// #[async_trait]
/// impl SecretStore for OrderedStore {
///     async fn put(&self, name: &str, key: &[u8]) -> Result<(), OtpError> {
///         self.data.lock().await.insert(name.to_string(), key.to_vec());
///         Ok(())
///     }
///
///     async fn get(&self, name: &str) -> Result<Vec<u8>, OtpError> {
///         self.data
///             .lock()
///             .await
///             .get(name)
///             .cloned()
///             .ok_or_else(|| OtpError::NotFound(name.to_string()))
///     }
///
///     async fn delete(&self, name: &str) -> Result<(), OtpError> {
///         self.data.lock().await.remove(name);
///         Ok(())
///     }
///
///     async fn list(&self) -> Result<Vec<SecretEntry>, OtpError> {
///         Ok(self
///             .data
///             .lock()
///             .await
///             .iter()
///             .map(|(name, key)| SecretEntry { name: name.clone(), key: key.clone() })
///             .collect())
///     }
/// }
/// ```
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Optional method for storage backend initialization.
    ///
    /// Called once before first use. Implementations can use this for
    /// schema creation, connection checks, etc.
    async fn init(&self) -> Result<(), OtpError> {
        Ok(())
    }

    /// Stores `key` under `name`, replacing any existing key.
    async fn put(&self, name: &str, key: &[u8]) -> Result<(), OtpError>;

    /// Retrieves the key stored under `name`.
    ///
    /// # Returns
    ///
    /// * `Ok(key)` - The stored key bytes
    /// * `Err(OtpError::NotFound)` - Nothing is stored under `name`
    /// * `Err(OtpError::StorageError)` - The backend failed
    async fn get(&self, name: &str) -> Result<Vec<u8>, OtpError>;

    /// Removes `name`. Removing a name that does not exist succeeds.
    async fn delete(&self, name: &str) -> Result<(), OtpError>;

    /// Returns every stored secret.
    ///
    /// The order is backend-specific; callers that present the list must
    /// sort it themselves.
    async fn list(&self) -> Result<Vec<SecretEntry>, OtpError>;
}
