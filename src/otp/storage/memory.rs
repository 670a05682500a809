//! In-memory storage backend implementation.
//!
//! Ideal for testing, development, and deployments where secrets are
//! re-registered on every start.

use super::{SecretEntry, SecretStore};
use crate::OtpError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A simple in-memory secret store.
///
/// Uses a `HashMap` wrapped in `Arc<RwLock<>>` for thread-safe access.
/// Nothing is persisted across restarts.
///
/// # Example
///
/// ```rust
/// use otpbase::storage::{MemoryStore, SecretStore};
///
/// # async fn example() -> Result<(), otpbase::OtpError> {
/// let store = MemoryStore::new();
///
/// store.put("work", b"Hello!").await?;
/// assert_eq!(store.get("work").await?, b"Hello!");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn put(&self, name: &str, key: &[u8]) -> Result<(), OtpError> {
        let mut data = self.data.write().await;
        data.insert(name.to_string(), key.to_vec());
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Vec<u8>, OtpError> {
        let data = self.data.read().await;
        data.get(name)
            .cloned()
            .ok_or_else(|| OtpError::NotFound(name.to_string()))
    }

    async fn delete(&self, name: &str) -> Result<(), OtpError> {
        let mut data = self.data.write().await;
        data.remove(name);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<SecretEntry>, OtpError> {
        let data = self.data.read().await;
        Ok(data
            .iter()
            .map(|(name, key)| SecretEntry {
                name: name.clone(),
                key: key.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_basic_operations() -> Result<(), OtpError> {
        let store = MemoryStore::new();

        store.put("work", b"key-one").await?;
        assert_eq!(store.get("work").await?, b"key-one");

        store.delete("work").await?;
        assert!(matches!(store.get("work").await, Err(OtpError::NotFound(_))));

        Ok(())
    }

    #[tokio::test]
    async fn test_memory_store_put_replaces() -> Result<(), OtpError> {
        let store = MemoryStore::new();

        store.put("work", b"old").await?;
        store.put("work", b"new").await?;

        assert_eq!(store.get("work").await?, b"new");
        assert_eq!(store.list().await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_memory_store_missing() -> Result<(), OtpError> {
        let store = MemoryStore::new();

        match store.get("nope").await {
            Err(OtpError::NotFound(name)) => assert_eq!(name, "nope"),
            other => panic!("expected NotFound, got {other:?}"),
        }

        // Deleting a missing name is not an error
        store.delete("nope").await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_memory_store_list() -> Result<(), OtpError> {
        let store = MemoryStore::new();

        store.put("b", b"2").await?;
        store.put("a", b"1").await?;

        let mut entries = store.list().await?;
        entries.sort_by(|x, y| x.name.cmp(&y.name));
        assert_eq!(
            entries,
            vec![
                SecretEntry {
                    name: "a".to_string(),
                    key: b"1".to_vec(),
                },
                SecretEntry {
                    name: "b".to_string(),
                    key: b"2".to_vec(),
                },
            ]
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_memory_store_concurrent_access() -> Result<(), OtpError> {
        let store = Arc::new(MemoryStore::new());
        let mut handles = vec![];

        for i in 0..10 {
            let store_clone = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store_clone
                    .put(&format!("app-{i}"), format!("key-{i}").as_bytes())
                    .await
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        assert_eq!(store.list().await?.len(), 10);

        Ok(())
    }
}
