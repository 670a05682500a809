//! Redis storage backend implementation.
//!
//! Shares registered secrets between several service instances.

use super::{SecretEntry, SecretStore};
use crate::OtpError;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::MultiplexedConnection};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Redis-based secret store.
///
/// All secrets live in one hash, `<prefix>:secrets`, with the application
/// name as field and the raw key bytes as value. Each operation is a single
/// hash command and therefore atomic on the server.
///
/// # Example
///
/// ```rust
/// use otpbase::storage::RedisStore;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), otpbase::OtpError> {
/// let store = Arc::new(RedisStore::new("redis://localhost:6379", "otpbase")?);
/// # Ok(())
/// # }
/// ```
pub struct RedisStore {
    client: Client,
    hash_key: String,
    /// Shared persistent connection, re-established when it goes stale
    conn: Arc<Mutex<Option<MultiplexedConnection>>>,
}

impl RedisStore {
    /// Create a new Redis store.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Redis connection URL (e.g., "redis://localhost:6379")
    /// * `key_prefix` - Prefix for the secrets hash to avoid collisions
    pub fn new(redis_url: &str, key_prefix: &str) -> Result<Self, OtpError> {
        let client = Client::open(redis_url)
            .map_err(|e| OtpError::storage(format!("Redis client error: {}", e)))?;

        Ok(Self {
            client,
            hash_key: format!("{}:secrets", key_prefix),
            conn: Arc::new(Mutex::new(None)),
        })
    }

    /// Get or create a persistent connection
    async fn get_connection(&self) -> Result<MultiplexedConnection, OtpError> {
        let mut conn_guard = self.conn.lock().await;

        if let Some(conn) = conn_guard.as_ref() {
            let mut test_conn = conn.clone();
            match redis::cmd("PING")
                .query_async::<_, String>(&mut test_conn)
                .await
            {
                Ok(_) => return Ok(conn.clone()),
                Err(_) => {
                    // Connection is dead, remove it
                    *conn_guard = None;
                }
            }
        }

        let new_conn = self
            .client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e| OtpError::storage(format!("Redis connection failed: {}", e)))?;

        *conn_guard = Some(new_conn.clone());
        Ok(new_conn)
    }
}

#[async_trait]
impl SecretStore for RedisStore {
    async fn init(&self) -> Result<(), OtpError> {
        let mut conn = self.get_connection().await?;

        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| OtpError::storage(format!("Redis ping failed: {}", e)))?;

        Ok(())
    }

    async fn put(&self, name: &str, key: &[u8]) -> Result<(), OtpError> {
        let mut conn = self.get_connection().await?;

        let _: () = conn
            .hset(&self.hash_key, name, key)
            .await
            .map_err(OtpError::storage)?;

        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Vec<u8>, OtpError> {
        let mut conn = self.get_connection().await?;

        let value: Option<Vec<u8>> = conn
            .hget(&self.hash_key, name)
            .await
            .map_err(OtpError::storage)?;

        value.ok_or_else(|| OtpError::NotFound(name.to_string()))
    }

    async fn delete(&self, name: &str) -> Result<(), OtpError> {
        let mut conn = self.get_connection().await?;

        let _: () = conn
            .hdel(&self.hash_key, name)
            .await
            .map_err(OtpError::storage)?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<SecretEntry>, OtpError> {
        let mut conn = self.get_connection().await?;

        let all: HashMap<String, Vec<u8>> = conn
            .hgetall(&self.hash_key)
            .await
            .map_err(OtpError::storage)?;

        Ok(all
            .into_iter()
            .map(|(name, key)| SecretEntry { name, key })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Note: These tests require a running Redis instance
    // Skip them if Redis is not available
    async fn get_test_store(prefix: &str) -> Option<RedisStore> {
        let store = RedisStore::new("redis://localhost:6379", prefix).ok()?;

        match store.init().await {
            Ok(()) => {
                // Start from an empty hash
                let mut conn = store.get_connection().await.ok()?;
                let _: () = conn.del(&store.hash_key).await.ok()?;
                Some(store)
            }
            Err(_) => {
                println!("Skipping Redis tests - no Redis server available");
                None
            }
        }
    }

    #[tokio::test]
    async fn test_redis_store_basic_operations() {
        let Some(store) = get_test_store("test_otpbase_basic").await else {
            return;
        };

        store.put("work", b"key-one").await.unwrap();
        assert_eq!(store.get("work").await.unwrap(), b"key-one");

        store.delete("work").await.unwrap();
        assert!(matches!(store.get("work").await, Err(OtpError::NotFound(_))));

        // Deleting again is still fine
        store.delete("work").await.unwrap();
    }

    #[tokio::test]
    async fn test_redis_store_put_replaces_and_lists() {
        let Some(store) = get_test_store("test_otpbase_list").await else {
            return;
        };

        store.put("work", b"old").await.unwrap();
        store.put("work", b"new").await.unwrap();
        store.put("bank", &[0u8, 255, 17]).await.unwrap();

        assert_eq!(store.get("work").await.unwrap(), b"new");

        let mut entries = store.list().await.unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "bank");
        assert_eq!(entries[0].key, vec![0u8, 255, 17]);
    }

    #[tokio::test]
    async fn test_redis_connection_reuse() {
        let Some(store) = get_test_store("test_otpbase_conn").await else {
            return;
        };

        for i in 0..10 {
            let name = format!("conn-test-{}", i);
            store.put(&name, b"k").await.unwrap();
            assert_eq!(store.get(&name).await.unwrap(), b"k");
        }

        assert_eq!(store.list().await.unwrap().len(), 10);
    }
}
