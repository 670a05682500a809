//! SQLite storage backend implementation.
//!
//! Persistent storage for single-instance deployments.

use super::{SecretEntry, SecretStore};
use crate::OtpError;
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::{Arc, Mutex, MutexGuard};

/// SQLite-based secret store.
///
/// Secrets live in a single `secret` table keyed by name. Writes are upserts,
/// so registering an existing name replaces its key in one statement.
///
/// # Example
///
/// ```rust
/// use otpbase::storage::{SecretStore, SqliteStore};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), otpbase::OtpError> {
/// // File-based storage
/// let store = Arc::new(SqliteStore::new("otpbase.db")?);
/// store.init().await?;
///
/// // Or use in-memory SQLite (for testing)
/// let memory_store = Arc::new(SqliteStore::new(":memory:")?);
/// # Ok(())
/// # }
/// ```
pub struct SqliteStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Create a new SQLite store.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the SQLite database file, or ":memory:" for in-memory database
    pub fn new(db_path: &str) -> Result<Self, OtpError> {
        let connection = if db_path == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(db_path)
        };

        let connection = connection.map_err(OtpError::storage)?;

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, OtpError> {
        self.connection
            .lock()
            .map_err(|_| OtpError::storage("SQLite connection lock poisoned"))
    }

    /// Create the database schema if it doesn't exist.
    fn init_schema(&self) -> Result<(), OtpError> {
        let conn = self.lock()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS secret (
                name TEXT PRIMARY KEY NOT NULL,
                key BLOB NOT NULL
            )
            "#,
            [],
        )
        .map_err(OtpError::storage)?;

        Ok(())
    }
}

#[async_trait]
impl SecretStore for SqliteStore {
    async fn init(&self) -> Result<(), OtpError> {
        self.init_schema()
    }

    async fn put(&self, name: &str, key: &[u8]) -> Result<(), OtpError> {
        let conn = self.lock()?;

        conn.execute(
            "INSERT INTO secret (name, key) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET key = excluded.key",
            params![name, key],
        )
        .map_err(OtpError::storage)?;

        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Vec<u8>, OtpError> {
        let conn = self.lock()?;

        conn.query_row(
            "SELECT key FROM secret WHERE name = ?1",
            params![name],
            |row| row.get::<_, Vec<u8>>(0),
        )
        .optional()
        .map_err(OtpError::storage)?
        .ok_or_else(|| OtpError::NotFound(name.to_string()))
    }

    async fn delete(&self, name: &str) -> Result<(), OtpError> {
        let conn = self.lock()?;

        conn.execute("DELETE FROM secret WHERE name = ?1", params![name])
            .map_err(OtpError::storage)?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<SecretEntry>, OtpError> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare("SELECT name, key FROM secret ORDER BY name")
            .map_err(OtpError::storage)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(SecretEntry {
                    name: row.get(0)?,
                    key: row.get(1)?,
                })
            })
            .map_err(OtpError::storage)?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(OtpError::storage)
    }
}
