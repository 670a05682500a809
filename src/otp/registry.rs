//! Named applications and their current codes.

use crate::otp::error::OtpError;
use crate::otp::secret::normalize;
use crate::otp::storage::SecretStore;
use crate::otp::totp::TotpGenerator;
use serde::Serialize;
use std::sync::Arc;

/// The current code of one registered application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppCode {
    /// Application name
    pub name: String,
    /// Six-digit code for the current time slot
    pub code: String,
}

/// Registers applications by name and produces their TOTP codes.
///
/// The registry decodes user-supplied secrets, persists the resulting key
/// bytes in a [`SecretStore`], and computes codes on demand. Listings are
/// always sorted by application name.
///
/// # Example
///
/// ```rust
/// use otpbase::AppRegistry;
/// use otpbase::storage::MemoryStore;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), otpbase::OtpError> {
/// let registry = AppRegistry::new(Arc::new(MemoryStore::new()));
/// registry.init().await?;
///
/// registry.register("work", "JBSWY3DPEHPK3PXP").await?;
/// let code = registry.code("work").await?;
/// assert_eq!(code.len(), 6);
/// # Ok(())
/// # }
/// ```
pub struct AppRegistry<S: SecretStore> {
    store: Arc<S>,
    generator: TotpGenerator,
}

impl<S: SecretStore + 'static> AppRegistry<S> {
    /// Creates a registry over `store`, generating codes with the system clock.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            generator: TotpGenerator::new(),
        }
    }

    /// Replaces the clock used to generate codes.
    pub fn with_time_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Result<u64, OtpError> + Send + Sync + 'static,
    {
        self.generator = self.generator.with_time_provider(provider);
        self
    }

    /// Initializes the storage backend (e.g., creates database tables).
    pub async fn init(&self) -> Result<(), OtpError> {
        self.store.init().await
    }

    /// Registers `name` with the base-32 `secret`, replacing any earlier
    /// registration under the same name.
    ///
    /// Surrounding whitespace in `name` is ignored here and in every other
    /// lookup by name.
    ///
    /// # Errors
    ///
    /// - [`OtpError::MissingField`] if `name` or `secret` is blank
    /// - [`OtpError::DecodeError`] if `secret` is not valid base-32
    /// - [`OtpError::EmptyKey`] if `secret` decodes to no key bytes
    /// - [`OtpError::StorageError`] if the store fails
    pub async fn register(&self, name: &str, secret: &str) -> Result<(), OtpError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(OtpError::MissingField("name"));
        }
        if secret.trim().is_empty() {
            return Err(OtpError::MissingField("secret"));
        }

        let key = normalize(secret)?;
        if key.is_empty() {
            return Err(OtpError::EmptyKey);
        }

        self.store.put(name, &key).await?;
        tracing::debug!(app = name, "Registered application");
        Ok(())
    }

    /// Returns the current code for `name`.
    ///
    /// # Errors
    ///
    /// - [`OtpError::NotFound`] if `name` is not registered
    /// - [`OtpError::EmptyKey`] if the stored key is empty
    pub async fn code(&self, name: &str) -> Result<String, OtpError> {
        let key = self.store.get(name.trim()).await?;
        self.generator.totp(&key)
    }

    /// Removes `name`. Removing an unknown name succeeds.
    pub async fn remove(&self, name: &str) -> Result<(), OtpError> {
        let name = name.trim();
        self.store.delete(name).await?;
        tracing::debug!(app = name, "Removed application");
        Ok(())
    }

    /// Returns the registered application names in lexicographic order.
    pub async fn names(&self) -> Result<Vec<String>, OtpError> {
        let mut names: Vec<String> = self
            .store
            .list()
            .await?
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        names.sort();
        Ok(names)
    }

    /// Returns the current code of every application, sorted by name.
    ///
    /// All codes are computed for the same instant, so a listing never
    /// straddles a slot boundary.
    pub async fn codes(&self) -> Result<Vec<AppCode>, OtpError> {
        let mut entries = self.store.list().await?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let now = self.generator.now()?;
        entries
            .into_iter()
            .map(|entry| {
                Ok(AppCode {
                    code: self.generator.totp_at(&entry.key, now)?,
                    name: entry.name,
                })
            })
            .collect()
    }

    /// Seconds until the current codes change.
    pub fn seconds_remaining(&self) -> Result<u64, OtpError> {
        self.generator.seconds_remaining()
    }

    /// Returns a reference to the storage backend.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }
}
