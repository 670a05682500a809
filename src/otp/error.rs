use thiserror::Error;

/// Error types that can occur during one-time code and inbox operations.
///
/// Every fallible operation in this crate returns `Result<T, OtpError>`.
/// Errors are returned synchronously to the immediate caller; nothing in the
/// library retries on its own. The surrounding service decides how each kind
/// maps onto a transport-level response, usually with the help of
/// [`OtpError::is_client_error`].
///
/// # Error Categories
///
/// - **Client Errors**: `EmptyBody`, `DecodeError`, `MissingField`, `NotFound`, `EmptyKey`
/// - **System Errors**: `StorageError`, `CryptoError`
///
/// # Example
///
/// ```rust
/// use otpbase::{OtpError, SmsInbox};
///
/// # async fn example() {
/// let inbox = SmsInbox::new();
///
/// match inbox.add("   ", Some("+15550100")).await {
///     Ok(_) => println!("Message stored"),
///     Err(OtpError::EmptyBody) => println!("Rejected blank message"),
///     Err(e) => println!("Other error: {e}"),
/// }
/// # }
/// ```
#[derive(Error, Debug)]
pub enum OtpError {
    /// The inbound message text was empty or only whitespace.
    ///
    /// The webhook caller should report a client error. Retrying the same
    /// request will fail the same way.
    #[error("Empty body is not allowed")]
    EmptyBody,

    /// The shared secret is not valid base-32.
    ///
    /// Raised by [`normalize`](crate::otp::normalize) when the secret contains
    /// characters outside the RFC 4648 alphabet or has invalid padding or
    /// length after repadding. The contained string describes the problem.
    #[error("Invalid secret: {0}")]
    DecodeError(String),

    /// A required field was omitted when registering an application.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// No secret is stored under the requested name.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The secret store backend failed.
    ///
    /// # When This Occurs
    ///
    /// - Database file is inaccessible or corrupted
    /// - Redis server is unreachable
    /// - A connection lock was poisoned by a panicking thread
    #[error("Storage error: {0}")]
    StorageError(String),

    /// A code was requested for zero-length key material.
    ///
    /// Generating a code from an empty key would yield a value that looks
    /// valid but is not tied to any real secret, so it is refused.
    #[error("Empty key material")]
    EmptyKey,

    /// A cryptographic or clock operation failed.
    ///
    /// In practice this means the system clock reports a time before the
    /// Unix epoch.
    #[error("Crypto error: {0}")]
    CryptoError(String),
}

impl OtpError {
    /// Wraps any backend error message as a [`OtpError::StorageError`].
    pub(crate) fn storage(err: impl std::fmt::Display) -> Self {
        OtpError::StorageError(err.to_string())
    }

    /// Returns `true` when the error was caused by the caller's input.
    ///
    /// Transport layers use this to choose between a 4xx and a 5xx response.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, OtpError::StorageError(_) | OtpError::CryptoError(_))
    }
}
