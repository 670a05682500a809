//! # otpbase
//!
//! A Rust library for time-based one-time codes and short-lived SMS codes.
//!
//! The library has two independent halves:
//!
//! - **Authenticator**: register applications by name with a base-32 secret
//!   and compute their current six-digit TOTP codes (RFC 6238, HMAC-SHA-1,
//!   30 second step).
//! - **SMS inbox**: capture inbound text messages from a webhook, keep the
//!   five most recent for one minute, and extract the numeric codes they
//!   carry.
//!
//! ## Features
//!
//! - **RFC 4226 / RFC 6238**: Byte-exact HOTP and TOTP codes
//! - **Forgiving secrets**: Lowercase, spaced and unpadded secrets are accepted
//! - **Pluggable Storage**: Memory, SQLite, Redis or your own [`storage::SecretStore`]
//! - **Bounded Inbox**: Count and age bounds with a background [`ExpirySweeper`]
//! - **Async Support**: Fully asynchronous API design
//!
//! ## Quick Start
//!
//! ### Authenticator codes
//!
//! ```rust
//! use otpbase::AppRegistry;
//! use otpbase::storage::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), otpbase::OtpError> {
//! let registry = AppRegistry::new(Arc::new(MemoryStore::new()));
//! registry.init().await?;
//!
//! registry.register("work", "jbsw y3dp ehpk 3pxp").await?;
//!
//! for app in registry.codes().await? {
//!     println!("{}: {}", app.name, app.code);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### SMS inbox
//!
//! ```rust
//! use otpbase::{ExpirySweeper, OtpConfig, SmsInbox};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), otpbase::OtpError> {
//! let config = OtpConfig::default();
//! let inbox = Arc::new(SmsInbox::from_config(&config));
//!
//! // Drop expired messages in the background
//! let sweeper = ExpirySweeper::from_config(&config).spawn(Arc::clone(&inbox));
//!
//! inbox.add("Your login code is 482913", Some("+15550199")).await?;
//! assert_eq!(inbox.list(true).await, vec!["482913".to_string()]);
//!
//! sweeper.stop().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! Inbox bounds and forwarding can be configured using environment variables:
//!
//! ```bash
//! export OTPBASE_INBOX_CAPACITY=5
//! export OTPBASE_RETENTION=60        # seconds
//! export OTPBASE_SWEEP_INTERVAL=10   # seconds
//! export OTPBASE_FORWARD="+15550100" # relay every message to this number
//! ```
//!
//! ## Architecture
//!
//! - **[`AppRegistry`]**: Named applications backed by a secret store
//! - **[`TotpGenerator`]**: Code generation with a pluggable clock
//! - **[`SmsInbox`]**: The bounded, self-expiring message buffer
//! - **[`ExpirySweeper`]**: Periodic expiry for anything implementing [`Sweep`]
//! - **[`OtpError`]**: Comprehensive error handling for all failure modes

pub mod otp;

pub use otp::storage;

// Re-export commonly used types
pub use otp::{
    AddOutcome, AppCode, AppRegistry, ConfigPreset, ExpirySweeper, ForwardRelay, MessageEntry,
    OtpConfig, OtpError, SmsInbox, Sweep, SweeperHandle, TotpGenerator,
};
