// Core code generation
mod error;
mod secret;
mod time_utils;
mod totp;

// Applications and SMS handling
mod config;
mod extract;
mod inbox;
mod registry;
mod sweeper;

// Storage backends
pub mod storage;

// Core exports
pub use error::OtpError;
pub use secret::normalize;
pub use time_utils::{TimeProviderFn, current_timestamp};
pub use totp::{DIGITS, TIME_STEP, TotpGenerator, hotp, totp};

// Application and inbox exports
pub use config::{
    ConfigPreset, DEFAULT_INBOX_CAPACITY, DEFAULT_RETENTION, DEFAULT_SWEEP_INTERVAL, OtpConfig,
};
pub use extract::extract;
pub use inbox::{AddOutcome, ForwardRelay, MessageEntry, SmsInbox};
pub use registry::{AppCode, AppRegistry};
pub use sweeper::{ExpirySweeper, Sweep, SweeperHandle};

// Storage exports
pub use storage::{MemoryStore, SecretEntry, SecretStore};
