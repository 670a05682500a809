//! Time utilities for safe timestamp handling.
//!
//! Both the code generator and the inbox read the wall clock through a
//! [`TimeProviderFn`], so tests can freeze or advance time without sleeping.

use crate::otp::error::OtpError;
use std::time::{SystemTime, UNIX_EPOCH};

/// A function that provides the current time in seconds since the Unix epoch.
pub type TimeProviderFn = Box<dyn Fn() -> Result<u64, OtpError> + Send + Sync>;

/// Get current timestamp in seconds since Unix epoch.
///
/// In the extremely rare case where system time is before Unix epoch,
/// it returns an error instead of panicking.
pub fn current_timestamp() -> Result<u64, OtpError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| OtpError::CryptoError("System time is before Unix epoch".to_string()))
}

/// The default time provider, backed by the system clock.
pub(crate) fn system_time_provider() -> TimeProviderFn {
    Box::new(current_timestamp)
}

/// Check whether something recorded at `recorded_at` has outlived `max_age_secs`.
///
/// The comparison is strict: an entry exactly `max_age_secs` old is still live.
pub(crate) fn is_expired(recorded_at: u64, now: u64, max_age_secs: u64) -> bool {
    now.saturating_sub(recorded_at) > max_age_secs
}
