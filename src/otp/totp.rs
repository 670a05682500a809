//! HOTP (RFC 4226) and TOTP (RFC 6238) code generation.
//!
//! Codes are always six digits derived from HMAC-SHA-1 with a 30 second
//! time step. Only the current time slot is ever computed; there is no
//! look-back or look-ahead window for clock skew.

use crate::otp::error::OtpError;
use crate::otp::time_utils::{TimeProviderFn, system_time_provider};
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Width of one TOTP time slot in seconds.
pub const TIME_STEP: u64 = 30;

/// Number of decimal digits in every generated code.
pub const DIGITS: u32 = 6;

/// Computes the HOTP code for `key` at `counter`.
///
/// Implements RFC 4226 dynamic truncation over an HMAC-SHA-1 digest of the
/// 8-byte big-endian counter. The result is always exactly six characters,
/// leading zeros included.
///
/// # Errors
///
/// Returns [`OtpError::EmptyKey`] if `key` is empty.
///
/// # Example
///
/// ```rust
/// use otpbase::otp::hotp;
///
/// // RFC 4226 Appendix D
/// assert_eq!(hotp(b"12345678901234567890", 0)?, "755224");
/// # Ok::<(), otpbase::OtpError>(())
/// ```
pub fn hotp(key: &[u8], counter: u64) -> Result<String, OtpError> {
    if key.is_empty() {
        return Err(OtpError::EmptyKey);
    }

    let mut mac =
        HmacSha1::new_from_slice(key).map_err(|e| OtpError::CryptoError(e.to_string()))?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    let offset = (digest[19] & 0x0f) as usize;
    let truncated = u32::from_be_bytes([
        digest[offset],
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]) & 0x7fff_ffff;

    let code = truncated % 10u32.pow(DIGITS);
    Ok(format!("{:0width$}", code, width = DIGITS as usize))
}

/// Computes the TOTP code for `key` at the current system time.
///
/// Shorthand for `TotpGenerator::new().totp(key)`.
pub fn totp(key: &[u8]) -> Result<String, OtpError> {
    TotpGenerator::new().totp(key)
}

/// Generator for time-based codes with a pluggable clock.
///
/// The generator itself is stateless apart from its time provider and can be
/// shared freely between tasks.
///
/// # Example
///
/// ```rust
/// use otpbase::otp::TotpGenerator;
///
/// let generator = TotpGenerator::new().with_time_provider(|| Ok(59));
/// assert_eq!(generator.totp(b"12345678901234567890")?, "287082");
/// # Ok::<(), otpbase::OtpError>(())
/// ```
pub struct TotpGenerator {
    time_provider: TimeProviderFn,
}

impl TotpGenerator {
    /// Creates a generator backed by the system clock.
    pub fn new() -> Self {
        Self {
            time_provider: system_time_provider(),
        }
    }

    /// Replaces the clock used to derive the counter.
    ///
    /// The provider returns seconds since the Unix epoch.
    pub fn with_time_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Result<u64, OtpError> + Send + Sync + 'static,
    {
        self.time_provider = Box::new(provider);
        self
    }

    /// Reads the generator's clock.
    pub fn now(&self) -> Result<u64, OtpError> {
        (self.time_provider)()
    }

    /// Computes the code for the current time slot.
    pub fn totp(&self, key: &[u8]) -> Result<String, OtpError> {
        let now = self.now()?;
        self.totp_at(key, now)
    }

    /// Computes the code for the slot containing `unix_seconds`.
    pub fn totp_at(&self, key: &[u8], unix_seconds: u64) -> Result<String, OtpError> {
        hotp(key, Self::counter_at(unix_seconds))
    }

    /// Returns the HOTP counter for the slot containing `unix_seconds`.
    pub fn counter_at(unix_seconds: u64) -> u64 {
        unix_seconds / TIME_STEP
    }

    /// Seconds until the code for the current slot changes.
    pub fn seconds_remaining(&self) -> Result<u64, OtpError> {
        Ok(Self::seconds_remaining_at(self.now()?))
    }

    /// Seconds until the slot containing `unix_seconds` ends.
    pub fn seconds_remaining_at(unix_seconds: u64) -> u64 {
        TIME_STEP - unix_seconds % TIME_STEP
    }
}

impl Default for TotpGenerator {
    fn default() -> Self {
        Self::new()
    }
}
