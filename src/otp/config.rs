use std::time::Duration;

/// Maximum number of inbox entries kept by default.
pub const DEFAULT_INBOX_CAPACITY: usize = 5;

/// Default age after which an inbox entry may be swept.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(60);

/// Default interval between background sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10);

/// Predefined configuration presets for common deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    /// The standard inbox bounds.
    ///
    /// - Capacity: 5 entries
    /// - Retention: 1 minute
    /// - Sweep interval: 10 seconds
    Standard,

    /// Longer retention for slow pickup, e.g. a human reading codes off a
    /// status page.
    ///
    /// - Capacity: 10 entries
    /// - Retention: 5 minutes
    /// - Sweep interval: 30 seconds
    Relaxed,

    /// Load configuration from environment variables.
    ///
    /// See [`OtpConfig`] for the variables read.
    FromEnv,
}

/// Configuration for the SMS inbox and its sweeper.
///
/// # Environment Variables
///
/// - `OTPBASE_INBOX_CAPACITY`: Maximum retained messages (default: 5)
/// - `OTPBASE_RETENTION`: Retention window in seconds (default: 60)
/// - `OTPBASE_SWEEP_INTERVAL`: Sweep interval in seconds (default: 10)
/// - `OTPBASE_FORWARD`: Number inbound messages are relayed to (default: unset, no relay)
///
/// # Example
///
/// ```rust
/// use otpbase::otp::{ConfigPreset, OtpConfig};
/// use std::time::Duration;
///
/// let config = OtpConfig::from(ConfigPreset::Standard);
/// assert_eq!(config.retention, Duration::from_secs(60));
///
/// let config = OtpConfig {
///     forward_to: Some("+15550100".to_string()),
///     ..OtpConfig::from(ConfigPreset::Standard)
/// };
/// ```
#[derive(Debug, Clone)]
pub struct OtpConfig {
    /// Maximum number of messages kept in the inbox
    pub inbox_capacity: usize,
    /// Age after which a message may be removed by a sweep
    pub retention: Duration,
    /// How often the background sweeper runs
    pub sweep_interval: Duration,
    /// Destination inbound messages are relayed to, if any
    pub forward_to: Option<String>,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            inbox_capacity: std::env::var("OTPBASE_INBOX_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_INBOX_CAPACITY),
            retention: Duration::from_secs(
                std::env::var("OTPBASE_RETENTION")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_RETENTION.as_secs()),
            ),
            sweep_interval: Duration::from_secs(
                std::env::var("OTPBASE_SWEEP_INTERVAL")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SWEEP_INTERVAL.as_secs()),
            ),
            forward_to: std::env::var("OTPBASE_FORWARD")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        }
    }
}

impl OtpConfig {
    /// Validates the configuration and returns any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.inbox_capacity == 0 {
            warnings.push("Inbox capacity of 0 discards every message".to_string());
        }
        if self.retention.as_secs() < 30 {
            warnings.push(
                "Very short retention (< 30 seconds) may expire codes before pickup".to_string(),
            );
        }
        if self.retention.as_secs() > 900 {
            warnings.push("Long retention (> 15 minutes) keeps stale codes around".to_string());
        }
        if self.sweep_interval.is_zero() {
            warnings.push("Sweep interval must be greater than zero".to_string());
        } else if self.sweep_interval > self.retention {
            warnings.push(
                "Sweep interval longer than retention lets expired messages linger".to_string(),
            );
        }

        warnings
    }

    /// Returns a summary of the current configuration.
    pub fn summary(&self) -> String {
        format!(
            "OtpConfig {{ Capacity: {}, Retention: {}s, Sweep Interval: {}s, Forwarding: {} }}",
            self.inbox_capacity,
            self.retention.as_secs(),
            self.sweep_interval.as_secs(),
            if self.forward_to.is_some() { "on" } else { "off" },
        )
    }
}

impl From<ConfigPreset> for OtpConfig {
    fn from(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Standard => Self {
                inbox_capacity: DEFAULT_INBOX_CAPACITY,
                retention: DEFAULT_RETENTION,
                sweep_interval: DEFAULT_SWEEP_INTERVAL,
                forward_to: None,
            },
            ConfigPreset::Relaxed => Self {
                inbox_capacity: 10,
                retention: Duration::from_secs(300),
                sweep_interval: Duration::from_secs(30),
                forward_to: None,
            },
            ConfigPreset::FromEnv => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env_vars() {
        unsafe {
            std::env::remove_var("OTPBASE_INBOX_CAPACITY");
            std::env::remove_var("OTPBASE_RETENTION");
            std::env::remove_var("OTPBASE_SWEEP_INTERVAL");
            std::env::remove_var("OTPBASE_FORWARD");
        }
    }

    #[test]
    fn test_standard_preset() {
        let config = OtpConfig::from(ConfigPreset::Standard);
        assert_eq!(config.inbox_capacity, 5);
        assert_eq!(config.retention.as_secs(), 60);
        assert_eq!(config.sweep_interval.as_secs(), 10);
        assert!(config.forward_to.is_none());
    }

    #[test]
    fn test_relaxed_preset() {
        let config = OtpConfig::from(ConfigPreset::Relaxed);
        assert_eq!(config.inbox_capacity, 10);
        assert_eq!(config.retention.as_secs(), 300);
        assert_eq!(config.sweep_interval.as_secs(), 30);
    }

    #[test]
    #[serial]
    fn test_from_env() {
        clear_env_vars();

        unsafe {
            std::env::set_var("OTPBASE_INBOX_CAPACITY", "8");
            std::env::set_var("OTPBASE_RETENTION", "120");
            std::env::set_var("OTPBASE_SWEEP_INTERVAL", "15");
            std::env::set_var("OTPBASE_FORWARD", "+15550100");
        }

        let config = OtpConfig::from(ConfigPreset::FromEnv);
        assert_eq!(config.inbox_capacity, 8);
        assert_eq!(config.retention.as_secs(), 120);
        assert_eq!(config.sweep_interval.as_secs(), 15);
        assert_eq!(config.forward_to.as_deref(), Some("+15550100"));

        clear_env_vars();
    }

    #[test]
    #[serial]
    fn test_env_defaults_and_blank_forward() {
        clear_env_vars();

        unsafe {
            std::env::set_var("OTPBASE_RETENTION", "not-a-number");
            std::env::set_var("OTPBASE_FORWARD", "  ");
        }

        let config = OtpConfig::default();
        assert_eq!(config.inbox_capacity, DEFAULT_INBOX_CAPACITY);
        assert_eq!(config.retention, DEFAULT_RETENTION);
        assert!(config.forward_to.is_none());

        clear_env_vars();
    }

    #[test]
    fn test_validation_valid_config() {
        let config = OtpConfig::from(ConfigPreset::Standard);
        assert!(config.validate().is_empty());

        let config = OtpConfig::from(ConfigPreset::Relaxed);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_validation_warnings() {
        let config = OtpConfig {
            inbox_capacity: 0,
            retention: Duration::from_secs(10),
            sweep_interval: Duration::from_secs(20),
            forward_to: None,
        };
        let warnings = config.validate();
        assert!(warnings.iter().any(|w| w.contains("capacity of 0")));
        assert!(warnings.iter().any(|w| w.contains("Very short retention")));
        assert!(warnings.iter().any(|w| w.contains("longer than retention")));

        let config = OtpConfig {
            sweep_interval: Duration::ZERO,
            ..OtpConfig::from(ConfigPreset::Standard)
        };
        assert!(
            config
                .validate()
                .iter()
                .any(|w| w.contains("greater than zero"))
        );
    }

    #[test]
    fn test_summary() {
        let config = OtpConfig {
            forward_to: Some("+15550100".to_string()),
            ..OtpConfig::from(ConfigPreset::Standard)
        };
        let summary = config.summary();
        assert!(summary.contains("Capacity: 5"));
        assert!(summary.contains("Retention: 60s"));
        assert!(summary.contains("Forwarding: on"));
    }
}
