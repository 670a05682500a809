//! Bounded, self-expiring inbox for inbound SMS messages.
//!
//! The inbox keeps the most recent messages newest-first. Two bounds apply:
//! a count bound enforced on every insert, and an age bound enforced by
//! [`SmsInbox::sweep`], which the [`ExpirySweeper`](crate::otp::ExpirySweeper)
//! calls periodically.

use crate::otp::config::{DEFAULT_INBOX_CAPACITY, DEFAULT_RETENTION, OtpConfig};
use crate::otp::error::OtpError;
use crate::otp::extract::extract;
use crate::otp::sweeper::Sweep;
use crate::otp::time_utils::{TimeProviderFn, is_expired, system_time_provider};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;

/// A single inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageEntry {
    /// The message body as received
    pub text: String,
    /// Sender identifier reported by the webhook, if any
    pub from: Option<String>,
    /// Unix timestamp (seconds) when the message was stored
    pub received_at: u64,
}

/// Data needed to relay an inbound message to the forwarding target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardRelay {
    /// Forwarding destination taken from configuration
    pub to: String,
    /// Sender of the original message
    pub from: String,
    /// Body of the original message
    pub text: String,
}

impl ForwardRelay {
    /// Renders a TwiML response instructing the SMS provider to relay the
    /// message.
    ///
    /// The original sender is embedded in a `[OTPBASE:<from>]` prefix so the
    /// recipient can tell relayed messages apart.
    ///
    /// # Example
    ///
    /// ```rust
    /// use otpbase::otp::ForwardRelay;
    ///
    /// let relay = ForwardRelay {
    ///     to: "+15550100".to_string(),
    ///     from: "+15550199".to_string(),
    ///     text: "Code: 123456".to_string(),
    /// };
    /// assert!(relay.twiml().contains("[OTPBASE:+15550199] Code: 123456"));
    /// ```
    pub fn twiml(&self) -> String {
        format!(
            "<?xml version='1.0' encoding='UTF-8'?>\n\
             <Response>\n    \
             <Message to='{}'>[OTPBASE:{}] {}</Message>\n\
             </Response>\n",
            escape_xml(&self.to),
            escape_xml(&self.from),
            escape_xml(&self.text),
        )
    }
}

/// What the webhook handler should do after a message was accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AddOutcome {
    /// The message was stored and nothing else needs to happen.
    Accepted,
    /// The message was stored and should be relayed.
    Forward(ForwardRelay),
}

/// Concurrent, bounded, self-expiring message buffer.
///
/// All state lives behind a single exclusive lock. Every operation holds it
/// only for the O(capacity) work on the entry sequence; code extraction and
/// relay formatting happen after it is released.
///
/// The inbox is an ordinary value: construct one, wrap it in an `Arc`, and
/// hand it to the request handlers and the sweeper that need it.
///
/// # Example
///
/// ```rust
/// use otpbase::otp::{AddOutcome, SmsInbox};
///
/// # async fn example() -> Result<(), otpbase::OtpError> {
/// let inbox = SmsInbox::new();
///
/// let outcome = inbox.add("Your code is 123456", Some("+15550199")).await?;
/// assert_eq!(outcome, AddOutcome::Accepted);
///
/// assert_eq!(inbox.list(true).await, vec!["123456".to_string()]);
/// # Ok(())
/// # }
/// ```
pub struct SmsInbox {
    entries: Mutex<VecDeque<MessageEntry>>,
    capacity: usize,
    retention: Duration,
    forward_to: Option<String>,
    time_provider: TimeProviderFn,
}

impl SmsInbox {
    /// Creates an inbox with the standard bounds (5 entries, 60 seconds)
    /// and no forwarding.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(DEFAULT_INBOX_CAPACITY + 1)),
            capacity: DEFAULT_INBOX_CAPACITY,
            retention: DEFAULT_RETENTION,
            forward_to: None,
            time_provider: system_time_provider(),
        }
    }

    /// Creates an inbox using the bounds and forwarding target of `config`.
    pub fn from_config(config: &OtpConfig) -> Self {
        let inbox = Self::new()
            .with_capacity(config.inbox_capacity)
            .with_retention(config.retention);
        match &config.forward_to {
            Some(to) => inbox.with_forward_to(to.clone()),
            None => inbox,
        }
    }

    /// Sets the maximum number of retained messages.
    ///
    /// Storage grows with the number of messages actually held, so a large
    /// bound costs nothing up front.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self.entries = Mutex::new(VecDeque::with_capacity(
            capacity.min(DEFAULT_INBOX_CAPACITY).saturating_add(1),
        ));
        self
    }

    /// Sets the age after which a sweep removes a message.
    ///
    /// Message ages are measured in whole seconds, so retention has
    /// whole-second resolution and any fractional part is ignored. A
    /// retention below one second expires a message once it is one second
    /// old.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Enables relaying of every accepted message to `to`.
    pub fn with_forward_to(mut self, to: impl Into<String>) -> Self {
        self.forward_to = Some(to.into());
        self
    }

    /// Replaces the clock used to timestamp and expire messages.
    ///
    /// The provider returns seconds since the Unix epoch.
    pub fn with_time_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Result<u64, OtpError> + Send + Sync + 'static,
    {
        self.time_provider = Box::new(provider);
        self
    }

    /// Stores an inbound message.
    ///
    /// The message becomes the newest entry; if the inbox then exceeds its
    /// capacity the oldest entries are dropped.
    ///
    /// # Errors
    ///
    /// - [`OtpError::EmptyBody`] if `text` is empty or whitespace
    /// - [`OtpError::CryptoError`] if the clock cannot be read
    pub async fn add(&self, text: &str, from: Option<&str>) -> Result<AddOutcome, OtpError> {
        if text.trim().is_empty() {
            return Err(OtpError::EmptyBody);
        }

        let entry = MessageEntry {
            text: text.to_string(),
            from: from.map(str::to_string),
            received_at: (self.time_provider)()?,
        };

        {
            let mut entries = self.entries.lock().await;
            entries.push_front(entry);
            entries.truncate(self.capacity);
        }

        tracing::debug!(from = from.unwrap_or("unknown"), "Stored inbound message");

        Ok(match &self.forward_to {
            Some(to) => AddOutcome::Forward(ForwardRelay {
                to: to.clone(),
                from: from.unwrap_or_default().to_string(),
                text: text.to_string(),
            }),
            None => AddOutcome::Accepted,
        })
    }

    /// Lists retained messages, newest first.
    ///
    /// With `extract_code` set, each message is reduced to the first run of
    /// six or more digits it contains (see [`extract`]).
    pub async fn list(&self, extract_code: bool) -> Vec<String> {
        let texts: Vec<String> = {
            let entries = self.entries.lock().await;
            entries.iter().map(|entry| entry.text.clone()).collect()
        };

        if extract_code {
            texts
                .into_iter()
                .map(|text| extract(&text).to_string())
                .collect()
        } else {
            texts
        }
    }

    /// Returns a snapshot of all retained entries, newest first.
    pub async fn entries(&self) -> Vec<MessageEntry> {
        self.entries.lock().await.iter().cloned().collect()
    }

    /// Number of retained messages.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the inbox holds no messages.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Removes every message.
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
        tracing::debug!("Cleared inbox");
    }

    /// Removes messages older than the retention window.
    ///
    /// Entries are scanned from the oldest end and removal stops at the first
    /// entry still inside the window. Timestamps are expected to be
    /// non-decreasing from oldest to newest; if the clock stepped backwards
    /// an expired entry may survive until a later sweep.
    ///
    /// Returns the number of removed messages.
    pub async fn sweep(&self) -> Result<usize, OtpError> {
        let now = (self.time_provider)()?;
        let max_age = self.retention.as_secs();

        let mut entries = self.entries.lock().await;
        let mut removed = 0;
        while let Some(oldest) = entries.back() {
            if !is_expired(oldest.received_at, now, max_age) {
                break;
            }
            entries.pop_back();
            removed += 1;
        }

        Ok(removed)
    }

    /// Returns the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the configured retention window.
    pub fn retention(&self) -> Duration {
        self.retention
    }

    /// Returns the forwarding target, if any.
    pub fn forward_to(&self) -> Option<&str> {
        self.forward_to.as_deref()
    }
}

impl Default for SmsInbox {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Sweep for SmsInbox {
    async fn sweep(&self) -> Result<usize, OtpError> {
        SmsInbox::sweep(self).await
    }
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
