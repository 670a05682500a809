//! Periodic background expiry for the SMS inbox.

use crate::otp::config::{DEFAULT_SWEEP_INTERVAL, OtpConfig};
use crate::otp::error::OtpError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Something that can drop its expired contents on request.
///
/// [`SmsInbox`](crate::otp::SmsInbox) is the implementation used in
/// practice; the trait keeps the sweeper independent of it.
#[async_trait]
pub trait Sweep: Send + Sync {
    /// Removes expired contents and returns how many items were removed.
    async fn sweep(&self) -> Result<usize, OtpError>;
}

/// Runs [`Sweep::sweep`] on a fixed interval in a background task.
///
/// The sweeper owns nothing but its interval. [`ExpirySweeper::spawn`]
/// starts the task and returns a [`SweeperHandle`] that stops it.
///
/// # Example
///
/// ```rust
/// use otpbase::otp::{ExpirySweeper, SmsInbox};
/// use std::sync::Arc;
///
/// # async fn example() {
/// let inbox = Arc::new(SmsInbox::new());
/// let handle = ExpirySweeper::new().spawn(Arc::clone(&inbox));
///
/// // ... serve requests ...
///
/// handle.stop().await;
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ExpirySweeper {
    interval: Duration,
}

impl ExpirySweeper {
    /// Creates a sweeper running every 10 seconds.
    pub fn new() -> Self {
        Self {
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    /// Creates a sweeper using the interval of `config`.
    pub fn from_config(config: &OtpConfig) -> Self {
        Self::new().with_interval(config.sweep_interval)
    }

    /// Sets the time between sweeps.
    ///
    /// A zero interval is raised to one millisecond, since the underlying
    /// timer cannot tick at a zero period.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Returns the configured interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts sweeping `target` in a background task.
    ///
    /// The first sweep runs one interval after this call. Failed sweeps are
    /// logged and retried at the next tick.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<T: Sweep + 'static>(&self, target: Arc<T>) -> SweeperHandle {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let period = self.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!("Inbox sweeper started ({}ms interval)", period.as_millis());

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => match target.sweep().await {
                        Ok(0) => {}
                        Ok(removed) => tracing::debug!(removed, "Swept expired inbox entries"),
                        Err(e) => tracing::warn!("Inbox sweep failed: {}", e),
                    },
                }
            }

            tracing::info!("Inbox sweeper stopped");
        });

        SweeperHandle {
            stop_tx: Some(stop_tx),
            task: Some(task),
        }
    }
}

impl Default for ExpirySweeper {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a running sweeper task.
///
/// Dropping the handle also stops the task, but without waiting for it to
/// finish; use [`SweeperHandle::stop`] during an orderly shutdown.
#[derive(Debug)]
pub struct SweeperHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Signals the task to stop and waits until it has exited.
    ///
    /// A sweep already in progress is allowed to complete.
    pub async fn stop(mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            // The task may already be gone; nothing left to signal then.
            let _ = stop_tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Inbox sweeper task ended abnormally: {}", e);
            }
        }
    }

    /// Whether the background task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|task| task.is_finished())
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
    }
}
