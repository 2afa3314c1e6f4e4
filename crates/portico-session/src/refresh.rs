//! Background session refresh.
//!
//! A long-lived client can keep its server session alive by calling
//! `/auth/refresh` periodically. [`spawn`] starts a task that does exactly
//! that while the store is signed in, and skips ticks while it isn't.
//!
//! ```text
//! spawn() ──→ sleep(interval + jitter) ──→ signed in? ──yes──→ store.refresh()
//!                  ↑                           │                    │
//!                  └───────── no ──────────────┘←───────────────────┘
//! ```
//!
//! A refresh that has started always runs to completion; the stop signal
//! is only observed while sleeping.

use std::sync::Arc;
use std::time::Duration;

use portico_transport::Transport;
use rand::Rng;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::SessionStore;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// How often to refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Time between refreshes.
    pub interval: Duration,
    /// Random delay (0..jitter) added to the first tick only, so clients
    /// started together don't refresh in lockstep.
    pub initial_jitter: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10 * 60),
            initial_jitter: Duration::from_secs(5),
        }
    }
}

impl RefreshConfig {
    /// Shortest interval accepted by [`validated`](Self::validated).
    pub const MIN_INTERVAL: Duration = Duration::from_secs(1);
    /// Longest interval accepted by [`validated`](Self::validated).
    pub const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

    pub fn every(interval: Duration) -> Self {
        Self {
            interval,
            ..Self::default()
        }
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.initial_jitter = jitter;
        self
    }

    /// Clamps `interval` into [`Self::MIN_INTERVAL`]..=[`Self::MAX_INTERVAL`]
    /// and `initial_jitter` to at most one interval.
    pub fn validated(mut self) -> Self {
        if self.interval < Self::MIN_INTERVAL {
            tracing::warn!(
                interval_ms = self.interval.as_millis() as u64,
                "refresh interval below minimum, clamping"
            );
            self.interval = Self::MIN_INTERVAL;
        }
        if self.interval > Self::MAX_INTERVAL {
            tracing::warn!(
                interval_secs = self.interval.as_secs(),
                "refresh interval above maximum, clamping"
            );
            self.interval = Self::MAX_INTERVAL;
        }
        self.initial_jitter = self.initial_jitter.min(self.interval);
        self
    }

    fn first_delay(&self) -> Duration {
        let jitter_ms = u64::try_from(self.initial_jitter.as_millis()).unwrap_or(u64::MAX);
        let jitter = if jitter_ms > 0 {
            Duration::from_millis(rand::rng().random_range(0..jitter_ms))
        } else {
            Duration::ZERO
        };
        self.interval.saturating_add(jitter)
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// Controls a running refresher. Dropping the handle also stops the task.
#[derive(Debug)]
pub struct RefreshHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Signals the task and waits for it to exit.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "refresh task ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Starts refreshing `store` in the background.
pub fn spawn<T: Transport>(
    store: Arc<SessionStore<T>>,
    config: RefreshConfig,
) -> RefreshHandle {
    let config = config.validated();
    let (shutdown, rx) = watch::channel(false);
    tracing::debug!(
        interval_secs = config.interval.as_secs(),
        "session refresher started"
    );
    let task = tokio::spawn(run(store, config, rx));
    RefreshHandle { shutdown, task }
}

async fn run<T: Transport>(
    store: Arc<SessionStore<T>>,
    config: RefreshConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut delay = config.first_delay();
    loop {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            // Fires on `stop()` and when the handle is dropped.
            _ = shutdown.changed() => break,
        }
        delay = config.interval;

        if !store.snapshot().is_logged_in() {
            tracing::trace!("not signed in, skipping refresh");
            continue;
        }
        if let Err(e) = store.refresh().await {
            tracing::warn!(error = %e, "background refresh failed");
        }
    }
    tracing::debug!("session refresher stopped");
}
