//! Periodic chat snapshot polling.
//!
//! Every tick starts an independent poll; a slow or hung page never delays the
//! next one. Failures (provider error or timeout) are logged and dropped, the
//! tracker only sees successful snapshots.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::sink::UnreadSink;
use crate::snapshot::{SnapshotError, SnapshotProvider};
use crate::tracker::{PollUpdate, UnreadTracker};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    /// Upper bound for a single snapshot query
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

/// Handle to the polling ticker.
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Stop scheduling new polls. Polls already in flight run to completion.
    pub fn stop(&self) {
        self.task.abort();
        tracing::info!("Chat polling stopped");
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

/// Start polling `provider` every `settings.interval`. The first poll runs one
/// interval after the call. Must be called from within a tokio runtime.
pub fn spawn_polling(
    provider: Arc<dyn SnapshotProvider>,
    tracker: Arc<Mutex<UnreadTracker>>,
    sink: Arc<dyn UnreadSink>,
    settings: PollSettings,
) -> PollerHandle {
    tracing::info!(
        "Chat polling every {:?} (timeout {:?})",
        settings.interval,
        settings.timeout
    );

    let task = tokio::spawn(async move {
        let mut timer = interval(settings.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        timer.tick().await;

        loop {
            timer.tick().await;

            let provider = provider.clone();
            let tracker = tracker.clone();
            let sink = sink.clone();
            tokio::spawn(async move {
                poll_once(provider.as_ref(), &tracker, sink.as_ref(), settings.timeout).await;
            });
        }
    });

    PollerHandle { task }
}

/// Run one poll and push the result to `sink`. Returns `None` when the poll failed
/// and the tracker was left untouched.
pub async fn poll_once(
    provider: &dyn SnapshotProvider,
    tracker: &Mutex<UnreadTracker>,
    sink: &dyn UnreadSink,
    timeout: Duration,
) -> Option<PollUpdate> {
    let outcome = match tokio::time::timeout(timeout, provider.snapshot()).await {
        Ok(outcome) => outcome,
        Err(_) => Err(SnapshotError::Timeout(timeout)),
    };

    if let Err(e) = &outcome {
        tracing::debug!("Chat poll failed: {}", e);
        return None;
    }

    let mut tracker = tracker.lock().await;
    let update = tracker.on_poll_outcome(outcome);
    sink.apply_poll_update(&update);
    Some(update)
}
