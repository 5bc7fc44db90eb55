//! Replay recorded page events through the unread tracker.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Mutex;
use whatsdev_core::config::DEFAULT_APP_NAME;
use whatsdev_core::snapshot::snapshots_from_raw;
use whatsdev_core::{NotificationRequest, RawChatSnapshot, SnapshotError, UnreadSink, UnreadTracker};

use crate::OutputFormat;

/// One recorded page event.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayEvent {
    Title { title: String },
    Poll {
        #[serde(default)]
        chats: Vec<RawChatSnapshot>,
    },
    PollFailed {
        #[serde(default)]
        reason: String,
    },
    FocusGained,
    FocusLost,
}

/// Parse a JSON-lines document. Blank lines and `#` comments are skipped.
pub fn parse_events(content: &str) -> Result<Vec<ReplayEvent>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line).with_context(|| format!("Invalid event on line {}", index + 1))
        })
        .collect()
}

/// Feed `events` through `tracker`, pushing every update into `sink`.
pub fn replay_events(tracker: &mut UnreadTracker, events: Vec<ReplayEvent>, sink: &dyn UnreadSink) {
    for event in events {
        match event {
            ReplayEvent::Title { title } => {
                let update = tracker.on_title_changed(&title);
                sink.apply_title_update(&update);
            }
            ReplayEvent::Poll { chats } => {
                let update = tracker.on_poll_outcome(Ok(snapshots_from_raw(&chats)));
                sink.apply_poll_update(&update);
            }
            ReplayEvent::PollFailed { reason } => {
                let update = tracker.on_poll_outcome(Err(SnapshotError::Unavailable(reason)));
                sink.apply_poll_update(&update);
            }
            ReplayEvent::FocusGained => tracker.on_focus_gained(),
            ReplayEvent::FocusLost => tracker.on_focus_lost(),
        }
    }
}

pub async fn run_replay(path: &Path, format: OutputFormat) -> Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let events = parse_events(&content)?;
    tracing::info!("Replaying {} events from {}", events.len(), path.display());

    let mut tracker = UnreadTracker::new(DEFAULT_APP_NAME);
    let sink = PrintSink::new(format);
    replay_events(&mut tracker, events, &sink);

    let state = tracker.state();
    match format {
        OutputFormat::Text => {
            println!();
            println!(
                "Final: {} unread, {} notified, {} known chats",
                state.aggregate_unread_count,
                state.last_notified_count,
                state.known_chats.len()
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "kind": "final", "state": state }));
        }
    }

    Ok(())
}

/// Prints notifications and tooltip changes to stdout.
struct PrintSink {
    format: OutputFormat,
    last_tooltip: Mutex<Option<String>>,
}

impl PrintSink {
    fn new(format: OutputFormat) -> Self {
        Self {
            format,
            last_tooltip: Mutex::new(None),
        }
    }
}

impl UnreadSink for PrintSink {
    fn show_notification(&self, notification: &NotificationRequest) {
        match self.format {
            OutputFormat::Text => println!("🔔 {}: {}", notification.title, notification.body),
            OutputFormat::Json => println!(
                "{}",
                serde_json::json!({ "kind": "notification", "notification": notification })
            ),
        }
    }

    fn update_tooltip(&self, tooltip: &str) {
        let Ok(mut last) = self.last_tooltip.lock() else {
            return;
        };
        if last.as_deref() == Some(tooltip) {
            return;
        }
        *last = Some(tooltip.to_string());

        match self.format {
            OutputFormat::Text => {
                println!("tooltip:");
                for line in tooltip.lines() {
                    println!("  | {}", line);
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "kind": "tooltip", "tooltip": tooltip }))
            }
        }
    }
}
