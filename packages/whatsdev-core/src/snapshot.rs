//! Per-chat unread snapshots scraped from the web client.
//!
//! The page is an untrusted source: every field arrives as text and may be
//! missing or garbled. [`ChatSnapshot::from_raw`] is the only way scraped data
//! enters the tracker.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Longest preview kept for tooltips and notification bodies, in chars.
pub const PREVIEW_MAX_CHARS: usize = 100;

/// Errors produced while fetching a snapshot. None of these reach the tracker's
/// callers; a failed poll leaves the tracker untouched.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// The page could not be queried (window gone, script injection failed)
    #[error("Snapshot source unavailable: {0}")]
    Unavailable(String),

    /// The page answered with something we could not decode
    #[error("Malformed snapshot: {0}")]
    Malformed(String),

    /// No answer within the poll timeout
    #[error("Snapshot timed out after {0:?}")]
    Timeout(Duration),
}

/// One unread chat as reported by the page scrape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChatSnapshot {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub count: String,
    #[serde(default)]
    pub last_message: String,
}

/// A validated unread chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSnapshot {
    name: String,
    unread_count: u32,
    last_message_preview: String,
}

impl ChatSnapshot {
    pub fn new(name: impl Into<String>, unread_count: u32, preview: impl AsRef<str>) -> Self {
        Self {
            name: name.into(),
            unread_count,
            last_message_preview: truncate_preview(preview.as_ref().trim(), PREVIEW_MAX_CHARS),
        }
    }

    /// Validate a scraped triple. Entries without a name or with a count that is
    /// not a plain non-negative integer are dropped.
    pub fn from_raw(raw: &RawChatSnapshot) -> Option<Self> {
        let name = raw.name.trim();
        if name.is_empty() {
            return None;
        }

        match raw.count.trim().parse::<u32>() {
            Ok(count) => Some(Self::new(name, count, &raw.last_message)),
            Err(_) => {
                tracing::debug!("Dropping chat {:?}: unusable count {:?}", name, raw.count);
                None
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unread_count(&self) -> u32 {
        self.unread_count
    }

    /// Truncated last message, `None` when the page showed no preview.
    pub fn preview(&self) -> Option<&str> {
        if self.last_message_preview.is_empty() {
            None
        } else {
            Some(&self.last_message_preview)
        }
    }

    /// Identity used for "have we announced this already": name and count.
    pub(crate) fn same_unread(&self, other: &ChatSnapshot) -> bool {
        self.name == other.name && self.unread_count == other.unread_count
    }
}

/// Validate a whole scrape, keeping scrape order.
pub fn snapshots_from_raw(raw: &[RawChatSnapshot]) -> Vec<ChatSnapshot> {
    raw.iter().filter_map(ChatSnapshot::from_raw).collect()
}

/// Source of per-chat snapshots, typically a script evaluated in the webview.
pub trait SnapshotProvider: Send + Sync {
    fn snapshot(&self) -> BoxFuture<'_, Result<Vec<ChatSnapshot>, SnapshotError>>;
}

pub(crate) fn truncate_preview(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }

    let truncated: String = input.chars().take(max_chars).collect();
    format!("{truncated}...")
}
