//! Unread state tracking and notification decisions.
//!
//! The tracker is fed from two independent triggers (title changes and the
//! periodic chat poll) plus focus signals. It is not thread-safe on its own;
//! callers serialize access, see [`crate::poller`].

use serde::Serialize;

use crate::snapshot::{ChatSnapshot, SnapshotError};

/// Chats kept between polls for de-duplication and the tooltip.
pub const MAX_KNOWN_CHATS: usize = 5;

/// Per-chat notifications emitted by a single poll.
pub const MAX_CHAT_NOTIFICATIONS_PER_POLL: usize = 3;

/// A notification the shell should display once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRequest {
    pub title: String,
    pub body: String,
}

/// Result of [`UnreadTracker::on_title_changed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleUpdate {
    pub tooltip: String,
    pub notification: Option<NotificationRequest>,
}

/// Result of [`UnreadTracker::on_chat_snapshot_poll`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollUpdate {
    pub tooltip: String,
    pub notifications: Vec<NotificationRequest>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerState {
    pub aggregate_unread_count: u32,
    pub last_notified_count: u32,
    pub known_chats: Vec<ChatSnapshot>,
}

#[derive(Debug)]
pub struct UnreadTracker {
    app_name: String,
    state: TrackerState,
    focused: bool,
}

impl UnreadTracker {
    /// `app_name` doubles as the idle tooltip and the title of aggregate notifications.
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            state: TrackerState::default(),
            focused: false,
        }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Feed the page title. The first `(<digits>)` in it is the aggregate unread count;
    /// no marker means everything has been read.
    pub fn on_title_changed(&mut self, raw_title: &str) -> TitleUpdate {
        let notification = match parse_unread_marker(raw_title) {
            Some(new_count) => {
                let notification = if new_count > self.state.last_notified_count && !self.focused {
                    let fresh = new_count - self.state.last_notified_count;
                    Some(NotificationRequest {
                        title: self.app_name.clone(),
                        body: format!("You have {} new {}", fresh, plural_messages(fresh)),
                    })
                } else {
                    None
                };
                self.state.last_notified_count = new_count;
                self.state.aggregate_unread_count = new_count;
                notification
            }
            None => {
                self.state.last_notified_count = 0;
                self.state.aggregate_unread_count = 0;
                None
            }
        };

        if self.state.aggregate_unread_count == 0 {
            self.state.known_chats.clear();
        }

        if let Some(notification) = &notification {
            tracing::debug!("Title reports new messages: {}", notification.body);
        }

        TitleUpdate {
            tooltip: self.tooltip(),
            notification,
        }
    }

    /// Feed a fresh scrape of unread chats, in page order.
    pub fn on_chat_snapshot_poll(&mut self, snapshots: Vec<ChatSnapshot>) -> PollUpdate {
        let notifications: Vec<NotificationRequest> = if self.focused {
            Vec::new()
        } else {
            let known = &self.state.known_chats;
            snapshots
                .iter()
                .filter(|chat| !known.iter().any(|k| k.same_unread(chat)))
                .take(MAX_CHAT_NOTIFICATIONS_PER_POLL)
                .map(chat_notification)
                .collect()
        };

        let mut snapshots = snapshots;
        snapshots.truncate(MAX_KNOWN_CHATS);
        self.state.known_chats = snapshots;

        if !notifications.is_empty() {
            tracing::debug!("Poll produced {} chat notifications", notifications.len());
        }

        PollUpdate {
            tooltip: self.tooltip(),
            notifications,
        }
    }

    /// Like [`Self::on_chat_snapshot_poll`], but a failed poll is a no-op.
    pub fn on_poll_outcome(&mut self, outcome: Result<Vec<ChatSnapshot>, SnapshotError>) -> PollUpdate {
        match outcome {
            Ok(snapshots) => self.on_chat_snapshot_poll(snapshots),
            Err(e) => {
                tracing::debug!("Chat poll skipped: {}", e);
                PollUpdate {
                    tooltip: self.tooltip(),
                    notifications: Vec::new(),
                }
            }
        }
    }

    /// Messages counted so far are considered seen; the aggregate stays until the
    /// page title catches up.
    pub fn on_focus_gained(&mut self) {
        self.focused = true;
        self.state.last_notified_count = self.state.aggregate_unread_count;
    }

    pub fn on_focus_lost(&mut self) {
        self.focused = false;
    }

    pub fn tooltip(&self) -> String {
        let unread = self.state.aggregate_unread_count;
        if unread == 0 {
            return self.app_name.clone();
        }

        let mut lines = vec![format!("{} unread {}", unread, plural_messages(unread))];
        for chat in &self.state.known_chats {
            lines.push(format!("{} ({})", chat.name(), chat.unread_count()));
            if let Some(preview) = chat.preview() {
                lines.push(format!("  {preview}"));
            }
        }
        if unread as usize > self.state.known_chats.len() {
            lines.push("…and more".to_string());
        }

        lines.join("\n")
    }
}

fn chat_notification(chat: &ChatSnapshot) -> NotificationRequest {
    let body = match chat.preview() {
        Some(preview) => preview.to_string(),
        None => format!(
            "{} unread {}",
            chat.unread_count(),
            plural_messages(chat.unread_count())
        ),
    };

    NotificationRequest {
        title: chat.name().to_string(),
        body,
    }
}

fn plural_messages(count: u32) -> &'static str {
    if count == 1 { "message" } else { "messages" }
}

/// First `(<digits>)` in the title, scanning left to right.
fn parse_unread_marker(title: &str) -> Option<u32> {
    let bytes = title.as_bytes();

    for (start, _) in title.match_indices('(') {
        let digits_start = start + 1;
        let digits_len = bytes[digits_start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits_len == 0 {
            continue;
        }
        if bytes.get(digits_start + digits_len) != Some(&b')') {
            continue;
        }

        let digits = &title[digits_start..digits_start + digits_len];
        // Only digits here, so a parse failure is overflow.
        return match digits.parse::<u32>() {
            Ok(count) => Some(count),
            Err(_) => {
                tracing::debug!("Unread marker out of range, saturating: {}", digits);
                Some(u32::MAX)
            }
        };
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn chat(name: &str, count: u32) -> ChatSnapshot {
        ChatSnapshot::new(name, count, "")
    }

    fn unfocused() -> UnreadTracker {
        UnreadTracker::new("WhatsDev")
    }

    #[test]
    fn test_parse_unread_marker() {
        assert_eq!(parse_unread_marker("WhatsDev (2)"), Some(2));
        assert_eq!(parse_unread_marker("(12) WhatsApp"), Some(12));
        assert_eq!(parse_unread_marker("a (3) b (7)"), Some(3));
        assert_eq!(parse_unread_marker("((4)"), Some(4));
        assert_eq!(parse_unread_marker("x () (5)"), Some(5));
        assert_eq!(parse_unread_marker("x (1a) (6)"), Some(6));
        assert_eq!(parse_unread_marker("WhatsApp"), None);
        assert_eq!(parse_unread_marker("(99999999999)"), Some(u32::MAX));
        assert_eq!(parse_unread_marker("trailing ("), None);
    }

    #[test]
    fn test_title_without_marker_clears_state() {
        let mut tracker = unfocused();
        tracker.on_title_changed("WhatsApp (4)");
        tracker.on_chat_snapshot_poll(vec![chat("Alice", 4)]);

        let update = tracker.on_title_changed("WhatsApp");
        assert_eq!(update.notification, None);
        assert_eq!(update.tooltip, "WhatsDev");
        assert_eq!(tracker.state(), &TrackerState::default());
    }

    #[test]
    fn test_title_scenario_two_unread() {
        let mut tracker = unfocused();
        let update = tracker.on_title_changed("WhatsDev (2)");

        assert!(update.tooltip.starts_with("2 unread messages"));
        let notification = update.notification.unwrap();
        assert_eq!(notification.title, "WhatsDev");
        assert_eq!(notification.body, "You have 2 new messages");
        assert_eq!(tracker.state().aggregate_unread_count, 2);
        assert_eq!(tracker.state().last_notified_count, 2);
    }

    #[test]
    fn test_title_notifies_only_the_difference() {
        let mut tracker = unfocused();
        tracker.on_title_changed("(2) WhatsApp");
        let update = tracker.on_title_changed("(3) WhatsApp");
        assert_eq!(update.notification.unwrap().body, "You have 1 new message");

        // Dropping back does not notify but lowers the baseline.
        assert!(tracker.on_title_changed("(1) WhatsApp").notification.is_none());
        assert_eq!(tracker.state().last_notified_count, 1);
        let update = tracker.on_title_changed("(4) WhatsApp");
        assert_eq!(update.notification.unwrap().body, "You have 3 new messages");
    }

    #[test]
    fn test_title_while_focused_updates_counts_silently() {
        let mut tracker = unfocused();
        tracker.on_focus_gained();
        let update = tracker.on_title_changed("(5) WhatsApp");
        assert!(update.notification.is_none());
        assert_eq!(tracker.state().aggregate_unread_count, 5);
        assert_eq!(tracker.state().last_notified_count, 5);

        tracker.on_focus_lost();
        assert!(tracker.on_title_changed("(5) WhatsApp").notification.is_none());
    }

    #[test]
    fn test_focus_gained_suppresses_repeat() {
        let mut tracker = unfocused();
        assert!(tracker.on_title_changed("(3) WhatsApp").notification.is_some());

        tracker.on_focus_gained();
        tracker.on_focus_lost();
        assert_eq!(tracker.state().aggregate_unread_count, 3);
        assert!(tracker.on_title_changed("(3) WhatsApp").notification.is_none());
    }

    #[test]
    fn test_zero_marker_is_all_read() {
        let mut tracker = unfocused();
        let update = tracker.on_title_changed("WhatsApp (0)");
        assert!(update.notification.is_none());
        assert_eq!(update.tooltip, "WhatsDev");
    }

    #[test]
    fn test_oversized_marker_still_counts_as_unread() {
        let mut tracker = unfocused();
        tracker.on_title_changed("(2) WhatsApp");
        tracker.on_chat_snapshot_poll(vec![chat("Alice", 2)]);

        let update = tracker.on_title_changed("(99999999999) WhatsApp");
        assert_eq!(tracker.state().aggregate_unread_count, u32::MAX);
        assert_eq!(tracker.state().known_chats.len(), 1);
        assert!(update.notification.is_some());
        assert!(update.tooltip.ends_with("…and more"));
    }

    #[test]
    fn test_unchanged_poll_does_not_repeat() {
        let mut tracker = unfocused();
        let first = tracker.on_chat_snapshot_poll(vec![chat("A", 3), chat("B", 1)]);
        assert_eq!(first.notifications.len(), 2);

        let second = tracker.on_chat_snapshot_poll(vec![chat("A", 3), chat("B", 1)]);
        assert!(second.notifications.is_empty());
    }

    #[test]
    fn test_count_change_renotifies_chat() {
        let mut tracker = unfocused();
        tracker.on_chat_snapshot_poll(vec![chat("A", 3)]);
        let update = tracker.on_chat_snapshot_poll(vec![chat("A", 5)]);

        assert_eq!(
            update.notifications,
            vec![NotificationRequest {
                title: "A".to_string(),
                body: "5 unread messages".to_string(),
            }]
        );
    }

    #[test]
    fn test_poll_caps_notifications_and_known_chats() {
        let mut tracker = unfocused();
        let chats: Vec<_> = (1..=7).map(|i| chat(&format!("Chat {i}"), i)).collect();
        let update = tracker.on_chat_snapshot_poll(chats);

        let titles: Vec<_> = update.notifications.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["Chat 1", "Chat 2", "Chat 3"]);
        assert_eq!(tracker.state().known_chats.len(), MAX_KNOWN_CHATS);
        assert_eq!(tracker.state().known_chats[4].name(), "Chat 5");
    }

    #[test]
    fn test_cap_applies_to_new_entries_only() {
        let mut tracker = unfocused();
        tracker.on_chat_snapshot_poll(vec![chat("A", 1), chat("B", 1)]);
        let update = tracker.on_chat_snapshot_poll(vec![
            chat("A", 1),
            chat("B", 1),
            chat("C", 1),
            chat("D", 1),
            chat("E", 1),
            chat("F", 1),
        ]);
        let titles: Vec<_> = update.notifications.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["C", "D", "E"]);
    }

    #[test]
    fn test_poll_while_focused_records_without_notifying() {
        let mut tracker = unfocused();
        tracker.on_focus_gained();
        let update = tracker.on_chat_snapshot_poll(vec![chat("A", 2)]);
        assert!(update.notifications.is_empty());

        tracker.on_focus_lost();
        let update = tracker.on_chat_snapshot_poll(vec![chat("A", 2)]);
        assert!(update.notifications.is_empty());
    }

    #[test]
    fn test_chat_notification_body() {
        let mut tracker = unfocused();
        let update = tracker.on_chat_snapshot_poll(vec![
            ChatSnapshot::new("Alice", 2, "lunch?"),
            chat("Bob", 1),
        ]);
        assert_eq!(update.notifications[0].body, "lunch?");
        assert_eq!(update.notifications[1].body, "1 unread message");
    }

    #[test]
    fn test_empty_poll_replaces_known_chats() {
        let mut tracker = unfocused();
        tracker.on_chat_snapshot_poll(vec![chat("A", 1)]);
        let update = tracker.on_chat_snapshot_poll(Vec::new());
        assert!(update.notifications.is_empty());
        assert!(tracker.state().known_chats.is_empty());

        // A chat that disappeared and came back is announced again.
        let update = tracker.on_chat_snapshot_poll(vec![chat("A", 1)]);
        assert_eq!(update.notifications.len(), 1);
    }

    #[test]
    fn test_failed_poll_keeps_state() {
        let mut tracker = unfocused();
        tracker.on_title_changed("(3) WhatsApp");
        tracker.on_chat_snapshot_poll(vec![chat("A", 3)]);
        let before = tracker.state().clone();
        let tooltip = tracker.tooltip();

        let update = tracker.on_poll_outcome(Err(SnapshotError::Timeout(Duration::from_secs(4))));
        assert!(update.notifications.is_empty());
        assert_eq!(update.tooltip, tooltip);
        assert_eq!(tracker.state(), &before);
    }

    #[test]
    fn test_tooltip_rendering() {
        let mut tracker = unfocused();
        assert_eq!(tracker.tooltip(), "WhatsDev");

        tracker.on_title_changed("(4) WhatsApp");
        let update = tracker.on_chat_snapshot_poll(vec![
            ChatSnapshot::new("Alice", 3, "see you at 5"),
            chat("Bob", 1),
        ]);
        assert_eq!(
            update.tooltip,
            "4 unread messages\nAlice (3)\n  see you at 5\nBob (1)\n…and more"
        );

        tracker.on_title_changed("(1) WhatsApp");
        let update = tracker.on_chat_snapshot_poll(vec![chat("Bob", 1)]);
        assert_eq!(update.tooltip, "1 unread message\nBob (1)");
    }

    #[test]
    fn test_tooltip_without_chats() {
        let mut tracker = unfocused();
        let update = tracker.on_title_changed("(2) WhatsApp");
        assert_eq!(update.tooltip, "2 unread messages\n…and more");
    }
}
