//! WhatsDev Core Library
//!
//! This crate holds the platform-independent part of the WhatsDev desktop shell:
//! - Unread tracking (title-derived aggregate count, per-chat snapshots)
//! - Notification decisions and de-duplication across polls and refocus
//! - Periodic, non-blocking snapshot polling against an injected provider
//! - Layered configuration (environment, config file, defaults)
//!
//! The shell owns the window, tray icon and OS notification delivery; it talks to
//! this crate through [`SnapshotProvider`] and [`UnreadSink`].
//!
//! # Example
//!
//! ```
//! use whatsdev_core::{ChatSnapshot, UnreadTracker};
//!
//! let mut tracker = UnreadTracker::new("WhatsDev");
//! let update = tracker.on_title_changed("WhatsDev (2)");
//! assert_eq!(update.notification.unwrap().body, "You have 2 new messages");
//!
//! let poll = tracker.on_chat_snapshot_poll(vec![ChatSnapshot::new("Alice", 2, "hi")]);
//! assert_eq!(poll.notifications.len(), 1);
//! assert!(poll.tooltip.starts_with("2 unread messages"));
//! ```

pub mod config;
pub mod poller;
pub mod sink;
pub mod snapshot;
pub mod tracker;

// Re-export commonly used types
pub use config::{load_config, AppConfig, ConfigSource};
pub use poller::{spawn_polling, PollSettings, PollerHandle};
pub use sink::UnreadSink;
pub use snapshot::{ChatSnapshot, RawChatSnapshot, SnapshotError, SnapshotProvider};
pub use tracker::{NotificationRequest, PollUpdate, TitleUpdate, TrackerState, UnreadTracker};
