use crate::tracker::{NotificationRequest, PollUpdate, TitleUpdate};

/// Where tracker output ends up: the tray tooltip and OS notifications in the
/// desktop shell, stdout in the CLI.
pub trait UnreadSink: Send + Sync {
    fn show_notification(&self, notification: &NotificationRequest);

    fn update_tooltip(&self, tooltip: &str);

    fn apply_title_update(&self, update: &TitleUpdate) {
        self.update_tooltip(&update.tooltip);
        if let Some(notification) = &update.notification {
            self.show_notification(notification);
        }
    }

    fn apply_poll_update(&self, update: &PollUpdate) {
        self.update_tooltip(&update.tooltip);
        for notification in &update.notifications {
            self.show_notification(notification);
        }
    }
}
