use tauri::AppHandle;
use tauri_plugin_notification::NotificationExt;
use whatsdev_core::{NotificationRequest, UnreadSink};

use crate::tray::set_tray_status;

/// Delivers tracker output to the tray icon and the OS notification center.
pub struct ShellSink {
    app: AppHandle,
    idle_tooltip: String,
    notifications_enabled: bool,
}

impl ShellSink {
    pub fn new(app: AppHandle, idle_tooltip: impl Into<String>, notifications_enabled: bool) -> Self {
        Self {
            app,
            idle_tooltip: idle_tooltip.into(),
            notifications_enabled,
        }
    }
}

impl UnreadSink for ShellSink {
    fn show_notification(&self, notification: &NotificationRequest) {
        if !self.notifications_enabled {
            tracing::debug!("Notifications disabled, skipping: {}", notification.title);
            return;
        }

        if let Err(e) = self
            .app
            .notification()
            .builder()
            .title(&notification.title)
            .body(&notification.body)
            .show()
        {
            tracing::warn!("Failed to show notification: {}", e);
        }
    }

    fn update_tooltip(&self, tooltip: &str) {
        set_tray_status(&self.app, tooltip, tooltip != self.idle_tooltip);
    }
}
