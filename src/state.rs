use std::sync::{Arc, Mutex as StdMutex};
use tauri::AppHandle;
use tokio::sync::Mutex;
use whatsdev_core::{AppConfig, PollerHandle, UnreadTracker};

use crate::bridge::WebviewSnapshotProvider;
use crate::notifications::ShellSink;

/// Shared shell state, managed by Tauri.
pub struct AppState {
    pub config: AppConfig,
    pub tracker: Arc<Mutex<UnreadTracker>>,
    pub sink: Arc<ShellSink>,
    pub snapshots: Arc<WebviewSnapshotProvider>,
    poller: StdMutex<Option<PollerHandle>>,
}

impl AppState {
    pub fn new(app: AppHandle, config: AppConfig) -> Self {
        let sink = ShellSink::new(app.clone(), config.app_name.clone(), config.notifications_enabled);
        Self {
            tracker: Arc::new(Mutex::new(UnreadTracker::new(config.app_name.clone()))),
            sink: Arc::new(sink),
            snapshots: Arc::new(WebviewSnapshotProvider::new(app)),
            poller: StdMutex::new(None),
            config,
        }
    }

    pub fn set_poller(&self, handle: PollerHandle) {
        if let Ok(mut poller) = self.poller.lock() {
            if let Some(previous) = poller.replace(handle) {
                previous.stop();
            }
        }
    }

    pub fn stop_polling(&self) {
        if let Ok(mut poller) = self.poller.lock() {
            if let Some(handle) = poller.take() {
                handle.stop();
            }
        }
    }
}
