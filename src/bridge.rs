//! Two-way bridge to the hosted web client.
//!
//! The page cannot be queried synchronously, so a snapshot request evaluates
//! the scrape script tagged with a request id and waits for the page to call
//! `report_chat_snapshot` with the same id.

use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::sync::Mutex;
use tauri::{AppHandle, Manager};
use tokio::sync::oneshot;
use uuid::Uuid;
use whatsdev_core::snapshot::snapshots_from_raw;
use whatsdev_core::{ChatSnapshot, RawChatSnapshot, SnapshotError, SnapshotProvider};

use crate::window::MAIN_WINDOW;

/// Installed on every page load; reports `document.title` changes.
pub const TITLE_OBSERVER_SCRIPT: &str = include_str!("scripts/title_observer.js");

const SCRAPE_SCRIPT: &str = include_str!("scripts/scrape_unread.js");

type PendingReply = oneshot::Sender<Result<Vec<RawChatSnapshot>, SnapshotError>>;

pub struct WebviewSnapshotProvider {
    app: AppHandle,
    pending: Mutex<HashMap<Uuid, PendingReply>>,
}

impl WebviewSnapshotProvider {
    pub fn new(app: AppHandle) -> Self {
        Self {
            app,
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Hand a page reply to the waiting request. Returns false when nobody is
    /// waiting any more (timed out or unknown id).
    pub fn resolve(&self, request_id: Uuid, reply: Result<Vec<RawChatSnapshot>, SnapshotError>) -> bool {
        let sender = match self.pending.lock() {
            Ok(mut pending) => pending.remove(&request_id),
            Err(_) => None,
        };

        match sender {
            Some(sender) => sender.send(reply).is_ok(),
            None => {
                tracing::debug!("Dropping late snapshot reply {}", request_id);
                false
            }
        }
    }

    fn register(&self) -> Result<(Uuid, oneshot::Receiver<Result<Vec<RawChatSnapshot>, SnapshotError>>), SnapshotError> {
        let (tx, rx) = oneshot::channel();
        let request_id = Uuid::new_v4();
        self.pending
            .lock()
            .map_err(|_| SnapshotError::Unavailable("pending request table poisoned".to_string()))?
            .insert(request_id, tx);
        Ok((request_id, rx))
    }

    fn forget(&self, request_id: &Uuid) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.remove(request_id);
        }
    }

    async fn query_page(&self) -> Result<Vec<ChatSnapshot>, SnapshotError> {
        let window = self
            .app
            .get_webview_window(MAIN_WINDOW)
            .ok_or_else(|| SnapshotError::Unavailable("main window is gone".to_string()))?;

        let (request_id, reply) = self.register()?;
        // Removes the entry if the poll times out and this future is dropped.
        let _pending = PendingGuard {
            provider: self,
            request_id,
        };

        window
            .eval(&scrape_script(request_id))
            .map_err(|e| SnapshotError::Unavailable(format!("script injection failed: {e}")))?;

        let raw = reply
            .await
            .map_err(|_| SnapshotError::Unavailable("request abandoned".to_string()))??;

        Ok(snapshots_from_raw(&raw))
    }
}

impl SnapshotProvider for WebviewSnapshotProvider {
    fn snapshot(&self) -> BoxFuture<'_, Result<Vec<ChatSnapshot>, SnapshotError>> {
        self.query_page().boxed()
    }
}

struct PendingGuard<'a> {
    provider: &'a WebviewSnapshotProvider,
    request_id: Uuid,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.provider.forget(&self.request_id);
    }
}

fn scrape_script(request_id: Uuid) -> String {
    SCRAPE_SCRIPT.replace("__REQUEST_ID__", &request_id.to_string())
}

/// Decode what the page sent for a snapshot request.
pub fn decode_reply(
    chats: Option<serde_json::Value>,
    error: Option<String>,
) -> Result<Vec<RawChatSnapshot>, SnapshotError> {
    if let Some(error) = error {
        return Err(SnapshotError::Unavailable(format!("page script failed: {error}")));
    }

    match chats {
        Some(value) => serde_json::from_value(value).map_err(|e| SnapshotError::Malformed(e.to_string())),
        None => Err(SnapshotError::Malformed("reply carried no chats".to_string())),
    }
}
