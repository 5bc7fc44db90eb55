use serde::Serialize;
use tauri::State;
use uuid::Uuid;
use whatsdev_core::UnreadSink;

use crate::bridge::decode_reply;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadStatus {
    pub unread_count: u32,
    pub last_notified_count: u32,
    pub known_chats: usize,
    pub focused: bool,
    pub tooltip: String,
}

/// Called by the page whenever `document.title` changes.
#[tauri::command]
pub async fn report_title(state: State<'_, AppState>, title: String) -> Result<(), String> {
    let mut tracker = state.tracker.lock().await;
    let update = tracker.on_title_changed(&title);
    state.sink.apply_title_update(&update);
    Ok(())
}

/// Called by the scrape script with the answer to one snapshot request.
#[tauri::command]
pub async fn report_chat_snapshot(
    state: State<'_, AppState>,
    request_id: Uuid,
    chats: Option<serde_json::Value>,
    error: Option<String>,
) -> Result<(), String> {
    let reply = decode_reply(chats, error);
    if let Err(e) = &reply {
        tracing::debug!("Snapshot request {} failed in page: {}", request_id, e);
    }
    state.snapshots.resolve(request_id, reply);
    Ok(())
}

#[tauri::command]
pub async fn get_unread_status(state: State<'_, AppState>) -> Result<UnreadStatus, String> {
    let tracker = state.tracker.lock().await;
    let tracked = tracker.state();
    Ok(UnreadStatus {
        unread_count: tracked.aggregate_unread_count,
        last_notified_count: tracked.last_notified_count,
        known_chats: tracked.known_chats.len(),
        focused: tracker.is_focused(),
        tooltip: tracker.tooltip(),
    })
}
