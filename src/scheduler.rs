use tauri::{AppHandle, Manager};
use whatsdev_core::spawn_polling;

use crate::state::AppState;

/// Start the periodic unread-chat poll against the main window.
pub async fn start_chat_polling(app: AppHandle) {
    let Some(state) = app.try_state::<AppState>() else {
        tracing::error!("App state missing, chat polling not started");
        return;
    };

    let handle = spawn_polling(
        state.snapshots.clone(),
        state.tracker.clone(),
        state.sink.clone(),
        state.config.poll_settings(),
    );
    state.set_poller(handle);
}

/// Forward a focus change of the main window to the tracker.
pub fn record_focus(app: AppHandle, focused: bool) {
    tauri::async_runtime::spawn(async move {
        let Some(state) = app.try_state::<AppState>() else {
            return;
        };
        let mut tracker = state.tracker.lock().await;
        if focused {
            tracker.on_focus_gained();
        } else {
            tracker.on_focus_lost();
        }
        tracing::debug!("Main window focused: {}", focused);
    });
}
