use tauri::image::Image;
use tauri::menu::{Menu, MenuItem, PredefinedMenuItem};
use tauri::tray::{MouseButton, MouseButtonState, TrayIconBuilder, TrayIconEvent};
use tauri::{AppHandle, Manager};

use crate::state::AppState;
use crate::window::{hide_main_window, show_main_window, toggle_main_window};

pub const TRAY_ID: &str = "main-tray";

pub fn create_tray(app: &AppHandle, app_name: &str) -> tauri::Result<()> {
    let show_item = MenuItem::with_id(app, "show", format!("Show {app_name}"), true, None::<&str>)?;
    let hide_item = MenuItem::with_id(app, "hide", format!("Hide {app_name}"), true, None::<&str>)?;
    let separator = PredefinedMenuItem::separator(app)?;
    let quit_item = MenuItem::with_id(app, "quit", format!("Quit {app_name}"), true, None::<&str>)?;
    let menu = Menu::with_items(app, &[&show_item, &hide_item, &separator, &quit_item])?;

    let mut tray_builder = TrayIconBuilder::with_id(TRAY_ID)
        .tooltip(app_name)
        .menu(&menu)
        .show_menu_on_left_click(false)
        .on_tray_icon_event(|tray, event| {
            if let TrayIconEvent::Click {
                button: MouseButton::Left,
                button_state: MouseButtonState::Up,
                ..
            } = event
            {
                toggle_main_window(tray.app_handle());
            }
        })
        .on_menu_event(|app, event| match event.id().as_ref() {
            "show" => show_main_window(app),
            "hide" => hide_main_window(app),
            "quit" => {
                if let Some(state) = app.try_state::<AppState>() {
                    state.stop_polling();
                }
                tracing::info!("Quit requested from tray");
                app.exit(0);
            }
            _ => {}
        });

    if let Some(icon) = tray_icon(false).or_else(|| app.default_window_icon().cloned()) {
        tray_builder = tray_builder.icon(icon);
    }
    tray_builder.build(app)?;

    Ok(())
}

pub fn tray_icon(has_unread: bool) -> Option<Image<'static>> {
    let bytes = if has_unread {
        include_bytes!("../icons/tray-unread.png").as_slice()
    } else {
        include_bytes!("../icons/tray-icon.png").as_slice()
    };
    Image::from_bytes(bytes).ok().map(|icon| icon.to_owned())
}

/// Push a new tooltip and matching icon to the tray.
pub fn set_tray_status(app: &AppHandle, tooltip: &str, has_unread: bool) {
    let Some(tray) = app.tray_by_id(TRAY_ID) else {
        return;
    };
    if let Err(e) = tray.set_tooltip(Some(tooltip)) {
        tracing::debug!("Failed to set tray tooltip: {}", e);
    }
    if let Err(e) = tray.set_icon(tray_icon(has_unread)) {
        tracing::debug!("Failed to set tray icon: {}", e);
    }
}
