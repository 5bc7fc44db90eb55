// Prevents additional console window on Windows in release mode
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod bridge;
mod cli;
mod commands;
mod notifications;
mod scheduler;
mod state;
mod tray;
mod window;

use tauri::{Manager, WindowEvent};
use tracing::info;

use crate::state::AppState;
use crate::window::{show_main_window, MAIN_WINDOW};

fn main() {
    let cli = cli::Cli::from_env();

    // Initialize tracing
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("whatsdev={},whatsdev_core={}", log_level, log_level).into()),
        )
        .init();

    let config = whatsdev_core::load_config();
    let start_hidden = cli.hidden || config.start_hidden;
    info!("Starting {} (URL from {})", config.app_name, config.source);

    tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app, _argv, _cwd| {
            info!("Second instance launched, focusing existing window");
            show_main_window(app);
        }))
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_notification::init())
        .setup(move |app| {
            let handle = app.handle().clone();
            app.manage(AppState::new(handle.clone(), config.clone()));

            window::create_main_window(&handle, &config, !start_hidden)?;
            tray::create_tray(&handle, &config.app_name)?;

            tauri::async_runtime::spawn(scheduler::start_chat_polling(handle));

            Ok(())
        })
        .on_window_event(|window, event| {
            if window.label() != MAIN_WINDOW {
                return;
            }
            match event {
                // Closing only hides; quitting goes through the tray menu.
                WindowEvent::CloseRequested { api, .. } => {
                    api.prevent_close();
                    let _ = window.hide();
                }
                WindowEvent::Focused(focused) => {
                    scheduler::record_focus(window.app_handle().clone(), *focused);
                }
                _ => {}
            }
        })
        .invoke_handler(tauri::generate_handler![
            commands::report_title,
            commands::report_chat_snapshot,
            commands::get_unread_status,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
