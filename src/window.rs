use anyhow::{Context, Result};
use tauri::webview::NewWindowResponse;
use tauri::{AppHandle, Manager, Url, WebviewUrl, WebviewWindow, WebviewWindowBuilder};
use tauri_plugin_opener::OpenerExt;
use whatsdev_core::AppConfig;

use crate::bridge::TITLE_OBSERVER_SCRIPT;

pub const MAIN_WINDOW: &str = "main";

/// Create the window hosting the web client. Links to other hosts, and every
/// `target="_blank"` link, open in the system browser instead.
pub fn create_main_window(app: &AppHandle, config: &AppConfig, visible: bool) -> Result<WebviewWindow> {
    let url: Url = config
        .url
        .parse()
        .with_context(|| format!("Invalid web client URL: {}", config.url))?;
    let home_host = home_host(&url);
    let navigation_handle = app.clone();
    let new_window_handle = app.clone();

    let window = WebviewWindowBuilder::new(app, MAIN_WINDOW, WebviewUrl::External(url))
        .title(config.app_name.as_str())
        .inner_size(1200.0, 800.0)
        .visible(visible)
        .user_agent(&config.user_agent)
        .initialization_script(TITLE_OBSERVER_SCRIPT)
        .on_navigation(move |url| {
            if stays_in_app(url, home_host.as_deref()) {
                return true;
            }
            open_in_browser(&navigation_handle, url);
            false
        })
        // Popups never get a webview of their own.
        .on_new_window(move |url, _features| {
            open_in_browser(&new_window_handle, &url);
            NewWindowResponse::Deny
        })
        .build()
        .context("Failed to create main window")?;

    tracing::info!("Main window loading {}", config.url);
    Ok(window)
}

/// Host navigation is pinned to. `Url` normalizes case, so this compares
/// cleanly against `Url::host_str` of later navigations.
fn home_host(url: &Url) -> Option<String> {
    url.host_str().map(str::to_string)
}

fn stays_in_app(url: &Url, home_host: Option<&str>) -> bool {
    match url.scheme() {
        "http" | "https" => home_host.is_some_and(|home| url.host_str() == Some(home)),
        // about:blank, blob: downloads, data: previews
        _ => true,
    }
}

fn open_in_browser(app: &AppHandle, url: &Url) {
    if !matches!(url.scheme(), "http" | "https" | "mailto") {
        tracing::debug!("Ignoring external open of {}", url);
        return;
    }
    tracing::debug!("Opening {} in the system browser", url);
    if let Err(e) = app.opener().open_url(url.as_str(), None::<&str>) {
        tracing::warn!("Failed to open external link: {}", e);
    }
}

pub fn show_main_window(app: &AppHandle) {
    if let Some(window) = app.get_webview_window(MAIN_WINDOW) {
        let _ = window.show();
        let _ = window.unminimize();
        let _ = window.set_focus();
    }
}

pub fn hide_main_window(app: &AppHandle) {
    if let Some(window) = app.get_webview_window(MAIN_WINDOW) {
        let _ = window.hide();
    }
}

pub fn toggle_main_window(app: &AppHandle) {
    let visible = app
        .get_webview_window(MAIN_WINDOW)
        .and_then(|window| window.is_visible().ok())
        .unwrap_or(false);

    if visible {
        hide_main_window(app);
    } else {
        show_main_window(app);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stays_in_app() {
        let home = Some("web.whatsapp.com");
        let url = |s: &str| s.parse::<Url>().unwrap();

        assert!(stays_in_app(&url("https://web.whatsapp.com/"), home));
        assert!(stays_in_app(&url("blob:https://web.whatsapp.com/1234"), home));
        assert!(stays_in_app(&url("about:blank"), home));
        assert!(!stays_in_app(&url("https://example.com/article"), home));
        assert!(!stays_in_app(&url("https://web.whatsapp.com/"), None));
    }

    #[test]
    fn test_home_host_matches_navigation_case_insensitively() {
        let url = |s: &str| s.parse::<Url>().unwrap();

        let home = home_host(&url("https://WEB.WhatsApp.com"));
        assert_eq!(home.as_deref(), Some("web.whatsapp.com"));
        assert!(stays_in_app(&url("https://web.whatsapp.com/send"), home.as_deref()));
        assert!(stays_in_app(&url("https://Web.WhatsApp.com/"), home.as_deref()));

        let home = home_host(&url("http://user@[::1]:8080/app?x=1"));
        assert_eq!(home.as_deref(), Some("[::1]"));
        assert!(stays_in_app(&url("http://[::1]:8080/other"), home.as_deref()));
        assert!(!stays_in_app(&url("http://localhost:8080/"), home.as_deref()));
    }
}
