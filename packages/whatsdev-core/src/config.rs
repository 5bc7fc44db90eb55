use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::poller::{PollSettings, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT};

/// Default application name, used for the window title and idle tooltip
pub const DEFAULT_APP_NAME: &str = "WhatsDev";

/// Default web client URL
pub const DEFAULT_URL: &str = "https://web.whatsapp.com";

/// The web client refuses unknown browsers, so present a desktop Chrome.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Environment variable name for URL override
const ENV_URL: &str = "WHATSDEV_URL";

/// Environment variable name for poll interval override
const ENV_POLL_INTERVAL: &str = "WHATSDEV_POLL_INTERVAL_SECS";

/// Configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    app: Option<AppSection>,
    polling: Option<PollingSection>,
    notifications: Option<NotificationsSection>,
}

#[derive(Debug, Deserialize, Default)]
struct AppSection {
    name: Option<String>,
    url: Option<String>,
    user_agent: Option<String>,
    start_hidden: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
struct PollingSection {
    interval_secs: Option<u64>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct NotificationsSection {
    enabled: Option<bool>,
}

/// Overrides read from the process environment
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    pub url: Option<String>,
    pub poll_interval_secs: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            url: std::env::var(ENV_URL).ok(),
            poll_interval_secs: std::env::var(ENV_POLL_INTERVAL).ok(),
        }
    }
}

/// Effective runtime configuration
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub app_name: String,
    pub url: String,
    pub user_agent: String,
    pub poll_interval_secs: u64,
    pub poll_timeout_secs: u64,
    pub notifications_enabled: bool,
    pub start_hidden: bool,
    /// Where the URL came from (for logging)
    #[serde(skip)]
    pub source: ConfigSource,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            url: DEFAULT_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT.as_secs(),
            notifications_enabled: true,
            start_hidden: false,
            source: ConfigSource::Default,
        }
    }
}

impl AppConfig {
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_secs(self.poll_interval_secs),
            timeout: Duration::from_secs(self.poll_timeout_secs),
        }
    }
}

/// Where the configuration came from
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConfigSource {
    /// Using default hardcoded values
    #[default]
    Default,
    /// Loaded from environment variable
    Environment,
    /// Loaded from config file
    ConfigFile,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::Environment => write!(f, "environment variable"),
            ConfigSource::ConfigFile => write!(f, "config file"),
        }
    }
}

/// Get the path to the configuration file
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .map(|p| p.join("whatsdev").join("config.toml"))
}

/// Parse a configuration file from disk
pub fn read_config_file(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

fn load_config_file() -> Option<ConfigFile> {
    let path = config_file_path()?;

    if !path.exists() {
        return None;
    }

    match read_config_file(&path) {
        Ok(config) => {
            tracing::debug!("Loaded config from {:?}", path);
            Some(config)
        }
        Err(e) => {
            tracing::warn!("{:#}", e);
            None
        }
    }
}

/// Load configuration with priority:
/// 1. Environment variables (WHATSDEV_URL, WHATSDEV_POLL_INTERVAL_SECS)
/// 2. Config file (~/.config/whatsdev/config.toml)
/// 3. Default values
pub fn load_config() -> AppConfig {
    resolve_config(load_config_file(), &EnvOverrides::from_env())
}

/// Merge file and environment over the defaults.
pub fn resolve_config(file: Option<ConfigFile>, env: &EnvOverrides) -> AppConfig {
    let mut config = AppConfig::default();
    let file = file.unwrap_or_default();

    if let Some(app) = file.app {
        if let Some(name) = non_empty(app.name) {
            config.app_name = name;
        }
        if let Some(url) = non_empty(app.url).map(trim_url) {
            tracing::info!("Using web client URL from config file: {}", url);
            config.url = url;
            config.source = ConfigSource::ConfigFile;
        }
        if let Some(user_agent) = non_empty(app.user_agent) {
            config.user_agent = user_agent;
        }
        if let Some(start_hidden) = app.start_hidden {
            config.start_hidden = start_hidden;
        }
    }

    if let Some(polling) = file.polling {
        match polling.interval_secs {
            Some(0) => tracing::warn!("Ignoring polling.interval_secs = 0"),
            Some(secs) => config.poll_interval_secs = secs,
            None => {}
        }
        match polling.timeout_secs {
            Some(0) => tracing::warn!("Ignoring polling.timeout_secs = 0"),
            Some(secs) => config.poll_timeout_secs = secs,
            None => {}
        }
    }

    if let Some(enabled) = file.notifications.and_then(|n| n.enabled) {
        config.notifications_enabled = enabled;
    }

    if let Some(url) = non_empty(env.url.clone()).map(trim_url) {
        tracing::info!("Using web client URL from environment variable: {}", url);
        config.url = url;
        config.source = ConfigSource::Environment;
    }

    if let Some(raw) = &env.poll_interval_secs {
        match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => config.poll_interval_secs = secs,
            _ => tracing::warn!("Ignoring invalid {}={:?}", ENV_POLL_INTERVAL, raw),
        }
    }

    if config.source == ConfigSource::Default {
        tracing::debug!("Using default web client URL: {}", DEFAULT_URL);
    }

    config
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

/// Get the path to the config file for documentation purposes
pub fn config_file_path_string() -> String {
    config_file_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "~/.config/whatsdev/config.toml".to_string())
}

/// Generate example config file content
pub fn generate_example_config() -> String {
    r#"# WhatsDev Configuration
# Place this file at: ~/.config/whatsdev/config.toml

[app]
# name = "WhatsDev"
# url = "https://web.whatsapp.com"
# user_agent = "Mozilla/5.0 ..."
# Start in the tray without showing the window
# start_hidden = false

[polling]
# How often unread chats are read from the page
# interval_secs = 5
# Give up on a single read after this long
# timeout_secs = 4

[notifications]
# enabled = true
"#
    .to_string()
}
