//! Configuration resolution for `SkillLink`.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/skilllink/settings.json)
//! 3. Explicit config file (`--config`)
//! 4. Environment variables
//! 5. CLI arguments (highest priority, applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Complete `SkillLink` client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Origin of the marketplace backend, without a trailing path.
    pub base_url: String,
    pub log_level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Presentation timings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// How long an error notice stays on screen.
    pub error_notice_ms: u64,
    /// How long a success notice stays on screen.
    pub success_notice_ms: u64,
    /// Delay between a success message and the follow-up navigation.
    pub redirect_delay_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            error_notice_ms: 5_000,
            success_notice_ms: 3_000,
            redirect_delay_ms: 1_500,
        }
    }
}

impl UiConfig {
    pub const fn error_notice(&self) -> Duration {
        Duration::from_millis(self.error_notice_ms)
    }

    pub const fn success_notice(&self) -> Duration {
        Duration::from_millis(self.success_notice_ms)
    }

    pub const fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}

/// Client storage location.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Storage file; `None` means `~/.skilllink/storage.json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Load configuration with hierarchical resolution.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            let global = load_config_file(&global_path)?;
            merge_config(&mut config, global);
        }
    }

    if let Some(path) = explicit {
        let file = load_config_file(path)?;
        merge_config(&mut config, file);
    }

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|h| PathBuf::from(h).join(".skilllink").join("settings.json"))
    }
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library/Application Support/skilllink/settings.json"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
            .map(|p| p.join("skilllink").join("settings.json"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

/// Directory holding client state: `~/.skilllink/`.
pub fn data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".skilllink"))
}

/// Default storage file: `~/.skilllink/storage.json`.
pub fn default_storage_path() -> Option<PathBuf> {
    data_dir().map(|d| d.join("storage.json"))
}

/// Log file used while the terminal UI owns the screen.
pub fn log_file_path() -> Option<PathBuf> {
    data_dir().map(|d| d.join("skilllink.log"))
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn merge_config(base: &mut Config, overlay: Config) {
    base.api = overlay.api;
    base.ui = overlay.ui;
    if overlay.storage.path.is_some() {
        base.storage.path = overlay.storage.path;
    }
}

fn apply_env_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("SKILLLINK_BASE_URL") {
        config.api.base_url = val;
    }
    if let Some(val) = var("SKILLLINK_LOG_LEVEL") {
        config.api.log_level = val;
    }
    if let Some(val) = var("SKILLLINK_STORAGE_PATH") {
        config.storage.path = Some(PathBuf::from(val));
    }
    if let Some(n) = var("SKILLLINK_REDIRECT_DELAY_MS").and_then(|v| v.parse().ok()) {
        config.ui.redirect_delay_ms = n;
    }
}
