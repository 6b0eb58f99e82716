//! Studio configuration storage
//!
//! Handles persistent storage of generation endpoint settings, editor
//! tuning and the saved-widget storage key.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use widget_engine::constants::history;

/// Environment variable that overrides the configured API key
pub const API_KEY_ENV: &str = "WIDGET_STUDIO_API_KEY";

/// Name of the config file inside the data directory
pub const CONFIG_FILE: &str = "config.json";

/// Settings for the widget generation backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`)
    pub endpoint: String,
    /// API key; the environment variable takes precedence
    pub api_key: Option<String>,
    /// Model used for quick generations
    pub fast_model: String,
    /// Model used when the user asks for a more careful result
    pub thorough_model: String,
    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    60_000
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: None,
            fast_model: "gpt-4o-mini".to_string(),
            thorough_model: "gpt-4o".to_string(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl GenerationConfig {
    /// The API key to use, preferring the environment
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|key| !key.trim().is_empty()))
    }
}

/// Editor behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Quiet period before typed text becomes an undo step
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Maximum number of undo steps
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Start sessions with drag handles shown
    #[serde(default)]
    pub edit_mode: bool,
}

fn default_debounce_ms() -> u64 {
    history::DEBOUNCE_MS
}

fn default_history_limit() -> usize {
    history::MAX_PAST
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            history_limit: default_history_limit(),
            edit_mode: false,
        }
    }
}

/// Saved-widget storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    /// Key under which the saved widget list is stored
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Maximum number of saved widgets kept
    #[serde(default = "default_max_saved")]
    pub max_saved: usize,
}

fn default_namespace() -> String {
    "widget-studio:saved".to_string()
}

fn default_max_saved() -> usize {
    50
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            max_saved: default_max_saved(),
        }
    }
}

/// Full studio configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StudioConfig {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl StudioConfig {
    /// Load configuration from disk, falling back to defaults if absent
    pub async fn load(data_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = data_dir.join(CONFIG_FILE);

        if !fs::try_exists(&config_path).await.map_err(ConfigError::Io)? {
            log::debug!("No config at {:?}, using defaults", config_path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)
            .await
            .map_err(ConfigError::Io)?;

        serde_json::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// Save configuration to disk
    pub async fn save(&self, data_dir: &Path) -> Result<(), ConfigError> {
        fs::create_dir_all(data_dir).await.map_err(ConfigError::Io)?;

        let config_path = data_dir.join(CONFIG_FILE);
        let contents = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        fs::write(&config_path, contents)
            .await
            .map_err(ConfigError::Io)?;

        log::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }
}

/// Default data directory (`<platform data dir>/widget-studio`)
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("widget-studio")
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(serde_json::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(serde_json::Error),
}
