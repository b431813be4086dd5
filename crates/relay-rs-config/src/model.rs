//! Configuration schema for the relay.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration passed to every component.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub images: ImagesConfig,
}

impl RelayConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> RelayConfigBuilder {
        RelayConfigBuilder::new()
    }
}

/// Builder for assembling a `RelayConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct RelayConfigBuilder {
    config: RelayConfig,
}

impl RelayConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: RelayConfig::default(),
        }
    }

    /// Replace the transport configuration.
    pub fn telegram(mut self, telegram: TelegramConfig) -> Self {
        self.config.telegram = telegram;
        self
    }

    /// Replace the text generation configuration.
    pub fn llm(mut self, llm: LlmConfig) -> Self {
        self.config.llm = llm;
        self
    }

    /// Replace the spreadsheet configuration.
    pub fn sheets(mut self, sheets: SheetsConfig) -> Self {
        self.config.sheets = sheets;
        self
    }

    /// Replace the memory configuration.
    pub fn memory(mut self, memory: MemoryConfig) -> Self {
        self.config.memory = memory;
        self
    }

    /// Replace the image storage configuration.
    pub fn images(mut self, images: ImagesConfig) -> Self {
        self.config.images = images;
        self
    }

    /// Finalize and return the built `RelayConfig`.
    pub fn build(self) -> RelayConfig {
        self.config
    }
}

/// Messaging transport settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Bot access token. Without it the relay does not start.
    #[serde(default)]
    pub bot_token: Option<String>,
}

/// Text generation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Extra text appended to the system prompt.
    #[serde(default)]
    pub additional_instructions: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            additional_instructions: None,
        }
    }
}

/// Default completion model.
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Default output token bound.
fn default_max_tokens() -> u32 {
    1000
}

/// Default sampling temperature.
fn default_temperature() -> f32 {
    0.7
}

/// Spreadsheet log settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SheetsConfig {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,
    /// Range read back by `/sheets` and `/stats`.
    #[serde(default = "default_range")]
    pub range: String,
    /// Range rows are appended to.
    #[serde(default = "default_append_range")]
    pub append_range: String,
    /// API key used for reads.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Service-account key file enabling authenticated writes.
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Base URL of the public CSV export used as read fallback.
    #[serde(default = "default_export_base_url")]
    pub export_base_url: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            range: default_range(),
            append_range: default_append_range(),
            api_key: None,
            credentials_file: None,
            api_base_url: default_api_base_url(),
            export_base_url: default_export_base_url(),
        }
    }
}

fn default_range() -> String {
    "Sheet1!A1:Z100".to_string()
}

fn default_append_range() -> String {
    "Sheet1!A:B".to_string()
}

fn default_api_base_url() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_export_base_url() -> String {
    "https://docs.google.com".to_string()
}

/// Conversation memory bounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Records kept per user before eviction.
    #[serde(default = "default_max_records")]
    pub max_records: usize,
    /// Records rendered into the prompt.
    #[serde(default = "default_context_window")]
    pub context_window: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_records: default_max_records(),
            context_window: default_context_window(),
        }
    }
}

fn default_max_records() -> usize {
    10
}

fn default_context_window() -> usize {
    5
}

/// Image handling settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ImagesConfig {
    /// Download and store photos. When off, only the file id is logged.
    #[serde(default = "default_images_enabled")]
    pub enabled: bool,
    /// Storage directory, created on startup.
    #[serde(default = "default_images_path")]
    pub path: PathBuf,
    /// Entries shown by `/images`.
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            enabled: default_images_enabled(),
            path: default_images_path(),
            list_limit: default_list_limit(),
        }
    }
}

fn default_images_enabled() -> bool {
    true
}

fn default_images_path() -> PathBuf {
    PathBuf::from("images")
}

fn default_list_limit() -> usize {
    10
}
