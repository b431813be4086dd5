//! Config loading from defaults, an optional JSON5 file and the environment.
//!
//! Environment access goes through a lookup function so callers decide where
//! values come from. The binary passes `std::env::var`; tests pass a map.


use crate::{ConfigError, RelayConfig};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable names read by [`RelayConfig::load_with`].
pub mod env_keys {
    /// Optional JSON5 config file path.
    pub const CONFIG_FILE: &str = "RELAY_CONFIG";
    pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const OPENAI_MODEL: &str = "OPENAI_MODEL";
    pub const GOOGLE_SHEET_ID: &str = "GOOGLE_SHEET_ID";
    pub const GOOGLE_SHEET_RANGE: &str = "GOOGLE_SHEET_RANGE";
    pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
    pub const GOOGLE_CREDENTIALS_FILE: &str = "GOOGLE_CREDENTIALS_FILE";
    pub const IMAGES_DIR: &str = "RELAY_IMAGES_DIR";
    pub const IMAGES_ENABLED: &str = "RELAY_IMAGES_ENABLED";
    pub const MEMORY_MAX: &str = "RELAY_MEMORY_MAX";
}

impl RelayConfig {
    /// Parse a JSON5 document into a validated config.
    pub fn load_from_str(input: &str) -> Result<Self, ConfigError> {
        let config: RelayConfig = json5::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON5 config file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("reading config file (path={})", path.display());
        let contents = fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }

    /// Load config from the real process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load config using `lookup` for every environment value.
    ///
    /// The file named by `RELAY_CONFIG` is applied first, then individual
    /// variables override it. Empty values count as unset.
    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = match lookup(env_keys::CONFIG_FILE) {
            Some(path) => {
                info!("loading config from path: {path}");
                Self::load_from_path(PathBuf::from(path))?
            }
            None => RelayConfig::default(),
        };
        config.apply_env(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay environment values onto the config.
    fn apply_env<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(env_keys::TELEGRAM_BOT_TOKEN) {
            self.telegram.bot_token = Some(token);
        }
        if let Some(key) = lookup(env_keys::OPENAI_API_KEY) {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = lookup(env_keys::OPENAI_MODEL) {
            self.llm.model = model;
        }
        if let Some(id) = lookup(env_keys::GOOGLE_SHEET_ID) {
            self.sheets.spreadsheet_id = Some(id);
        }
        if let Some(range) = lookup(env_keys::GOOGLE_SHEET_RANGE) {
            self.sheets.range = range;
        }
        if let Some(key) = lookup(env_keys::GOOGLE_API_KEY) {
            self.sheets.api_key = Some(key);
        }
        if let Some(path) = lookup(env_keys::GOOGLE_CREDENTIALS_FILE) {
            self.sheets.credentials_file = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup(env_keys::IMAGES_DIR) {
            self.images.path = PathBuf::from(path);
        }
        if let Some(value) = lookup(env_keys::IMAGES_ENABLED) {
            self.images.enabled = parse_bool(&value)
                .ok_or_else(|| ConfigError::invalid("images.enabled", "expected a boolean"))?;
        }
        if let Some(value) = lookup(env_keys::MEMORY_MAX) {
            self.memory.max_records = value.trim().parse().map_err(|_| {
                ConfigError::invalid("memory.max_records", "expected a positive integer")
            })?;
        }
        Ok(())
    }

    /// Check invariants the components rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory.max_records == 0 {
            return Err(ConfigError::invalid(
                "memory.max_records",
                "must be at least 1",
            ));
        }
        if self.memory.context_window == 0 {
            return Err(ConfigError::invalid(
                "memory.context_window",
                "must be at least 1",
            ));
        }
        if self.llm.max_tokens == 0 {
            return Err(ConfigError::invalid("llm.max_tokens", "must be at least 1"));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::invalid(
                "llm.temperature",
                "must be between 0.0 and 2.0",
            ));
        }
        if self.sheets.range.trim().is_empty() {
            return Err(ConfigError::invalid("sheets.range", "must not be empty"));
        }
        Ok(())
    }
}

/// Parse common boolean spellings.
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
