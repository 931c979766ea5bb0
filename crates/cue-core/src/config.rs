use crate::context::DEFAULT_WINDOW_SIZE;
use crate::trigger::DEFAULT_TRIGGER;
use cue_provider::ModelDescriptor;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default completion token cap.
pub const DEFAULT_MAX_TOKENS: u32 = 256;

/// Environment variable read when no API key is configured.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Serialized settings from ~/.cue/config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_key: String,
    pub max_tokens: u32,
    /// Replaces the trigger token once an option is committed.
    pub content_tag: String,
    pub custom_models: Vec<ModelDescriptor>,
    pub trigger: String,
    /// Characters of full-page context kept in a prompt.
    pub window_size: usize,
    pub fuzzy_filter: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
            content_tag: String::new(),
            custom_models: Vec::new(),
            trigger: DEFAULT_TRIGGER.to_string(),
            window_size: DEFAULT_WINDOW_SIZE,
            fuzzy_filter: false,
        }
    }
}

/// Setting names accepted by [`Settings::set`].
pub const SETTING_KEYS: &[&str] = &[
    "api_key",
    "max_tokens",
    "content_tag",
    "custom_models",
    "trigger",
    "window_size",
    "fuzzy_filter",
];

impl Settings {
    // — Raw-string setters: empty or invalid input keeps the previous value —

    pub fn set_api_key(&mut self, raw: &str) -> bool {
        let raw = raw.trim();
        if raw.is_empty() {
            return false;
        }
        self.api_key = raw.to_string();
        true
    }

    pub fn set_max_tokens(&mut self, raw: &str) -> bool {
        match raw.trim().parse::<u32>() {
            Ok(n) if n > 0 => {
                self.max_tokens = n;
                true
            }
            _ => {
                tracing::debug!(raw, "ignoring invalid max_tokens");
                false
            }
        }
    }

    /// Whitespace is a valid tag; only empty input is ignored.
    pub fn set_content_tag(&mut self, raw: &str) -> bool {
        if raw.is_empty() {
            return false;
        }
        self.content_tag = raw.to_string();
        true
    }

    /// Replace the custom model list from a JSON array.
    pub fn set_custom_models(&mut self, raw: &str) -> bool {
        if raw.trim().is_empty() {
            return false;
        }
        match serde_json::from_str::<Vec<ModelDescriptor>>(raw) {
            Ok(models) => {
                self.custom_models = models;
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "ignoring unparsable custom models");
                false
            }
        }
    }

    pub fn set_trigger(&mut self, raw: &str) -> bool {
        let raw = raw.trim();
        if raw.is_empty() {
            return false;
        }
        self.trigger = raw.to_string();
        true
    }

    pub fn set_window_size(&mut self, raw: &str) -> bool {
        match raw.trim().parse::<usize>() {
            Ok(n) if n > 0 => {
                self.window_size = n;
                true
            }
            _ => {
                tracing::debug!(raw, "ignoring invalid window_size");
                false
            }
        }
    }

    pub fn set_fuzzy_filter(&mut self, raw: &str) -> bool {
        match raw.trim().parse::<bool>() {
            Ok(on) => {
                self.fuzzy_filter = on;
                true
            }
            Err(_) => false,
        }
    }

    /// Set a value by name. Returns whether the value was accepted.
    pub fn set(&mut self, key: &str, raw: &str) -> bool {
        match key {
            "api_key" => self.set_api_key(raw),
            "max_tokens" => self.set_max_tokens(raw),
            "content_tag" => self.set_content_tag(raw),
            "custom_models" => self.set_custom_models(raw),
            "trigger" => self.set_trigger(raw),
            "window_size" => self.set_window_size(raw),
            "fuzzy_filter" => self.set_fuzzy_filter(raw),
            _ => {
                tracing::debug!(key, "unknown setting");
                false
            }
        }
    }

    /// Fill an empty API key from `OPENAI_API_KEY`.
    pub fn with_env_api_key(mut self) -> Self {
        if self.api_key.is_empty() {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                self.set_api_key(&key);
            }
        }
        self
    }
}

/// Helper struct for storing the location to read/write settings
pub struct SettingsStore {
    path: PathBuf,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore {
    pub fn new() -> Self {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".cue");
        path.push("config.json");
        Self { path }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the saved settings, or fallback to Default
    pub fn load(&self) -> Settings {
        if let Ok(content) = fs::read_to_string(&self.path) {
            match serde_json::from_str(&content) {
                Ok(settings) => return settings,
                Err(e) => tracing::debug!(path = %self.path.display(), error = %e, "ignoring malformed settings"),
            }
        }
        Settings::default()
    }

    /// Save settings back to disk
    pub fn save(&self, settings: &Settings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, content)
    }
}
