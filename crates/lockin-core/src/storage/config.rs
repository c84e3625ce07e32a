//! TOML-based application configuration.
//!
//! Stores pipeline settings:
//! - Capture loop interval and screenshot command
//! - Classifier threshold, base rule, and default study topic
//! - Required daily study minutes
//! - Ollama endpoint and model names
//! - Notification and Canvas settings
//!
//! Configuration is stored at `~/.config/lockin/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::aggregator::DEFAULT_CONFIDENCE_THRESHOLD;
use crate::definition::DEFAULT_BASE_RULE;
use crate::error::ConfigError;
use crate::synthesizer::DEFAULT_REQUIRED_MINUTES;

/// Capture loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_capture_interval")]
    pub capture_interval_seconds: u64,
    /// Screenshot command; `{output}` is replaced with the target path.
    #[serde(default = "default_screenshot_command")]
    pub screenshot_command: String,
    /// Directory for captured screenshots (default: data dir).
    #[serde(default)]
    pub screenshots_dir: Option<String>,
}

/// Classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    #[serde(default = "default_base_rule")]
    pub base_rule: String,
    /// Default study topic, used when the CLI does not pass one.
    #[serde(default)]
    pub study_topic: Option<String>,
}

/// Schedule synthesis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_required_minutes")]
    pub required_minutes: u32,
}

/// Ollama service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    #[serde(default = "default_ollama_base_url")]
    pub ollama_base_url: String,
    #[serde(default = "default_text_model")]
    pub text_model: String,
    #[serde(default = "default_vision_model")]
    pub vision_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Text-to-speech command, run through the shell; `{message}` is
    /// replaced with the alert text, or the text is appended quoted.
    #[serde(default = "default_speech_command")]
    pub speech_command: String,
}

/// Canvas LMS configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CanvasConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub selected_course_id: Option<i64>,
    #[serde(default)]
    pub selected_course_name: Option<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/lockin/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub services: ServicesConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub canvas: CanvasConfig,
}

// Default functions
fn default_capture_interval() -> u64 {
    60
}
fn default_screenshot_command() -> String {
    if cfg!(target_os = "macos") {
        "screencapture -x {output}".into()
    } else {
        "scrot {output}".into()
    }
}
fn default_confidence_threshold() -> f64 {
    DEFAULT_CONFIDENCE_THRESHOLD
}
fn default_base_rule() -> String {
    DEFAULT_BASE_RULE.into()
}
fn default_required_minutes() -> u32 {
    DEFAULT_REQUIRED_MINUTES
}
fn default_ollama_base_url() -> String {
    "http://localhost:11434".into()
}
fn default_text_model() -> String {
    "llama3.1".into()
}
fn default_vision_model() -> String {
    "llava".into()
}
fn default_temperature() -> f64 {
    0.3
}
fn default_request_timeout() -> u64 {
    120
}
fn default_true() -> bool {
    true
}
fn default_speech_command() -> String {
    if cfg!(target_os = "macos") {
        "say".into()
    } else {
        "espeak".into()
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            capture_interval_seconds: default_capture_interval(),
            screenshot_command: default_screenshot_command(),
            screenshots_dir: None,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            base_rule: default_base_rule(),
            study_topic: None,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            required_minutes: default_required_minutes(),
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            ollama_base_url: default_ollama_base_url(),
            text_model: default_text_model(),
            vision_model: default_vision_model(),
            temperature: default_temperature(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            speech_command: default_speech_command(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            monitor: MonitorConfig::default(),
            classifier: ClassifierConfig::default(),
            schedule: ScheduleConfig::default(),
            services: ServicesConfig::default(),
            notifications: NotificationsConfig::default(),
            canvas: CanvasConfig::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    // Optional fields deserialize as null until set;
                    // treat them as strings (all optional keys here are
                    // strings or numbers parseable from string JSON).
                    serde_json::Value::Null | serde_json::Value::String(_) => {
                        serde_json::Value::String(value.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::DirUnavailable(e.to_string()))?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, writing and returning the default if no config
    /// file exists yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Load from disk, returning the default on any error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key and persist the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be
    /// parsed, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.save()
    }
}
