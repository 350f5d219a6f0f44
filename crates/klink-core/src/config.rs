//! klink Configuration Management
//!
//! Handles configuration from environment variables and TOML config files
//! with sensible defaults for local runs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Sentence encoder configuration
    pub encoder: EncoderConfig,

    /// Cross-corpus linker configuration
    pub linker: LinkerConfig,

    /// Relation extraction configuration
    pub extraction: ExtractionConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("KLINK_MODEL_DIR") {
            config.encoder.model_dir = Some(PathBuf::from(dir));
        }
        if let Ok(model) = std::env::var("KLINK_MODEL_ID") {
            config.encoder.model_id = model;
        }
        if let Ok(batch) = std::env::var("KLINK_BATCH_SIZE") {
            config.encoder.batch_size = parse_value("KLINK_BATCH_SIZE", &batch)?;
        }
        if let Ok(len) = std::env::var("KLINK_MAX_LENGTH") {
            config.encoder.max_length = parse_value("KLINK_MAX_LENGTH", &len)?;
        }
        if let Ok(k) = std::env::var("KLINK_TOP_K") {
            config.linker.top_k = parse_value("KLINK_TOP_K", &k)?;
        }
        if let Ok(max) = std::env::var("KLINK_MAX_PAIRABLE_MENTIONS") {
            config.extraction.max_pairable_mentions =
                Some(parse_value("KLINK_MAX_PAIRABLE_MENTIONS", &max)?);
        }
        if let Ok(level) = std::env::var("KLINK_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;
        let defaults = Self::default();

        if env_config.encoder.model_dir.is_some() {
            self.encoder.model_dir = env_config.encoder.model_dir;
        }
        if env_config.encoder.model_id != defaults.encoder.model_id {
            self.encoder.model_id = env_config.encoder.model_id;
        }
        if env_config.encoder.batch_size != defaults.encoder.batch_size {
            self.encoder.batch_size = env_config.encoder.batch_size;
        }
        if env_config.encoder.max_length != defaults.encoder.max_length {
            self.encoder.max_length = env_config.encoder.max_length;
        }
        if env_config.linker.top_k != defaults.linker.top_k {
            self.linker.top_k = env_config.linker.top_k;
        }
        if env_config.extraction.max_pairable_mentions.is_some() {
            self.extraction.max_pairable_mentions = env_config.extraction.max_pairable_mentions;
        }
        if env_config.logging.level != defaults.logging.level {
            self.logging.level = env_config.logging.level;
        }

        Ok(self)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Sentence encoder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Local directory holding config.json / tokenizer.json /
    /// model.safetensors; when unset, files are resolved from the
    /// Hugging Face hub
    pub model_dir: Option<PathBuf>,

    /// Hub model id
    pub model_id: String,

    /// Hub revision
    pub revision: String,

    /// Number of texts per forward pass
    pub batch_size: usize,

    /// Maximum token length; longer texts are truncated
    pub max_length: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            model_dir: None,
            model_id: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            revision: "main".to_string(),
            batch_size: 16,
            max_length: 512,
        }
    }
}

/// Cross-corpus linker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerConfig {
    /// Neighbors per query document
    pub top_k: usize,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

/// Relation extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Skip the quadratic entity-pair pass for documents with more pairable
    /// mentions than this bound. Unset preserves the exhaustive product.
    pub max_pairable_mentions: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
