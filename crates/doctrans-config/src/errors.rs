use std::io;
use thiserror::Error;

/// Errors raised while reading or writing doctrans configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to write config TOML: {0}")]
    Write(#[from] toml::ser::Error),

    #[error("Failed to read or write engine settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not determine the configuration directory")]
    NoConfigDir,

    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    #[error("Invalid value '{value}' for config key '{key}'")]
    InvalidValue { key: String, value: String },

    #[error("Invalid engine identifier '{0}': use letters, digits, '-' or '_'")]
    InvalidEngine(String),

    #[error("Failed to store API key: {0}")]
    Secret(String),
}
