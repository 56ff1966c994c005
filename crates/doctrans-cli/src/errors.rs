//! Errors surfaced by the doctrans commands

use doctrans_bridge::BridgeError;
use doctrans_config::ConfigError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to encode result: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Translation failed: {0}")]
    TranslationFailed(String),

    #[error("Connection test failed for engine '{0}'")]
    ConnectionFailed(String),

    #[error("Invalid temperature {0}: expected a value between 0 and 2")]
    InvalidTemperature(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_error_display() {
        let err = CliError::ConnectionFailed("deepseek".to_string());
        assert_eq!(
            err.to_string(),
            "Connection test failed for engine 'deepseek'"
        );

        let err = CliError::InputNotFound(PathBuf::from("missing.docx"));
        assert_eq!(err.to_string(), "Input file not found: missing.docx");
    }

    #[test]
    fn test_bridge_error_is_transparent() {
        let err = CliError::from(BridgeError::NoRuntimeFound {
            tried: vec!["python3".to_string()],
        });
        assert!(err.to_string().starts_with("No compatible Python runtime found"));
    }
}
