use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while discovering an interpreter or running a script
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("No compatible Python runtime found (tried: {})", .tried.join(", "))]
    NoRuntimeFound { tried: Vec<String> },

    #[error(
        "Translation script failed with exit code {}: {}",
        .code.map_or_else(|| "none".to_string(), |c| c.to_string()),
        .stderr
    )]
    SubprocessFailed { code: Option<i32>, stderr: String },

    #[error("Translation script exited successfully but printed no result")]
    UnparsableResult,

    #[error("Translation script timed out after {}", format_limit(.0))]
    Timeout(Duration),

    #[error("Script not found: {0}")]
    ScriptNotFound(PathBuf),

    #[error("Failed to serialize request: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Whole seconds when exact, milliseconds otherwise
fn format_limit(limit: &Duration) -> String {
    if limit.subsec_millis() == 0 {
        format!("{}s", limit.as_secs())
    } else {
        format!("{}ms", limit.as_millis())
    }
}
