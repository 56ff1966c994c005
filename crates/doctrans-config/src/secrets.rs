//! API keys stored in per-user environment variables
//!
//! Keys never touch the settings files. They are read from the environment
//! when engine settings load and written back when settings are saved. On
//! Windows the user-level variable is persisted with `setx` so the next
//! session sees it; elsewhere only the current process is updated.

use crate::errors::ConfigError;
use tracing::{debug, warn};

/// Environment variable holding the API key for `engine`,
/// e.g. `deep-seek` -> `DOCTRANS_DEEP_SEEK_API_KEY`
pub fn api_key_var(engine: &str) -> String {
    let normalized: String = engine
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("DOCTRANS_{}_API_KEY", normalized)
}

/// Read the API key for `engine`. Empty values count as missing.
pub fn read_api_key(engine: &str) -> Option<String> {
    std::env::var(api_key_var(engine))
        .ok()
        .filter(|value| !value.trim().is_empty())
}

/// Store the API key for `engine`. An empty key clears it.
pub fn write_api_key(engine: &str, key: &str) -> Result<(), ConfigError> {
    let var = api_key_var(engine);
    if key.is_empty() {
        std::env::remove_var(&var);
    } else {
        std::env::set_var(&var, key);
    }
    debug!("Updated {} in process environment", var);

    persist_user_variable(&var, key)
}

#[cfg(target_os = "windows")]
fn persist_user_variable(var: &str, value: &str) -> Result<(), ConfigError> {
    let output = std::process::Command::new("setx")
        .arg(var)
        .arg(value)
        .output()
        .map_err(|e| ConfigError::Secret(format!("failed to run setx: {}", e)))?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!("setx {} failed: {}", var, stderr.trim());
        Err(ConfigError::Secret(stderr.trim().to_string()))
    }
}

#[cfg(not(target_os = "windows"))]
fn persist_user_variable(var: &str, _value: &str) -> Result<(), ConfigError> {
    warn!(
        "{} is only set for this process; export it in your shell profile to keep it",
        var
    );
    Ok(())
}
