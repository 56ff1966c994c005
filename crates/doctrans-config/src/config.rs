use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default limit for one translation run. `timeout-secs = 0` disables it.
pub const DEFAULT_TIMEOUT_SECS: u64 = 1800;

const CONFIG_FILE_NAME: &str = "doctrans.toml";
const POINTER_FILE_NAME: &str = ".doctrans_config_path";

const DEFAULT_SCRIPTS_DIR: &str = "scripts";
const DEFAULT_TRANSLATE_SCRIPT: &str = "translate.py";
const DEFAULT_PROGRESS_SCRIPT: &str = "translate_with_progress.py";
const DEFAULT_TEST_SCRIPT: &str = "test_connection.py";
const DEFAULT_ENGINE: &str = "openai";

/// Modules the translation scripts import. An interpreter lacking any of
/// them is skipped during discovery.
const DEFAULT_REQUIRED_MODULES: &[&str] = &["json", "docx", "openpyxl", "pptx", "requests"];

/// Directory holding `doctrans.toml`, the engine settings and the log file.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    #[cfg(not(target_os = "windows"))]
    let dir = dirs::home_dir()
        .ok_or(ConfigError::NoConfigDir)?
        .join(".config")
        .join("doctrans");

    #[cfg(target_os = "windows")]
    let dir = dirs::config_dir()
        .ok_or(ConfigError::NoConfigDir)?
        .join("doctrans");

    Ok(dir)
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scripts_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translate_script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_script: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpreter_candidates: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_modules: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_engine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl Config {
    /// Resolve the config file location.
    ///
    /// `DOCTRANS_CONFIG` wins when set and non-empty. Otherwise a pointer file
    /// next to the default location may redirect to another file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        if let Ok(env_path) = std::env::var("DOCTRANS_CONFIG") {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        let dir = config_dir()?;
        let pointer = dir.join(POINTER_FILE_NAME);
        if let Ok(contents) = fs::read_to_string(&pointer) {
            let trimmed = contents.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        Ok(dir.join(CONFIG_FILE_NAME))
    }

    /// Pointer file used by `config path <new>` to relocate the config
    pub fn pointer_path() -> Result<PathBuf, ConfigError> {
        Ok(config_dir()?.join(POINTER_FILE_NAME))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        debug!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "base-dir" => self.base_dir.clone(),
            "scripts-dir" => self.scripts_dir.clone(),
            "translate-script" => self.translate_script.clone(),
            "progress-script" => self.progress_script.clone(),
            "test-script" => self.test_script.clone(),
            "interpreter-candidates" => self.interpreter_candidates.as_ref().map(|v| v.join(",")),
            "required-modules" => self.required_modules.as_ref().map(|v| v.join(",")),
            "timeout-secs" => self.timeout_secs.map(|t| t.to_string()),
            "default-engine" => self.default_engine.clone(),
            "default-model" => self.default_model.clone(),
            _ => None,
        }
    }

    /// Set a value by its kebab-case key. List keys take comma-separated values.
    pub fn set(&mut self, key: &str, value: String) -> Result<(), ConfigError> {
        match key {
            "base-dir" => self.base_dir = Some(value),
            "scripts-dir" => self.scripts_dir = Some(value),
            "translate-script" => self.translate_script = Some(value),
            "progress-script" => self.progress_script = Some(value),
            "test-script" => self.test_script = Some(value),
            "interpreter-candidates" => self.interpreter_candidates = Some(split_list(&value)),
            "required-modules" => self.required_modules = Some(split_list(&value)),
            "timeout-secs" => {
                let secs = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.clone(),
                })?;
                self.timeout_secs = Some(secs);
            }
            "default-engine" => self.default_engine = Some(value),
            "default-model" => self.default_model = Some(value),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        &[
            "base-dir",
            "scripts-dir",
            "translate-script",
            "progress-script",
            "test-script",
            "interpreter-candidates",
            "required-modules",
            "timeout-secs",
            "default-engine",
            "default-model",
        ]
    }

    pub fn is_empty(&self) -> bool {
        *self == Config::default()
    }

    pub fn values_iter(&self) -> Vec<(&'static str, String)> {
        Self::keys()
            .iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }

    /// Directory the bridge runs scripts from: the configured `base-dir`,
    /// else the directory holding the running executable, else the cwd.
    pub fn resolve_base_dir(&self) -> PathBuf {
        if let Some(ref dir) = self.base_dir {
            return PathBuf::from(dir);
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Scripts directory; relative values are taken from the base dir
    pub fn resolve_scripts_dir(&self) -> PathBuf {
        let dir = self.scripts_dir.as_deref().unwrap_or(DEFAULT_SCRIPTS_DIR);
        let dir = PathBuf::from(dir);
        if dir.is_absolute() {
            dir
        } else {
            self.resolve_base_dir().join(dir)
        }
    }

    pub fn translate_script_name(&self) -> &str {
        self.translate_script
            .as_deref()
            .unwrap_or(DEFAULT_TRANSLATE_SCRIPT)
    }

    pub fn progress_script_name(&self) -> &str {
        self.progress_script
            .as_deref()
            .unwrap_or(DEFAULT_PROGRESS_SCRIPT)
    }

    pub fn test_script_name(&self) -> &str {
        self.test_script.as_deref().unwrap_or(DEFAULT_TEST_SCRIPT)
    }

    pub fn required_modules(&self) -> Vec<String> {
        self.required_modules.clone().unwrap_or_else(|| {
            DEFAULT_REQUIRED_MODULES
                .iter()
                .map(|m| (*m).to_string())
                .collect()
        })
    }

    /// Invocation timeout, `None` when disabled with `timeout-secs = 0`
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn engine(&self) -> &str {
        self.default_engine.as_deref().unwrap_or(DEFAULT_ENGINE)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
