//! Per-engine settings, one JSON file per engine under `engines/`

use crate::config::{config_dir, Config};
use crate::errors::ConfigError;
use crate::secrets;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_TEMPERATURE: f64 = 0.3;

/// Connection settings for one translation engine.
///
/// `api_key` is filled from the secret store on load and is never written
/// to the settings file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EngineSettings {
    #[serde(default)]
    pub api_url: String,
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(skip)]
    pub api_key: Option<String>,
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

impl EngineSettings {
    /// Built-in defaults for engines the scripts know about
    pub fn defaults_for(engine: &str) -> Self {
        let (api_url, model) = match engine {
            "openai" => ("https://api.openai.com/v1", "gpt-4o-mini"),
            "deepseek" => ("https://api.deepseek.com/v1", "deepseek-chat"),
            "anthropic" => ("https://api.anthropic.com/v1", "claude-3-5-haiku-latest"),
            "qwen" => (
                "https://dashscope.aliyuncs.com/compatible-mode/v1",
                "qwen-plus",
            ),
            "ollama" => ("http://localhost:11434", "llama3"),
            _ => ("", ""),
        };
        EngineSettings {
            api_url: api_url.to_string(),
            model: model.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            api_key: None,
        }
    }
}

/// Directory-backed store of [`EngineSettings`]
#[derive(Debug, Clone)]
pub struct EngineStore {
    dir: PathBuf,
}

impl EngineStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store in an `engines` directory next to the active config file
    pub fn default_location() -> Result<Self, ConfigError> {
        let config_path = Config::path()?;
        let dir = match config_path.parent() {
            Some(parent) => parent.to_path_buf(),
            None => config_dir()?,
        };
        Ok(Self::new(dir.join("engines")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, engine: &str) -> Result<PathBuf, ConfigError> {
        validate_engine_id(engine)?;
        Ok(self.dir.join(format!("{}.json", engine)))
    }

    /// Load settings for `engine`; a missing file yields the engine defaults
    pub fn load(&self, engine: &str) -> Result<EngineSettings, ConfigError> {
        let path = self.file_for(engine)?;
        let mut settings = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            debug!("No settings for engine '{}', using defaults", engine);
            EngineSettings::defaults_for(engine)
        };
        settings.api_key = secrets::read_api_key(engine);
        Ok(settings)
    }

    /// Save settings for `engine`. The API key, if present, goes to the
    /// secret store instead of the file.
    pub fn save(&self, engine: &str, settings: &EngineSettings) -> Result<(), ConfigError> {
        let path = self.file_for(engine)?;
        fs::create_dir_all(&self.dir)?;
        fs::write(&path, serde_json::to_string_pretty(settings)?)?;
        debug!("Saved engine settings to {}", path.display());

        if let Some(ref key) = settings.api_key {
            secrets::write_api_key(engine, key)?;
        }
        Ok(())
    }

    /// Engines with a settings file, sorted by name
    pub fn list(&self) -> Result<Vec<String>, ConfigError> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut engines: Vec<String> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(str::to_string)
            })
            .collect();
        engines.sort();
        Ok(engines)
    }
}

fn validate_engine_id(engine: &str) -> Result<(), ConfigError> {
    let valid = !engine.is_empty()
        && engine
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidEngine(engine.to_string()))
    }
}
