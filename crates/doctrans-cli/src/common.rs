//! Common types shared across commands

use crate::errors::CliError;
use clap::Parser;
use doctrans_config::{Config, EngineSettings, EngineStore};
use std::path::{Path, PathBuf};

/// Global CLI options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    #[arg(short, long, global = true, help = "Only show warnings and errors")]
    pub quiet: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Increase verbosity (-v for debug, -vv for trace)")]
    pub verbose: u8,

    #[arg(
        long,
        global = true,
        help = "Show translation script output on console (always logged to file)"
    )]
    pub log_script: bool,
}

impl GlobalOpts {
    /// Effective verbosity level
    /// - 0: warnings only
    /// - 1: debug (-v)
    /// - 2: trace (-vv)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

/// Absolute form of a user-supplied path, resolved against the current directory.
///
/// The scripts run with the runtime base directory as their working directory,
/// so relative paths must not reach them.
pub fn absolute_path(path: &Path) -> Result<PathBuf, CliError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Engine, model and connection settings for one invocation
#[derive(Debug, Clone)]
pub struct EngineChoice {
    pub engine: String,
    pub model: String,
    pub settings: EngineSettings,
}

/// Pick the engine and model for a command.
///
/// Flags win, then the engine's saved settings, then the config defaults.
pub fn choose_engine(
    config: &Config,
    store: &EngineStore,
    engine: Option<String>,
    model: Option<String>,
) -> Result<EngineChoice, CliError> {
    let engine = engine.unwrap_or_else(|| config.engine().to_string());
    let mut settings = store.load(&engine)?;
    let model = model
        .or_else(|| Some(settings.model.clone()).filter(|m| !m.is_empty()))
        .or_else(|| config.default_model.clone())
        .unwrap_or_default();
    settings.model.clone_from(&model);
    tracing::debug!(engine = %engine, model = %model, "Selected engine");
    Ok(EngineChoice {
        engine,
        model,
        settings,
    })
}

/// Run a future to completion on a fresh multi-threaded runtime
pub fn block_on<F: std::future::Future>(future: F) -> Result<F::Output, CliError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}
