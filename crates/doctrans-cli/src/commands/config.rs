use crate::errors::CliError;
use crate::GlobalOpts;
use clap::Subcommand;
use colored::Colorize;
use doctrans_config::Config;
use doctrans_logger as logger;
use std::fs;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print every configured value
    Show,
    /// Set a config value. List keys take comma-separated values.
    Set { key: String, value: String },
    /// Get or set the path to the config file.
    /// If `new_path` is provided, later runs read the config from that file.
    /// If omitted, the current configuration file path is printed.
    Path {
        /// Optional new config path to set
        new_path: Option<String>,
    },
}

pub fn handle_config(action: Option<ConfigAction>, opts: &GlobalOpts) -> Result<(), CliError> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => show(opts),
        ConfigAction::Set { key, value } => set(&key, value),
        ConfigAction::Path { new_path } => path(new_path),
    }
}

fn show(opts: &GlobalOpts) -> Result<(), CliError> {
    let config = Config::load()?;
    println!("{}", "Configuration:".bold().green());
    if config.is_empty() {
        if opts.verbosity_level() > 0 {
            println!("  {}", "(empty)".yellow());
        }
    } else {
        for (key, value) in config.values_iter() {
            println!("  {}: {}", key.cyan(), value);
        }
    }
    Ok(())
}

fn set(key: &str, value: String) -> Result<(), CliError> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;
    logger::success(&format!(
        "Set {} = {}",
        key,
        config.get(key).unwrap_or_default()
    ));
    Ok(())
}

fn path(new_path: Option<String>) -> Result<(), CliError> {
    let config_path = Config::path()?;
    logger::debug(&format!("Reading config from: {}", config_path.display()));
    let pointer_path = Config::pointer_path()?;

    match new_path {
        Some(p) => {
            if let Some(parent) = pointer_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&pointer_path, p.as_bytes())?;
            logger::success(&format!("Config path set to {}", p));
        }
        None => {
            println!("{}", config_path.display());
            if let Ok(contents) = fs::read_to_string(&pointer_path) {
                let trimmed = contents.trim();
                if !trimmed.is_empty() {
                    println!("{} {}", "overridden-by".cyan(), trimmed);
                }
            }
        }
    }
    Ok(())
}
