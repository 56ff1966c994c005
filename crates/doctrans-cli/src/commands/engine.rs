//! Per-engine connection settings

use crate::errors::CliError;
use clap::Subcommand;
use colored::Colorize;
use doctrans_config::{secrets, Config, EngineStore};
use doctrans_logger as logger;

#[derive(Subcommand, Debug, Clone)]
pub enum EngineAction {
    /// Show the settings used for an engine
    Show {
        /// Engine name (defaults to the configured default engine)
        engine: Option<String>,
    },
    /// Update the settings of an engine
    Set {
        engine: String,
        #[arg(long)]
        api_url: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        temperature: Option<f64>,
        /// Stored in the environment, never in the settings file
        #[arg(long)]
        api_key: Option<String>,
    },
    /// List engines that have saved settings
    List,
}

pub fn handle_engine(action: EngineAction) -> Result<(), CliError> {
    let store = EngineStore::default_location()?;
    match action {
        EngineAction::Show { engine } => {
            let engine = match engine {
                Some(engine) => engine,
                None => Config::load()?.engine().to_string(),
            };
            let settings = store.load(&engine)?;
            println!("{} {}", "Engine:".bold().green(), engine);
            println!("  {}: {}", "api-url".cyan(), settings.api_url);
            println!("  {}: {}", "model".cyan(), settings.model);
            println!("  {}: {}", "temperature".cyan(), settings.temperature);
            let key_state = if settings.api_key.is_some() {
                "set".green()
            } else {
                "not set".yellow()
            };
            println!(
                "  {}: {} ({})",
                "api-key".cyan(),
                key_state,
                secrets::api_key_var(&engine)
            );
            Ok(())
        }
        EngineAction::Set {
            engine,
            api_url,
            model,
            temperature,
            api_key,
        } => {
            let mut settings = store.load(&engine)?;
            if let Some(api_url) = api_url {
                settings.api_url = api_url;
            }
            if let Some(model) = model {
                settings.model = model;
            }
            if let Some(temperature) = temperature {
                if !(0.0..=2.0).contains(&temperature) {
                    return Err(CliError::InvalidTemperature(temperature));
                }
                settings.temperature = temperature;
            }
            // Only a newly supplied key is written back to the secret store
            settings.api_key = api_key;
            store.save(&engine, &settings)?;
            logger::success(&format!("Saved settings for engine '{}'", engine));
            Ok(())
        }
        EngineAction::List => {
            let engines = store.list()?;
            if engines.is_empty() {
                logger::info("No engine settings saved yet");
            }
            for engine in engines {
                println!("{}", engine);
            }
            Ok(())
        }
    }
}
