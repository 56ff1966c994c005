use crate::common::{block_on, choose_engine};
use crate::errors::CliError;
use clap::Args;
use doctrans_bridge::Bridge;
use doctrans_config::{Config, EngineStore};
use doctrans_logger as logger;

#[derive(Args, Debug, Clone)]
pub struct TestConnectionCommand {
    /// Engine to test (defaults to the configured default engine)
    #[arg(long)]
    pub engine: Option<String>,
    /// Model to test with
    #[arg(long)]
    pub model: Option<String>,
}

pub fn handle_test_connection(cmd: TestConnectionCommand) -> Result<(), CliError> {
    let config = Config::load()?;
    let store = EngineStore::default_location()?;
    let choice = choose_engine(&config, &store, cmd.engine, cmd.model)?;
    let bridge = Bridge::new(&config)?.with_engine_settings(&choice.settings);

    logger::spinner_start(&format!("Testing connection to {}...", choice.engine));
    let reachable = block_on(bridge.test_connection(&choice.engine, &choice.model))?;
    if reachable {
        logger::spinner_success(&format!(
            "Connected to {} ({})",
            choice.engine, choice.model
        ));
        Ok(())
    } else {
        logger::spinner_error(&format!("Could not reach {}", choice.engine));
        Err(CliError::ConnectionFailed(choice.engine))
    }
}
