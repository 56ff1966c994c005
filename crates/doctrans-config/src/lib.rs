//! Configuration for the doctrans bridge and its collaborator stores
//!
//! - [`Config`]: the `doctrans.toml` file that tells the bridge where scripts
//!   live, which interpreters to try and how long a run may take.
//! - [`EngineStore`]: one JSON settings file per translation engine.
//! - [`secrets`]: API keys kept in per-user environment variables.

mod config;
mod engines;
mod errors;
pub mod secrets;

pub use config::{config_dir, Config, DEFAULT_TIMEOUT_SECS};
pub use engines::{EngineSettings, EngineStore};
pub use errors::ConfigError;
