//! Process bridge between doctrans and its Python translation scripts
//!
//! The bridge:
//! 1. Discovers a Python interpreter that can import the modules the scripts
//!    need, once, when the [`Bridge`] is constructed
//! 2. Writes each request to a temporary JSON file and runs one of three
//!    scripts (translate, translate with progress, test connection)
//! 3. Reads stdout and stderr line by line while the script runs, forwarding
//!    progress events and picking out the final [`TranslationResult`]
//!
//! Public translate methods never fail: every error is folded into a
//! `TranslationResult` with `success = false`.

mod bridge;
pub mod classify;
pub mod discovery;
pub mod errors;
mod invocation;
mod resolution;
mod types;
mod utils;

pub use bridge::{Bridge, ScriptSet};
pub use discovery::{
    default_candidates, locate, CandidateProber, CommandProber, InterpreterHandle,
};
pub use errors::BridgeError;
pub use types::{Language, ProgressEvent, TranslationRequest, TranslationResult, Verb};
