use crate::errors::BridgeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// A language as shown to the user and as understood by the engine
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub name: String,
    pub code: String,
}

impl Language {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }
}

/// Everything a translate script needs to process one document.
///
/// Written as JSON to a temporary file whose path is the script's only
/// argument.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TranslationRequest {
    pub file_path: PathBuf,
    pub source_lang: Language,
    pub target_lang: Language,
    pub engine: String,
    pub model: String,
    #[serde(default)]
    pub use_terminology: bool,
    #[serde(default)]
    pub preprocess_terms: bool,
    #[serde(default)]
    pub export_secondary: bool,
    #[serde(default = "default_output_format")]
    pub output_format: String,
}

fn default_output_format() -> String {
    "auto".to_string()
}

/// Payload for the test-connection script
#[derive(Serialize, Debug, Clone)]
pub(crate) struct ConnectionTestRequest<'a> {
    pub action: &'static str,
    pub engine: &'a str,
    pub model: &'a str,
}

impl<'a> ConnectionTestRequest<'a> {
    pub fn new(engine: &'a str, model: &'a str) -> Self {
        Self {
            action: "test_connection",
            engine,
            model,
        }
    }
}

/// Terminal outcome of one script run.
///
/// `success` is required on the wire so that arbitrary JSON printed by a
/// script is not mistaken for a result.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub success: bool,
    #[serde(default, alias = "outputPath", skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(
        default,
        alias = "errorMessage",
        alias = "error",
        skip_serializing_if = "Option::is_none"
    )]
    pub error_message: Option<String>,
    #[serde(default, deserialize_with = "lenient_percent")]
    pub progress: i32,
    #[serde(
        default,
        alias = "statusMessage",
        alias = "message",
        skip_serializing_if = "Option::is_none"
    )]
    pub status_message: Option<String>,
}

/// Accept integer, float or null percentages; floats are rounded
fn lenient_percent<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<f64> = Option::deserialize(deserializer)?;
    Ok(value.map_or(0, |p| p.round() as i32))
}

impl TranslationResult {
    /// Locally built failure, used whenever the script did not supply a result
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output_path: None,
            error_message: Some(message.into()),
            progress: 0,
            status_message: Some("Translation failed".to_string()),
        }
    }

    pub fn from_error(err: &BridgeError) -> Self {
        Self::failure(err.to_string())
    }
}

/// A (percentage, message) update emitted while a script runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub percent: i32,
    pub message: String,
}

/// Which of the three scripts to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Translate,
    TranslateWithProgress,
    TestConnection,
}

impl Verb {
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Translate => "translate",
            Verb::TranslateWithProgress => "translate-with-progress",
            Verb::TestConnection => "test-connection",
        }
    }
}
