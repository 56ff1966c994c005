use crate::discovery::{default_candidates, locate, CommandProber, InterpreterHandle};
use crate::errors::BridgeError;
use crate::resolution::resolve;
use crate::types::{
    ConnectionTestRequest, ProgressEvent, TranslationRequest, TranslationResult, Verb,
};
use doctrans_config::{Config, EngineSettings};
use doctrans_logger as logger;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Upper bound for a connection test, whatever the translation timeout is
const CONNECTION_TEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Paths of the three scripts the bridge can run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSet {
    pub translate: PathBuf,
    pub translate_with_progress: PathBuf,
    pub test_connection: PathBuf,
}

impl ScriptSet {
    pub fn from_config(config: &Config) -> Self {
        let dir = config.resolve_scripts_dir();
        Self {
            translate: dir.join(config.translate_script_name()),
            translate_with_progress: dir.join(config.progress_script_name()),
            test_connection: dir.join(config.test_script_name()),
        }
    }

    pub fn path_for(&self, verb: Verb) -> &Path {
        match verb {
            Verb::Translate => &self.translate,
            Verb::TranslateWithProgress => &self.translate_with_progress,
            Verb::TestConnection => &self.test_connection,
        }
    }
}

/// Runs translation scripts under one discovered interpreter.
///
/// The interpreter is found once, in [`Bridge::new`], and never re-probed.
/// Every invocation owns its own request file and child process, so a
/// `Bridge` can be shared freely.
#[derive(Debug, Clone)]
pub struct Bridge {
    interpreter: InterpreterHandle,
    base_dir: PathBuf,
    scripts: ScriptSet,
    timeout: Option<Duration>,
    script_env: Vec<(String, String)>,
    request_dir: Option<PathBuf>,
}

impl Bridge {
    /// Discover an interpreter and build a bridge from `config`.
    ///
    /// Fails with [`BridgeError::NoRuntimeFound`] when no candidate qualifies;
    /// nothing can be translated until that is fixed.
    pub fn new(config: &Config) -> Result<Self, BridgeError> {
        let start = Instant::now();
        let base_dir = config.resolve_base_dir();
        let candidates = default_candidates(config, &base_dir);
        let prober = CommandProber::new(config.required_modules());

        logger::spinner_start("Looking for a Python runtime...");
        let interpreter = match locate(&candidates, &prober) {
            Ok(interpreter) => {
                logger::spinner_stop();
                interpreter
            }
            Err(e) => {
                logger::spinner_error("No compatible Python runtime found");
                return Err(e);
            }
        };
        logger::debug(&format!("Interpreter discovery took {:?}", start.elapsed()));

        Ok(Self::with_interpreter(interpreter, config))
    }

    /// Build a bridge around an interpreter that is already known
    pub fn with_interpreter(interpreter: InterpreterHandle, config: &Config) -> Self {
        Self {
            interpreter,
            base_dir: config.resolve_base_dir(),
            scripts: ScriptSet::from_config(config),
            timeout: config.timeout(),
            script_env: Vec::new(),
            request_dir: None,
        }
    }

    /// Override the invocation timeout; `None` waits indefinitely
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Write request files into `dir` instead of the system temp directory
    pub fn with_request_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.request_dir = Some(dir.into());
        self
    }

    /// Export engine settings and API key to the scripts' environment
    pub fn with_engine_settings(mut self, settings: &EngineSettings) -> Self {
        self.script_env.retain(|(key, _)| {
            !matches!(
                key.as_str(),
                "DOCTRANS_API_URL" | "DOCTRANS_API_KEY" | "DOCTRANS_MODEL" | "DOCTRANS_TEMPERATURE"
            )
        });
        self.script_env
            .push(("DOCTRANS_API_URL".to_string(), settings.api_url.clone()));
        self.script_env
            .push(("DOCTRANS_MODEL".to_string(), settings.model.clone()));
        self.script_env.push((
            "DOCTRANS_TEMPERATURE".to_string(),
            settings.temperature.to_string(),
        ));
        if let Some(ref key) = settings.api_key {
            self.script_env
                .push(("DOCTRANS_API_KEY".to_string(), key.clone()));
        }
        self
    }

    pub fn interpreter(&self) -> &InterpreterHandle {
        &self.interpreter
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn scripts(&self) -> &ScriptSet {
        &self.scripts
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub(crate) fn request_dir(&self) -> Option<&Path> {
        self.request_dir.as_deref()
    }

    pub(crate) fn script_env(&self) -> &[(String, String)] {
        &self.script_env
    }

    /// Translate a document. Never fails; errors come back as a failed result.
    pub async fn translate(&self, request: &TranslationRequest) -> TranslationResult {
        self.invoke(Verb::Translate, request, &mut |_| {}).await
    }

    /// Translate a document, calling `on_progress` for every progress event.
    ///
    /// All callbacks have run, in emission order, by the time this returns.
    pub async fn translate_with_progress<F>(
        &self,
        request: &TranslationRequest,
        mut on_progress: F,
    ) -> TranslationResult
    where
        F: FnMut(ProgressEvent),
    {
        self.invoke(Verb::TranslateWithProgress, request, &mut on_progress)
            .await
    }

    /// Run the script for `verb` and fold every failure into the result
    pub async fn invoke<T: Serialize>(
        &self,
        verb: Verb,
        payload: &T,
        on_progress: &mut dyn FnMut(ProgressEvent),
    ) -> TranslationResult {
        let outcome = self
            .run_script(verb, payload, self.timeout, on_progress)
            .await
            .and_then(resolve);

        match outcome {
            Ok(result) => result,
            Err(e) => {
                logger::info(&format!("{} failed: {}", verb.as_str(), e));
                TranslationResult::from_error(&e)
            }
        }
    }

    /// Check that `engine`/`model` are reachable.
    ///
    /// Only the exit code matters; script output is logged. Any error,
    /// including a missing script, yields `false`.
    pub async fn test_connection(&self, engine: &str, model: &str) -> bool {
        let payload = ConnectionTestRequest::new(engine, model);
        let timeout = Some(
            self.timeout
                .map_or(CONNECTION_TEST_TIMEOUT, |t| t.min(CONNECTION_TEST_TIMEOUT)),
        );

        match self
            .run_script(Verb::TestConnection, &payload, timeout, &mut |_| {})
            .await
        {
            Ok(output) => {
                logger::debug(&format!(
                    "Connection test for {}/{} exited with {:?}",
                    engine, model, output.exit_code
                ));
                if !output.stdout.trim().is_empty() {
                    logger::debug(&format!("Connection test stdout:\n{}", output.stdout));
                }
                if !output.stderr.trim().is_empty() {
                    logger::debug(&format!("Connection test stderr:\n{}", output.stderr));
                }
                output.exit_code == Some(0)
            }
            Err(e) => {
                logger::warn(&format!("Connection test for {} failed: {}", engine, e));
                false
            }
        }
    }
}
