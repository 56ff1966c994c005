//! `doctrans translate`: one document through the translate scripts

use crate::common::{absolute_path, block_on, choose_engine};
use crate::errors::CliError;
use clap::Args;
use doctrans_bridge::{Bridge, Language, TranslationRequest, TranslationResult};
use doctrans_config::{Config, EngineStore};
use doctrans_logger as logger;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct TranslateCommand {
    /// Document to translate (docx, xlsx, pptx, ...)
    pub file: PathBuf,
    /// Display name of the source language
    #[arg(long, default_value = "English")]
    pub source_lang: String,
    /// Language code of the source language
    #[arg(long, default_value = "en")]
    pub source_code: String,
    /// Display name of the target language
    #[arg(long)]
    pub target_lang: String,
    /// Language code of the target language
    #[arg(long)]
    pub target_code: String,
    #[arg(long)]
    pub engine: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    /// Apply the terminology database
    #[arg(long)]
    pub terminology: bool,
    /// Pre-process terms before translating
    #[arg(long)]
    pub preprocess_terms: bool,
    /// Also export a bilingual secondary document
    #[arg(long)]
    pub export_secondary: bool,
    /// Output format passed through to the script
    #[arg(long, default_value = "auto")]
    pub format: String,
    /// Show a progress bar driven by the script's progress events
    #[arg(long)]
    pub progress: bool,
    /// Print the full result as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl TranslateCommand {
    fn into_request(self, engine: String, model: String) -> Result<TranslationRequest, CliError> {
        Ok(TranslationRequest {
            file_path: absolute_path(&self.file)?,
            source_lang: Language::new(self.source_lang, self.source_code),
            target_lang: Language::new(self.target_lang, self.target_code),
            engine,
            model,
            use_terminology: self.terminology,
            preprocess_terms: self.preprocess_terms,
            export_secondary: self.export_secondary,
            output_format: self.format,
        })
    }
}

pub fn handle_translate(cmd: TranslateCommand) -> Result<(), CliError> {
    if !cmd.file.is_file() {
        return Err(CliError::InputNotFound(cmd.file));
    }

    let config = Config::load()?;
    let store = EngineStore::default_location()?;
    let choice = choose_engine(&config, &store, cmd.engine.clone(), cmd.model.clone())?;
    let bridge = Bridge::new(&config)?.with_engine_settings(&choice.settings);

    let show_progress = cmd.progress;
    let as_json = cmd.json;
    let request = cmd.into_request(choice.engine, choice.model)?;
    logger::info(&format!(
        "Translating {} from {} to {} with {} ({})",
        request.file_path.display(),
        request.source_lang.name,
        request.target_lang.name,
        request.engine,
        request.model
    ));

    let result = if show_progress {
        logger::progress_start("Starting translation");
        let result = block_on(bridge.translate_with_progress(&request, |event| {
            logger::progress_update(event.percent, &event.message);
        }));
        logger::progress_finish();
        result?
    } else {
        logger::spinner_start("Translating...");
        let result = block_on(bridge.translate(&request));
        logger::spinner_stop();
        result?
    };

    report(&result, as_json)
}

fn report(result: &TranslationResult, as_json: bool) -> Result<(), CliError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(result)?);
    }

    if !result.success {
        let message = result
            .error_message
            .clone()
            .unwrap_or_else(|| "no error message reported".to_string());
        return Err(CliError::TranslationFailed(message));
    }

    match result.output_path.as_deref() {
        Some(output) => {
            logger::success(&format!("Translated document written to {}", output));
            if !as_json {
                println!("{}", output);
            }
        }
        None => logger::success(
            &result
                .status_message
                .clone()
                .unwrap_or_else(|| "Translation finished".to_string()),
        ),
    }
    Ok(())
}
