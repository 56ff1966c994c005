//! Line classification for script output
//!
//! Scripts interleave diagnostics with machine-readable lines. Each line is
//! decoded independently; a failed decode is never an error, the line is just
//! kept as text.

use crate::types::{ProgressEvent, TranslationResult};
use doctrans_logger as logger;
use serde::Deserialize;

/// What a single output line turned out to be
#[derive(Debug, Clone, PartialEq)]
pub enum OutputLine {
    Result(TranslationResult),
    Progress(ProgressEvent),
    Text,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum StderrMessage {
    Progress {
        progress: f64,
        #[serde(default)]
        message: String,
    },
}

/// Decode a line as a [`TranslationResult`], successful or not
pub fn parse_result(line: &str) -> Option<TranslationResult> {
    let trimmed = line.trim();
    if !trimmed.starts_with('{') {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

/// Decode a line as a `{"type": "progress", ...}` event
pub fn parse_progress(line: &str) -> Option<ProgressEvent> {
    let trimmed = line.trim();
    if !trimmed.starts_with('{') {
        return None;
    }
    match serde_json::from_str(trimmed).ok()? {
        StderrMessage::Progress { progress, message } => Some(ProgressEvent {
            percent: progress.round() as i32,
            message,
        }),
    }
}

/// A stdout line only counts as a terminal result when it reports success
pub fn classify_stdout(line: &str) -> OutputLine {
    match parse_result(line) {
        Some(result) if result.success => OutputLine::Result(result),
        _ => OutputLine::Text,
    }
}

pub fn classify_stderr(line: &str) -> OutputLine {
    match parse_progress(line) {
        Some(event) => OutputLine::Progress(event),
        None => OutputLine::Text,
    }
}

/// Accumulates both streams of one invocation
#[derive(Debug, Default)]
pub(crate) struct StreamCollector {
    stdout: String,
    stderr: String,
    terminal: Option<TranslationResult>,
}

impl StreamCollector {
    /// Every stdout line is kept for the post-exit scan; successful result
    /// lines also replace the current terminal candidate (last wins).
    pub fn push_stdout(&mut self, line: &str) {
        logger::script_line("stdout", line);
        self.stdout.push_str(line);
        self.stdout.push('\n');
        if let OutputLine::Result(result) = classify_stdout(line) {
            self.terminal = Some(result);
        }
    }

    /// Progress lines go straight to the callback; other lines are diagnostics
    pub fn push_stderr(&mut self, line: &str, on_progress: &mut dyn FnMut(ProgressEvent)) {
        match classify_stderr(line) {
            OutputLine::Progress(event) => {
                logger::step(&format!("progress {}% {}", event.percent, event.message));
                on_progress(event);
            }
            _ => {
                logger::script_line("stderr", line);
                self.stderr.push_str(line);
                self.stderr.push('\n');
            }
        }
    }

    pub fn into_parts(self) -> (String, String, Option<TranslationResult>) {
        (self.stdout, self.stderr, self.terminal)
    }
}
