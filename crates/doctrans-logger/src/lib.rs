//! Logging for doctrans
//!
//! Messages always go to `doctrans.log` in the config directory. What reaches
//! the console depends on the verbosity level set at startup. Output captured
//! from translation scripts is tagged `[SCRIPT]` in the file and only echoed
//! to the console when `--log-script` is given.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

static LOG_FILE: Mutex<Option<PathBuf>> = Mutex::new(None);
static VERBOSITY: Mutex<u8> = Mutex::new(0);
static LOG_SCRIPT: Mutex<bool> = Mutex::new(false);
static SPINNER: Mutex<Option<ProgressBar>> = Mutex::new(None);
static PROGRESS: Mutex<Option<ProgressBar>> = Mutex::new(None);

const LOG_FILE_NAME: &str = "doctrans.log";

/// Get the current verbosity level
pub fn get_verbosity() -> u8 {
    VERBOSITY.lock().ok().map(|v| *v).unwrap_or(0)
}

fn set_verbosity(verbosity: u8) {
    if let Ok(mut v) = VERBOSITY.lock() {
        *v = verbosity;
    }
}

/// Whether script output is echoed to the console
pub fn get_log_script() -> bool {
    LOG_SCRIPT.lock().ok().map(|v| *v).unwrap_or(false)
}

pub fn set_log_script(enabled: bool) {
    if let Ok(mut v) = LOG_SCRIPT.lock() {
        *v = enabled;
    }
}

/// Log level handed to translation scripts through `DOCTRANS_LOG_LEVEL`.
/// 0 = warnings only, 1 = info (-v), 2+ = debug (-vv)
pub fn verbosity_to_script_level() -> &'static str {
    match get_verbosity() {
        0 => "WARNING",
        1 => "INFO",
        _ => "DEBUG",
    }
}

/// Initialize the logger in the default config directory
pub fn init_with_verbosity(verbosity: u8, log_script: bool) -> Result<(), String> {
    set_verbosity(verbosity);
    set_log_script(log_script);

    let config_dir = get_config_dir()?;
    init_in(&config_dir)
}

/// Initialize the logger so that it writes `doctrans.log` inside `dir`.
///
/// The previous log file is truncated; each run starts with a fresh log.
pub fn init_in(dir: &Path) -> Result<(), String> {
    fs::create_dir_all(dir).map_err(|e| format!("Failed to create log directory: {}", e))?;

    let log_file = dir.join(LOG_FILE_NAME);
    if log_file.exists() {
        let _ = fs::remove_file(&log_file);
    }

    let mut guard = LOG_FILE
        .lock()
        .map_err(|_| "Log file lock poisoned".to_string())?;
    *guard = Some(log_file);
    Ok(())
}

fn get_config_dir() -> Result<PathBuf, String> {
    #[cfg(not(target_os = "windows"))]
    let config_dir = dirs::home_dir()
        .ok_or("Could not determine home directory")?
        .join(".config")
        .join("doctrans");

    #[cfg(target_os = "windows")]
    let config_dir = dirs::config_dir()
        .ok_or("Could not determine config directory")?
        .join("doctrans");

    Ok(config_dir)
}

fn write_to_log(message: &str) {
    write_to_log_with_source(message, "RUST");
}

fn write_to_log_with_source(message: &str, source: &str) {
    let Ok(guard) = LOG_FILE.lock() else {
        return;
    };
    if let Some(ref log_path) = *guard {
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(log_path) {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            let _ = writeln!(file, "[{}] [{}] {}", timestamp, source, message);
        }
    }
}

/// Print to stderr without tearing an active progress bar or spinner
fn console(line: String) {
    let guard = PROGRESS.lock().ok();
    let bar = guard.as_deref().and_then(Option::as_ref);
    write_console(bar, &line, &mut std::io::stderr());
}

/// Write one console line, clearing an active progress bar around it.
/// A hidden bar (stderr not a terminal) still lets the line through.
fn write_console(bar: Option<&ProgressBar>, line: &str, out: &mut dyn Write) {
    let mut emit = || {
        let _ = writeln!(out, "{}", line);
    };
    match bar {
        Some(bar) => bar.suspend(emit),
        None => emit(),
    }
}

/// Log an informational message (console if verbose >= 1, always to file)
pub fn info(message: &str) {
    write_to_log(&format!("INFO {}", message));
    if get_verbosity() >= 1 {
        console(message.to_string());
    }
}

/// Log a debug message (console if verbose >= 1, always to file)
pub fn debug(message: &str) {
    write_to_log(&format!("DEBUG {}", message));
    if get_verbosity() >= 1 {
        console(format!("{} {}", "DEBUG:".blue().bold(), message));
    }
}

/// Log a warning (file and console)
pub fn warn(message: &str) {
    write_to_log(&format!("WARN {}", message));
    console(format!("{} {}", "warning:".yellow().bold(), message));
}

/// Log an error (file and console)
pub fn error(message: &str) {
    write_to_log(&format!("ERROR {}", message));
    console(format!("{} {}", "Error:".red().bold(), message));
}

/// User-facing success message
pub fn success(message: &str) {
    write_to_log(&format!("SUCCESS {}", message));
    console(format!("{} {}", "\u{2714}".green().bold(), message));
}

/// Trace-level step, console only at -vv
pub fn step(message: &str) {
    if get_verbosity() >= 2 {
        console(format!("TRACE: {}", message));
    }
    write_to_log(&format!("STEP: {}", message));
}

/// Record one line of translation script output.
///
/// `stream` is `"stdout"` or `"stderr"`.
pub fn script_line(stream: &str, line: &str) {
    write_to_log_with_source(&format!("{} {}", stream, line), "SCRIPT");
    if get_log_script() {
        console(format!("{} {}", "script:".dimmed(), line));
    }
}

/// Capture a finished probe command's output in the log file
pub fn capture_output(command_name: &str, output: &std::process::Output) {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    write_to_log(&format!(
        "COMMAND: {} (exit code: {:?})",
        command_name,
        output.status.code()
    ));

    if !stdout.is_empty() {
        write_to_log(&format!("  STDOUT:\n{}", stdout));
    }
    if !stderr.is_empty() {
        write_to_log(&format!("  STDERR:\n{}", stderr));
    }
}

pub fn get_log_path() -> Option<PathBuf> {
    LOG_FILE.lock().ok().and_then(|guard| guard.clone())
}

/// Log file path as a string, for the `DOCTRANS_LOG_FILE` script variable
pub fn get_log_path_string() -> String {
    if let Some(path) = get_log_path() {
        path.to_string_lossy().to_string()
    } else if let Ok(config_dir) = get_config_dir() {
        config_dir.join(LOG_FILE_NAME).to_string_lossy().to_string()
    } else {
        String::new()
    }
}

pub fn show_log_path() {
    match get_log_path() {
        Some(path) => eprintln!("Log file: {}", path.display()),
        None => eprintln!("Log file location not available"),
    }
}

/// Start a spinner (suppressed in verbose mode)
pub fn spinner_start(message: &str) {
    if get_verbosity() > 0 {
        return;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.cyan} {msg}")
    {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());

    if let Ok(mut guard) = SPINNER.lock() {
        *guard = Some(spinner);
    }
}

fn spinner_clear() {
    if let Ok(mut guard) = SPINNER.lock() {
        if let Some(spinner) = guard.take() {
            spinner.finish_and_clear();
        }
    }
}

pub fn spinner_success(message: &str) {
    spinner_clear();
    eprintln!("{} {}", "✔".green().bold(), message);
}

pub fn spinner_error(message: &str) {
    spinner_clear();
    eprintln!("  {} {}", "✗".red().bold(), message);
}

pub fn spinner_stop() {
    spinner_clear();
}

/// Start a 0-100 progress bar for a translation run
pub fn progress_start(message: &str) {
    let bar = ProgressBar::new(100);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{bar:40.cyan/blue} {pos:>3}% {msg}")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.set_message(message.to_string());

    if let Ok(mut guard) = PROGRESS.lock() {
        *guard = Some(bar);
    }
}

/// Move the progress bar. Percentages outside 0..=100 are clamped.
pub fn progress_update(percent: i32, message: &str) {
    write_to_log(&format!("PROGRESS {}% {}", percent, message));
    if let Ok(guard) = PROGRESS.lock() {
        if let Some(bar) = guard.as_ref() {
            bar.set_position(clamp_percent(percent));
            bar.set_message(message.to_string());
        }
    }
}

pub fn progress_finish() {
    if let Ok(mut guard) = PROGRESS.lock() {
        if let Some(bar) = guard.take() {
            bar.finish_and_clear();
        }
    }
}

fn clamp_percent(percent: i32) -> u64 {
    percent.clamp(0, 100) as u64
}
