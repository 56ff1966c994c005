//! Platform-specific names for Python installations

/// Directory holding the interpreter inside a venv
/// ("Scripts" on Windows, "bin" elsewhere)
#[cfg(windows)]
pub const PYTHON_BIN_DIR: &str = "Scripts";
#[cfg(not(windows))]
pub const PYTHON_BIN_DIR: &str = "bin";

#[cfg(windows)]
pub const PYTHON_EXE: &str = "python.exe";
#[cfg(not(windows))]
pub const PYTHON_EXE: &str = "python3";

/// Generic command names tried through PATH, most specific first
#[cfg(windows)]
pub const PATH_COMMANDS: &[&str] = &["python", "py", "python3"];
#[cfg(not(windows))]
pub const PATH_COMMANDS: &[&str] = &["python3", "python"];

/// Local environments looked for under the base directory.
/// An embedded distribution keeps `python.exe` at its root on Windows.
#[cfg(windows)]
pub const LOCAL_ENV_DIRS: &[&str] = &["python", ".venv", "venv"];
#[cfg(not(windows))]
pub const LOCAL_ENV_DIRS: &[&str] = &[".venv", "venv"];
