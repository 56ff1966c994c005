//! Python interpreter discovery
//!
//! Target machines carry all sorts of Python installs, so instead of trusting
//! configuration the bridge probes a priority-ordered list of candidates and
//! keeps the first one that runs and can import every required module.
//! Each probe has a bounded wait; a broken candidate is skipped, never fatal.

use crate::errors::BridgeError;
use crate::utils::{LOCAL_ENV_DIRS, PATH_COMMANDS, PYTHON_BIN_DIR, PYTHON_EXE};
use doctrans_config::Config;
use doctrans_logger as logger;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Bound on `<candidate> --version`
pub const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Bound on the module import probe
pub const CAPABILITY_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Printed by the capability probe once every import succeeded
pub const PROBE_SENTINEL: &str = "DOCTRANS_RUNTIME_OK";

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// The interpreter a bridge runs its scripts with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterHandle {
    pub executable: PathBuf,
    /// Output of `--version`, e.g. "Python 3.11.9"
    pub version: String,
}

/// Probes one candidate. Implementations must not panic and must bound
/// their own waits.
pub trait CandidateProber {
    /// Run a version query. `None` disqualifies the candidate.
    fn probe_version(&self, candidate: &Path) -> Option<String>;

    /// Check that the required modules import. Only `true` qualifies.
    fn probe_capabilities(&self, candidate: &Path) -> bool;
}

/// Prober that actually runs the candidate
#[derive(Debug, Clone)]
pub struct CommandProber {
    required_modules: Vec<String>,
}

impl CommandProber {
    pub fn new(required_modules: Vec<String>) -> Self {
        Self { required_modules }
    }

    /// Python source for the capability probe. Names that are not dotted
    /// identifiers are dropped so configuration cannot inject code.
    fn probe_source(&self) -> String {
        let modules: Vec<&str> = self
            .required_modules
            .iter()
            .map(|m| m.trim())
            .filter(|m| is_module_name(m))
            .collect();

        if modules.is_empty() {
            format!("print('{}')", PROBE_SENTINEL)
        } else {
            format!("import {}; print('{}')", modules.join(", "), PROBE_SENTINEL)
        }
    }
}

impl CandidateProber for CommandProber {
    fn probe_version(&self, candidate: &Path) -> Option<String> {
        let mut command = Command::new(candidate);
        command.arg("--version");
        let output = run_bounded(command, VERSION_PROBE_TIMEOUT)?;
        logger::capture_output(&format!("{} --version", candidate.display()), &output);

        if !output.status.success() {
            return None;
        }
        // Python 2 printed its version to stderr
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let version = if stdout.trim().is_empty() {
            stderr.trim().to_string()
        } else {
            stdout.trim().to_string()
        };
        Some(version)
    }

    fn probe_capabilities(&self, candidate: &Path) -> bool {
        let mut command = Command::new(candidate);
        command.arg("-c").arg(self.probe_source());
        let Some(output) = run_bounded(command, CAPABILITY_PROBE_TIMEOUT) else {
            return false;
        };
        logger::capture_output(
            &format!("{} -c <capability probe>", candidate.display()),
            &output,
        );

        String::from_utf8_lossy(&output.stdout)
            .lines()
            .any(|line| line.trim() == PROBE_SENTINEL)
    }
}

fn is_module_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            let mut chars = part.chars();
            chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// Read a child pipe to EOF on its own thread so the child never blocks on a
/// full pipe while we poll for exit
fn collect<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

/// Run `command` to completion, killing it once `timeout` has passed.
/// Launch failures and timeouts both yield `None`.
fn run_bounded(mut command: Command, timeout: Duration) -> Option<Output> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            logger::debug(&format!("Failed to launch {:?}: {}", command.get_program(), e));
            return None;
        }
    };
    let stdout = collect(child.stdout.take());
    let stderr = collect(child.stderr.take());

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                return Some(Output {
                    status,
                    stdout: stdout.join().ok()?,
                    stderr: stderr.join().ok()?,
                });
            }
            Ok(None) if Instant::now() >= deadline => {
                logger::debug(&format!(
                    "{:?} did not finish within {:?}",
                    command.get_program(),
                    timeout
                ));
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(_) => {
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
        }
    }
}

/// Candidate list in priority order, without duplicates:
/// 1. `interpreter-candidates` from the config, as given
/// 2. Environments shipped next to the application under `base_dir`
/// 3. Per-user installs (Windows)
/// 4. Generic command names resolved through PATH
pub fn default_candidates(config: &Config, base_dir: &Path) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    let mut push = |path: PathBuf| {
        if !candidates.contains(&path) {
            candidates.push(path);
        }
    };

    for configured in config.interpreter_candidates.iter().flatten() {
        push(PathBuf::from(configured));
    }

    for env_dir in LOCAL_ENV_DIRS {
        let env_root = base_dir.join(env_dir);
        for exe in [
            env_root.join(PYTHON_EXE),
            env_root.join(PYTHON_BIN_DIR).join(PYTHON_EXE),
        ] {
            if exe.is_file() {
                push(exe);
            }
        }
    }

    #[cfg(windows)]
    {
        if let Some(local) = local_programs_python() {
            for version in ["Python313", "Python312", "Python311", "Python310"] {
                let exe = local.join(version).join(PYTHON_EXE);
                if exe.is_file() {
                    push(exe);
                }
            }
        }
    }

    for name in PATH_COMMANDS {
        match which::which(name) {
            Ok(path) => push(path),
            Err(_) => push(PathBuf::from(name)),
        }
    }

    candidates
}

#[cfg(windows)]
fn local_programs_python() -> Option<PathBuf> {
    std::env::var_os("LOCALAPPDATA")
        .map(|local| PathBuf::from(local).join("Programs").join("Python"))
}

/// Return the first candidate that passes both probes.
///
/// Every candidate is tried before giving up with
/// [`BridgeError::NoRuntimeFound`].
pub fn locate(
    candidates: &[PathBuf],
    prober: &dyn CandidateProber,
) -> Result<InterpreterHandle, BridgeError> {
    logger::debug(&format!("Probing {} Python candidates", candidates.len()));
    let mut tried = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        tried.push(candidate.display().to_string());

        let Some(version) = prober.probe_version(candidate) else {
            logger::debug(&format!("{} did not run, skipping", candidate.display()));
            continue;
        };

        if !prober.probe_capabilities(candidate) {
            logger::debug(&format!(
                "{} ({}) is missing required modules, skipping",
                candidate.display(),
                version
            ));
            continue;
        }

        logger::info(&format!("Using {} at {}", version, candidate.display()));
        return Ok(InterpreterHandle {
            executable: candidate.clone(),
            version,
        });
    }

    Err(BridgeError::NoRuntimeFound { tried })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Fake prober driven by two predicate lists, recording every call
    struct FakeProber {
        runs: Vec<&'static str>,
        capable: Vec<&'static str>,
        version_calls: RefCell<Vec<PathBuf>>,
        capability_calls: RefCell<Vec<PathBuf>>,
    }

    impl FakeProber {
        fn new(runs: Vec<&'static str>, capable: Vec<&'static str>) -> Self {
            Self {
                runs,
                capable,
                version_calls: RefCell::new(Vec::new()),
                capability_calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl CandidateProber for FakeProber {
        fn probe_version(&self, candidate: &Path) -> Option<String> {
            self.version_calls.borrow_mut().push(candidate.to_path_buf());
            self.runs
                .iter()
                .any(|r| Path::new(r) == candidate)
                .then(|| "Python 3.11.9".to_string())
        }

        fn probe_capabilities(&self, candidate: &Path) -> bool {
            self.capability_calls
                .borrow_mut()
                .push(candidate.to_path_buf());
            self.capable.iter().any(|c| Path::new(c) == candidate)
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_bounded_run_drains_large_output() {
        let mut command = Command::new("sh");
        command.args(["-c", "head -c 300000 /dev/zero | tr '\\0' x; echo; echo done"]);

        let start = Instant::now();
        let output = run_bounded(command, Duration::from_secs(5)).expect("finished");
        assert!(output.status.success());
        assert!(output.stdout.len() > 300_000);
        assert!(String::from_utf8_lossy(&output.stdout).ends_with("done\n"));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_bounded_run_kills_on_deadline() {
        let mut command = Command::new("sh");
        command.args(["-c", "sleep 5"]);
        let start = Instant::now();
        assert!(run_bounded(command, Duration::from_millis(200)).is_none());
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn test_bounded_run_missing_program() {
        let command = Command::new("/nonexistent/doctrans/python3");
        assert!(run_bounded(command, Duration::from_secs(1)).is_none());
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_first_qualified_candidate_wins() {
        let candidates = paths(&["broken", "no-docx", "good", "also-good"]);
        let prober = FakeProber::new(
            vec!["no-docx", "good", "also-good"],
            vec!["good", "also-good"],
        );

        let handle = locate(&candidates, &prober).expect("interpreter");
        assert_eq!(handle.executable, PathBuf::from("good"));
        assert_eq!(handle.version, "Python 3.11.9");
        assert_eq!(prober.version_calls.borrow().len(), 3);
        assert_eq!(*prober.capability_calls.borrow(), paths(&["no-docx", "good"]));
    }

    #[test]
    fn test_exhausts_every_candidate_before_failing() {
        let candidates = paths(&["a", "b", "c", "d"]);
        let prober = FakeProber::new(vec!["a", "b", "c", "d"], vec![]);

        let err = locate(&candidates, &prober).unwrap_err();
        assert_eq!(prober.capability_calls.borrow().len(), candidates.len());
        match err {
            BridgeError::NoRuntimeFound { tried } => assert_eq!(tried, vec!["a", "b", "c", "d"]),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_version_failure_skips_capability_probe() {
        let candidates = paths(&["dead"]);
        let prober = FakeProber::new(vec![], vec!["dead"]);

        assert!(locate(&candidates, &prober).is_err());
        assert!(prober.capability_calls.borrow().is_empty());
    }

    #[test]
    fn test_empty_candidate_list() {
        let prober = FakeProber::new(vec![], vec![]);
        let err = locate(&[], &prober).unwrap_err();
        assert!(matches!(err, BridgeError::NoRuntimeFound { tried } if tried.is_empty()));
    }

    #[test]
    fn test_command_prober_missing_executable() {
        let prober = CommandProber::new(vec!["json".to_string()]);
        let missing = Path::new("/nonexistent/doctrans/python-does-not-exist");
        assert_eq!(prober.probe_version(missing), None);
        assert!(!prober.probe_capabilities(missing));
    }

    #[test]
    fn test_probe_source_filters_module_names() {
        let prober = CommandProber::new(vec![
            "docx".to_string(),
            " openpyxl ".to_string(),
            "os; import shutil".to_string(),
            "xml.etree".to_string(),
            "9lives".to_string(),
        ]);
        assert_eq!(
            prober.probe_source(),
            "import docx, openpyxl, xml.etree; print('DOCTRANS_RUNTIME_OK')"
        );
        assert_eq!(
            CommandProber::new(vec![]).probe_source(),
            "print('DOCTRANS_RUNTIME_OK')"
        );
    }

    #[test]
    fn test_configured_candidates_come_first() {
        let base = tempfile::TempDir::new().expect("tempdir");
        let config = Config {
            interpreter_candidates: Some(vec![
                "/custom/python".to_string(),
                "/custom/python".to_string(),
            ]),
            ..Config::default()
        };
        let candidates = default_candidates(&config, base.path());
        assert_eq!(candidates.first(), Some(&PathBuf::from("/custom/python")));
        assert_eq!(
            candidates
                .iter()
                .filter(|c| *c == &PathBuf::from("/custom/python"))
                .count(),
            1
        );
        assert!(candidates.len() > PATH_COMMANDS.len());
    }

    #[test]
    #[cfg(unix)]
    fn test_local_venv_is_preferred_over_path() {
        let base = tempfile::TempDir::new().expect("tempdir");
        let venv_bin = base.path().join(".venv").join(PYTHON_BIN_DIR);
        std::fs::create_dir_all(&venv_bin).expect("venv dir");
        std::fs::write(venv_bin.join(PYTHON_EXE), "").expect("fake python");

        let candidates = default_candidates(&Config::default(), base.path());
        assert_eq!(candidates.first(), Some(&venv_bin.join(PYTHON_EXE)));
    }
}
