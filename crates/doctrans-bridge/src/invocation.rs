//! Running one script as a child process

use crate::bridge::Bridge;
use crate::classify::StreamCollector;
use crate::errors::BridgeError;
use crate::types::{ProgressEvent, TranslationResult, Verb};
use doctrans_logger as logger;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

/// Raw outcome of one script run, before result resolution
#[derive(Debug, Clone)]
pub(crate) struct InvocationOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    /// Diagnostic stderr text, progress lines excluded
    pub stderr: String,
    /// Last successful result line seen on stdout
    pub terminal: Option<TranslationResult>,
}

/// Temporary JSON request owned by one invocation.
///
/// Removed on drop, so every exit path cleans up. A failed removal is logged
/// and otherwise ignored.
pub(crate) struct RequestFile {
    path: PathBuf,
}

impl RequestFile {
    /// Create the file in `dir`, or in the system temp directory when `None`
    pub fn create<T: Serialize>(payload: &T, dir: Option<&Path>) -> Result<Self, BridgeError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("doctrans_request_").suffix(".json");
        let named = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        // Keep the path but close our handle so the child can open the file
        // on platforms with exclusive sharing.
        let (mut file, path) = named.keep().map_err(|e| BridgeError::Io(e.error))?;
        let request = Self { path };

        serde_json::to_writer(&mut file, payload)?;
        file.flush()?;
        Ok(request)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RequestFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            logger::warn(&format!(
                "Could not remove request file {}: {}",
                self.path.display(),
                e
            ));
        }
    }
}

/// Decode one raw output line. Invalid UTF-8 is replaced rather than
/// rejected, and a trailing `\r` from Windows line endings is dropped.
fn decode_line(mut raw: Vec<u8>) -> String {
    if raw.last() == Some(&b'\r') {
        raw.pop();
    }
    match String::from_utf8(raw) {
        Ok(line) => line,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

/// Drain stdout and stderr concurrently until both reach EOF.
///
/// Lines are handed to the collector in the order they arrive on each stream;
/// no ordering between the two streams is assumed. Only read failures are
/// errors; undecodable bytes end up as diagnostic text.
pub(crate) async fn drain<O, E>(
    stdout: O,
    stderr: E,
    collector: &mut StreamCollector,
    on_progress: &mut dyn FnMut(ProgressEvent),
) -> io::Result<()>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let mut out_lines = BufReader::new(stdout).split(b'\n');
    let mut err_lines = BufReader::new(stderr).split(b'\n');
    let mut out_open = true;
    let mut err_open = true;

    while out_open || err_open {
        tokio::select! {
            line = out_lines.next_segment(), if out_open => match line? {
                Some(raw) => collector.push_stdout(&decode_line(raw)),
                None => out_open = false,
            },
            line = err_lines.next_segment(), if err_open => match line? {
                Some(raw) => collector.push_stderr(&decode_line(raw), on_progress),
                None => err_open = false,
            },
        }
    }
    Ok(())
}

impl Bridge {
    /// Run the script for `verb` with `payload` as its request file.
    ///
    /// Returns once the process has exited and both streams are drained, or
    /// with [`BridgeError::Timeout`] after killing a script that ran longer
    /// than `timeout`.
    pub(crate) async fn run_script<T: Serialize>(
        &self,
        verb: Verb,
        payload: &T,
        timeout: Option<Duration>,
        on_progress: &mut dyn FnMut(ProgressEvent),
    ) -> Result<InvocationOutput, BridgeError> {
        let script = self.scripts().path_for(verb);
        if !script.is_file() {
            return Err(BridgeError::ScriptNotFound(script.to_path_buf()));
        }

        let request = RequestFile::create(payload, self.request_dir())?;

        let mut command = Command::new(&self.interpreter().executable);
        command
            .arg(script)
            .arg(request.path())
            .current_dir(self.base_dir())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .env("PYTHONIOENCODING", "utf-8")
            .env("PYTHONUNBUFFERED", "1")
            .env("DOCTRANS_LOG_LEVEL", logger::verbosity_to_script_level())
            .env("DOCTRANS_LOG_FILE", logger::get_log_path_string());
        for (key, value) in self.script_env() {
            command.env(key, value);
        }

        logger::debug(&format!(
            "Running {} script: {} {} {}",
            verb.as_str(),
            self.interpreter().executable.display(),
            script.display(),
            request.path().display()
        ));

        let start = Instant::now();
        let mut child = command.spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("child stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("child stderr was not captured"))?;

        let mut collector = StreamCollector::default();
        let run = async {
            drain(stdout, stderr, &mut collector, on_progress).await?;
            child.wait().await
        };

        let status = match timeout {
            Some(limit) => match tokio::time::timeout(limit, run).await {
                Ok(status) => status?,
                Err(_) => {
                    logger::warn(&format!(
                        "{} script exceeded {:?}, killing it",
                        verb.as_str(),
                        limit
                    ));
                    if let Err(e) = child.kill().await {
                        logger::debug(&format!("Kill after timeout failed: {}", e));
                    }
                    return Err(BridgeError::Timeout(limit));
                }
            },
            None => run.await?,
        };

        logger::debug(&format!(
            "{} script exited with {:?} after {:?}",
            verb.as_str(),
            status.code(),
            start.elapsed()
        ));
        drop(request);

        let (stdout, stderr, terminal) = collector.into_parts();
        Ok(InvocationOutput {
            exit_code: status.code(),
            stdout,
            stderr,
            terminal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TranslationRequest;

    #[test]
    fn test_request_file_removed_on_drop() {
        let payload = serde_json::json!({"action": "test_connection"});
        let request = RequestFile::create(&payload, None).expect("request file");
        let path = request.path().to_path_buf();

        let written = fs::read_to_string(&path).expect("read request");
        assert!(written.contains("test_connection"));

        drop(request);
        assert!(!path.exists());
    }

    #[test]
    fn test_request_file_drop_tolerates_missing_file() {
        let request = RequestFile::create(&serde_json::json!({}), None).expect("request file");
        fs::remove_file(request.path()).expect("remove early");
        drop(request);
    }

    #[test]
    fn test_request_file_holds_request_json() {
        let request: TranslationRequest = serde_json::from_value(serde_json::json!({
            "file_path": "slides.pptx",
            "source_lang": {"name": "English", "code": "en"},
            "target_lang": {"name": "Japanese", "code": "ja"},
            "engine": "openai",
            "model": "gpt-4o-mini"
        }))
        .expect("request");
        assert_eq!(request.output_format, "auto");

        let file = RequestFile::create(&request, None).expect("request file");
        let round: TranslationRequest =
            serde_json::from_str(&fs::read_to_string(file.path()).expect("read")).expect("parse");
        assert_eq!(round, request);
    }

    #[tokio::test]
    async fn test_drain_interleaved_streams() {
        let stdout: &[u8] = b"loading\n{\"success\": true, \"output_path\": \"a.docx\"}\n";
        let stderr: &[u8] = b"{\"type\":\"progress\",\"progress\":10,\"message\":\"one\"}\nwarn: slow\n{\"type\":\"progress\",\"progress\":90,\"message\":\"two\"}\n";

        let mut collector = StreamCollector::default();
        let mut events = Vec::new();
        drain(stdout, stderr, &mut collector, &mut |e| events.push(e))
            .await
            .expect("drain");

        let percents: Vec<i32> = events.iter().map(|e| e.percent).collect();
        assert_eq!(percents, vec![10, 90]);

        let (stdout, stderr, terminal) = collector.into_parts();
        assert_eq!(stdout.lines().count(), 2);
        assert_eq!(stderr, "warn: slow\n");
        assert_eq!(
            terminal.and_then(|r| r.output_path).as_deref(),
            Some("a.docx")
        );
    }

    #[tokio::test]
    async fn test_drain_tolerates_invalid_utf8() {
        let stdout: &[u8] = b"\xff\xfe banner\r\n{\"success\": true, \"output_path\": \"ok.docx\"}\r\n";
        let stderr: &[u8] = b"caf\xe9 warning\n";

        let mut collector = StreamCollector::default();
        drain(stdout, stderr, &mut collector, &mut |_| {})
            .await
            .expect("drain");

        let (stdout, stderr, terminal) = collector.into_parts();
        assert_eq!(stdout.lines().count(), 2);
        assert!(stderr.starts_with("caf\u{FFFD} warning"));
        assert_eq!(
            terminal.and_then(|r| r.output_path).as_deref(),
            Some("ok.docx")
        );
    }

    #[test]
    fn test_decode_line_strips_carriage_return() {
        assert_eq!(decode_line(b"done\r".to_vec()), "done");
        assert_eq!(decode_line(b"\xe9t\xe9".to_vec()), "\u{FFFD}t\u{FFFD}");
    }

    #[tokio::test]
    async fn test_drain_handles_missing_trailing_newline() {
        let stdout: &[u8] = b"{\"success\": true}";
        let stderr: &[u8] = b"";
        let mut collector = StreamCollector::default();
        drain(stdout, stderr, &mut collector, &mut |_| {})
            .await
            .expect("drain");
        let (_, _, terminal) = collector.into_parts();
        assert!(terminal.is_some_and(|r| r.success));
    }
}
