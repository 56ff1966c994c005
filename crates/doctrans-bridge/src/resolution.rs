//! Turning a finished invocation into its terminal result

use crate::classify::parse_result;
use crate::errors::BridgeError;
use crate::invocation::InvocationOutput;
use crate::types::TranslationResult;

/// Pick the terminal result of a finished invocation.
///
/// 1. A successful result seen while streaming wins.
/// 2. On exit code 0, the last stdout line that decodes as a result.
/// 3. On any other exit, `SubprocessFailed` with the collected stderr.
/// 4. Exit code 0 with nothing decodable is `UnparsableResult`.
pub(crate) fn resolve(output: InvocationOutput) -> Result<TranslationResult, BridgeError> {
    if let Some(result) = output.terminal {
        return Ok(result);
    }

    if output.exit_code == Some(0) {
        return output
            .stdout
            .lines()
            .rev()
            .filter(|line| !line.trim().is_empty())
            .find_map(parse_result)
            .ok_or(BridgeError::UnparsableResult);
    }

    Err(BridgeError::SubprocessFailed {
        code: output.exit_code,
        stderr: output.stderr.trim_end().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(exit_code: Option<i32>, stdout: &str, stderr: &str) -> InvocationOutput {
        InvocationOutput {
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            terminal: None,
        }
    }

    #[test]
    fn test_streamed_result_wins_over_exit_code() {
        let mut out = output(Some(1), "", "crashed during cleanup");
        out.terminal = Some(TranslationResult {
            success: true,
            output_path: Some("done.pdf".to_string()),
            error_message: None,
            progress: 100,
            status_message: None,
        });
        let result = resolve(out).expect("streamed result");
        assert_eq!(result.output_path.as_deref(), Some("done.pdf"));
    }

    #[test]
    fn test_zero_exit_scans_backward() {
        let stdout = "starting\n{\"success\": false, \"error\": \"first\"}\n\n{\"success\": false, \"error\": \"last\"}\ntrailing noise\n   \n";
        let result = resolve(output(Some(0), stdout, "")).expect("scanned result");
        assert!(!result.success);
        assert_eq!(result.error_message.as_deref(), Some("last"));
    }

    #[test]
    fn test_zero_exit_without_result_is_unparsable() {
        let err = resolve(output(Some(0), "hello\nworld\n", "")).unwrap_err();
        assert!(matches!(err, BridgeError::UnparsableResult));
    }

    #[test]
    fn test_nonzero_exit_carries_stderr() {
        let stdout = "{\"success\": false, \"error\": \"ignored on failure\"}\n";
        let err = resolve(output(Some(3), stdout, "Traceback\nValueError: bad file\n")).unwrap_err();
        match err {
            BridgeError::SubprocessFailed { code, stderr } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "Traceback\nValueError: bad file");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_killed_process_has_no_code() {
        let err = resolve(output(None, "", "")).unwrap_err();
        assert!(matches!(err, BridgeError::SubprocessFailed { code: None, .. }));
    }
}
