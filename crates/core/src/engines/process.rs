//! Shared process invocation with a bounded time budget.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tokio::time::{timeout, Duration};

use super::error::EngineError;

/// Longest stderr excerpt carried into an error message.
const STDERR_TAIL_BYTES: usize = 2048;

/// Runs a process to completion with a timeout, treating a non-zero exit
/// as failure. The process is killed if the budget elapses.
pub(crate) async fn run_checked(
    engine: &'static str,
    program: &Path,
    args: &[impl AsRef<OsStr>],
    timeout_secs: u64,
) -> Result<(), EngineError> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                EngineError::NotExecutable {
                    engine,
                    path: program.to_path_buf(),
                    reason: "binary not found".to_string(),
                }
            } else {
                EngineError::Io(e)
            }
        })?;

    match timeout(Duration::from_secs(timeout_secs), child.wait_with_output()).await {
        Ok(Ok(output)) => {
            if output.status.success() {
                Ok(())
            } else {
                Err(EngineError::failed(
                    engine,
                    format!("exited with {:?}", output.status.code()),
                    stderr_tail(&output.stderr),
                ))
            }
        }
        Ok(Err(e)) => Err(EngineError::Io(e)),
        // Dropping the child future kills the process (kill_on_drop).
        Err(_) => Err(EngineError::Timeout {
            engine,
            timeout_secs,
        }),
    }
}

pub(crate) fn stderr_tail(stderr: &[u8]) -> Option<String> {
    if stderr.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(stderr);
    let tail_start = text.len().saturating_sub(STDERR_TAIL_BYTES);
    let mut start = tail_start;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    Some(text[start..].to_string())
}
