//! Bounded-retry scan for an expected output artifact.
//!
//! Used where an engine writes its output asynchronously relative to
//! process exit. The artifact counts as produced once it exists with a
//! non-zero size that held steady across two consecutive polls.

use std::path::Path;

use tokio::time::{sleep, Duration, Instant};

use super::error::EngineError;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Waits for `path` to appear with a stabilized size, returning the size,
/// or a typed "not produced in time" error once the window closes.
pub async fn await_output(
    engine: &'static str,
    path: &Path,
    window: Duration,
) -> Result<u64, EngineError> {
    let deadline = Instant::now() + window;
    let mut last_size: Option<u64> = None;

    loop {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.len() > 0 => {
                let size = meta.len();
                if last_size == Some(size) {
                    return Ok(size);
                }
                last_size = Some(size);
            }
            _ => {
                last_size = None;
            }
        }

        if Instant::now() >= deadline {
            return Err(EngineError::OutputNotProduced {
                engine,
                path: path.to_path_buf(),
            });
        }
        sleep(POLL_INTERVAL).await;
    }
}
