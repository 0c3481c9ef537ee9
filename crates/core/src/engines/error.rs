//! Error types for external engine invocation.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when resolving or invoking an external engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No path was configured for the engine.
    #[error("{engine} is not configured; set its path in the [engines] config section")]
    NotConfigured { engine: &'static str },

    /// A path was configured but the binary could not be executed.
    #[error("{engine} at {path} could not be executed: {reason}")]
    NotExecutable {
        engine: &'static str,
        path: PathBuf,
        reason: String,
    },

    /// The engine process ran and reported failure.
    #[error("{engine} failed: {reason}")]
    Failed {
        engine: &'static str,
        reason: String,
        stderr: Option<String>,
    },

    /// The engine process exceeded its time budget and was killed.
    #[error("{engine} timed out after {timeout_secs} seconds")]
    Timeout {
        engine: &'static str,
        timeout_secs: u64,
    },

    /// The engine exited successfully but the expected artifact never
    /// appeared (or never stabilized) within the scan window.
    #[error("{engine} did not produce output at {path}")]
    OutputNotProduced {
        engine: &'static str,
        path: PathBuf,
    },

    /// I/O error around the invocation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Creates a new failure error with captured stderr.
    pub fn failed(engine: &'static str, reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::Failed {
            engine,
            reason: reason.into(),
            stderr,
        }
    }

    /// Whether this error means the engine itself is missing, as opposed
    /// to one invocation going wrong.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::NotConfigured { .. } | Self::NotExecutable { .. })
    }
}
