//! Mock transcoder for testing.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::engines::EngineError;
use crate::pipeline::{Strategy, Transcoder};

#[derive(Debug, Clone)]
enum Behavior {
    /// Every attempt succeeds and writes an artifact.
    Succeed,
    /// The first `n` attempts fail; later ones succeed.
    FailFirst(usize),
    /// Every attempt fails.
    FailAll,
    /// Attempts report success but write nothing.
    SucceedWithoutOutput,
    /// Attempts fail whenever the input path contains the needle;
    /// everything else succeeds.
    FailForInput(String),
}

/// Mock implementation of the [`Transcoder`] trait.
///
/// Records every attempted strategy label for assertions and simulates
/// success/failure per the configured behavior. Successful attempts
/// write a small artifact so executors can verify output presence.
#[derive(Clone)]
pub struct MockTranscoder {
    behavior: Behavior,
    attempt_count: Arc<AtomicUsize>,
    attempts: Arc<RwLock<Vec<String>>>,
}

impl MockTranscoder {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            behavior,
            attempt_count: Arc::new(AtomicUsize::new(0)),
            attempts: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn succeeding() -> Self {
        Self::with_behavior(Behavior::Succeed)
    }

    pub fn failing_first(attempts: usize) -> Self {
        Self::with_behavior(Behavior::FailFirst(attempts))
    }

    pub fn failing_all() -> Self {
        Self::with_behavior(Behavior::FailAll)
    }

    pub fn succeeding_without_output() -> Self {
        Self::with_behavior(Behavior::SucceedWithoutOutput)
    }

    pub fn failing_for_input(needle: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::FailForInput(needle.into()))
    }

    /// Strategy labels in attempt order.
    pub async fn attempts(&self) -> Vec<String> {
        self.attempts.read().await.clone()
    }

    async fn write_artifact(&self, output: &Path) -> Result<(), EngineError> {
        tokio::fs::write(output, b"mock transcode artifact").await?;
        Ok(())
    }

    fn strategy_error(strategy: &Strategy) -> EngineError {
        EngineError::failed(
            "ffmpeg",
            format!("strategy {} failed on incompatible codec", strategy.label),
            Some("mock engine stderr".to_string()),
        )
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        _container: &str,
        strategy: &Strategy,
    ) -> Result<(), EngineError> {
        let attempt = self.attempt_count.fetch_add(1, Ordering::SeqCst);
        self.attempts.write().await.push(strategy.label.clone());

        match &self.behavior {
            Behavior::Succeed => self.write_artifact(output).await,
            Behavior::FailFirst(n) => {
                if attempt < *n {
                    Err(Self::strategy_error(strategy))
                } else {
                    self.write_artifact(output).await
                }
            }
            Behavior::FailAll => Err(Self::strategy_error(strategy)),
            Behavior::SucceedWithoutOutput => Ok(()),
            Behavior::FailForInput(needle) => {
                if input.to_string_lossy().contains(needle.as_str()) {
                    Err(Self::strategy_error(strategy))
                } else {
                    self.write_artifact(output).await
                }
            }
        }
    }
}
