//! Trait seam between the pipeline executor and the transcode engine.

use async_trait::async_trait;
use std::path::Path;

use crate::engines::EngineError;

use super::types::Strategy;

/// A transcode engine that can run one strategy attempt.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Runs a single attempt with the given strategy, writing the
    /// artifact to `output`. Must report failure (non-zero exit,
    /// timeout, engine-reported error) rather than leaving a partial
    /// artifact behind silently; the executor discards partials.
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        container: &str,
        strategy: &Strategy,
    ) -> Result<(), EngineError>;
}
