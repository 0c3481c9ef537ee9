//! Ordered-fallback execution of a transcode plan.

use std::path::Path;

use tracing::{debug, warn};

use crate::engines::EngineError;
use crate::metrics;

use super::traits::Transcoder;
use super::types::{CompletedTranscode, TranscodePlan};

/// Tries each strategy of the plan in order until one produces the
/// artifact. Stale or partial output is removed before every attempt and
/// after every failed one. When every strategy fails, the last attempt's
/// error is the one reported.
pub async fn execute(
    transcoder: &dyn Transcoder,
    plan: &TranscodePlan,
    input: &Path,
    output: &Path,
) -> Result<CompletedTranscode, EngineError> {
    let mut last_error: Option<EngineError> = None;

    for (index, strategy) in plan.strategies.iter().enumerate() {
        discard(output).await;

        debug!(
            strategy = %strategy.label,
            container = %plan.container,
            input = %input.display(),
            "attempting transcode strategy"
        );

        match transcoder
            .transcode(input, output, &plan.container, strategy)
            .await
        {
            Ok(()) => match tokio::fs::metadata(output).await {
                Ok(meta) if meta.len() > 0 => {
                    if index > 0 {
                        metrics::STRATEGY_FALLBACKS.inc();
                    }
                    return Ok(CompletedTranscode {
                        strategy: strategy.label.clone(),
                        output_size_bytes: meta.len(),
                    });
                }
                _ => {
                    warn!(
                        strategy = %strategy.label,
                        "engine reported success but produced no artifact"
                    );
                    last_error = Some(EngineError::OutputNotProduced {
                        engine: "transcode",
                        path: output.to_path_buf(),
                    });
                }
            },
            Err(e) => {
                warn!(strategy = %strategy.label, error = %e, "transcode strategy failed");
                discard(output).await;
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        EngineError::failed("transcode", "plan resolved to no strategies", None)
    }))
}

/// Removes a stale or partial artifact; absence is fine.
async fn discard(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "could not remove stale output"),
    }
}
