//! Audio and video transcode batches.

use crate::batch::{download_url, IncomingItem, ItemOutcome, ItemSuccess};
use crate::engines::EngineKind;
use crate::metrics;
use crate::pipeline::{self, audio_plan, video_plan, AudioOutputFormat, VideoOutputFormat};
use crate::workspace::Workspace;

use super::{ConversionService, RequestError};

/// Bitrate used when the caller sends none or nonsense.
pub const DEFAULT_AUDIO_BITRATE_KBPS: u32 = 128;

/// Floor below which a requested bitrate falls back to the default.
const MIN_AUDIO_BITRATE_KBPS: u32 = 16;

/// Normalizes a caller-supplied bitrate.
pub fn effective_bitrate(requested: Option<u32>) -> u32 {
    match requested {
        Some(kbps) if kbps > MIN_AUDIO_BITRATE_KBPS => kbps,
        _ => DEFAULT_AUDIO_BITRATE_KBPS,
    }
}

impl ConversionService {
    /// Transcodes a batch of audio files. Single-strategy plans; the
    /// capability map gates formats the installed engine cannot produce.
    pub async fn transcode_audio_batch(
        &self,
        workspace: &Workspace,
        items: Vec<IncomingItem>,
        format: AudioOutputFormat,
        bitrate_kbps: u32,
    ) -> Result<Vec<ItemOutcome>, RequestError> {
        if items.is_empty() {
            return Err(RequestError::NoFiles);
        }
        self.engines().require(EngineKind::Ffmpeg)?;
        if !self.capabilities().supports(format) {
            return Err(RequestError::UnsupportedFormat {
                format: format.to_string(),
            });
        }

        let plan = audio_plan(format, bitrate_kbps);
        let out_dir = workspace.output_dir().await?;
        let mut outcomes = Vec::with_capacity(items.len());

        for item in items {
            let outcome = match item {
                IncomingItem::Rejected {
                    original_name,
                    error,
                } => ItemOutcome::failure(original_name, error),
                IncomingItem::Accepted(item) => {
                    let output_name =
                        format!("{}-converted.{}", item.output_stem(), plan.extension);
                    let output_path = out_dir.join(&output_name);

                    match pipeline::execute(
                        self.transcoder.as_ref(),
                        &plan,
                        &item.path,
                        &output_path,
                    )
                    .await
                    {
                        Ok(_done) => ItemOutcome::Success(ItemSuccess {
                            original_name: item.original_name,
                            download_url: download_url(workspace.id(), &output_name),
                            output_name,
                            format: Some(format.to_string()),
                            strategy: None,
                            bitrate_kbps: format.is_lossy().then_some(bitrate_kbps),
                            blank_pages_removed: None,
                        }),
                        Err(e) => ItemOutcome::failure(item.original_name, e),
                    }
                }
            };
            metrics::record_conversion("audio", outcome.is_success());
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    /// Transcodes a batch of video files through the two-tier plan:
    /// remux first, full re-encode as the fallback. The winning strategy
    /// label lands in the per-item result.
    pub async fn transcode_video_batch(
        &self,
        workspace: &Workspace,
        items: Vec<IncomingItem>,
        format: VideoOutputFormat,
    ) -> Result<Vec<ItemOutcome>, RequestError> {
        if items.is_empty() {
            return Err(RequestError::NoFiles);
        }
        self.engines().require(EngineKind::Ffmpeg)?;

        let plan = video_plan(format);
        let out_dir = workspace.output_dir().await?;
        let mut outcomes = Vec::with_capacity(items.len());

        for item in items {
            let outcome = match item {
                IncomingItem::Rejected {
                    original_name,
                    error,
                } => ItemOutcome::failure(original_name, error),
                IncomingItem::Accepted(item) => {
                    let output_name =
                        format!("{}_reformed.{}", item.output_stem(), plan.extension);
                    let output_path = out_dir.join(&output_name);

                    match pipeline::execute(
                        self.transcoder.as_ref(),
                        &plan,
                        &item.path,
                        &output_path,
                    )
                    .await
                    {
                        Ok(done) => ItemOutcome::Success(ItemSuccess {
                            original_name: item.original_name,
                            download_url: download_url(workspace.id(), &output_name),
                            output_name,
                            format: Some(format.to_string()),
                            strategy: Some(done.strategy),
                            bitrate_kbps: None,
                            blank_pages_removed: None,
                        }),
                        Err(e) => ItemOutcome::failure(item.original_name, e),
                    }
                }
            };
            metrics::record_conversion("video", outcome.is_success());
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_bitrate_clamps_to_default() {
        assert_eq!(effective_bitrate(None), 128);
        assert_eq!(effective_bitrate(Some(0)), 128);
        assert_eq!(effective_bitrate(Some(16)), 128);
        assert_eq!(effective_bitrate(Some(320)), 320);
    }
}
