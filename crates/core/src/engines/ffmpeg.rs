//! FFmpeg-backed transcode engine.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::pipeline::{Strategy, Transcoder};

use super::config::EnginesConfig;
use super::error::EngineError;
use super::process::run_checked;
use super::set::{EngineKind, EngineSet};

/// Drives ffmpeg for one strategy attempt at a time. Engine availability
/// is checked against the startup-resolved [`EngineSet`] on every call so
/// a missing binary fails fast instead of spawning.
pub struct FfmpegEngine {
    engines: Arc<EngineSet>,
    timeout_secs: u64,
    log_level: String,
    extra_args: Vec<String>,
}

impl FfmpegEngine {
    pub fn new(engines: Arc<EngineSet>, config: &EnginesConfig) -> Self {
        Self {
            engines,
            timeout_secs: config.transcode_timeout_secs,
            log_level: config.ffmpeg_log_level.clone(),
            extra_args: config.extra_ffmpeg_args.clone(),
        }
    }

    /// Builds ffmpeg arguments for one strategy attempt.
    fn build_args(
        &self,
        input: &Path,
        output: &Path,
        container: &str,
        strategy: &Strategy,
    ) -> Vec<String> {
        let mut args = vec![
            "-nostdin".to_string(),
            "-y".to_string(), // Overwrite output
            "-i".to_string(),
            input.to_string_lossy().to_string(),
        ];

        if strategy.copy_streams {
            args.extend(["-c".to_string(), "copy".to_string()]);
        } else {
            if let Some(ref codec) = strategy.video_codec {
                args.extend(["-c:v".to_string(), codec.clone()]);
            }
            if let Some(ref codec) = strategy.audio_codec {
                args.extend(["-c:a".to_string(), codec.clone()]);
            }
            if let Some(bitrate) = strategy.audio_bitrate_kbps {
                args.extend(["-b:a".to_string(), format!("{}k", bitrate)]);
            }
        }

        args.extend(strategy.extra_args.iter().cloned());

        // Explicit container; the extension alone is not authoritative.
        args.extend(["-f".to_string(), container.to_string()]);

        args.extend(["-loglevel".to_string(), self.log_level.clone()]);
        args.extend(self.extra_args.iter().cloned());

        args.push(output.to_string_lossy().to_string());
        args
    }
}

#[async_trait]
impl Transcoder for FfmpegEngine {
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        container: &str,
        strategy: &Strategy,
    ) -> Result<(), EngineError> {
        let program = self.engines.require(EngineKind::Ffmpeg)?.to_path_buf();
        let args = self.build_args(input, output, container, strategy);
        run_checked("ffmpeg", &program, &args, self.timeout_secs).await
    }
}
