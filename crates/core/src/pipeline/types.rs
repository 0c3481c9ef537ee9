//! Types for conversion pipelines.

use serde::{Deserialize, Serialize};

/// One concrete attempt configuration within a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    /// Short label reported to the caller when this strategy wins.
    pub label: String,
    /// Stream copy (remux) instead of re-encoding.
    pub copy_streams: bool,
    /// Video codec for re-encode strategies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    /// Audio codec for re-encode strategies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
    /// Audio bitrate in kbps, for lossy audio codecs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_bitrate_kbps: Option<u32>,
    /// Additional engine arguments (quality, preset, container flags).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_args: Vec<String>,
}

impl Strategy {
    /// The cheap lossless tier: change the container, copy the streams.
    pub fn stream_copy(label: &str) -> Self {
        Self {
            label: label.to_string(),
            copy_streams: true,
            video_codec: None,
            audio_codec: None,
            audio_bitrate_kbps: None,
            extra_args: Vec::new(),
        }
    }
}

/// Ordered list of strategies for one target kind, tried until one
/// completes without signaling failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodePlan {
    /// Engine container/format name (may differ from the extension,
    /// e.g. `matroska` for `.mkv`, `ipod` for `.m4a`).
    pub container: String,
    /// Extension of the produced file.
    pub extension: String,
    pub strategies: Vec<Strategy>,
}

/// A finished transcode: which strategy produced the artifact.
#[derive(Debug, Clone)]
pub struct CompletedTranscode {
    pub strategy: String,
    pub output_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_copy_strategy() {
        let strategy = Strategy::stream_copy("copy");
        assert!(strategy.copy_streams);
        assert!(strategy.video_codec.is_none());
        assert_eq!(strategy.label, "copy");
    }
}
