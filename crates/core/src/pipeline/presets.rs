//! Static pipeline resolution per requested output kind.
//!
//! Video plans carry two tiers: a stream-copy remux first (lossless and
//! cheap when the codecs already fit the container) and a re-encode
//! fallback that is guaranteed compatible. Audio plans have one tier;
//! audio transcodes do not fail on container/codec mismatch the way
//! remuxes do.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::types::{Strategy, TranscodePlan};

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Supported video output containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoOutputFormat {
    Mp4,
    Mov,
    Webm,
    Mkv,
    Avi,
}

impl VideoOutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Mov => "mov",
            Self::Webm => "webm",
            Self::Mkv => "mkv",
            Self::Avi => "avi",
        }
    }

    fn container(&self) -> &'static str {
        match self {
            Self::Mkv => "matroska",
            other => other.extension(),
        }
    }
}

impl fmt::Display for VideoOutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for VideoOutputFormat {
    type Err = UnknownFormat;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "mp4" => Ok(Self::Mp4),
            "mov" => Ok(Self::Mov),
            "webm" => Ok(Self::Webm),
            "mkv" => Ok(Self::Mkv),
            "avi" => Ok(Self::Avi),
            _ => Err(UnknownFormat {
                format: raw.to_string(),
            }),
        }
    }
}

/// Requested output format is not in the preset table.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unsupported output format: {format}")]
pub struct UnknownFormat {
    pub format: String,
}

/// Resolves the two-tier plan for a video output format.
pub fn video_plan(format: VideoOutputFormat) -> TranscodePlan {
    let strategies = match format {
        VideoOutputFormat::Mp4 => vec![
            Strategy {
                extra_args: args(&["-movflags", "+faststart"]),
                ..Strategy::stream_copy("copy")
            },
            Strategy {
                label: "h264-aac".to_string(),
                copy_streams: false,
                video_codec: Some("libx264".to_string()),
                audio_codec: Some("aac".to_string()),
                audio_bitrate_kbps: Some(128),
                extra_args: args(&["-preset", "veryfast", "-crf", "23", "-movflags", "+faststart"]),
            },
        ],
        VideoOutputFormat::Mov => vec![
            Strategy::stream_copy("copy"),
            Strategy {
                label: "h264-aac".to_string(),
                copy_streams: false,
                video_codec: Some("libx264".to_string()),
                audio_codec: Some("aac".to_string()),
                audio_bitrate_kbps: Some(128),
                extra_args: args(&["-preset", "veryfast", "-crf", "23"]),
            },
        ],
        VideoOutputFormat::Webm => vec![
            Strategy::stream_copy("copy"),
            Strategy {
                label: "vp9-opus".to_string(),
                copy_streams: false,
                video_codec: Some("libvpx-vp9".to_string()),
                audio_codec: Some("libopus".to_string()),
                audio_bitrate_kbps: None,
                extra_args: args(&["-b:v", "0", "-crf", "36", "-deadline", "realtime", "-cpu-used", "4"]),
            },
        ],
        VideoOutputFormat::Mkv => vec![
            Strategy::stream_copy("copy"),
            Strategy {
                label: "h264-aac".to_string(),
                copy_streams: false,
                video_codec: Some("libx264".to_string()),
                audio_codec: Some("aac".to_string()),
                audio_bitrate_kbps: Some(128),
                extra_args: args(&["-preset", "veryfast", "-crf", "23"]),
            },
        ],
        VideoOutputFormat::Avi => vec![
            Strategy::stream_copy("copy"),
            Strategy {
                label: "mpeg4-mp3".to_string(),
                copy_streams: false,
                video_codec: Some("mpeg4".to_string()),
                audio_codec: Some("libmp3lame".to_string()),
                audio_bitrate_kbps: Some(160),
                extra_args: args(&["-q:v", "5"]),
            },
        ],
    };

    TranscodePlan {
        container: format.container().to_string(),
        extension: format.extension().to_string(),
        strategies,
    }
}

/// Supported audio output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioOutputFormat {
    Mp3,
    M4a,
    Aac,
    Ogg,
    Opus,
    Wav,
    Flac,
}

impl AudioOutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::M4a => "m4a",
            Self::Aac => "aac",
            Self::Ogg => "ogg",
            Self::Opus => "opus",
            Self::Wav => "wav",
            Self::Flac => "flac",
        }
    }

    pub fn codec(&self) -> &'static str {
        match self {
            Self::Mp3 => "libmp3lame",
            Self::M4a | Self::Aac => "aac",
            Self::Ogg => "libvorbis",
            Self::Opus => "libopus",
            Self::Wav => "pcm_s16le",
            Self::Flac => "flac",
        }
    }

    /// Engine container name; raw AAC goes into an ADTS stream, m4a into
    /// the ipod flavor of MP4, opus into an Ogg container.
    pub fn container(&self) -> &'static str {
        match self {
            Self::M4a => "ipod",
            Self::Aac => "adts",
            Self::Opus => "ogg",
            other => other.extension(),
        }
    }

    /// Bitrate applies only to lossy formats.
    pub fn is_lossy(&self) -> bool {
        !matches!(self, Self::Wav | Self::Flac)
    }
}

impl fmt::Display for AudioOutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for AudioOutputFormat {
    type Err = UnknownFormat;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "m4a" => Ok(Self::M4a),
            "aac" => Ok(Self::Aac),
            "ogg" => Ok(Self::Ogg),
            "opus" => Ok(Self::Opus),
            "wav" => Ok(Self::Wav),
            "flac" => Ok(Self::Flac),
            _ => Err(UnknownFormat {
                format: raw.to_string(),
            }),
        }
    }
}

/// Resolves the single-tier plan for an audio output format.
pub fn audio_plan(format: AudioOutputFormat, bitrate_kbps: u32) -> TranscodePlan {
    let mut extra_args = Vec::new();
    if matches!(format, AudioOutputFormat::M4a | AudioOutputFormat::Aac) {
        // Drop any video stream (cover art) the AAC muxers would choke on.
        extra_args = args(&["-vn"]);
    }

    let strategy = Strategy {
        label: format.codec().to_string(),
        copy_streams: false,
        video_codec: None,
        audio_codec: Some(format.codec().to_string()),
        audio_bitrate_kbps: format.is_lossy().then_some(bitrate_kbps),
        extra_args,
    };

    TranscodePlan {
        container: format.container().to_string(),
        extension: format.extension().to_string(),
        strategies: vec![strategy],
    }
}
