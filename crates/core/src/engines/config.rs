//! Configuration for external engines.
//!
//! Engine locations are explicit configuration injected at process start;
//! nothing scans well-known install directories at runtime. An engine
//! without a configured path resolves to a typed "not configured" state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Paths and budgets for the external engines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnginesConfig {
    /// Path to the ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg: PathBuf,

    /// Path to the ffprobe binary.
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe: PathBuf,

    /// Path to the LibreOffice binary (office-to-PDF). Unset means the
    /// office conversion endpoints report the engine as not configured.
    #[serde(default)]
    pub soffice: Option<PathBuf>,

    /// Path to the Ghostscript binary (PDF optimizer).
    #[serde(default)]
    pub ghostscript: Option<PathBuf>,

    /// Program converting a PDF to an editable document; invoked as
    /// `<program> <input> <output>`.
    #[serde(default)]
    pub pdf_converter: Option<PathBuf>,

    /// Timeout for a single transcode invocation in seconds.
    #[serde(default = "default_transcode_timeout")]
    pub transcode_timeout_secs: u64,

    /// Timeout for one office-to-PDF conversion in seconds.
    #[serde(default = "default_office_timeout")]
    pub office_timeout_secs: u64,

    /// Timeout for one Ghostscript pass in seconds.
    #[serde(default = "default_ghostscript_timeout")]
    pub ghostscript_timeout_secs: u64,

    /// Timeout for one PDF-to-document conversion in seconds.
    #[serde(default = "default_pdf_converter_timeout")]
    pub pdf_converter_timeout_secs: u64,

    /// FFmpeg log level (quiet, error, warning, info, ...).
    #[serde(default = "default_ffmpeg_log_level")]
    pub ffmpeg_log_level: String,

    /// Additional global ffmpeg arguments.
    #[serde(default)]
    pub extra_ffmpeg_args: Vec<String>,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ffprobe_path() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_transcode_timeout() -> u64 {
    3600
}

fn default_office_timeout() -> u64 {
    60
}

fn default_ghostscript_timeout() -> u64 {
    120
}

fn default_pdf_converter_timeout() -> u64 {
    300
}

fn default_ffmpeg_log_level() -> String {
    "warning".to_string()
}

impl Default for EnginesConfig {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg_path(),
            ffprobe: default_ffprobe_path(),
            soffice: None,
            ghostscript: None,
            pdf_converter: None,
            transcode_timeout_secs: default_transcode_timeout(),
            office_timeout_secs: default_office_timeout(),
            ghostscript_timeout_secs: default_ghostscript_timeout(),
            pdf_converter_timeout_secs: default_pdf_converter_timeout(),
            ffmpeg_log_level: default_ffmpeg_log_level(),
            extra_ffmpeg_args: Vec::new(),
        }
    }
}
