use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::engines::EnginesConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub engines: EnginesConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    4000
}

/// Workspace storage and retention configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root directory under which per-request workspaces are created.
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
    /// Workspace age after which the sweeper reclaims it.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Interval between sweep passes.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            ttl_secs: default_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_storage_root() -> PathBuf {
    std::env::temp_dir().join("reformer")
}

fn default_ttl_secs() -> u64 {
    30 * 60
}

fn default_sweep_interval_secs() -> u64 {
    5 * 60
}

/// Upload size ceilings and batch limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    /// Maximum number of files per batch request.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Ceiling for office documents and PDFs, in megabytes.
    #[serde(default = "default_document_mb")]
    pub document_mb: u64,
    /// Ceiling for images, in megabytes.
    #[serde(default = "default_image_mb")]
    pub image_mb: u64,
    /// Ceiling for audio and video files, in gigabytes.
    #[serde(default = "default_audio_video_gb")]
    pub audio_video_gb: u64,
    /// Ceiling for uploaded archives, in gigabytes.
    #[serde(default = "default_archive_gb")]
    pub archive_gb: u64,
    /// Ceiling for arbitrary files (zip creation input), in gigabytes.
    #[serde(default = "default_any_gb")]
    pub any_gb: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            document_mb: default_document_mb(),
            image_mb: default_image_mb(),
            audio_video_gb: default_audio_video_gb(),
            archive_gb: default_archive_gb(),
            any_gb: default_any_gb(),
        }
    }
}

fn default_max_files() -> usize {
    10
}

fn default_document_mb() -> u64 {
    50
}

fn default_image_mb() -> u64 {
    50
}

fn default_audio_video_gb() -> u64 {
    10
}

fn default_archive_gb() -> u64 {
    5
}

fn default_any_gb() -> u64 {
    1
}

const MB: u64 = 1024 * 1024;
const GB: u64 = 1024 * 1024 * 1024;

impl LimitsConfig {
    pub fn document_bytes(&self) -> u64 {
        self.document_mb * MB
    }

    pub fn image_bytes(&self) -> u64 {
        self.image_mb * MB
    }

    pub fn audio_video_bytes(&self) -> u64 {
        self.audio_video_gb * GB
    }

    pub fn archive_bytes(&self) -> u64 {
        self.archive_gb * GB
    }

    pub fn any_bytes(&self) -> u64 {
        self.any_gb * GB
    }
}

/// Extension allow-lists per upload category
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    #[serde(default = "default_office_extensions")]
    pub office_extensions: Vec<String>,
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
    #[serde(default = "default_audio_extensions")]
    pub audio_extensions: Vec<String>,
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,
    #[serde(default = "default_archive_extensions")]
    pub archive_extensions: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            office_extensions: default_office_extensions(),
            image_extensions: default_image_extensions(),
            audio_extensions: default_audio_extensions(),
            video_extensions: default_video_extensions(),
            archive_extensions: default_archive_extensions(),
        }
    }
}

fn string_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_office_extensions() -> Vec<String> {
    string_list(&[
        "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp",
    ])
}

fn default_image_extensions() -> Vec<String> {
    string_list(&[
        "jpg", "jpeg", "png", "gif", "webp", "tiff", "tif", "bmp", "ico", "svg",
    ])
}

fn default_audio_extensions() -> Vec<String> {
    string_list(&[
        "mp3", "wav", "ogg", "m4a", "flac", "aac", "opus", "oga", "webm",
    ])
}

fn default_video_extensions() -> Vec<String> {
    string_list(&["mp4", "mov", "webm", "mkv", "avi", "m4v"])
}

fn default_archive_extensions() -> Vec<String> {
    string_list(&["zip", "rar"])
}
