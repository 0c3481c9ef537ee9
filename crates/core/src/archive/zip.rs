//! Zip creation and extraction.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::workspace::sanitize_filename;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("RAR archives are not supported; upload a ZIP file")]
    RarUnsupported,

    #[error("unsupported archive type: .{extension}")]
    UnsupportedType { extension: String },

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Compression level for created archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZipCompressionLevel {
    /// No compression, fastest.
    Store,
    /// Standard deflate.
    Deflate,
    /// Deflate at maximum effort.
    DeflateMax,
}

impl Default for ZipCompressionLevel {
    fn default() -> Self {
        Self::Deflate
    }
}

impl fmt::Display for ZipCompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Store => "store",
            Self::Deflate => "deflate",
            Self::DeflateMax => "deflate-max",
        };
        f.write_str(name)
    }
}

impl FromStr for ZipCompressionLevel {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "store" => Ok(Self::Store),
            "deflate" => Ok(Self::Deflate),
            "deflate-max" | "deflate_max" => Ok(Self::DeflateMax),
            _ => Err(()),
        }
    }
}

impl ZipCompressionLevel {
    fn file_options(&self) -> FileOptions {
        let options = FileOptions::default().large_file(true);
        match self {
            Self::Store => options.compression_method(CompressionMethod::Stored),
            Self::Deflate => options.compression_method(CompressionMethod::Deflated),
            Self::DeflateMax => options
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(9)),
        }
    }
}

/// Packs the given files into a zip at `output` under their original
/// names, returning the archive's byte size. Synchronous IO; async
/// callers wrap this in `spawn_blocking`.
pub fn build_zip(
    entries: &[(String, PathBuf)],
    output: &Path,
    level: ZipCompressionLevel,
) -> Result<u64, ArchiveError> {
    let file = File::create(output)?;
    let mut writer = ZipWriter::new(file);
    let options = level.file_options();

    for (name, path) in entries {
        writer.start_file(name.clone(), options)?;
        let mut input = File::open(path)?;
        std::io::copy(&mut input, &mut writer)?;
    }

    let file = writer.finish()?;
    Ok(file.metadata()?.len())
}

/// A file pulled out of an archive.
#[derive(Debug, Clone)]
pub struct ExtractedEntry {
    /// Sanitized flattened name on disk.
    pub name: String,
    /// Path the entry had inside the archive.
    pub original_name: String,
    pub size_bytes: u64,
}

/// Extracts an uploaded archive into `out_dir`. Entries are flattened to
/// sanitized basenames; directories are skipped. Only ZIP is supported;
/// RAR gets its own rejection so the caller can say so.
pub fn extract_archive(
    input: &Path,
    original_name: &str,
    out_dir: &Path,
) -> Result<Vec<ExtractedEntry>, ArchiveError> {
    let extension = Path::new(original_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "zip" => extract_zip(input, out_dir),
        "rar" => Err(ArchiveError::RarUnsupported),
        other => Err(ArchiveError::UnsupportedType {
            extension: other.to_string(),
        }),
    }
}

fn extract_zip(input: &Path, out_dir: &Path) -> Result<Vec<ExtractedEntry>, ArchiveError> {
    let file = File::open(input)?;
    let mut archive = ZipArchive::new(file)?;
    let mut entries = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let original_name = entry.name().to_string();
        let base = Path::new(&original_name)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| original_name.clone());
        let name = sanitize_filename(&base);

        let mut output = File::create(out_dir.join(&name))?;
        let size_bytes = std::io::copy(&mut entry, &mut output)?;

        entries.push(ExtractedEntry {
            name,
            original_name,
            size_bytes,
        });
    }

    Ok(entries)
}
