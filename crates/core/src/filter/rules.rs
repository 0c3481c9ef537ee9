//! Accept/reject decisions for uploaded files.

use std::path::Path;

use thiserror::Error;

use crate::config::{FilterConfig, LimitsConfig};

use super::types::FileCategory;

const ARCHIVE_MIME_TYPES: &[&str] = &[
    "application/zip",
    "application/x-zip-compressed",
    "application/x-rar-compressed",
];

/// Per-item rejection, surfaced locally; never aborts the batch.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("extension .{extension} is not allowed for {category}")]
    DisallowedExtension {
        category: &'static str,
        extension: String,
    },
}

/// Validates uploads against their declared category before any bytes are
/// consumed: extension allow-list, declared MIME type where the category
/// accepts one, and the per-category size ceiling.
#[derive(Debug, Clone)]
pub struct ContentFilter {
    filter: FilterConfig,
    limits: LimitsConfig,
}

impl ContentFilter {
    pub fn new(filter: FilterConfig, limits: LimitsConfig) -> Self {
        Self { filter, limits }
    }

    /// Decide accept/reject from the declared name and MIME type.
    pub fn check(
        &self,
        category: FileCategory,
        original_name: &str,
        declared_mime: Option<&str>,
    ) -> Result<(), ValidationError> {
        let ext = extension_of(original_name);
        let mime = declared_mime.unwrap_or("").to_ascii_lowercase();

        let allowed = match category {
            FileCategory::OfficeDocument => self.in_list(&self.filter.office_extensions, &ext),
            FileCategory::Image => self.in_list(&self.filter.image_extensions, &ext),
            FileCategory::Pdf => ext == "pdf" || mime == "application/pdf",
            FileCategory::Audio => {
                self.in_list(&self.filter.audio_extensions, &ext) || mime.starts_with("audio/")
            }
            FileCategory::Video => {
                self.in_list(&self.filter.video_extensions, &ext) || mime.starts_with("video/")
            }
            FileCategory::Archive => {
                self.in_list(&self.filter.archive_extensions, &ext)
                    || ARCHIVE_MIME_TYPES.contains(&mime.as_str())
            }
            FileCategory::Any => true,
        };

        if allowed {
            Ok(())
        } else {
            Err(ValidationError::DisallowedExtension {
                category: category.name(),
                extension: ext,
            })
        }
    }

    /// Size ceiling for the category, enforced by the upload sink while
    /// the byte stream is consumed.
    pub fn max_bytes(&self, category: FileCategory) -> u64 {
        match category {
            FileCategory::OfficeDocument | FileCategory::Pdf => self.limits.document_bytes(),
            FileCategory::Image => self.limits.image_bytes(),
            FileCategory::Audio | FileCategory::Video => self.limits.audio_video_bytes(),
            FileCategory::Archive => self.limits.archive_bytes(),
            FileCategory::Any => self.limits.any_bytes(),
        }
    }

    pub fn max_files(&self) -> usize {
        self.limits.max_files
    }

    fn in_list(&self, list: &[String], ext: &str) -> bool {
        list.iter().any(|allowed| allowed == ext)
    }
}

fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}
