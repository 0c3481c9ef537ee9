//! Upload categories.

use serde::{Deserialize, Serialize};

/// Category an upload endpoint declares for its files. Determines the
/// extension allow-list, accepted MIME types and the size ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    OfficeDocument,
    Image,
    Pdf,
    Audio,
    Video,
    Archive,
    /// Anything goes (zip-creation input); only the size ceiling applies.
    Any,
}

impl FileCategory {
    pub fn name(&self) -> &'static str {
        match self {
            Self::OfficeDocument => "office documents",
            Self::Image => "images",
            Self::Pdf => "PDF files",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Archive => "archives",
            Self::Any => "files",
        }
    }
}
