//! Archive creation and extraction.

mod zip;

pub use zip::{
    build_zip, extract_archive, ArchiveError, ExtractedEntry, ZipCompressionLevel,
};
