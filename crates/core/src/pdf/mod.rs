//! PDF object-model operations: blank-page elimination and merging.
//!
//! Everything here is synchronous CPU work over `lopdf`; callers on the
//! async path wrap these in `spawn_blocking`.

mod blank;
mod merge;

pub use blank::{strip_blank_pages, CleanedPdf};
pub use merge::{merge_documents, MergeOutcome};

use thiserror::Error;

/// Errors from PDF analysis and rewriting.
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("document contains no pages")]
    NoPages,

    #[error("every page in the document is blank")]
    AllPagesBlank,

    #[error("no readable PDF content in: {names}")]
    NoValidInput { names: String },

    #[error("failed to read PDF: {0}")]
    Parse(String),

    #[error("failed to write PDF: {0}")]
    Write(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
