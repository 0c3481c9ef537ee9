//! Request-wide structural errors.
//!
//! Per-item failures live inside batch results and never abort the
//! surrounding request; the variants here abort the whole request with an
//! explicit error payload.

use thiserror::Error;

use crate::engines::EngineError;
use crate::pipeline::UnknownFormat;
use crate::workspace::WorkspaceError;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("no files were uploaded")]
    NoFiles,

    #[error("upload at least 2 PDF files")]
    NeedAtLeastTwoPdfs,

    #[error("unsupported output format: {format}")]
    UnsupportedFormat { format: String },

    #[error("could not read any of the uploaded PDFs: {names}")]
    NoValidPdfs { names: String },

    /// A single-file operation received an invalid item.
    #[error("{0}")]
    InvalidItem(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal task failure: {0}")]
    Internal(String),
}

impl From<UnknownFormat> for RequestError {
    fn from(err: UnknownFormat) -> Self {
        Self::UnsupportedFormat { format: err.format }
    }
}

impl RequestError {
    /// Whether the caller caused this (4xx shape) as opposed to the
    /// service being unable to do the work (5xx shape).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NoFiles
                | Self::NeedAtLeastTwoPdfs
                | Self::UnsupportedFormat { .. }
                | Self::NoValidPdfs { .. }
                | Self::InvalidItem(_)
        )
    }
}
