//! Per-item batch results.
//!
//! Every batch operation returns a result list isomorphic to the input
//! list (same cardinality, same order) with each entry independently
//! marked success or failure.

use std::fmt;

use serde::Serialize;

use crate::workspace::{UploadedItem, WorkspaceId};

/// Route prefix artifacts are served under.
pub const DOWNLOAD_PREFIX: &str = "/api/v1/download";

/// Download locator for an artifact in a workspace's output directory.
pub fn download_url(workspace: WorkspaceId, file_name: &str) -> String {
    format!("{}/{}/{}", DOWNLOAD_PREFIX, workspace, file_name)
}

/// An uploaded batch entry as it came off the wire: either stored in the
/// workspace, or rejected by the content filter while its bytes were
/// still unread. Rejected entries keep their batch position.
#[derive(Debug)]
pub enum IncomingItem {
    Accepted(UploadedItem),
    Rejected {
        original_name: String,
        error: String,
    },
}

impl IncomingItem {
    pub fn original_name(&self) -> &str {
        match self {
            Self::Accepted(item) => &item.original_name,
            Self::Rejected { original_name, .. } => original_name,
        }
    }
}

/// One entry of a batch result.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Success(ItemSuccess),
    Error(ItemFailure),
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemSuccess {
    pub original_name: String,
    pub output_name: String,
    pub download_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Label of the pipeline strategy that produced the artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate_kbps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blank_pages_removed: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemFailure {
    pub original_name: String,
    pub error: String,
}

impl ItemOutcome {
    pub fn failure(original_name: impl Into<String>, error: impl fmt::Display) -> Self {
        Self::Error(ItemFailure {
            original_name: original_name.into(),
            error: error.to_string(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn original_name(&self) -> &str {
        match self {
            Self::Success(s) => &s.original_name,
            Self::Error(f) => &f.original_name,
        }
    }
}
