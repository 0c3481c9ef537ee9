//! Per-request workspace directories.
//!
//! Every request gets an isolated directory tree under the storage root:
//! `input/` for uploads, `out/` for produced artifacts, `work/` for
//! intermediate files. One workspace is used by exactly one logical
//! request; concurrent workspaces are fully independent.

mod manager;
mod upload;

pub use manager::{
    Workspace, WorkspaceError, WorkspaceId, WorkspaceManager, INPUT_DIR, OUTPUT_DIR, SCRATCH_DIR,
};
pub use upload::{sanitize_filename, stored_name_for, BoundedSink, UploadError, UploadedItem};
