//! Workspace allocation and reclamation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;
use uuid::Uuid;

/// Subdirectory receiving uploaded files.
pub const INPUT_DIR: &str = "input";
/// Subdirectory holding produced artifacts, served for download.
pub const OUTPUT_DIR: &str = "out";
/// Subdirectory for intermediate files (e.g. blank-page-stripped PDFs).
pub const SCRATCH_DIR: &str = "work";

/// Opaque identity of a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkspaceId(Uuid);

impl WorkspaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WorkspaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for WorkspaceId {
    type Err = WorkspaceError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| WorkspaceError::InvalidId {
                raw: raw.to_string(),
            })
    }
}

/// Errors from workspace operations.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("workspace {id} not found")]
    NotFound { id: WorkspaceId },

    #[error("invalid workspace id: {raw}")]
    InvalidId { raw: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Allocates and reclaims per-request workspace directories under a
/// single root. Workspaces are fully independent of each other; the only
/// coordination point is the filesystem namespace, partitioned by id.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the root directory if it does not exist yet.
    pub async fn ensure_root(&self) -> Result<(), WorkspaceError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Allocates a fresh workspace with a new id.
    pub async fn create(&self) -> Result<Workspace, WorkspaceError> {
        let id = WorkspaceId::new();
        let path = self.root.join(id.to_string());
        tokio::fs::create_dir_all(&path).await?;
        Ok(Workspace { id, path })
    }

    /// Attaches to an existing workspace, or reports it as gone.
    pub async fn open(&self, id: WorkspaceId) -> Result<Workspace, WorkspaceError> {
        let path = self.root.join(id.to_string());
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(WorkspaceError::NotFound { id });
        }
        Ok(Workspace { id, path })
    }

    /// Recursively removes a workspace tree. Deleting a workspace that is
    /// already gone (another sweep pass, manual cleanup) is not an error.
    pub async fn reclaim(&self, id: WorkspaceId) -> Result<(), WorkspaceError> {
        let path = self.root.join(id.to_string());
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// An allocated workspace. Owned by exactly one logical request until the
/// retention sweeper takes over deletion.
#[derive(Debug, Clone)]
pub struct Workspace {
    id: WorkspaceId,
    path: PathBuf,
}

impl Workspace {
    pub fn id(&self) -> WorkspaceId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Input directory, created on first access.
    pub async fn input_dir(&self) -> Result<PathBuf, WorkspaceError> {
        self.subdir(INPUT_DIR).await
    }

    /// Output directory, created on first access.
    pub async fn output_dir(&self) -> Result<PathBuf, WorkspaceError> {
        self.subdir(OUTPUT_DIR).await
    }

    /// Scratch directory, created on first access.
    pub async fn scratch_dir(&self) -> Result<PathBuf, WorkspaceError> {
        self.subdir(SCRATCH_DIR).await
    }

    async fn subdir(&self, name: &str) -> Result<PathBuf, WorkspaceError> {
        let dir = self.path.join(name);
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir)
    }
}
