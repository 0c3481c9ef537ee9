//! Durable poll-based job registry.
//!
//! A job's identity is its workspace id. The job is implicitly
//! "processing" from the moment the workspace exists; the producer
//! publishes one terminal record, atomically, and pollers read it
//! verbatim any number of times afterwards.

use thiserror::Error;
use tracing::warn;

use crate::workspace::{Workspace, WorkspaceError, WorkspaceId, WorkspaceManager, OUTPUT_DIR};

use super::types::{JobRecord, JobStatus};

/// Name of the terminal record inside the workspace output directory.
pub const STATUS_FILE: &str = "status.json";

#[derive(Debug, Error)]
pub enum JobError {
    #[error("terminal record already published for workspace {id}")]
    AlreadyPublished { id: WorkspaceId },

    #[error("failed to serialize job record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads and writes per-job terminal records.
#[derive(Debug, Clone)]
pub struct JobRegistry {
    workspaces: WorkspaceManager,
}

impl JobRegistry {
    pub fn new(workspaces: WorkspaceManager) -> Self {
        Self { workspaces }
    }

    /// Publishes the terminal record: write-then-rename so a poller never
    /// observes a half-written record, and at most once per job.
    pub async fn publish(&self, workspace: &Workspace, record: &JobRecord) -> Result<(), JobError> {
        let out_dir = workspace.output_dir().await?;
        let final_path = out_dir.join(STATUS_FILE);

        if tokio::fs::try_exists(&final_path).await.unwrap_or(false) {
            return Err(JobError::AlreadyPublished {
                id: workspace.id(),
            });
        }

        let staging_path = out_dir.join(format!("{}.tmp", STATUS_FILE));
        let payload = serde_json::to_vec(record)?;
        tokio::fs::write(&staging_path, payload).await?;
        tokio::fs::rename(&staging_path, &final_path).await?;
        Ok(())
    }

    /// Reads the poller-facing state for a job id. Never errors: every
    /// failure mode maps onto one of the protocol's states.
    pub async fn status(&self, id: WorkspaceId) -> JobStatus {
        let workspace_dir = self.workspaces.root().join(id.to_string());
        let status_path = workspace_dir.join(OUTPUT_DIR).join(STATUS_FILE);

        match tokio::fs::read(&status_path).await {
            Ok(bytes) => match serde_json::from_slice::<JobRecord>(&bytes) {
                Ok(record) => JobStatus::Finished(record),
                Err(e) => {
                    // Should be unreachable given atomic publication.
                    warn!("corrupt job record for workspace {}: {}", id, e);
                    JobStatus::Finished(JobRecord::Error {
                        message: "job record is corrupt".to_string(),
                    })
                }
            },
            Err(_) => {
                if tokio::fs::try_exists(&workspace_dir).await.unwrap_or(false) {
                    JobStatus::Processing
                } else {
                    JobStatus::NotFound
                }
            }
        }
    }
}
