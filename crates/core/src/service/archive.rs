//! Archive creation (async job) and extraction.

use serde::Serialize;
use tracing::{error, info};

use crate::archive::{build_zip, extract_archive, ZipCompressionLevel};
use crate::batch::{download_url, IncomingItem};
use crate::jobs::JobRecord;
use crate::metrics;
use crate::workspace::{UploadedItem, Workspace};

use super::{ConversionService, RequestError};

/// One file pulled out of an uploaded archive, with its locator.
#[derive(Debug, Serialize)]
pub struct ExtractedFile {
    pub name: String,
    pub original_name: String,
    pub download_url: String,
}

impl ConversionService {
    /// Kicks off zip creation on a detached task and returns
    /// immediately; the caller polls the job registry for the terminal
    /// state. The workspace is handed to the task whole; nothing else
    /// touches it until the sweeper does.
    pub fn spawn_compress_job(
        &self,
        workspace: Workspace,
        items: Vec<UploadedItem>,
        level: ZipCompressionLevel,
    ) -> tokio::task::JoinHandle<()> {
        let registry = self.registry.clone();

        tokio::spawn(async move {
            let record = match compress_into_workspace(&workspace, items, level).await {
                Ok(record) => {
                    metrics::record_conversion("archive_compress", true);
                    record
                }
                Err(message) => {
                    metrics::record_conversion("archive_compress", false);
                    error!(workspace = %workspace.id(), %message, "Archive job failed");
                    JobRecord::Error { message }
                }
            };

            if let Err(e) = registry.publish(&workspace, &record).await {
                error!(workspace = %workspace.id(), error = %e, "Could not publish job record");
            }
        })
    }

    /// Extracts one uploaded archive into the workspace output directory.
    pub async fn extract_archive_upload(
        &self,
        workspace: &Workspace,
        item: IncomingItem,
    ) -> Result<Vec<ExtractedFile>, RequestError> {
        let item = match item {
            IncomingItem::Accepted(item) => item,
            IncomingItem::Rejected { error, .. } => {
                return Err(RequestError::InvalidItem(error));
            }
        };

        let out_dir = workspace.output_dir().await?;
        let input = item.path.clone();
        let original_name = item.original_name.clone();
        let entries = tokio::task::spawn_blocking(move || {
            extract_archive(&input, &original_name, &out_dir)
        })
        .await
        .map_err(|e| RequestError::Internal(e.to_string()))?
        .map_err(|e| RequestError::InvalidItem(e.to_string()))?;

        metrics::record_conversion("archive_extract", true);

        Ok(entries
            .into_iter()
            .map(|entry| ExtractedFile {
                download_url: download_url(workspace.id(), &entry.name),
                name: entry.name,
                original_name: entry.original_name,
            })
            .collect())
    }
}

async fn compress_into_workspace(
    workspace: &Workspace,
    items: Vec<UploadedItem>,
    level: ZipCompressionLevel,
) -> Result<JobRecord, String> {
    let out_dir = workspace
        .output_dir()
        .await
        .map_err(|e| e.to_string())?;

    let zip_name = format!("archive-{}.zip", chrono::Utc::now().timestamp_millis());
    let zip_path = out_dir.join(&zip_name);
    let entries: Vec<(String, std::path::PathBuf)> = items
        .into_iter()
        .map(|item| (item.original_name, item.path))
        .collect();

    let bytes = tokio::task::spawn_blocking(move || build_zip(&entries, &zip_path, level))
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())?;

    info!(workspace = %workspace.id(), zip = %zip_name, bytes, "Archive created");

    Ok(JobRecord::Completed {
        download_url: download_url(workspace.id(), &zip_name),
        output_name: zip_name,
        bytes,
    })
}
