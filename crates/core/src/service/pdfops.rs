//! PDF merge and optimization.

use serde::Serialize;

use crate::batch::{download_url, IncomingItem};
use crate::engines::{EngineKind, PdfCompressionPreset};
use crate::metrics;
use crate::pdf::{merge_documents, PdfError};
use crate::workspace::Workspace;

use super::{ConversionService, RequestError};

/// Result of merging a PDF batch into one document.
#[derive(Debug, Serialize)]
pub struct PdfMergeResult {
    pub output_name: String,
    pub download_url: String,
    pub total_files: usize,
    pub skipped_files: Vec<String>,
}

/// Result of one Ghostscript optimization pass.
#[derive(Debug, Serialize)]
pub struct PdfCompressResult {
    pub original_name: String,
    pub output_name: String,
    pub download_url: String,
    pub preset: String,
    pub original_size: u64,
    pub compressed_size: u64,
    pub savings: u64,
    pub savings_percent: u64,
}

impl ConversionService {
    /// Merges uploaded PDFs, in upload order, into a single document.
    /// Unreadable inputs are skipped and reported; a batch where nothing
    /// could be read fails as a whole.
    pub async fn merge_pdfs(
        &self,
        workspace: &Workspace,
        items: Vec<IncomingItem>,
    ) -> Result<PdfMergeResult, RequestError> {
        if items.len() < 2 {
            return Err(RequestError::NeedAtLeastTwoPdfs);
        }

        let total_files = items.len();
        let mut inputs = Vec::new();
        let mut rejected = Vec::new();
        for item in items {
            match item {
                IncomingItem::Accepted(item) => {
                    inputs.push((item.original_name.clone(), item.path.clone()));
                }
                IncomingItem::Rejected { original_name, .. } => rejected.push(original_name),
            }
        }

        let out_dir = workspace.output_dir().await?;
        let output_name = format!("merged-{}.pdf", chrono::Utc::now().timestamp_millis());
        let output_path = out_dir.join(&output_name);

        let outcome =
            tokio::task::spawn_blocking(move || merge_documents(&inputs, &output_path))
                .await
                .map_err(|e| RequestError::Internal(e.to_string()))?;

        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(PdfError::NoValidInput { names }) => {
                metrics::record_conversion("pdf_merge", false);
                let mut all = rejected;
                all.extend(
                    names
                        .split(", ")
                        .filter(|name| !name.is_empty())
                        .map(str::to_string),
                );
                return Err(RequestError::NoValidPdfs {
                    names: all.join(", "),
                });
            }
            Err(e) => {
                metrics::record_conversion("pdf_merge", false);
                return Err(RequestError::Internal(e.to_string()));
            }
        };

        metrics::record_conversion("pdf_merge", true);
        let mut skipped_files = rejected;
        skipped_files.extend(outcome.skipped);

        Ok(PdfMergeResult {
            download_url: download_url(workspace.id(), &output_name),
            output_name,
            total_files,
            skipped_files,
        })
    }

    /// Optimizes one PDF with the named Ghostscript preset and reports
    /// the size delta.
    pub async fn compress_pdf(
        &self,
        workspace: &Workspace,
        item: IncomingItem,
        preset: PdfCompressionPreset,
    ) -> Result<PdfCompressResult, RequestError> {
        self.engines().require(EngineKind::Ghostscript)?;

        let item = match item {
            IncomingItem::Accepted(item) => item,
            IncomingItem::Rejected { error, .. } => {
                return Err(RequestError::InvalidItem(error));
            }
        };

        let out_dir = workspace.output_dir().await?;
        let output_name = format!("{}_compressed.pdf", item.output_stem());
        let output_path = out_dir.join(&output_name);

        let result = self
            .ghostscript
            .compress(&item.path, &output_path, preset)
            .await;
        metrics::record_conversion("pdf_compress", result.is_ok());
        result?;

        let original_size = tokio::fs::metadata(&item.path).await?.len();
        let compressed_size = tokio::fs::metadata(&output_path).await?.len();
        let savings = original_size.saturating_sub(compressed_size);
        let savings_percent = if original_size > 0 {
            savings * 100 / original_size
        } else {
            0
        };

        Ok(PdfCompressResult {
            original_name: item.original_name,
            download_url: download_url(workspace.id(), &output_name),
            output_name,
            preset: preset.to_string(),
            original_size,
            compressed_size,
            savings,
            savings_percent,
        })
    }
}
