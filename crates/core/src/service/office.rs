//! Office-document and PDF-to-document conversions.

use tracing::info;

use crate::batch::{download_url, IncomingItem, ItemOutcome, ItemSuccess};
use crate::engines::EngineKind;
use crate::metrics;
use crate::pdf::strip_blank_pages;
use crate::workspace::Workspace;

use super::{ConversionService, RequestError};

impl ConversionService {
    /// Converts a batch of office documents to PDF. One engine invocation
    /// per item, no fallback tiers; a failed item is terminal for that
    /// item only.
    pub async fn convert_office_batch(
        &self,
        workspace: &Workspace,
        items: Vec<IncomingItem>,
    ) -> Result<Vec<ItemOutcome>, RequestError> {
        if items.is_empty() {
            return Err(RequestError::NoFiles);
        }
        // One availability check up front instead of N doomed invocations.
        self.engines().require(EngineKind::LibreOffice)?;

        let out_dir = workspace.output_dir().await?;
        let mut outcomes = Vec::with_capacity(items.len());

        for item in items {
            let outcome = match item {
                IncomingItem::Rejected {
                    original_name,
                    error,
                } => ItemOutcome::failure(original_name, error),
                IncomingItem::Accepted(item) => {
                    match self.office.convert_to_pdf(&item.path, &out_dir).await {
                        Ok(pdf_path) => {
                            let output_name = pdf_path
                                .file_name()
                                .map(|n| n.to_string_lossy().to_string())
                                .unwrap_or_default();
                            ItemOutcome::Success(ItemSuccess {
                                original_name: item.original_name,
                                download_url: download_url(workspace.id(), &output_name),
                                output_name,
                                format: Some("pdf".to_string()),
                                strategy: None,
                                bitrate_kbps: None,
                                blank_pages_removed: None,
                            })
                        }
                        Err(e) => ItemOutcome::failure(item.original_name, e),
                    }
                }
            };
            metrics::record_conversion("office_to_pdf", outcome.is_success());
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    /// Converts a batch of PDFs to editable documents. Blank pages are
    /// stripped before the engine runs; the per-item result reports how
    /// many went.
    pub async fn pdf_to_docx_batch(
        &self,
        workspace: &Workspace,
        items: Vec<IncomingItem>,
    ) -> Result<Vec<ItemOutcome>, RequestError> {
        if items.is_empty() {
            return Err(RequestError::NoFiles);
        }
        self.engines().require(EngineKind::PdfConverter)?;

        let out_dir = workspace.output_dir().await?;
        let work_dir = workspace.scratch_dir().await?;
        let mut outcomes = Vec::with_capacity(items.len());

        for item in items {
            let outcome = match item {
                IncomingItem::Rejected {
                    original_name,
                    error,
                } => ItemOutcome::failure(original_name, error),
                IncomingItem::Accepted(item) => {
                    let input = item.path.clone();
                    let work = work_dir.clone();
                    let cleaned =
                        tokio::task::spawn_blocking(move || strip_blank_pages(&input, &work))
                            .await;

                    match cleaned {
                        Err(join_err) => ItemOutcome::failure(
                            item.original_name,
                            format!("blank-page analysis failed: {}", join_err),
                        ),
                        Ok(Err(pdf_err)) => ItemOutcome::failure(item.original_name, pdf_err),
                        Ok(Ok(cleaned)) => {
                            let removed = cleaned.removed_count();
                            if removed > 0 {
                                metrics::BLANK_PAGES_REMOVED.inc_by(removed as u64);
                                info!(
                                    file = %item.original_name,
                                    removed,
                                    "Stripped blank pages before conversion"
                                );
                            }

                            let output_name = format!("{}.docx", item.output_stem());
                            let output_path = out_dir.join(&output_name);
                            let result = self
                                .pdf_to_docx
                                .convert(&cleaned.path, &output_path)
                                .await;
                            // The intermediate artifact is scratch-only.
                            let _ = tokio::fs::remove_file(&cleaned.path).await;

                            match result {
                                Ok(()) => ItemOutcome::Success(ItemSuccess {
                                    original_name: item.original_name,
                                    download_url: download_url(workspace.id(), &output_name),
                                    output_name,
                                    format: Some("docx".to_string()),
                                    strategy: None,
                                    bitrate_kbps: None,
                                    blank_pages_removed: Some(removed),
                                }),
                                Err(e) => ItemOutcome::failure(item.original_name, e),
                            }
                        }
                    }
                }
            };
            metrics::record_conversion("pdf_to_docx", outcome.is_success());
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}
