//! Image conversion batches.

use crate::batch::{download_url, IncomingItem, ItemOutcome, ItemSuccess};
use crate::images::{convert_image, ImageOutputFormat};
use crate::metrics;
use crate::workspace::Workspace;

use super::{ConversionService, RequestError};

impl ConversionService {
    /// Converts a batch of images to the requested format, optionally
    /// with a quality setting for the codecs that have one. Runs fully
    /// in-process.
    pub async fn convert_image_batch(
        &self,
        workspace: &Workspace,
        items: Vec<IncomingItem>,
        format: ImageOutputFormat,
        quality: Option<u8>,
    ) -> Result<Vec<ItemOutcome>, RequestError> {
        if items.is_empty() {
            return Err(RequestError::NoFiles);
        }

        let out_dir = workspace.output_dir().await?;
        let scratch_dir = workspace.scratch_dir().await?;
        let mut outcomes = Vec::with_capacity(items.len());

        for item in items {
            let outcome = match item {
                IncomingItem::Rejected {
                    original_name,
                    error,
                } => ItemOutcome::failure(original_name, error),
                IncomingItem::Accepted(item) => {
                    let output_name = format!("{}.{}", item.output_stem(), format.extension());
                    let output_path = out_dir.join(&output_name);

                    let input = item.path.clone();
                    let scratch = scratch_dir.clone();
                    let result = tokio::task::spawn_blocking(move || {
                        convert_image(&input, &output_path, format, quality, &scratch)
                    })
                    .await;

                    match result {
                        Err(join_err) => ItemOutcome::failure(
                            item.original_name,
                            format!("image conversion failed: {}", join_err),
                        ),
                        Ok(Err(e)) => ItemOutcome::failure(item.original_name, e),
                        Ok(Ok(())) => ItemOutcome::Success(ItemSuccess {
                            original_name: item.original_name,
                            download_url: download_url(workspace.id(), &output_name),
                            output_name,
                            format: Some(format.to_string()),
                            strategy: None,
                            bitrate_kbps: None,
                            blank_pages_removed: None,
                        }),
                    }
                }
            };
            metrics::record_conversion("image", outcome.is_success());
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}
