//! Multipart intake: streams every file field into the workspace input
//! directory through the size-bounded sink, validating name and MIME
//! before any bytes are consumed. A rejected file keeps its batch
//! position as a per-item failure; text fields collect into a map.

use std::collections::HashMap;

use axum::extract::Multipart;
use tracing::debug;

use reformer_core::metrics;
use reformer_core::{
    BoundedSink, ContentFilter, FileCategory, IncomingItem, UploadedItem, Workspace,
};

use super::error::{bad_request, internal_error, ApiError};

pub struct UploadForm {
    /// Files in arrival order, accepted or rejected.
    pub items: Vec<IncomingItem>,
    /// Non-file form fields (format, quality, bitrate, ...).
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

pub async fn receive_uploads(
    multipart: &mut Multipart,
    workspace: &Workspace,
    filter: &ContentFilter,
    category: FileCategory,
) -> Result<UploadForm, ApiError> {
    let input_dir = workspace.input_dir().await.map_err(internal_error)?;
    let limit_bytes = filter.max_bytes(category);
    let max_files = filter.max_files();

    let mut items: Vec<IncomingItem> = Vec::new();
    let mut fields = HashMap::new();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("malformed upload: {}", e)))?
    {
        let Some(original_name) = field.file_name().map(str::to_string) else {
            let name = field.name().unwrap_or_default().to_string();
            let value = field.text().await.unwrap_or_default();
            fields.insert(name, value);
            continue;
        };

        if items.len() >= max_files {
            return Err(bad_request(format!(
                "too many files; at most {} per request",
                max_files
            )));
        }

        let declared_mime = field.content_type().map(str::to_string);
        if let Err(e) = filter.check(category, &original_name, declared_mime.as_deref()) {
            debug!(file = %original_name, error = %e, "Upload rejected by filter");
            metrics::UPLOADS_REJECTED
                .with_label_values(&[category.name()])
                .inc();
            items.push(IncomingItem::Rejected {
                original_name,
                error: e.to_string(),
            });
            continue;
        }

        let stored_name = reformer_core::stored_name_for(&original_name);
        let path = input_dir.join(&stored_name);
        let mut sink = BoundedSink::create(&path, limit_bytes)
            .await
            .map_err(internal_error)?;

        let mut failure: Option<String> = None;
        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => {
                    if let Err(e) = sink.write_chunk(&chunk).await {
                        failure = Some(e.to_string());
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    failure = Some(format!("upload stream error: {}", e));
                    break;
                }
            }
        }

        match failure {
            Some(error) => {
                let _ = sink.abort().await;
                metrics::UPLOADS_REJECTED
                    .with_label_values(&[category.name()])
                    .inc();
                items.push(IncomingItem::Rejected {
                    original_name,
                    error,
                });
            }
            None => {
                let size_bytes = sink.finish().await.map_err(internal_error)?;
                items.push(IncomingItem::Accepted(UploadedItem {
                    original_name,
                    stored_name,
                    path,
                    size_bytes,
                    declared_mime,
                }));
            }
        }
    }

    Ok(UploadForm { items, fields })
}
