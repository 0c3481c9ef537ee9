//! Uploaded file intake: name sanitization and size-bounded persistence.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Errors while persisting an uploaded byte stream.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file exceeds the {limit_bytes} byte size limit")]
    TooLarge { limit_bytes: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A file that has been written to a workspace input directory.
/// Immutable once stored.
#[derive(Debug, Clone)]
pub struct UploadedItem {
    /// Name as supplied by the caller.
    pub original_name: String,
    /// Sanitized on-disk name (collision-prefixed).
    pub stored_name: String,
    /// Absolute path inside the workspace input directory.
    pub path: PathBuf,
    /// Bytes written.
    pub size_bytes: u64,
    /// MIME type declared by the caller, if any.
    pub declared_mime: Option<String>,
}

impl UploadedItem {
    /// Sanitized stem of the original name, used to derive output names.
    pub fn output_stem(&self) -> String {
        let stem = Path::new(&self.original_name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.original_name.clone());
        sanitize_filename(&stem)
    }
}

/// Maps a caller-supplied filename onto a safe on-disk name: only
/// `[A-Za-z0-9._-]` survive, underscore runs collapse, 255-char cap.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;
    for c in name.chars() {
        let keep = c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_');
        let mapped = if keep { c } else { '_' };
        if mapped == '_' {
            if prev_underscore {
                continue;
            }
            prev_underscore = true;
        } else {
            prev_underscore = false;
        }
        out.push(mapped);
        if out.len() >= 255 {
            break;
        }
    }
    if out.is_empty() {
        out.push_str("file");
    }
    out
}

/// On-disk name for a fresh upload: millisecond timestamp prefix keeps
/// same-named uploads within one batch from clobbering each other.
pub fn stored_name_for(original_name: &str) -> String {
    let sanitized = sanitize_filename(original_name);
    format!("{}-{}", chrono::Utc::now().timestamp_millis(), sanitized)
}

/// Writes a byte stream to disk while enforcing a size ceiling.
///
/// The ceiling is checked as each chunk arrives, before the full stream
/// has been buffered anywhere; crossing it deletes the partial file and
/// fails the write.
pub struct BoundedSink {
    file: File,
    path: PathBuf,
    written: u64,
    limit_bytes: u64,
}

impl BoundedSink {
    pub async fn create(path: impl Into<PathBuf>, limit_bytes: u64) -> Result<Self, UploadError> {
        let path = path.into();
        let file = File::create(&path).await?;
        Ok(Self {
            file,
            path,
            written: 0,
            limit_bytes,
        })
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Appends one chunk, failing (and removing the partial file) as soon
    /// as the running total crosses the ceiling.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), UploadError> {
        self.written += chunk.len() as u64;
        if self.written > self.limit_bytes {
            self.discard().await;
            return Err(UploadError::TooLarge {
                limit_bytes: self.limit_bytes,
            });
        }
        self.file.write_all(chunk).await?;
        Ok(())
    }

    /// Flushes and returns the byte count.
    pub async fn finish(mut self) -> Result<u64, UploadError> {
        self.file.flush().await?;
        Ok(self.written)
    }

    /// Removes the partial file (e.g. when a later field of the same
    /// request fails).
    pub async fn abort(mut self) -> Result<(), UploadError> {
        self.discard().await;
        Ok(())
    }

    async fn discard(&mut self) {
        let _ = self.file.shutdown().await;
        let _ = tokio::fs::remove_file(&self.path).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_replaces_disallowed_chars() {
        assert_eq!(sanitize_filename("my file (1).pdf"), "my_file_1_.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename("café.png"), "caf_.png");
    }

    #[test]
    fn test_sanitize_collapses_underscore_runs() {
        assert_eq!(sanitize_filename("a   b.txt"), "a_b.txt");
        assert_eq!(sanitize_filename("a___b"), "a_b");
    }

    #[test]
    fn test_sanitize_never_emits_path_separators() {
        let sanitized = sanitize_filename("..\\..\\win\\path/unix/path");
        assert!(!sanitized.contains('/'));
        assert!(!sanitized.contains('\\'));
    }

    #[test]
    fn test_sanitize_empty_name() {
        assert_eq!(sanitize_filename(""), "file");
        assert_eq!(sanitize_filename("///"), "_");
    }

    #[test]
    fn test_sanitize_caps_length() {
        let long = "a".repeat(1000);
        assert!(sanitize_filename(&long).len() <= 255);
    }

    #[tokio::test]
    async fn test_bounded_sink_accepts_within_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("upload.bin");
        let mut sink = BoundedSink::create(&path, 10).await.unwrap();
        sink.write_chunk(b"12345").await.unwrap();
        sink.write_chunk(b"67890").await.unwrap();
        let written = sink.finish().await.unwrap();
        assert_eq!(written, 10);
        assert_eq!(tokio::fs::metadata(&path).await.unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_bounded_sink_rejects_over_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("upload.bin");
        let mut sink = BoundedSink::create(&path, 8).await.unwrap();
        sink.write_chunk(b"12345").await.unwrap();
        let err = sink.write_chunk(b"67890").await.unwrap_err();
        assert!(matches!(err, UploadError::TooLarge { limit_bytes: 8 }));
        // Partial file is gone.
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_bounded_sink_abort_removes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("upload.bin");
        let mut sink = BoundedSink::create(&path, 100).await.unwrap();
        sink.write_chunk(b"data").await.unwrap();
        sink.abort().await.unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_output_stem() {
        let item = UploadedItem {
            original_name: "Quarterly Report (final).docx".to_string(),
            stored_name: "x".to_string(),
            path: PathBuf::from("/tmp/x"),
            size_bytes: 1,
            declared_mime: None,
        };
        assert_eq!(item.output_stem(), "Quarterly_Report_final_");
    }
}
