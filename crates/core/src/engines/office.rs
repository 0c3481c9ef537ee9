//! Document engines: LibreOffice (office to PDF) and the PDF-to-DOCX
//! program.
//!
//! Both are single-invocation engines with no fallback tiers; a failed
//! run is terminal for the item.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::time::Duration;

use super::error::EngineError;
use super::process::run_checked;
use super::scan::await_output;
use super::set::{EngineKind, EngineSet};

/// Window for the produced artifact to appear and stabilize after the
/// engine process exits.
const OUTPUT_SCAN_WINDOW: Duration = Duration::from_secs(20);

/// Office-document to PDF conversion via headless LibreOffice.
pub struct LibreOfficeEngine {
    engines: Arc<EngineSet>,
    timeout_secs: u64,
}

impl LibreOfficeEngine {
    pub fn new(engines: Arc<EngineSet>, timeout_secs: u64) -> Self {
        Self {
            engines,
            timeout_secs,
        }
    }

    /// Converts one document, returning the deterministic output path:
    /// LibreOffice derives the name from the input's stem.
    pub async fn convert_to_pdf(
        &self,
        input: &Path,
        out_dir: &Path,
    ) -> Result<PathBuf, EngineError> {
        let program = self.engines.require(EngineKind::LibreOffice)?.to_path_buf();

        let args = [
            "--headless".to_string(),
            "--norestore".to_string(),
            "--nofirststartwizard".to_string(),
            "--convert-to".to_string(),
            "pdf".to_string(),
            "--outdir".to_string(),
            out_dir.to_string_lossy().to_string(),
            input.to_string_lossy().to_string(),
        ];
        run_checked("libreoffice", &program, &args, self.timeout_secs).await?;

        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());
        let expected = out_dir.join(format!("{}.pdf", stem));

        await_output("libreoffice", &expected, OUTPUT_SCAN_WINDOW).await?;
        Ok(expected)
    }
}

/// PDF to editable-document conversion via a configured external program
/// invoked as `<program> <input> <output>`.
pub struct PdfToDocxEngine {
    engines: Arc<EngineSet>,
    timeout_secs: u64,
}

impl PdfToDocxEngine {
    pub fn new(engines: Arc<EngineSet>, timeout_secs: u64) -> Self {
        Self {
            engines,
            timeout_secs,
        }
    }

    /// Converts one PDF; the orchestrator chooses the output path.
    pub async fn convert(&self, input: &Path, output: &Path) -> Result<(), EngineError> {
        let program = self.engines.require(EngineKind::PdfConverter)?.to_path_buf();

        let args = [
            input.to_string_lossy().to_string(),
            output.to_string_lossy().to_string(),
        ];
        run_checked("pdf converter", &program, &args, self.timeout_secs).await?;

        await_output("pdf converter", output, OUTPUT_SCAN_WINDOW).await?;
        Ok(())
    }
}
