//! Conversion orchestration.
//!
//! One service object owns the engines and drives each operation family
//! from validation through preprocessing and engine invocation to the
//! index-aligned batch outcomes.
//! Items within a batch are processed sequentially; independent requests
//! run fully in parallel with no shared mutable state beyond the
//! filesystem namespace, which the workspace ids already partition.

mod archive;
mod error;
mod image;
mod media;
mod office;
mod pdfops;

pub use archive::ExtractedFile;
pub use error::RequestError;
pub use media::{effective_bitrate, DEFAULT_AUDIO_BITRATE_KBPS};
pub use pdfops::{PdfCompressResult, PdfMergeResult};

use std::sync::Arc;

use crate::config::Config;
use crate::engines::{
    AudioSupport, EngineSet, FfmpegEngine, GhostscriptEngine, LibreOfficeEngine, PdfToDocxEngine,
};
use crate::jobs::JobRegistry;
use crate::pipeline::Transcoder;
use crate::workspace::WorkspaceManager;

/// Drives all conversion operations for the service.
pub struct ConversionService {
    engines: Arc<EngineSet>,
    transcoder: Arc<dyn Transcoder>,
    office: LibreOfficeEngine,
    pdf_to_docx: PdfToDocxEngine,
    ghostscript: GhostscriptEngine,
    capabilities: AudioSupport,
    registry: JobRegistry,
}

impl ConversionService {
    pub fn new(
        config: &Config,
        engines: Arc<EngineSet>,
        capabilities: AudioSupport,
        workspaces: WorkspaceManager,
    ) -> Self {
        let transcoder: Arc<dyn Transcoder> =
            Arc::new(FfmpegEngine::new(Arc::clone(&engines), &config.engines));
        Self {
            office: LibreOfficeEngine::new(
                Arc::clone(&engines),
                config.engines.office_timeout_secs,
            ),
            pdf_to_docx: PdfToDocxEngine::new(
                Arc::clone(&engines),
                config.engines.pdf_converter_timeout_secs,
            ),
            ghostscript: GhostscriptEngine::new(
                Arc::clone(&engines),
                config.engines.ghostscript_timeout_secs,
            ),
            transcoder,
            capabilities,
            registry: JobRegistry::new(workspaces),
            engines,
        }
    }

    /// Swaps the transcode engine; seam for tests and embedding.
    pub fn with_transcoder(mut self, transcoder: Arc<dyn Transcoder>) -> Self {
        self.transcoder = transcoder;
        self
    }

    pub fn engines(&self) -> &EngineSet {
        &self.engines
    }

    pub fn capabilities(&self) -> AudioSupport {
        self.capabilities
    }

    pub fn registry(&self) -> &JobRegistry {
        &self.registry
    }
}
