//! PDF optimization via Ghostscript.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::EngineError;
use super::process::run_checked;
use super::set::{EngineKind, EngineSet};

/// Named quality presets mapped onto Ghostscript's distiller settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfCompressionPreset {
    /// Print quality, mild compression.
    High,
    /// E-book quality, the default.
    Balanced,
    /// Screen quality, maximum compression.
    Strong,
}

impl PdfCompressionPreset {
    fn distiller_setting(&self) -> &'static str {
        match self {
            Self::High => "/printer",
            Self::Balanced => "/ebook",
            Self::Strong => "/screen",
        }
    }
}

impl Default for PdfCompressionPreset {
    fn default() -> Self {
        Self::Balanced
    }
}

impl fmt::Display for PdfCompressionPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::High => "high",
            Self::Balanced => "balanced",
            Self::Strong => "strong",
        };
        f.write_str(name)
    }
}

impl FromStr for PdfCompressionPreset {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "balanced" => Ok(Self::Balanced),
            "strong" => Ok(Self::Strong),
            _ => Err(()),
        }
    }
}

/// Ghostscript-backed PDF optimizer.
pub struct GhostscriptEngine {
    engines: Arc<EngineSet>,
    timeout_secs: u64,
}

impl GhostscriptEngine {
    pub fn new(engines: Arc<EngineSet>, timeout_secs: u64) -> Self {
        Self {
            engines,
            timeout_secs,
        }
    }

    /// Rewrites `input` with the preset's distiller settings.
    pub async fn compress(
        &self,
        input: &Path,
        output: &Path,
        preset: PdfCompressionPreset,
    ) -> Result<(), EngineError> {
        let program = self.engines.require(EngineKind::Ghostscript)?.to_path_buf();

        let args = [
            "-sDEVICE=pdfwrite".to_string(),
            "-dCompatibilityLevel=1.4".to_string(),
            format!("-dPDFSETTINGS={}", preset.distiller_setting()),
            "-dNOPAUSE".to_string(),
            "-dQUIET".to_string(),
            "-dBATCH".to_string(),
            format!("-sOutputFile={}", output.to_string_lossy()),
            input.to_string_lossy().to_string(),
        ];
        run_checked("ghostscript", &program, &args, self.timeout_secs).await?;

        match tokio::fs::metadata(output).await {
            Ok(meta) if meta.len() > 0 => Ok(()),
            _ => Err(EngineError::OutputNotProduced {
                engine: "ghostscript",
                path: output.to_path_buf(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_distiller_settings() {
        assert_eq!(PdfCompressionPreset::High.distiller_setting(), "/printer");
        assert_eq!(PdfCompressionPreset::Balanced.distiller_setting(), "/ebook");
        assert_eq!(PdfCompressionPreset::Strong.distiller_setting(), "/screen");
    }

    #[test]
    fn test_preset_parsing_defaults_to_balanced() {
        assert_eq!(
            "strong".parse::<PdfCompressionPreset>().unwrap(),
            PdfCompressionPreset::Strong
        );
        assert!("turbo".parse::<PdfCompressionPreset>().is_err());
        assert_eq!(PdfCompressionPreset::default(), PdfCompressionPreset::Balanced);
    }

    #[tokio::test]
    async fn test_compress_fails_fast_when_not_configured() {
        let engine = GhostscriptEngine::new(Arc::new(EngineSet::unconfigured()), 120);
        let err = engine
            .compress(
                Path::new("/in.pdf"),
                Path::new("/out.pdf"),
                PdfCompressionPreset::Balanced,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotConfigured { .. }));
    }
}
