//! Startup resolution of the configured engines.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::Serialize;
use tokio::process::Command;
use tracing::{info, warn};

use super::config::EnginesConfig;
use super::error::EngineError;

/// The engines this service can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Ffmpeg,
    Ffprobe,
    LibreOffice,
    Ghostscript,
    PdfConverter,
}

impl EngineKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ffmpeg => "ffmpeg",
            Self::Ffprobe => "ffprobe",
            Self::LibreOffice => "libreoffice",
            Self::Ghostscript => "ghostscript",
            Self::PdfConverter => "pdf converter",
        }
    }
}

/// Resolution state of one engine, fixed at startup.
#[derive(Debug, Clone)]
pub enum EngineStatus {
    /// Configured and responded to a version probe.
    Ready { path: PathBuf },
    /// No path configured.
    NotConfigured,
    /// Configured but the probe could not execute it.
    Unavailable { path: PathBuf, reason: String },
}

impl EngineStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    fn describe(&self) -> String {
        match self {
            Self::Ready { .. } => "ready".to_string(),
            Self::NotConfigured => "not_configured".to_string(),
            Self::Unavailable { reason, .. } => format!("unavailable: {}", reason),
        }
    }
}

/// Per-engine availability, reported by the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EngineSummary {
    pub ffmpeg: String,
    pub ffprobe: String,
    pub libreoffice: String,
    pub ghostscript: String,
    pub pdf_converter: String,
}

/// All engine states, resolved once at process start. Operations that
/// depend on an engine call [`EngineSet::require`] and fail fast with a
/// typed diagnostic instead of attempting an invocation that cannot work.
#[derive(Debug)]
pub struct EngineSet {
    ffmpeg: EngineStatus,
    ffprobe: EngineStatus,
    soffice: EngineStatus,
    ghostscript: EngineStatus,
    pdf_converter: EngineStatus,
}

impl EngineSet {
    /// Probes every configured engine once.
    pub async fn resolve(config: &EnginesConfig) -> Self {
        let set = Self {
            ffmpeg: probe(config.ffmpeg.clone(), "-version").await,
            ffprobe: probe(config.ffprobe.clone(), "-version").await,
            soffice: probe_optional(config.soffice.clone(), "--version").await,
            ghostscript: probe_optional(config.ghostscript.clone(), "--version").await,
            pdf_converter: probe_optional(config.pdf_converter.clone(), "--version").await,
        };

        for kind in [
            EngineKind::Ffmpeg,
            EngineKind::Ffprobe,
            EngineKind::LibreOffice,
            EngineKind::Ghostscript,
            EngineKind::PdfConverter,
        ] {
            match set.status(kind) {
                EngineStatus::Ready { path } => {
                    info!("{} ready at {}", kind.label(), path.display());
                }
                EngineStatus::NotConfigured => {
                    info!("{} not configured", kind.label());
                }
                EngineStatus::Unavailable { path, reason } => {
                    warn!(
                        "{} configured at {} but unavailable: {}",
                        kind.label(),
                        path.display(),
                        reason
                    );
                }
            }
        }

        set
    }

    /// Builds a set from explicit statuses (tests, embedding).
    pub fn from_statuses(
        ffmpeg: EngineStatus,
        ffprobe: EngineStatus,
        soffice: EngineStatus,
        ghostscript: EngineStatus,
        pdf_converter: EngineStatus,
    ) -> Self {
        Self {
            ffmpeg,
            ffprobe,
            soffice,
            ghostscript,
            pdf_converter,
        }
    }

    /// A set with nothing configured.
    pub fn unconfigured() -> Self {
        Self::from_statuses(
            EngineStatus::NotConfigured,
            EngineStatus::NotConfigured,
            EngineStatus::NotConfigured,
            EngineStatus::NotConfigured,
            EngineStatus::NotConfigured,
        )
    }

    pub fn status(&self, kind: EngineKind) -> &EngineStatus {
        match kind {
            EngineKind::Ffmpeg => &self.ffmpeg,
            EngineKind::Ffprobe => &self.ffprobe,
            EngineKind::LibreOffice => &self.soffice,
            EngineKind::Ghostscript => &self.ghostscript,
            EngineKind::PdfConverter => &self.pdf_converter,
        }
    }

    /// The engine's binary path, or a typed error describing why it
    /// cannot be used.
    pub fn require(&self, kind: EngineKind) -> Result<&Path, EngineError> {
        match self.status(kind) {
            EngineStatus::Ready { path } => Ok(path),
            EngineStatus::NotConfigured => Err(EngineError::NotConfigured {
                engine: kind.label(),
            }),
            EngineStatus::Unavailable { path, reason } => Err(EngineError::NotExecutable {
                engine: kind.label(),
                path: path.clone(),
                reason: reason.clone(),
            }),
        }
    }

    pub fn summary(&self) -> EngineSummary {
        EngineSummary {
            ffmpeg: self.ffmpeg.describe(),
            ffprobe: self.ffprobe.describe(),
            libreoffice: self.soffice.describe(),
            ghostscript: self.ghostscript.describe(),
            pdf_converter: self.pdf_converter.describe(),
        }
    }
}

async fn probe_optional(path: Option<PathBuf>, version_arg: &str) -> EngineStatus {
    match path {
        Some(path) => probe(path, version_arg).await,
        None => EngineStatus::NotConfigured,
    }
}

/// Verifies the binary can be spawned at all. A failing exit status still
/// counts as present; only a spawn error marks the engine unavailable.
async fn probe(path: PathBuf, version_arg: &str) -> EngineStatus {
    let result = Command::new(&path)
        .arg(version_arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await;

    match result {
        Ok(_) => EngineStatus::Ready { path },
        Err(e) => EngineStatus::Unavailable {
            path,
            reason: e.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_not_configured() {
        let set = EngineSet::unconfigured();
        let err = set.require(EngineKind::LibreOffice).unwrap_err();
        assert!(matches!(err, EngineError::NotConfigured { .. }));
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_require_ready() {
        let set = EngineSet::from_statuses(
            EngineStatus::Ready {
                path: PathBuf::from("/usr/bin/ffmpeg"),
            },
            EngineStatus::NotConfigured,
            EngineStatus::NotConfigured,
            EngineStatus::NotConfigured,
            EngineStatus::NotConfigured,
        );
        let path = set.require(EngineKind::Ffmpeg).unwrap();
        assert_eq!(path, Path::new("/usr/bin/ffmpeg"));
    }

    #[test]
    fn test_require_unavailable_carries_reason() {
        let set = EngineSet::from_statuses(
            EngineStatus::Unavailable {
                path: PathBuf::from("/opt/ffmpeg"),
                reason: "permission denied".to_string(),
            },
            EngineStatus::NotConfigured,
            EngineStatus::NotConfigured,
            EngineStatus::NotConfigured,
            EngineStatus::NotConfigured,
        );
        let err = set.require(EngineKind::Ffmpeg).unwrap_err();
        assert!(err.to_string().contains("permission denied"));
    }

    #[tokio::test]
    async fn test_resolve_marks_missing_binary_unavailable() {
        let config = EnginesConfig {
            ffmpeg: PathBuf::from("/definitely/not/ffmpeg"),
            ffprobe: PathBuf::from("/definitely/not/ffprobe"),
            ..EnginesConfig::default()
        };
        let set = EngineSet::resolve(&config).await;
        assert!(!set.status(EngineKind::Ffmpeg).is_ready());
        assert!(matches!(
            set.status(EngineKind::LibreOffice),
            EngineStatus::NotConfigured
        ));
    }

    #[test]
    fn test_summary_shapes() {
        let summary = EngineSet::unconfigured().summary();
        assert_eq!(summary.ffmpeg, "not_configured");
        assert_eq!(summary.libreoffice, "not_configured");
    }
}
