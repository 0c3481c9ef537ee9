//! External processing engines.
//!
//! Every engine is an out-of-process collaborator reached over a process
//! invocation boundary with an explicit time budget. Paths come from
//! configuration, resolved once at startup into an [`EngineSet`]; an
//! engine that is missing yields a typed error instead of a spawn
//! attempt.

mod capabilities;
mod config;
mod error;
mod ffmpeg;
mod ghostscript;
mod office;
mod process;
mod scan;
mod set;

pub use capabilities::AudioSupport;
pub use config::EnginesConfig;
pub use error::EngineError;
pub use ffmpeg::FfmpegEngine;
pub use ghostscript::{GhostscriptEngine, PdfCompressionPreset};
pub use office::{LibreOfficeEngine, PdfToDocxEngine};
pub use scan::await_output;
pub use set::{EngineKind, EngineSet, EngineStatus, EngineSummary};
