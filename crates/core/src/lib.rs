//! Core library for the reformer conversion service.
//!
//! The pieces, leaves first: workspace management, content filtering,
//! blank-page elimination, the fallback transcode pipeline, the poll-based
//! async job registry and the retention sweeper, plus the external-engine
//! layer and the service object orchestrating them.

pub mod archive;
pub mod batch;
pub mod config;
pub mod engines;
pub mod filter;
pub mod images;
pub mod jobs;
pub mod metrics;
pub mod pdf;
pub mod pipeline;
pub mod service;
pub mod sweeper;
pub mod testing;
pub mod workspace;

pub use batch::{download_url, IncomingItem, ItemFailure, ItemOutcome, ItemSuccess};
pub use config::{load_config, load_config_from_str, validate_config, Config, ConfigError};
pub use engines::{
    AudioSupport, EngineError, EngineKind, EngineSet, EngineStatus, EngineSummary, EnginesConfig,
    PdfCompressionPreset,
};
pub use filter::{ContentFilter, FileCategory, ValidationError};
pub use jobs::{JobRecord, JobRegistry, JobStatus};
pub use service::{ConversionService, ExtractedFile, PdfCompressResult, PdfMergeResult, RequestError};
pub use sweeper::RetentionSweeper;
pub use workspace::{
    sanitize_filename, stored_name_for, BoundedSink, UploadError, UploadedItem, Workspace,
    WorkspaceError, WorkspaceId, WorkspaceManager,
};
