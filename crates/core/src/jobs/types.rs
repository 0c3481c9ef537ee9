//! Job state types.

use serde::{Deserialize, Serialize};

/// Terminal record of an async job. Written exactly once into the
/// workspace's output directory; its wire shape is what pollers read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobRecord {
    Completed {
        output_name: String,
        download_url: String,
        bytes: u64,
    },
    Error {
        message: String,
    },
}

/// What a poller sees for a job id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Workspace exists, no terminal record yet.
    Processing,
    /// Terminal record, returned verbatim on every read.
    Finished(JobRecord),
    /// Never started, or already reaped.
    NotFound,
}
