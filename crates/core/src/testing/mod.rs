//! Test doubles for external collaborators.

mod mock_transcoder;

pub use mock_transcoder::MockTranscoder;
