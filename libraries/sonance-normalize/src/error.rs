//! Error types for normalization

use sonance_core::CoreError;
use thiserror::Error;

/// Result type for normalization operations
pub type Result<T> = std::result::Result<T, NormalizeError>;

/// Errors that can occur while normalizing
///
/// Cancellation and no-op requests are not errors; see `ApplyOutcome`.
#[derive(Error, Debug)]
pub enum NormalizeError {
    /// Channels of a jointly processed track cover different sample counts
    #[error("Channels of track '{track}' differ in length over the selection ({expected} vs {found} samples)")]
    ChannelMismatch {
        /// Track name
        track: String,
        /// Selected length of the first channel
        expected: i64,
        /// Selected length of the mismatching channel
        found: i64,
    },

    /// Settings are out of range or a parameter was rejected
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// Block read or write failed
    #[error("Sample storage failed: {0}")]
    Io(#[from] CoreError),
}

impl From<NormalizeError> for CoreError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::Io(inner) => inner,
            other => CoreError::effect(crate::NORMALIZE_SYMBOL, other.to_string()),
        }
    }
}
