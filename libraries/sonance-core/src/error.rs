/// Core error types for Sonance
use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for Sonance
#[derive(Error, Debug)]
pub enum CoreError {
    /// Sample storage errors (block read/write failures)
    #[error("Storage error: {0}")]
    Storage(String),

    /// A block access fell outside the channel
    #[error("Block {start}..{end} is out of bounds for a channel of {len} samples")]
    OutOfBounds {
        /// First sample of the requested block
        start: i64,
        /// One past the last sample of the requested block
        end: i64,
        /// Channel length in samples
        len: i64,
    },

    /// Parameter string could not be parsed
    #[error("Malformed parameter string: {0}")]
    MalformedParameters(String),

    /// Parameter has an unexpected type or value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// What was wrong with it
        reason: String,
    },

    /// Parameter name not understood by the effect
    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    /// No effect registered under the requested name
    #[error("Unknown effect: {0}")]
    UnknownEffect(String),

    /// Effect-specific failure
    #[error("{effect} failed: {message}")]
    Effect {
        /// Effect symbol
        effect: String,
        /// Failure description
        message: String,
    },

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an effect failure
    pub fn effect(effect: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Effect {
            effect: effect.into(),
            message: message.into(),
        }
    }
}
