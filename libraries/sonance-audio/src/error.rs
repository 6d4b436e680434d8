/// Audio file errors
use thiserror::Error;

/// Result type alias using `AudioError`
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio error types
#[derive(Error, Debug)]
pub enum AudioError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// Encoding error
    #[error("Encode error: {0}")]
    EncodeError(String),

    /// Track cannot be written as-is
    #[error("Invalid track: {0}")]
    InvalidTrack(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Symphonia error
    #[error("Symphonia error: {0}")]
    Symphonia(String),

    /// Sample storage error while reading a track
    #[error(transparent)]
    Core(#[from] sonance_core::CoreError),
}

impl From<hound::Error> for AudioError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => AudioError::Io(e),
            other => AudioError::EncodeError(other.to_string()),
        }
    }
}

impl From<AudioError> for sonance_core::CoreError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::Core(inner) => inner,
            AudioError::Io(inner) => sonance_core::CoreError::Io(inner),
            other => sonance_core::CoreError::storage(other.to_string()),
        }
    }
}
