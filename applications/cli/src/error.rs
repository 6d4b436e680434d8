/// CLI error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error(transparent)]
    Audio(#[from] sonance_audio::AudioError),

    #[error(transparent)]
    Normalize(#[from] sonance_normalize::NormalizeError),

    #[error(transparent)]
    Core(#[from] sonance_core::CoreError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
