//! Sonance CLI Library
//!
//! Command-line front end for the Sonance effects: decode a file, run an
//! effect over a selection and write the result as WAV.
//!
//! This library exposes the core components for testing purposes.

pub mod commands;
pub mod config;
pub mod error;

pub use commands::{
    apply_file, build_registry, list_effects, normalize_file, selection_from_bounds, EffectInfo,
    FileReport, NormalizeJob, RunStatus,
};
pub use config::CliConfig;
pub use error::{CliError, Result};
