//! Peak and DC-offset normalization for Sonance
//!
//! This crate provides:
//! - Streaming analysis of a selection (DC offset, sample peaks)
//! - Per-channel or joint-stereo correction factors
//! - In-place rewrite of the selection with progress and cancellation
//! - A `Normalize` effect for the effect registry and batch commands
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌───────────────┐
//! │ Track       │ ──► │  Analysis    │ ──► │ Correction    │
//! │ (channels)  │     │  (pass 1)    │     │ offset, gain  │
//! └─────────────┘     └──────────────┘     └───────────────┘
//!        ▲                                        │
//!        │            ┌──────────────┐            │
//!        └─────────── │  Rewrite     │ ◄──────────┘
//!                     │  (pass 2)    │
//!                     └──────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use sonance_core::{NullProgress, Selection, Track};
//! use sonance_normalize::{ApplyOutcome, NormalizeSettings, Normalizer};
//!
//! let mut tracks = vec![Track::mono("Take 1", vec![-0.5, 0.25, 0.5, -0.25])];
//! let settings = NormalizeSettings {
//!     peak_level_db: -6.0,
//!     remove_dc: false,
//!     ..NormalizeSettings::default()
//! };
//!
//! let outcome = Normalizer::new(settings)
//!     .apply(&mut tracks, Selection::all(), &mut NullProgress)
//!     .unwrap();
//! assert!(matches!(outcome, ApplyOutcome::Completed(_)));
//! ```

#![deny(unsafe_code)]

mod analysis;
mod effect;
mod error;
mod normalizer;
mod settings;

pub use analysis::{AnalysisResult, PeakRange, SampleStats};
pub use effect::{register, NormalizeEffect};
pub use error::{NormalizeError, Result};
pub use normalizer::{ApplyOutcome, Correction, NormalizeReport, Normalizer, TrackReport};
pub use settings::{NormalizeSettings, ParamKey};

/// Effect symbol used for registry lookup
pub const NORMALIZE_SYMBOL: &str = "Normalize";

/// Default target peak level in dBFS
pub const DEFAULT_PEAK_LEVEL_DB: f64 = -1.0;

/// Lowest accepted target peak level in dBFS
pub const MIN_PEAK_LEVEL_DB: f64 = -145.0;

/// Highest accepted target peak level in dBFS
pub const MAX_PEAK_LEVEL_DB: f64 = 0.0;

/// Default number of samples streamed per block
pub const DEFAULT_BLOCK_SIZE: usize = 65_536;

/// Convert a level in dB to a linear amplitude
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}
