//! Sonance Core
//!
//! Host-side building blocks shared by every Sonance effect.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `Selection`, `SampleCount`
//! - **Core Traits**: `SampleChannel` (block-streaming sample storage),
//!   `ProgressReporter` (progress, cancellation and status), `Effect`
//! - **Parameters**: `Parameters` / `ParamValue` for string-form parameter transport
//! - **Commands**: `EffectRegistry` and `BatchCommand` for applying an effect by name
//! - **Error Handling**: Unified `CoreError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use sonance_core::{MemoryChannel, SampleChannel, Selection, Track};
//!
//! let track = Track::stereo("Take 1", vec![0.1, 0.2, 0.3], vec![0.3, 0.2, 0.1]);
//! assert_eq!(track.channel_count(), 2);
//!
//! let selection = Selection::new(1, 3);
//! assert_eq!(selection.len(), 2);
//!
//! let channel = MemoryChannel::new(vec![0.0; 16]);
//! assert_eq!(channel.len(), 16);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod batch;
pub mod error;
pub mod memory;
pub mod params;
pub mod progress;
pub mod registry;
#[cfg(test)]
mod testing;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use batch::BatchCommand;
pub use error::{CoreError, Result};
pub use memory::MemoryChannel;
pub use params::{ParamValue, Parameters};
pub use progress::{CancellableProgress, NullProgress, ProgressControl, ProgressReporter};
pub use registry::{EffectFactory, EffectRegistry};
pub use traits::{Effect, EffectOutcome, SampleChannel};
pub use types::{SampleCount, Selection, Track};

/// Preferred block size (in samples) when a channel has no opinion of its own
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 65_536;
