//! Sonance Audio
//!
//! Audio file input and output for Sonance.
//!
//! This crate provides:
//! - Decoding via Symphonia (WAV, FLAC, MP3, OGG/Vorbis, AAC, MP4) into
//!   in-memory tracks, one channel per source channel
//! - 32-bit float WAV output via hound
//!
//! # Example
//!
//! ```rust,no_run
//! use sonance_audio::{decode_file, write_wav};
//! use sonance_core::{NullProgress, Selection};
//! use sonance_normalize::{NormalizeSettings, Normalizer};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let decoded = decode_file(Path::new("/music/take.flac"))?;
//! let sample_rate = decoded.sample_rate;
//! let mut tracks = vec![decoded.into_track()];
//!
//! Normalizer::new(NormalizeSettings::default())
//!     .apply(&mut tracks, Selection::all(), &mut NullProgress)?;
//!
//! write_wav(Path::new("/music/take-normalized.wav"), &tracks[0], sample_rate)?;
//! # Ok(())
//! # }
//! ```

mod decoder;
mod error;
mod wav;

pub use decoder::{decode_file, DecodedAudio};
pub use error::{AudioError, Result};
pub use wav::write_wav;
