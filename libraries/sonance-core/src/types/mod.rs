//! Domain types for Sonance

mod selection;
mod track;

pub use selection::{SampleCount, Selection};
pub use track::Track;
