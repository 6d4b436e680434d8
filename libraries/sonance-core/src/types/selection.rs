/// Sample-addressed selections
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sample position or length within a channel
///
/// Signed 64-bit so that very long recordings stay addressable and
/// differences between positions never wrap.
pub type SampleCount = i64;

/// Half-open range `[start, end)` of samples targeted by an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    /// First selected sample
    pub start: SampleCount,
    /// One past the last selected sample
    pub end: SampleCount,
}

impl Selection {
    /// Create a new selection
    #[must_use]
    pub fn new(start: SampleCount, end: SampleCount) -> Self {
        Self { start, end }
    }

    /// Selection covering every sample of any channel
    #[must_use]
    pub fn all() -> Self {
        Self {
            start: 0,
            end: SampleCount::MAX,
        }
    }

    /// Number of selected samples (zero for inverted ranges)
    pub fn len(&self) -> SampleCount {
        self.end.saturating_sub(self.start).max(0)
    }

    /// Check if the selection covers no samples
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Restrict the selection to a channel of `len` samples
    #[must_use]
    pub fn clamp_to(&self, len: SampleCount) -> Self {
        let len = len.max(0);
        let start = self.start.clamp(0, len);
        let end = self.end.clamp(start, len);
        Self { start, end }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Self::all()
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.end == SampleCount::MAX {
            write!(f, "[{}, end)", self.start)
        } else {
            write!(f, "[{}, {})", self.start, self.end)
        }
    }
}
