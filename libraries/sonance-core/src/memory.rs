//! In-memory sample storage

use crate::error::{CoreError, Result};
use crate::traits::SampleChannel;
use crate::types::SampleCount;
use crate::DEFAULT_MAX_BLOCK_SIZE;

/// Channel backed by a `Vec<f32>`
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryChannel {
    samples: Vec<f32>,
    max_block_size: usize,
}

impl MemoryChannel {
    /// Create a channel holding `samples`
    pub fn new(samples: Vec<f32>) -> Self {
        Self {
            samples,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
        }
    }

    /// Override the preferred block size (clamped to at least 1)
    #[must_use]
    pub fn with_max_block_size(mut self, max_block_size: usize) -> Self {
        self.max_block_size = max_block_size.max(1);
        self
    }

    /// Borrow the samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Take the samples out of the channel
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    fn range(&self, start: SampleCount, count: usize) -> Result<std::ops::Range<usize>> {
        let len = self.samples.len();
        let out_of_bounds = || CoreError::OutOfBounds {
            start,
            end: start.saturating_add(count as SampleCount),
            len: len as SampleCount,
        };
        let begin = usize::try_from(start).map_err(|_| out_of_bounds())?;
        let end = begin.checked_add(count).ok_or_else(out_of_bounds)?;
        if end > len {
            return Err(out_of_bounds());
        }
        Ok(begin..end)
    }
}

impl From<Vec<f32>> for MemoryChannel {
    fn from(samples: Vec<f32>) -> Self {
        Self::new(samples)
    }
}

impl SampleChannel for MemoryChannel {
    fn len(&self) -> SampleCount {
        self.samples.len() as SampleCount
    }

    fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    fn read_block(&self, start: SampleCount, buffer: &mut [f32]) -> Result<()> {
        let range = self.range(start, buffer.len())?;
        buffer.copy_from_slice(&self.samples[range]);
        Ok(())
    }

    fn write_block(&mut self, start: SampleCount, samples: &[f32]) -> Result<()> {
        let range = self.range(start, samples.len())?;
        self.samples[range].copy_from_slice(samples);
        Ok(())
    }

    fn to_vec(&self) -> Result<Vec<f32>> {
        Ok(self.samples.clone())
    }
}
