/// Core traits for Sonance
use crate::error::Result;
use crate::params::Parameters;
use crate::progress::ProgressReporter;
use crate::types::{SampleCount, Selection, Track};
use crate::DEFAULT_MAX_BLOCK_SIZE;

/// Block-streaming access to one channel of sample storage
///
/// Implementers own the samples (in memory, on disk, in a block file cache)
/// and hand them out in blocks. Indices are 0-based sample offsets within the
/// channel. Calls are synchronous from the caller's point of view.
pub trait SampleChannel: Send {
    /// Channel length in samples
    fn len(&self) -> SampleCount;

    /// Check if the channel holds no samples
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Largest block the storage prefers to hand out in one call
    fn max_block_size(&self) -> usize {
        DEFAULT_MAX_BLOCK_SIZE
    }

    /// Fill `buffer` with the samples starting at `start`
    ///
    /// # Errors
    /// Returns an error if the range is out of bounds or the storage fails
    fn read_block(&self, start: SampleCount, buffer: &mut [f32]) -> Result<()>;

    /// Replace the samples starting at `start` with `samples`
    ///
    /// # Errors
    /// Returns an error if the range is out of bounds or the storage fails
    fn write_block(&mut self, start: SampleCount, samples: &[f32]) -> Result<()>;

    /// Read the whole channel into memory
    fn to_vec(&self) -> Result<Vec<f32>> {
        let len = usize::try_from(self.len().max(0))
            .map_err(|_| crate::CoreError::storage("channel too long to load into memory"))?;
        let mut samples = vec![0.0_f32; len];
        let block = self.max_block_size().max(1);
        for (index, chunk) in samples.chunks_mut(block).enumerate() {
            self.read_block((index * block) as SampleCount, chunk)?;
        }
        Ok(samples)
    }
}

/// How an effect invocation ended (errors are reported separately)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectOutcome {
    /// Every track was processed
    Completed {
        /// Optional one-line status for the user
        message: Option<String>,
    },
    /// Nothing to do; the caller should not record an action
    Skipped,
    /// The user cancelled; some tracks may be partially processed
    Cancelled,
}

impl EffectOutcome {
    /// Status message, if the effect produced one
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Completed { message } => message.as_deref(),
            Self::Skipped | Self::Cancelled => None,
        }
    }

    /// Check if the effect ran to completion
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Offline effect applied to a selection of tracks
///
/// Effects are configured through string-form `Parameters`, then applied to
/// tracks synchronously on the caller's thread. Progress, cancellation and
/// status messages flow through the `ProgressReporter`.
pub trait Effect: Send {
    /// Stable name used for lookup (e.g. in batch commands)
    fn symbol(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Current parameters
    fn parameters(&self) -> Parameters;

    /// Update parameters; keys not present keep their current value
    ///
    /// # Errors
    /// Returns an error for unknown names or invalid values. On error the
    /// effect keeps its previous parameters.
    fn set_parameters(&mut self, params: &Parameters) -> Result<()>;

    /// Check whether applying to `selection` would be a no-op
    fn should_skip(&self, selection: Selection) -> bool;

    /// Apply the effect to `selection` of every track
    ///
    /// # Errors
    /// Returns an error if the tracks are unsuitable or storage fails
    fn apply(
        &self,
        tracks: &mut [Track],
        selection: Selection,
        progress: &mut dyn ProgressReporter,
    ) -> Result<EffectOutcome>;
}
