//! Streaming selection analysis
//!
//! One pass over the selection gathers everything both corrections need:
//! - the sum of samples (for the DC offset), accumulated in `f64`
//! - the raw sample minimum and maximum
//!
//! Subtracting a constant preserves order, so the extremes of
//! `sample - offset` are exactly `min - offset` and `max - offset`. The DC and
//! peak statistics therefore come out of the same pass.

use serde::Serialize;
use sonance_core::SampleCount;

/// Running statistics over the blocks of one channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleStats {
    sum: f64,
    min: f32,
    max: f32,
    count: SampleCount,
}

impl SampleStats {
    /// Start an empty accumulation
    pub fn new() -> Self {
        Self {
            sum: 0.0,
            min: f32::INFINITY,
            max: f32::NEG_INFINITY,
            count: 0,
        }
    }

    /// Fold one block of samples into the statistics
    pub fn add_block(&mut self, samples: &[f32]) {
        // Per-block partial sums keep the running total from swamping
        // small contributions over very long selections
        let mut block_sum = 0.0_f64;
        for &sample in samples {
            block_sum += f64::from(sample);
            self.min = self.min.min(sample);
            self.max = self.max.max(sample);
        }
        self.sum += block_sum;
        self.count += samples.len() as SampleCount;
    }

    /// Number of samples seen so far
    pub fn count(&self) -> SampleCount {
        self.count
    }

    /// Final statistics; an empty accumulation reports zeros
    pub fn finish(&self) -> AnalysisResult {
        if self.count == 0 {
            return AnalysisResult::default();
        }
        AnalysisResult {
            offset: self.sum / self.count as f64,
            min: self.min,
            max: self.max,
            sum: self.sum,
            count: self.count,
        }
    }
}

impl Default for SampleStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics of one channel's selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// Mean sample value (DC bias estimate)
    pub offset: f64,
    /// Smallest raw sample
    pub min: f32,
    /// Largest raw sample
    pub max: f32,
    /// Sum of all samples
    pub sum: f64,
    /// Number of samples analyzed
    pub count: SampleCount,
}

impl AnalysisResult {
    /// Sample extremes after subtracting `offset`
    ///
    /// An empty analysis yields an empty range so it never contributes to a
    /// pooled peak.
    pub fn centered(&self, offset: f64) -> PeakRange {
        if self.count == 0 {
            return PeakRange::empty();
        }
        PeakRange {
            min: f64::from(self.min) - offset,
            max: f64::from(self.max) - offset,
        }
    }
}

/// Extremes of a (possibly pooled) signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakRange {
    /// Most negative value
    pub min: f64,
    /// Most positive value
    pub max: f64,
}

impl PeakRange {
    /// Range containing nothing; the identity for `merge`
    pub fn empty() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Smallest range containing both
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Check if nothing was merged in
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Peak magnitude: `max(|min|, |max|)`, zero when empty
    pub fn extent(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.min.abs().max(self.max.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_across_blocks() {
        let mut stats = SampleStats::new();
        stats.add_block(&[-0.5, 0.25]);
        stats.add_block(&[0.5, -0.25]);
        stats.add_block(&[]);

        let result = stats.finish();
        assert_eq!(result.count, 4);
        assert_eq!(result.min, -0.5);
        assert_eq!(result.max, 0.5);
        assert_eq!(result.sum, 0.0);
        assert_eq!(result.offset, 0.0);
    }

    #[test]
    fn empty_stats_are_zero() {
        let result = SampleStats::new().finish();
        assert_eq!(result, AnalysisResult::default());
        assert!(result.centered(0.0).is_empty());
        assert_eq!(result.centered(0.0).extent(), 0.0);
    }

    #[test]
    fn offset_is_mean() {
        let mut stats = SampleStats::new();
        stats.add_block(&[0.1, 0.2, 0.3, 0.4]);
        let result = stats.finish();
        assert!((result.offset - 0.25).abs() < 1e-7);
    }

    #[test]
    fn dc_accumulation_is_stable_over_millions_of_samples() {
        let mut stats = SampleStats::new();
        let block = vec![0.1_f32; 4096];
        for _ in 0..1024 {
            stats.add_block(&block);
        }
        let result = stats.finish();
        assert_eq!(result.count, 4096 * 1024);
        assert!((result.offset - f64::from(0.1_f32)).abs() < 1e-9);
    }

    #[test]
    fn centered_range_and_extent() {
        let mut stats = SampleStats::new();
        stats.add_block(&[0.2, 0.6, 0.4]);
        let result = stats.finish();

        let range = result.centered(result.offset);
        assert!((range.min + 0.2).abs() < 1e-6);
        assert!((range.max - 0.2).abs() < 1e-6);
        assert!((range.extent() - 0.2).abs() < 1e-6);

        // Without DC removal the raw peak dominates
        assert!((result.centered(0.0).extent() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn merge_pools_extremes() {
        let left = PeakRange { min: -0.3, max: 0.2 };
        let right = PeakRange { min: -0.1, max: 0.7 };
        let pooled = PeakRange::empty().merge(left).merge(right);
        assert_eq!(pooled, PeakRange { min: -0.3, max: 0.7 });
        assert_eq!(pooled.extent(), 0.7);
    }
}
