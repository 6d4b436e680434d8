//! Two-pass peak and DC-offset normalization
//!
//! For every track (or every channel, in stereo-independent mode) the
//! normalizer streams the selection once to gather statistics, derives an
//! offset and a gain, then streams it again rewriting each sample as
//! `(sample - offset) * multiplier`.
//!
//! Tracks are processed strictly one after another. Channels that share a
//! gain are all analyzed before any of them is rewritten.

use crate::analysis::{AnalysisResult, PeakRange, SampleStats};
use crate::error::{NormalizeError, Result};
use crate::settings::NormalizeSettings;
use crate::DEFAULT_BLOCK_SIZE;
use serde::Serialize;
use sonance_core::{
    ProgressControl, ProgressReporter, SampleChannel, SampleCount, Selection, Track,
};
use tracing::{debug, info, trace, warn};

/// Offset and gain applied to one channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Correction {
    /// Value subtracted from every sample
    pub offset: f64,
    /// Factor applied after the offset
    pub multiplier: f64,
}

impl Correction {
    /// Correction that changes nothing
    pub const IDENTITY: Self = Self {
        offset: 0.0,
        multiplier: 1.0,
    };

    /// Check if applying this correction would leave samples unchanged
    pub fn is_identity(&self) -> bool {
        self.offset == 0.0 && self.multiplier == 1.0
    }

    /// Correct a single sample
    #[inline]
    pub fn apply(&self, sample: f32) -> f32 {
        ((f64::from(sample) - self.offset) * self.multiplier) as f32
    }

    /// Correct a block of samples in place
    pub fn apply_block(&self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = self.apply(*sample);
        }
    }

    /// Gain in dB (for logging)
    pub fn gain_db(&self) -> f64 {
        20.0 * self.multiplier.log10()
    }
}

/// What happened to one track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackReport {
    /// Track name
    pub name: String,
    /// Correction derived for each channel, in channel order
    pub corrections: Vec<Correction>,
    /// Whether any sample of the track was rewritten
    pub rewritten: bool,
}

/// Summary of a completed normalization
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizeReport {
    /// One entry per processed track, in order
    pub tracks: Vec<TrackReport>,
}

impl NormalizeReport {
    /// Number of tracks that had samples rewritten
    pub fn rewritten_tracks(&self) -> usize {
        self.tracks.iter().filter(|t| t.rewritten).count()
    }

    /// One-line summary for status display
    pub fn summary(&self) -> String {
        format!(
            "Normalized {} of {} track(s)",
            self.rewritten_tracks(),
            self.tracks.len()
        )
    }
}

/// How an apply call ended (errors are reported separately)
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// Every track was analyzed and, where needed, rewritten
    Completed(NormalizeReport),
    /// Nothing was requested or the selection is empty; nothing was touched
    Skipped,
    /// Cancelled by the host; blocks already rewritten stay rewritten
    Cancelled,
}

/// Per-invocation processing phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Analyzing,
    Deriving,
    Rewriting,
    Done,
}

/// Converts sample counts into progress fractions for the host
struct ProgressMeter<'a> {
    reporter: &'a mut dyn ProgressReporter,
    total: SampleCount,
    done: SampleCount,
}

impl<'a> ProgressMeter<'a> {
    fn new(reporter: &'a mut dyn ProgressReporter, total: SampleCount) -> Self {
        Self {
            reporter,
            total,
            done: 0,
        }
    }

    fn advance(&mut self, samples: SampleCount) -> ProgressControl {
        self.done = (self.done + samples).min(self.total);
        let fraction = if self.total > 0 {
            self.done as f64 / self.total as f64
        } else {
            1.0
        };
        self.reporter.report(fraction)
    }

    fn status(&mut self, message: &str) {
        self.reporter.status(message);
    }
}

/// State owned by a single apply call
struct Run<'a> {
    meter: ProgressMeter<'a>,
    buffer: Vec<f32>,
    phase: Phase,
}

impl Run<'_> {
    fn enter(&mut self, phase: Phase) {
        trace!("Normalize phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }
}

enum GroupStep {
    Done {
        corrections: Vec<Correction>,
        rewritten: bool,
    },
    Cancelled,
}

/// Peak and DC-offset normalizer
///
/// # Example
///
/// ```rust
/// use sonance_core::{NullProgress, Selection, Track};
/// use sonance_normalize::{NormalizeSettings, Normalizer};
///
/// let mut tracks = vec![Track::stereo("Mix", vec![0.1, -0.2], vec![0.4, -0.1])];
/// let normalizer = Normalizer::new(NormalizeSettings::default()).with_block_size(4096);
/// normalizer.apply(&mut tracks, Selection::all(), &mut NullProgress).unwrap();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    settings: NormalizeSettings,
    block_size: usize,
}

impl Normalizer {
    /// Create a normalizer with the default block size
    pub fn new(settings: NormalizeSettings) -> Self {
        Self {
            settings,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    /// Override the streaming block size (clamped to at least 1)
    #[must_use]
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    /// Settings this normalizer applies
    pub fn settings(&self) -> &NormalizeSettings {
        &self.settings
    }

    /// Streaming block size in samples
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Check whether applying to `selection` would be a no-op
    pub fn should_skip(&self, selection: Selection) -> bool {
        self.settings.is_noop() || selection.is_empty()
    }

    /// Verify that jointly processed channels line up over the selection
    ///
    /// Always succeeds in stereo-independent mode.
    pub fn check_tracks(&self, tracks: &[Track], selection: Selection) -> Result<()> {
        if self.settings.stereo_independent {
            return Ok(());
        }
        for track in tracks {
            let mut lengths = track
                .channels()
                .iter()
                .map(|channel| selection.clamp_to(channel.len()).len());
            if let Some(expected) = lengths.next() {
                if let Some(found) = lengths.find(|&len| len != expected) {
                    return Err(NormalizeError::ChannelMismatch {
                        track: track.name().to_string(),
                        expected,
                        found,
                    });
                }
            }
        }
        Ok(())
    }

    /// Derive one correction per analysis, sharing a single gain
    ///
    /// The gain brings the largest DC-centered peak across all analyses to
    /// the target level. Silence (zero extent) gets no gain.
    pub fn derive(&self, analyses: &[AnalysisResult]) -> Vec<Correction> {
        let offsets: Vec<f64> = analyses
            .iter()
            .map(|analysis| {
                if self.settings.remove_dc {
                    analysis.offset
                } else {
                    0.0
                }
            })
            .collect();

        let multiplier = if self.settings.apply_gain {
            let pooled = analyses
                .iter()
                .zip(&offsets)
                .fold(PeakRange::empty(), |pooled, (analysis, &offset)| {
                    pooled.merge(analysis.centered(offset))
                });
            let extent = pooled.extent();
            if extent > 0.0 {
                self.settings.target_amplitude() / extent
            } else {
                debug!("Selection is silent; gain left at unity");
                1.0
            }
        } else {
            1.0
        };

        offsets
            .into_iter()
            .map(|offset| Correction { offset, multiplier })
            .collect()
    }

    /// Normalize `selection` of every track in place
    ///
    /// # Errors
    /// - `InvalidSettings` if the target level is out of range
    /// - `ChannelMismatch` if joint channels differ in selected length
    ///   (checked for all tracks before anything is read)
    /// - `Io` if a block read or write fails; blocks already written stay
    ///   written
    pub fn apply(
        &self,
        tracks: &mut [Track],
        selection: Selection,
        progress: &mut dyn ProgressReporter,
    ) -> Result<ApplyOutcome> {
        self.settings.validate()?;

        if self.should_skip(selection) {
            debug!("Nothing to normalize in {}; skipping", selection);
            return Ok(ApplyOutcome::Skipped);
        }

        self.check_tracks(tracks, selection)?;

        // Every selected sample is visited twice: once to analyze, once to rewrite
        let total: SampleCount = tracks
            .iter()
            .flat_map(|track| track.channels())
            .map(|channel| selection.clamp_to(channel.len()).len() * 2)
            .sum();

        info!(
            "Normalizing {} track(s) over {} to {:.2} dB (gain: {}, dc: {}, independent: {})",
            tracks.len(),
            selection,
            self.settings.peak_level_db,
            self.settings.apply_gain,
            self.settings.remove_dc,
            self.settings.stereo_independent
        );

        let mut run = Run {
            meter: ProgressMeter::new(progress, total),
            buffer: vec![0.0; self.buffer_len(tracks, selection)],
            phase: Phase::Idle,
        };
        let mut report = NormalizeReport::default();

        for track in tracks.iter_mut() {
            match self.process_track(track, selection, &mut run) {
                Ok(Some(track_report)) => report.tracks.push(track_report),
                Ok(None) => {
                    run.enter(Phase::Done);
                    info!("Normalization cancelled while processing '{}'", track.name());
                    return Ok(ApplyOutcome::Cancelled);
                }
                Err(err) => {
                    warn!("Normalization of '{}' failed: {}", track.name(), err);
                    return Err(err);
                }
            }
        }

        run.enter(Phase::Done);
        info!("{}", report.summary());
        Ok(ApplyOutcome::Completed(report))
    }

    /// Process one track; `None` means cancelled
    fn process_track(
        &self,
        track: &mut Track,
        selection: Selection,
        run: &mut Run<'_>,
    ) -> Result<Option<TrackReport>> {
        let name = track.name().to_string();
        let channels = track.channels_mut();
        let ranges: Vec<Selection> = channels
            .iter()
            .map(|channel| selection.clamp_to(channel.len()))
            .collect();

        let group_size = if self.settings.stereo_independent {
            1
        } else {
            channels.len().max(1)
        };
        let group_count = channels.len().div_ceil(group_size);

        let mut corrections = Vec::with_capacity(channels.len());
        let mut rewritten = false;

        for (index, (group, group_ranges)) in channels
            .chunks_mut(group_size)
            .zip(ranges.chunks(group_size))
            .enumerate()
        {
            let label = if group_count > 1 {
                format!("{} (channel {} of {})", name, index + 1, group_count)
            } else {
                name.clone()
            };

            match self.process_group(group, group_ranges, &label, run)? {
                GroupStep::Done {
                    corrections: group_corrections,
                    rewritten: group_rewritten,
                } => {
                    corrections.extend(group_corrections);
                    rewritten |= group_rewritten;
                }
                GroupStep::Cancelled => return Ok(None),
            }
        }

        Ok(Some(TrackReport {
            name,
            corrections,
            rewritten,
        }))
    }

    /// Analyze every channel of a group, then rewrite them with a shared gain
    fn process_group(
        &self,
        channels: &mut [Box<dyn SampleChannel>],
        ranges: &[Selection],
        label: &str,
        run: &mut Run<'_>,
    ) -> Result<GroupStep> {
        run.enter(Phase::Analyzing);
        run.meter.status(&format!("Analyzing: {}", label));

        let mut analyses = Vec::with_capacity(channels.len());
        for (channel, range) in channels.iter().zip(ranges) {
            match self.analyze_channel(channel.as_ref(), *range, run)? {
                Some(analysis) => analyses.push(analysis),
                None => return Ok(GroupStep::Cancelled),
            }
        }

        run.enter(Phase::Deriving);
        let corrections = self.derive(&analyses);
        for (analysis, correction) in analyses.iter().zip(&corrections) {
            debug!(
                "{}: offset {:.6}, peak {:.6}..{:.6} over {} samples -> gain {:.2} dB",
                label,
                correction.offset,
                analysis.min,
                analysis.max,
                analysis.count,
                correction.gain_db()
            );
        }

        run.enter(Phase::Rewriting);
        let mut rewritten = false;
        for ((channel, range), correction) in channels.iter_mut().zip(ranges).zip(&corrections) {
            if correction.is_identity() || range.is_empty() {
                if run.meter.advance(range.len()).is_cancel() {
                    return Ok(GroupStep::Cancelled);
                }
                continue;
            }

            if !rewritten {
                run.meter.status(&format!("Normalizing: {}", label));
            }
            if !self.rewrite_channel(channel.as_mut(), *range, *correction, run)? {
                return Ok(GroupStep::Cancelled);
            }
            rewritten = true;
        }

        Ok(GroupStep::Done {
            corrections,
            rewritten,
        })
    }

    /// Blocks never exceed our buffer or the storage's preferred size
    fn block_len(&self, channel: &dyn SampleChannel) -> usize {
        self.block_size.min(channel.max_block_size().max(1))
    }

    /// Largest block any selected channel will use
    fn buffer_len(&self, tracks: &[Track], selection: Selection) -> usize {
        tracks
            .iter()
            .flat_map(|track| track.channels())
            .map(|channel| {
                let selected = selection.clamp_to(channel.len()).len();
                let selected = usize::try_from(selected).unwrap_or(usize::MAX);
                self.block_len(channel.as_ref()).min(selected)
            })
            .max()
            .unwrap_or(0)
    }

    /// First pass over one channel; `None` means cancelled
    fn analyze_channel(
        &self,
        channel: &dyn SampleChannel,
        range: Selection,
        run: &mut Run<'_>,
    ) -> Result<Option<AnalysisResult>> {
        let block_len = self.block_len(channel);
        let mut stats = SampleStats::new();
        let mut position = range.start;

        while position < range.end {
            let remaining = usize::try_from(range.end - position).unwrap_or(usize::MAX);
            let len = block_len.min(remaining);
            let block = &mut run.buffer[..len];

            channel.read_block(position, block)?;
            stats.add_block(block);
            position += len as SampleCount;

            if run.meter.advance(len as SampleCount).is_cancel() {
                return Ok(None);
            }
        }

        Ok(Some(stats.finish()))
    }

    /// Second pass over one channel; `false` means cancelled
    fn rewrite_channel(
        &self,
        channel: &mut dyn SampleChannel,
        range: Selection,
        correction: Correction,
        run: &mut Run<'_>,
    ) -> Result<bool> {
        let block_len = self.block_len(channel);
        let mut position = range.start;

        while position < range.end {
            let remaining = usize::try_from(range.end - position).unwrap_or(usize::MAX);
            let len = block_len.min(remaining);
            let block = &mut run.buffer[..len];

            channel.read_block(position, block)?;
            correction.apply_block(block);
            channel.write_block(position, block)?;
            position += len as SampleCount;

            if run.meter.advance(len as SampleCount).is_cancel() {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonance_core::NullProgress;

    fn samples(track: &Track, channel: usize) -> Vec<f32> {
        track.channel(channel).unwrap().to_vec().unwrap()
    }

    fn gain_only(level_db: f64) -> NormalizeSettings {
        NormalizeSettings {
            peak_level_db: level_db,
            apply_gain: true,
            remove_dc: false,
            stereo_independent: false,
        }
    }

    #[test]
    fn scenario_minus_six_db() {
        let mut tracks = vec![Track::mono("A", vec![-0.5, 0.25, 0.5, -0.25])];
        let outcome = Normalizer::new(gain_only(-6.0))
            .apply(&mut tracks, Selection::all(), &mut NullProgress)
            .unwrap();

        let report = match outcome {
            ApplyOutcome::Completed(report) => report,
            other => panic!("expected completion, got {:?}", other),
        };
        let correction = report.tracks[0].corrections[0];
        assert_eq!(correction.offset, 0.0);
        assert!((correction.multiplier - 1.002374).abs() < 1e-5);

        let expected = [-0.501187, 0.250594, 0.501187, -0.250594];
        for (actual, expected) in samples(&tracks[0], 0).iter().zip(expected) {
            assert!((actual - expected).abs() < 1e-5, "{} vs {}", actual, expected);
        }
    }

    #[test]
    fn derive_without_gain_keeps_unity() {
        let settings = NormalizeSettings {
            apply_gain: false,
            ..NormalizeSettings::default()
        };
        let analysis = AnalysisResult {
            offset: 0.1,
            min: -0.2,
            max: 0.4,
            sum: 0.4,
            count: 4,
        };
        let corrections = Normalizer::new(settings).derive(&[analysis]);
        assert_eq!(corrections[0].multiplier, 1.0);
        assert_eq!(corrections[0].offset, 0.1);
    }

    #[test]
    fn derive_pools_gain_but_not_offset() {
        let normalizer = Normalizer::new(NormalizeSettings {
            peak_level_db: 0.0,
            ..NormalizeSettings::default()
        });
        let left = AnalysisResult {
            offset: 0.1,
            min: -0.1,
            max: 0.3,
            sum: 0.0,
            count: 10,
        };
        let right = AnalysisResult {
            offset: -0.2,
            min: -0.6,
            max: 0.0,
            sum: 0.0,
            count: 10,
        };

        let corrections = normalizer.derive(&[left, right]);
        assert_eq!(corrections[0].offset, 0.1);
        assert_eq!(corrections[1].offset, -0.2);
        // Right channel: |-0.6 - (-0.2)| = 0.4 is the largest centered peak
        let expected = 1.0 / 0.4;
        assert!((corrections[0].multiplier - expected).abs() < 1e-6);
        assert_eq!(corrections[0].multiplier, corrections[1].multiplier);
    }

    #[test]
    fn empty_channels_do_not_affect_pooled_gain() {
        let normalizer = Normalizer::new(gain_only(0.0));
        let silent_empty = AnalysisResult::default();
        let loud = AnalysisResult {
            offset: 0.0,
            min: -0.5,
            max: 0.25,
            sum: 0.0,
            count: 2,
        };
        let corrections = normalizer.derive(&[silent_empty, loud]);
        assert!((corrections[1].multiplier - 2.0).abs() < 1e-9);
    }

    #[test]
    fn skip_checks() {
        let normalizer = Normalizer::new(NormalizeSettings::default());
        assert!(normalizer.should_skip(Selection::new(5, 5)));
        assert!(!normalizer.should_skip(Selection::new(0, 5)));

        let noop = Normalizer::new(NormalizeSettings {
            apply_gain: false,
            remove_dc: false,
            ..NormalizeSettings::default()
        });
        assert!(noop.should_skip(Selection::all()));
    }

    #[test]
    fn invalid_level_is_rejected_before_any_work() {
        let mut tracks = vec![Track::mono("A", vec![0.5; 4])];
        let result = Normalizer::new(gain_only(3.0)).apply(
            &mut tracks,
            Selection::all(),
            &mut NullProgress,
        );
        assert!(matches!(result, Err(NormalizeError::InvalidSettings(_))));
        assert_eq!(samples(&tracks[0], 0), vec![0.5; 4]);
    }

    #[test]
    fn block_size_is_clamped_by_storage() {
        let normalizer = Normalizer::new(NormalizeSettings::default()).with_block_size(1024);
        let channel = sonance_core::MemoryChannel::new(vec![0.0; 8]).with_max_block_size(16);
        assert_eq!(normalizer.block_len(&channel), 16);
        assert_eq!(Normalizer::new(NormalizeSettings::default()).with_block_size(0).block_size(), 1);
    }

    #[test]
    fn buffer_is_bounded_by_selected_samples() {
        let normalizer =
            Normalizer::new(NormalizeSettings::default()).with_block_size(usize::MAX / 8);
        let tracks = vec![
            Track::mono("A", vec![0.0; 4]),
            Track::mono("B", vec![0.0; 10]),
        ];
        assert_eq!(normalizer.buffer_len(&tracks, Selection::all()), 10);
        assert_eq!(normalizer.buffer_len(&tracks, Selection::new(2, 7)), 5);
        assert_eq!(normalizer.buffer_len(&[], Selection::all()), 0);
    }

    #[test]
    fn huge_block_size_on_tiny_track() {
        let mut tracks = vec![Track::mono("A", vec![0.5, -0.25, 0.1, 0.0])];
        let outcome = Normalizer::new(gain_only(0.0))
            .with_block_size(usize::MAX / 8)
            .apply(&mut tracks, Selection::all(), &mut NullProgress)
            .unwrap();

        assert!(matches!(outcome, ApplyOutcome::Completed(_)));
        assert_eq!(samples(&tracks[0], 0), vec![1.0, -0.5, 0.2, 0.0]);
    }

    #[test]
    fn correction_apply() {
        let correction = Correction {
            offset: 0.25,
            multiplier: 2.0,
        };
        let mut block = [0.25_f32, 0.75, -0.25];
        correction.apply_block(&mut block);
        assert_eq!(block, [0.0, 1.0, -1.0]);
        assert!(Correction::IDENTITY.is_identity());
        assert!((Correction::IDENTITY.gain_db()).abs() < 1e-12);
    }

    #[test]
    fn report_summary() {
        let report = NormalizeReport {
            tracks: vec![
                TrackReport {
                    name: "A".into(),
                    corrections: vec![Correction::IDENTITY],
                    rewritten: false,
                },
                TrackReport {
                    name: "B".into(),
                    corrections: vec![Correction::IDENTITY],
                    rewritten: true,
                },
            ],
        };
        assert_eq!(report.rewritten_tracks(), 1);
        assert_eq!(report.summary(), "Normalized 1 of 2 track(s)");
    }
}
