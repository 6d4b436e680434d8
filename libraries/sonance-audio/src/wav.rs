//! WAV output using hound

use crate::decoder::DecodedAudio;
use crate::error::{AudioError, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use sonance_core::Track;
use std::path::Path;
use tracing::info;

/// Write every channel of `track` to `path` as 32-bit float WAV
///
/// Channels shorter than the track are padded with silence.
pub fn write_wav(path: &Path, track: &Track, sample_rate: u32) -> Result<()> {
    if track.channel_count() == 0 {
        return Err(AudioError::InvalidTrack(format!(
            "'{}' has no channels",
            track.name()
        )));
    }
    let channel_count = u16::try_from(track.channel_count()).map_err(|_| {
        AudioError::InvalidTrack(format!(
            "'{}' has {} channels; WAV supports at most {}",
            track.name(),
            track.channel_count(),
            u16::MAX
        ))
    })?;

    let channels = track
        .channels()
        .iter()
        .map(|channel| channel.to_vec())
        .collect::<sonance_core::Result<Vec<_>>>()?;
    let frames = channels.iter().map(Vec::len).max().unwrap_or(0);

    let spec = WavSpec {
        channels: channel_count,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec)?;

    for frame in 0..frames {
        for channel in &channels {
            writer.write_sample(channel.get(frame).copied().unwrap_or(0.0))?;
        }
    }
    writer.finalize()?;

    info!(
        "Wrote {}: {} channel(s), {} frames at {} Hz",
        path.display(),
        channel_count,
        frames,
        sample_rate
    );
    Ok(())
}

impl DecodedAudio {
    /// Write the decoded (and possibly processed) audio back out as WAV
    pub fn write_wav(&self, path: &Path) -> Result<()> {
        write_wav(path, &self.track, self.sample_rate)
    }
}
