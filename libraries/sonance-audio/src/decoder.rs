/// Audio file decoding using Symphonia
use crate::error::{AudioError, Result};
use sonance_core::{MemoryChannel, SampleCount, Track};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info, warn};

/// A fully decoded file: one in-memory channel per source channel
#[derive(Debug)]
pub struct DecodedAudio {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Decoded channels, named after the file stem
    pub track: Track,
}

impl DecodedAudio {
    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.track.channel_count()
    }

    /// Length in frames
    pub fn frames(&self) -> SampleCount {
        self.track.len()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// Take the decoded track
    pub fn into_track(self) -> Track {
        self.track
    }
}

/// Decode every packet of the default track of `path`
///
/// Channels are kept separate (no downmix). Integer formats are scaled to
/// `[-1.0, 1.0)` by Symphonia's sample conversion. Corrupt packets are
/// skipped with a warning.
///
/// # Errors
/// - `FileNotFound` if `path` does not exist
/// - `UnsupportedFormat` if no demuxer or codec recognizes the file
/// - `DecodeError` if the stream has no audio or changes channel layout
pub fn decode_file(path: &Path) -> Result<DecodedAudio> {
    if !path.exists() {
        return Err(AudioError::FileNotFound(path.display().to_string()));
    }

    let file = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Create a hint to help the format registry guess the format
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| probe_error(path, e))?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| AudioError::DecodeError("No audio tracks found".to_string()))?;

    let track_id = track.id;
    let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
    let declared_channels = track.codec_params.channels.map(|c| c.count());

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| probe_error(path, e))?;

    debug!(
        "Decoding {} ({} Hz, {:?} channels)",
        path.display(),
        sample_rate,
        declared_channels
    );

    let mut channels: Vec<Vec<f32>> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(e) => {
                return Err(AudioError::Symphonia(format!("Error reading packet: {}", e)));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                warn!("Skipping corrupt packet in {}: {}", path.display(), e);
                continue;
            }
            Err(e) => return Err(AudioError::DecodeError(e.to_string())),
        };

        let spec = *decoded.spec();
        let count = spec.channels.count();
        if channels.is_empty() {
            channels = vec![Vec::new(); count];
        } else if channels.len() != count {
            return Err(AudioError::DecodeError(format!(
                "channel count changed from {} to {} mid-stream",
                channels.len(),
                count
            )));
        }

        // Reallocate when a packet is larger than any seen so far
        let needs_alloc = match &sample_buf {
            Some(buf) => buf.capacity() < decoded.capacity() * count,
            None => true,
        };
        if needs_alloc {
            sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
        }

        if let Some(buf) = sample_buf.as_mut() {
            buf.copy_interleaved_ref(decoded);
            deinterleave(buf.samples(), &mut channels);
        }
    }

    if channels.is_empty() {
        match declared_channels {
            Some(count) if count > 0 => channels = vec![Vec::new(); count],
            _ => return Err(AudioError::DecodeError("No audio decoded".to_string())),
        }
    }

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio")
        .to_string();

    let track = Track::from_channels(
        name,
        channels
            .into_iter()
            .map(|samples| Box::new(MemoryChannel::new(samples)) as Box<dyn sonance_core::SampleChannel>)
            .collect(),
    );

    info!(
        "Decoded {}: {} channel(s), {} frames at {} Hz",
        path.display(),
        track.channel_count(),
        track.len(),
        sample_rate
    );

    Ok(DecodedAudio { sample_rate, track })
}

/// Append interleaved frames to per-channel buffers
fn deinterleave(interleaved: &[f32], channels: &mut [Vec<f32>]) {
    let count = channels.len();
    if count == 0 {
        return;
    }
    for frame in interleaved.chunks_exact(count) {
        for (channel, &sample) in channels.iter_mut().zip(frame) {
            channel.push(sample);
        }
    }
}

fn probe_error(path: &Path, err: SymphoniaError) -> AudioError {
    match err {
        SymphoniaError::Unsupported(what) => {
            AudioError::UnsupportedFormat(format!("{}: {}", path.display(), what))
        }
        other => AudioError::Symphonia(format!("Failed to probe {}: {}", path.display(), other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deinterleave_splits_frames() {
        let mut channels = vec![Vec::new(), Vec::new()];
        deinterleave(&[0.1, 0.2, 0.3, 0.4], &mut channels);
        deinterleave(&[0.5, 0.6], &mut channels);
        assert_eq!(channels[0], vec![0.1, 0.3, 0.5]);
        assert_eq!(channels[1], vec![0.2, 0.4, 0.6]);
    }

    #[test]
    fn missing_file_is_reported() {
        let result = decode_file(Path::new("/nonexistent/take.wav"));
        assert!(matches!(result, Err(AudioError::FileNotFound(_))));
    }

    #[test]
    fn duration_of_empty_audio() {
        let decoded = DecodedAudio {
            sample_rate: 0,
            track: Track::mono("x", vec![0.0; 10]),
        };
        assert_eq!(decoded.duration_secs(), 0.0);
        assert_eq!(decoded.frames(), 10);
    }
}
