//! File-level operations behind the `sonance` subcommands

use crate::error::{CliError, Result};
use serde::Serialize;
use sonance_audio::{decode_file, write_wav};
use sonance_core::{BatchCommand, EffectOutcome, EffectRegistry, ProgressReporter, Selection};
use sonance_normalize::{
    ApplyOutcome, NormalizeEffect, NormalizeReport, NormalizeSettings, Normalizer,
};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One `normalize` invocation
#[derive(Debug, Clone)]
pub struct NormalizeJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub settings: NormalizeSettings,
    pub selection: Selection,
    pub block_size: usize,
}

/// How a file-level run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Completed,
    Skipped,
    Cancelled,
}

/// Result of a file-level run, printed as text or JSON
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub input: PathBuf,
    /// `None` when nothing was written (cancelled)
    pub output: Option<PathBuf>,
    pub sample_rate: u32,
    pub channels: usize,
    pub frames: i64,
    pub status: RunStatus,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalize: Option<NormalizeReport>,
}

impl FileReport {
    /// Pretty-printed JSON form of the report
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable summary
    pub fn summary(&self) -> String {
        let status = match self.status {
            RunStatus::Completed => "completed",
            RunStatus::Skipped => "skipped",
            RunStatus::Cancelled => "cancelled",
        };
        let mut text = format!(
            "{}: {} ({} channel(s), {} frames at {} Hz)",
            self.input.display(),
            status,
            self.channels,
            self.frames,
            self.sample_rate
        );
        if let Some(message) = &self.message {
            text.push_str(&format!("\n  {}", message));
        }
        if let Some(report) = &self.normalize {
            for track in &report.tracks {
                for (index, correction) in track.corrections.iter().enumerate() {
                    text.push_str(&format!(
                        "\n  channel {}: offset {:+.6}, gain {:+.2} dB",
                        index + 1,
                        correction.offset,
                        correction.gain_db()
                    ));
                }
            }
        }
        if let Some(output) = &self.output {
            text.push_str(&format!("\n  -> {}", output.display()));
        }
        text
    }
}

/// Build a selection from optional frame bounds
pub fn selection_from_bounds(start: Option<i64>, end: Option<i64>) -> Result<Selection> {
    let start = start.unwrap_or(0);
    let end = end.unwrap_or(Selection::all().end);
    if start < 0 {
        return Err(CliError::InvalidSelection(format!(
            "start {} is negative",
            start
        )));
    }
    if end < start {
        return Err(CliError::InvalidSelection(format!(
            "end {} is before start {}",
            end, start
        )));
    }
    Ok(Selection::new(start, end))
}

/// Registry with every effect the CLI offers
pub fn build_registry(defaults: NormalizeSettings, block_size: usize) -> EffectRegistry {
    let mut registry = EffectRegistry::new();
    registry.register(NormalizeEffect::factory(defaults, block_size));
    registry
}

/// Decode `job.input`, normalize it and write `job.output` as WAV
///
/// A skipped run still writes the (unchanged) audio; a cancelled run writes
/// nothing.
pub fn normalize_file(job: &NormalizeJob, progress: &mut dyn ProgressReporter) -> Result<FileReport> {
    let decoded = decode_file(&job.input)?;
    let sample_rate = decoded.sample_rate;
    let channels = decoded.channel_count();
    let frames = decoded.frames();
    let mut tracks = vec![decoded.into_track()];

    let outcome = Normalizer::new(job.settings)
        .with_block_size(job.block_size)
        .apply(&mut tracks, job.selection, progress)?;

    let (status, normalize) = match outcome {
        ApplyOutcome::Completed(report) => (RunStatus::Completed, Some(report)),
        ApplyOutcome::Skipped => (RunStatus::Skipped, None),
        ApplyOutcome::Cancelled => (RunStatus::Cancelled, None),
    };

    let output = finish(&job.output, status, |path| {
        write_wav(path, &tracks[0], sample_rate)
    })?;

    Ok(FileReport {
        input: job.input.clone(),
        output,
        sample_rate,
        channels,
        frames,
        status,
        message: normalize.as_ref().map(NormalizeReport::summary),
        normalize,
    })
}

/// Run a registered effect by name with a parameter string
pub fn apply_file(
    registry: &EffectRegistry,
    command: &BatchCommand,
    input: &Path,
    output: &Path,
    selection: Selection,
    progress: &mut dyn ProgressReporter,
) -> Result<FileReport> {
    let decoded = decode_file(input)?;
    let sample_rate = decoded.sample_rate;
    let channels = decoded.channel_count();
    let frames = decoded.frames();
    let mut tracks = vec![decoded.into_track()];

    let outcome = command.execute(registry, &mut tracks, selection, progress)?;
    let (status, message) = match outcome {
        EffectOutcome::Completed { message } => (RunStatus::Completed, message),
        EffectOutcome::Skipped => (RunStatus::Skipped, None),
        EffectOutcome::Cancelled => (RunStatus::Cancelled, None),
    };

    let output = finish(output, status, |path| write_wav(path, &tracks[0], sample_rate))?;

    Ok(FileReport {
        input: input.to_path_buf(),
        output,
        sample_rate,
        channels,
        frames,
        status,
        message,
        normalize: None,
    })
}

fn finish<F>(output: &Path, status: RunStatus, write: F) -> Result<Option<PathBuf>>
where
    F: FnOnce(&Path) -> sonance_audio::Result<()>,
{
    if status == RunStatus::Cancelled {
        warn!("Cancelled; {} was not written", output.display());
        return Ok(None);
    }
    write(output)?;
    info!("Wrote {}", output.display());
    Ok(Some(output.to_path_buf()))
}

/// Registered effect as listed by `sonance effects`
#[derive(Debug, Clone, Serialize)]
pub struct EffectInfo {
    pub symbol: &'static str,
    pub description: &'static str,
    pub parameters: String,
}

/// Describe every registered effect with its default parameters
pub fn list_effects(registry: &EffectRegistry) -> Vec<EffectInfo> {
    registry
        .factories()
        .map(|factory| EffectInfo {
            symbol: factory.symbol,
            description: factory.description,
            parameters: (factory.create)().parameters().to_string(),
        })
        .collect()
}
