//! End-to-end tests of the file-level commands

use sonance_cli::{
    apply_file, build_registry, normalize_file, selection_from_bounds, CliError, NormalizeJob,
    RunStatus,
};
use sonance_core::{BatchCommand, CancellableProgress, CoreError, NullProgress, Selection};
use sonance_normalize::{db_to_linear, NormalizeSettings};
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a mono 16-bit WAV with a DC bias
fn create_test_wav(path: &Path, frames: usize) {
    use hound::{WavSpec, WavWriter};

    let spec = WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        let phase = 2.0 * std::f32::consts::PI * 8.0 * i as f32 / frames as f32;
        let sample = 0.25 * phase.sin() + 0.1;
        writer.write_sample((sample * 32768.0) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

fn read_wav(path: &Path) -> Vec<f32> {
    hound::WavReader::open(path)
        .unwrap()
        .samples::<f32>()
        .map(|s| s.unwrap())
        .collect()
}

fn job(dir: &TempDir, settings: NormalizeSettings) -> NormalizeJob {
    let input = dir.path().join("in.wav");
    create_test_wav(&input, 16000);
    NormalizeJob {
        input,
        output: dir.path().join("out.wav"),
        settings,
        selection: Selection::all(),
        block_size: 4096,
    }
}

#[test]
fn test_normalize_file_hits_target_and_removes_dc() {
    let dir = TempDir::new().unwrap();
    let job = job(
        &dir,
        NormalizeSettings {
            peak_level_db: -3.0,
            ..NormalizeSettings::default()
        },
    );

    let report = normalize_file(&job, &mut NullProgress).unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.channels, 1);
    assert_eq!(report.frames, 16000);
    assert_eq!(report.output.as_deref(), Some(job.output.as_path()));
    assert_eq!(report.message.as_deref(), Some("Normalized 1 of 1 track(s)"));

    let samples = read_wav(&job.output);
    let mean = samples.iter().map(|&s| f64::from(s)).sum::<f64>() / samples.len() as f64;
    let peak = samples.iter().fold(0.0_f32, |acc, s| acc.max(s.abs()));
    assert!(mean.abs() < 1e-5);
    assert!((peak - db_to_linear(-3.0) as f32).abs() < 1e-5);
}

#[test]
fn test_cancelled_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let job = job(&dir, NormalizeSettings::default());

    let mut progress = CancellableProgress::new();
    progress.cancel();
    let report = normalize_file(&job, &mut progress).unwrap();

    assert_eq!(report.status, RunStatus::Cancelled);
    assert!(report.output.is_none());
    assert!(!job.output.exists());
}

#[test]
fn test_skipped_run_copies_audio() {
    let dir = TempDir::new().unwrap();
    let job = job(
        &dir,
        NormalizeSettings {
            apply_gain: false,
            remove_dc: false,
            ..NormalizeSettings::default()
        },
    );

    let report = normalize_file(&job, &mut NullProgress).unwrap();

    assert_eq!(report.status, RunStatus::Skipped);
    assert!(report.normalize.is_none());
    assert_eq!(read_wav(&job.output).len(), 16000);
}

#[test]
fn test_report_serializes_to_json() {
    let dir = TempDir::new().unwrap();
    let job = job(&dir, NormalizeSettings::default());
    let report = normalize_file(&job, &mut NullProgress).unwrap();

    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    assert_eq!(json["status"], "completed");
    assert_eq!(json["sample_rate"], 16000);
    assert_eq!(json["normalize"]["tracks"][0]["rewritten"], true);
    assert!(report.summary().contains("channel 1: offset"));
}

#[test]
fn test_apply_runs_batch_command() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    let output = dir.path().join("applied.wav");
    create_test_wav(&input, 8000);

    let registry = build_registry(NormalizeSettings::default(), 1024);
    let command = BatchCommand::new("normalize", "PeakLevel=0 RemoveDcOffset=no");
    let report = apply_file(
        &registry,
        &command,
        &input,
        &output,
        selection_from_bounds(Some(0), Some(4000)).unwrap(),
        &mut NullProgress,
    )
    .unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    let samples = read_wav(&output);
    let head_peak = samples[..4000].iter().fold(0.0_f32, |acc, s| acc.max(s.abs()));
    assert!((head_peak - 1.0).abs() < 1e-5);
}

#[test]
fn test_apply_unknown_effect_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.wav");
    create_test_wav(&input, 100);

    let registry = build_registry(NormalizeSettings::default(), 1024);
    let result = apply_file(
        &registry,
        &BatchCommand::new("Reverb", ""),
        &input,
        &dir.path().join("never.wav"),
        Selection::all(),
        &mut NullProgress,
    );

    assert!(matches!(
        result,
        Err(CliError::Core(CoreError::UnknownEffect(_)))
    ));
    assert!(!dir.path().join("never.wav").exists());
}

#[test]
fn test_missing_input_is_an_audio_error() {
    let dir = TempDir::new().unwrap();
    let job = NormalizeJob {
        input: dir.path().join("missing.wav"),
        output: dir.path().join("out.wav"),
        settings: NormalizeSettings::default(),
        selection: Selection::all(),
        block_size: 1024,
    };
    assert!(matches!(
        normalize_file(&job, &mut NullProgress),
        Err(CliError::Audio(_))
    ));
}
