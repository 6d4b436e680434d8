/// Sonance - peak and DC-offset normalization from the command line
use clap::{Args, Parser, Subcommand};
use sonance_cli::config::parse_block_size;
use sonance_cli::{
    apply_file, build_registry, list_effects, normalize_file, selection_from_bounds, CliConfig,
    FileReport, NormalizeJob,
};
use sonance_core::{BatchCommand, CancellableProgress};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sonance")]
#[command(about = "Normalize audio files and run Sonance effects", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./sonance.toml if present)
    #[arg(short, long, global = true, env = "SONANCE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize the peak level and remove DC offset
    Normalize {
        /// Input audio file
        input: PathBuf,
        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,
        /// Target peak level in dBFS (-145 to 0)
        #[arg(short, long, allow_hyphen_values = true)]
        level: Option<f64>,
        /// Do not change the peak level
        #[arg(long)]
        no_gain: bool,
        /// Do not remove DC offset
        #[arg(long)]
        no_dc: bool,
        /// Normalize each channel separately
        #[arg(long)]
        stereo_independent: bool,
        #[command(flatten)]
        run: RunArgs,
    },
    /// Run a registered effect with a parameter string
    Apply {
        /// Input audio file
        input: PathBuf,
        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,
        /// Effect name (see `sonance effects`)
        #[arg(long)]
        command: String,
        /// Parameters, e.g. "PeakLevel=-3 RemoveDcOffset=false"
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        params: String,
        #[command(flatten)]
        run: RunArgs,
    },
    /// List registered effects and their default parameters
    Effects {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Options shared by commands that process a file
#[derive(Args)]
struct RunArgs {
    /// First frame of the selection
    #[arg(long)]
    start: Option<i64>,
    /// One past the last frame of the selection
    #[arg(long)]
    end: Option<i64>,
    /// Samples per processing block
    #[arg(long, value_parser = parse_block_size)]
    block_size: Option<usize>,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = CliConfig::load(cli.config.as_deref())?;
    config.validate()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Normalize {
            input,
            output,
            level,
            no_gain,
            no_dc,
            stereo_independent,
            run,
        } => {
            let mut settings = config.normalize;
            if let Some(level) = level {
                settings.peak_level_db = level;
            }
            settings.apply_gain &= !no_gain;
            settings.remove_dc &= !no_dc;
            settings.stereo_independent |= stereo_independent;
            settings.validate()?;

            let job = NormalizeJob {
                input,
                output,
                settings,
                selection: selection_from_bounds(run.start, run.end)?,
                block_size: run.block_size.unwrap_or(config.processing.block_size),
            };

            let mut progress = CancellableProgress::new();
            let report = normalize_file(&job, &mut progress)?;
            print_report(&report, run.json)?;
        }
        Commands::Apply {
            input,
            output,
            command,
            params,
            run,
        } => {
            let block_size = run.block_size.unwrap_or(config.processing.block_size);
            let registry = build_registry(config.normalize, block_size);
            let batch = BatchCommand::new(command, params);

            let mut progress = CancellableProgress::new();
            let report = apply_file(
                &registry,
                &batch,
                &input,
                &output,
                selection_from_bounds(run.start, run.end)?,
                &mut progress,
            )?;
            print_report(&report, run.json)?;
        }
        Commands::Effects { json } => {
            let registry = build_registry(config.normalize, config.processing.block_size);
            let effects = list_effects(&registry);
            if json {
                println!("{}", serde_json::to_string_pretty(&effects)?);
            } else {
                for effect in effects {
                    println!("{:<12} {}", effect.symbol, effect.description);
                    println!("{:<12} {}", "", effect.parameters);
                }
            }
        }
    }

    Ok(())
}

fn print_report(report: &FileReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", report.summary());
    }
    Ok(())
}
