//! `perf-report` - performance report and sample data CLI.
//!
//! ```bash
//! # Generate one synthetic trading day
//! perf-report generate --output data/sample_performance.csv --seed 42
//!
//! # Summary, metrics CSV and charts into results/
//! perf-report report --input data/sample_performance.csv --output-dir results
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use clap::{Parser, Subcommand};

use perf_analytics::config::{Config, load_config};
use perf_analytics::report::ReportGenerator;
use perf_analytics::sample::{SampleConfig, SampleGenerator};
use perf_analytics::source::{CsvRecordSource, write_records};
use perf_analytics::telemetry::{init_tracing, load_dotenv};

#[derive(Parser)]
#[command(name = "perf-report")]
#[command(about = "Rolling performance metrics for market-making logs", long_about = None)]
#[command(version)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute metrics and write the summary, metrics CSV and charts
    Report {
        /// Input CSV (defaults to source.path from the config)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory (defaults to report.output_dir from the config)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Rolling window in periods
        #[arg(short, long)]
        window: Option<usize>,

        /// Number of autocorrelation lags
        #[arg(long)]
        max_lag: Option<usize>,

        /// Skip SVG chart rendering
        #[arg(long, default_value = "false")]
        no_charts: bool,
    },

    /// Write a deterministic synthetic session to CSV
    Generate {
        /// Output CSV path
        #[arg(short, long, default_value = "data/sample_performance.csv")]
        output: PathBuf,

        /// Number of one-minute periods
        #[arg(short, long, default_value = "390")]
        periods: usize,

        /// RNG seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Timestamp of the first period (RFC 3339)
        #[arg(long)]
        start: Option<String>,
    },
}

fn main() -> Result<()> {
    load_dotenv();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    init_tracing(&config.observability.logging);

    match cli.command {
        Commands::Report {
            input,
            output_dir,
            window,
            max_lag,
            no_charts,
        } => run_report(config, input, output_dir, window, max_lag, no_charts),
        Commands::Generate {
            output,
            periods,
            seed,
            start,
        } => run_generate(&output, periods, seed, start.as_deref()),
    }
}

fn run_report(
    mut config: Config,
    input: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    window: Option<usize>,
    max_lag: Option<usize>,
    no_charts: bool,
) -> Result<()> {
    if let Some(window) = window {
        config.metrics.window = window;
    }
    if let Some(max_lag) = max_lag {
        config.metrics.max_lag = max_lag;
    }
    if no_charts {
        config.report.charts = false;
    }

    let input = input.unwrap_or_else(|| PathBuf::from(&config.source.path));
    let output_dir = output_dir.unwrap_or_else(|| PathBuf::from(&config.report.output_dir));

    let generator = ReportGenerator::new(config.metrics.to_params(), &config.report)
        .context("invalid metrics parameters")?;
    let artifacts = generator
        .generate(&CsvRecordSource::new(&input), &output_dir)
        .with_context(|| format!("failed to generate report from {}", input.display()))?;

    println!("{}", artifacts.summary_text);
    println!(
        "Report generated: {} files in {}",
        artifacts.files.len(),
        output_dir.display()
    );
    Ok(())
}

fn run_generate(output: &Path, periods: usize, seed: u64, start: Option<&str>) -> Result<()> {
    let start = match start {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("invalid --start timestamp '{raw}'"))?
            .with_timezone(&Utc),
        None => Utc
            .with_ymd_and_hms(2024, 1, 2, 9, 30, 0)
            .single()
            .context("invalid default start timestamp")?,
    };

    let records = SampleGenerator::new(SampleConfig::new(periods, seed, start))
        .context("invalid sample parameters")?
        .generate();
    write_records(output, &records)
        .with_context(|| format!("failed to write {}", output.display()))?;

    tracing::info!(
        path = %output.display(),
        periods,
        seed,
        "Sample session written"
    );
    println!("Wrote {} periods to {}", records.len(), output.display());
    Ok(())
}
