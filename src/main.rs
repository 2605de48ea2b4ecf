//! CLI entry point for the visit rater.
//!
//! Provides subcommands for assessing dataset quality, producing the full
//! performance report, and running the weekly reporting loop.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use visit_rater::analytics::build_report;
use visit_rater::config::AssessConfig;
use visit_rater::loader::load_snapshot;
use visit_rater::quality::assess;
use visit_rater::report::{
    export_chart_data, export_performance_report, export_quality_report, run_timestamp,
};

#[derive(Parser)]
#[command(name = "visit_rater")]
#[command(about = "Healthcare visit data quality and performance reporting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Path to the visit dataset CSV
    #[arg(value_name = "CSV")]
    dataset: String,

    /// Optional JSON file with assessment configuration overrides
    #[arg(short, long)]
    config: Option<String>,

    /// Directory to write report artifacts to
    #[arg(short, long, default_value = "Reports")]
    output_dir: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Assess dataset quality and export the quality report
    Assess {
        #[command(flatten)]
        args: RunArgs,
    },
    /// Run the full pipeline: quality, aggregation, chart data, export
    Report {
        #[command(flatten)]
        args: RunArgs,
    },
    /// Run the full pipeline now, then repeat on a fixed interval
    Schedule {
        #[command(flatten)]
        args: RunArgs,

        /// Days between runs
        #[arg(long, default_value_t = 7)]
        interval_days: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/visit_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("visit_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Assess { args } => {
            run_once(&args, false)?;
        }
        Commands::Report { args } => {
            run_once(&args, true)?;
        }
        Commands::Schedule {
            args,
            interval_days,
        } => {
            run_scheduled(&args, interval_days).await;
        }
    }

    Ok(())
}

/// One full reporting run: load, assess, aggregate, export.
/// With `full` off, only the quality assessment is produced.
#[tracing::instrument(skip(args, full), fields(dataset = %args.dataset))]
fn run_once(args: &RunArgs, full: bool) -> Result<()> {
    let config = match &args.config {
        Some(path) => AssessConfig::load(path)?,
        None => AssessConfig::default(),
    };

    let snapshot = load_snapshot(&args.dataset)?;
    if snapshot.is_empty() {
        warn!(dataset = %args.dataset, "No records in snapshot; reports will be degenerate");
    }

    let quality = assess(&snapshot.records, &config, snapshot.loaded_at.date_naive());
    info!(
        records = snapshot.len(),
        overall_score = quality.overall_score,
        rating = %quality.rating,
        issues = quality.issues.len(),
        high_severity = quality.high_severity_count(),
        "Quality assessment complete"
    );

    let output_dir = Path::new(&args.output_dir);
    std::fs::create_dir_all(output_dir)?;
    let timestamp = run_timestamp(snapshot.loaded_at);

    export_quality_report(output_dir, &timestamp, &quality)?;

    if full {
        let performance = build_report(&snapshot.records);
        export_performance_report(output_dir, &timestamp, &performance)?;
        export_chart_data(output_dir, &timestamp, &performance)?;
        info!(
            months = performance.monthly.len(),
            departments = performance.departments.len(),
            "Performance report complete"
        );
    }

    info!(output_dir = %output_dir.display(), %timestamp, "Run finished");
    Ok(())
}

/// Runs the full pipeline immediately, then again every `interval_days`.
/// A failed run is logged and the loop keeps going.
async fn run_scheduled(args: &RunArgs, interval_days: u64) {
    info!(interval_days, "Scheduled reporting started. Press Ctrl+C to stop.");

    loop {
        if let Err(e) = run_once(args, true) {
            error!(error = %e, "Scheduled run failed");
        }

        info!(interval_days, "Waiting for next scheduled run");
        tokio::time::sleep(tokio::time::Duration::from_secs(interval_days * 86_400)).await;
    }
}
