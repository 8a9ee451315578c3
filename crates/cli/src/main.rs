//! `round-recon`: reconstruct round summaries for a directory of match files.

mod bootstrap;

use anyhow::{bail, Result};
use clap::Parser;
use rounds_batch::{discover_demos, BatchRunner};
use rounds_ingestion::JsonDumpDecoder;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "round-recon")]
#[command(
    about = "Reconstruct per-round summaries from decoded match telemetry",
    long_about = None
)]
struct Args {
    /// Match file or directory scanned recursively for match files
    #[arg(long)]
    input: PathBuf,

    /// JSON configuration file
    #[arg(long, env = "ROUND_RECON_CONFIG")]
    config: Option<PathBuf>,

    /// Worker threads (0 = one per core); overrides the configuration
    #[arg(long)]
    workers: Option<usize>,

    /// Output file for accepted round summaries
    #[arg(long, default_value = "rounds.json")]
    output: PathBuf,

    /// Output file for rejected matches and their reasons
    #[arg(long, default_value = "failed.json")]
    failures: PathBuf,

    /// Optional output file for the batch report
    #[arg(long)]
    report: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    bootstrap::setup_logging(&args.log_level);

    tracing::info!("round-recon v{} starting", env!("CARGO_PKG_VERSION"));

    let config = bootstrap::load_config(args.config.as_deref(), args.workers)?;

    let paths = discover_demos(&args.input, &config.batch.demo_extension);
    if paths.is_empty() {
        bail!(
            "no .{} match files found under {}",
            config.batch.demo_extension,
            args.input.display()
        );
    }
    tracing::info!("Discovered {} match files", paths.len());

    let runner = BatchRunner::from_config(Arc::new(JsonDumpDecoder::new()), &config)?;
    let output = runner.run(&paths);

    bootstrap::write_json(&args.output, &output.accepted)?;
    bootstrap::write_json(&args.failures, &output.rejections)?;
    if let Some(report) = &args.report {
        bootstrap::write_json(report, &output.report)?;
    }

    tracing::info!(
        "Wrote {} rounds to {} ({} matches failed, see {})",
        output.accepted.len(),
        args.output.display(),
        output.failed.len(),
        args.failures.display()
    );
    Ok(())
}
