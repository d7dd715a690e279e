// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI tool to sweep every deserializer variant and tabulate the results.

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;
use jsonmark_benchmark::{markdown_table, JsonReporter, SweepHarness, SweepLoader};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "run_sweep")]
#[command(about = "Run every jsonmark variant in a roster and compare against the baseline")]
struct Args {
    /// Sweep roster file
    #[arg(short, long, default_value = "sweep.yaml")]
    config: PathBuf,

    /// Output directory for JSON reports
    #[arg(short, long, default_value = "data")]
    output: PathBuf,

    /// Timing runs per variant (overrides the roster)
    #[arg(short, long)]
    iterations: Option<u32>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let mut config = SweepLoader::load_file(&args.config)?;
    if let Some(iterations) = args.iterations {
        config = config.with_iterations(iterations)?;
    }
    let harness = SweepHarness::new(config);
    tracing::info!(
        config = %args.config.display(),
        variants = harness.config().variants.len(),
        iterations = harness.config().iterations,
        "Starting sweep"
    );

    let reporter = JsonReporter::new(&args.output)?;
    let report = harness.run()?;
    if let Some(baseline) = report.baseline() {
        tracing::info!(
            "Baseline {}: {:.2}s average",
            baseline.variant,
            baseline.time_avg_secs
        );
    }

    print!("{}", markdown_table(&report));

    let path = reporter.save(&report)?;
    tracing::info!("Sweep report saved to: {}", path.display());

    Ok(())
}
