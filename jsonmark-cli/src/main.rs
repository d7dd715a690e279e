// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! jsonmark CLI
//!
//! Runs one JSON deserialization benchmark against an external deserializer.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::builder::PossibleValuesParser;
use clap::{Parser, ValueEnum};
use jsonmark_core::profiler::DEFAULT_SAMPLE_INTERVAL;
use jsonmark_core::{SerializerKind, BUILTIN_BENCHMARKS};
use tracing_subscriber::EnvFilter;

mod run;

/// Profiling backend selected with `--profiler`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProfilerBackend {
    /// Wrap the command with the external `psrecord` tool
    Psrecord,
    /// Sample the process tree in-process
    Sampler,
}

/// jsonmark - JSON deserialization benchmark orchestrator
///
/// DESERIALIZER_CMD is a shell command reading the corpus file named by the
/// "$FILENAME" placeholder, for example: "python json_deser.py $FILENAME".
/// "$BENCHMARK" is replaced by the benchmark name.
#[derive(Parser, Debug)]
#[command(name = "jsonmark")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Benchmark to run
    #[arg(long, value_parser = benchmark_names())]
    pub benchmark: String,

    /// Encoder used to write the corpus
    #[arg(long, value_enum, default_value_t = SerializerKind::Compact)]
    pub serializer: SerializerKind,

    /// Cache directory for the serialized corpus
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Exit after serializing without running DESERIALIZER_CMD
    #[arg(long)]
    pub only_serialize: bool,

    /// Profile CPU and memory usage
    #[arg(long)]
    pub profile: bool,

    /// Profiling backend used with --profile
    #[arg(long, value_enum, default_value = "psrecord")]
    pub profiler: ProfilerBackend,

    /// Sampling interval of the in-process profiler
    #[arg(
        long,
        default_value_t = DEFAULT_SAMPLE_INTERVAL.as_millis() as u64,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub sample_interval_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Deserializer command template
    #[arg(value_name = "DESERIALIZER_CMD")]
    pub deserializer_cmd: Option<String>,
}

fn benchmark_names() -> PossibleValuesParser {
    PossibleValuesParser::new(BUILTIN_BENCHMARKS.iter().map(|d| d.name))
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run::execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
