// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `jsonmark` benchmark run - serialize, deserialize, verify, profile.

use std::time::Duration;

use jsonmark_core::checksum;
use jsonmark_core::profiler;
use jsonmark_core::{
    BenchmarkRegistry, CommandTemplate, CorpusFile, JsonmarkResult, ProcessRunner, ProfileError,
    Profiler, Substitutions, UsageError,
};
use tempfile::TempPath;

use crate::{Cli, ProfilerBackend};

pub fn execute(cli: &Cli) -> JsonmarkResult<()> {
    let registry = BenchmarkRegistry::builtin()?;
    let definition = registry.get(&cli.benchmark)?;

    // Usage errors surface before anything is generated or spawned
    let template = if cli.only_serialize {
        None
    } else {
        let raw = cli
            .deserializer_cmd
            .as_deref()
            .ok_or(UsageError::MissingCommand)?;
        let template = CommandTemplate::new(raw);
        template.check()?;
        Some(template)
    };

    tracing::info!("Running benchmark: {}", definition.name);
    tracing::info!("Using library for serialization: {}", cli.serializer);
    match &cli.cache_dir {
        Some(dir) => tracing::info!("Using cache directory: {}", dir.display()),
        None => tracing::info!(
            "Not using cache directory, a temporary corpus will be generated (use --cache-dir to speed up subsequent runs)"
        ),
    }

    let corpus = CorpusFile::resolve(definition, cli.serializer, cli.cache_dir.as_deref())?;
    corpus.materialize(definition, cli.serializer)?;

    let Some(template) = template else {
        return Ok(());
    };

    let profile_log = if cli.profile {
        Some(profile_log_path()?)
    } else {
        None
    };
    let profiler = profile_log.as_ref().map(|log| match cli.profiler {
        ProfilerBackend::Psrecord => Profiler::Psrecord {
            log: log.to_path_buf(),
        },
        ProfilerBackend::Sampler => Profiler::Sampler {
            log: log.to_path_buf(),
            interval: Duration::from_millis(cli.sample_interval_ms),
        },
    });

    let substitutions = Substitutions {
        filename: corpus.path(),
        benchmark: definition.name,
    };
    let outcome = ProcessRunner::new().run(&template, &substitutions, profiler.as_ref())?;

    checksum::validate(outcome.checksum_or_invalid(), definition.expected_checksum);

    let secs = outcome.elapsed.as_secs_f64();
    tracing::info!(
        "Deserialize time taken: {:.2}s ({:.2} lines/sec)",
        secs,
        definition.iterations as f64 / secs.max(f64::EPSILON)
    );

    if let Some(active) = &profiler {
        profiler::summarize(active.log_path())?.log();
    }

    Ok(())
}

fn profile_log_path() -> Result<TempPath, ProfileError> {
    tempfile::Builder::new()
        .prefix("jsonmark-profile-")
        .suffix(".log")
        .tempfile()
        .map(|file| file.into_temp_path())
        .map_err(|e| ProfileError::Io {
            context: "creating profile log",
            path: std::env::temp_dir(),
            source: e,
        })
}
