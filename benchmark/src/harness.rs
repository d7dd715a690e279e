// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Sweep harness: runs each variant's commands and collects measurements.
//!
//! Commands run through `sh -c` with stderr merged into stdout, since the
//! figures come from jsonmark's log lines. A failing command or a missing
//! figure aborts the sweep.

use std::process::Stdio;

use jsonmark_core::runner::shell_command;

use crate::config::SweepConfig;
use crate::error::{SweepError, SweepResult};
use crate::metrics::{LogPattern, SweepReport, VariantResult};

/// Runs a validated sweep roster.
pub struct SweepHarness {
    config: SweepConfig,
}

impl SweepHarness {
    pub fn new(config: SweepConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Run every variant in roster order.
    pub fn run(&self) -> SweepResult<SweepReport> {
        let mut report = SweepReport::new(self.config.iterations);
        for variant in &self.config.variants {
            let result = self.run_variant(variant)?;
            tracing::info!(
                variant = %result.variant,
                time_avg_secs = result.time_avg_secs,
                "Variant complete"
            );
            report.add_result(result);
        }
        Ok(report)
    }

    /// Time a variant `iterations` times, then profile it once.
    pub fn run_variant(&self, variant: &str) -> SweepResult<VariantResult> {
        let run_command = self.config.run_command_for(variant);
        let mut times = Vec::with_capacity(self.config.iterations as usize);

        for iteration in 1..=self.config.iterations {
            tracing::info!(variant, iteration, "Timing run");
            let output = self.capture(variant, &run_command)?;
            let secs = require(variant, LogPattern::DeserializeTime, &output)?;
            tracing::debug!(variant, iteration, secs, "Timing recorded");
            times.push(secs);
        }

        tracing::info!(variant, "Profiling run");
        let output = self.capture(variant, &self.config.profile_command_for(variant))?;
        let cpu = require(variant, LogPattern::CpuP95, &output)?;
        let mem = require(variant, LogPattern::MemP95, &output)?;

        Ok(VariantResult::new(variant, times, cpu, mem))
    }

    /// Run a command and return its combined output.
    fn capture(&self, variant: &str, command: &str) -> SweepResult<String> {
        tracing::debug!(variant, command, "Running sweep command");
        let mut cmd = shell_command(&format!("exec 2>&1\n{}", command));
        cmd.stdin(Stdio::null());
        if let Some(dir) = &self.config.workdir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|e| SweepError::Spawn {
            command: command.to_string(),
            source: e,
        })?;
        let text = String::from_utf8_lossy(&output.stdout).into_owned();

        if !output.status.success() {
            return Err(SweepError::CommandFailed {
                variant: variant.to_string(),
                command: command.to_string(),
                status: output.status.to_string(),
                output: text,
            });
        }
        Ok(text)
    }
}

fn require(variant: &str, pattern: LogPattern, output: &str) -> SweepResult<f64> {
    pattern
        .extract(output)
        .ok_or_else(|| SweepError::PatternMissing {
            variant: variant.to_string(),
            pattern: pattern.as_str(),
            output: output.to_string(),
        })
}
