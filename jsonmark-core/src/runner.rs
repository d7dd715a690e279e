// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! External deserializer process management.
//!
//! A deserializer is any shell command line containing `$FILENAME` (and
//! optionally `$BENCHMARK`). The runner substitutes both, runs the command
//! through `sh -c`, waits for it by polling, and parses the single decimal
//! checksum it prints on stdout.
//!
//! Stdout is drained by a capture thread so a chatty child can never block on
//! a full pipe; the polling loop only deals with exit detection.

use std::borrow::Cow;
use std::io::Read;
use std::path::Path;
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::checksum::INVALID_CHECKSUM;
use crate::error::{JsonmarkResult, ProcessError, UsageError};
use crate::profiler::Profiler;

/// Replaced by the corpus file path. Required.
pub const FILENAME_PLACEHOLDER: &str = "$FILENAME";
/// Replaced by the benchmark name. Optional.
pub const BENCHMARK_PLACEHOLDER: &str = "$BENCHMARK";

/// Default interval between liveness checks.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);
/// Default interval between "still running" status lines.
const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_secs(5);

/// Quote a value for inclusion in a `sh -c` command line.
///
/// Values made only of characters the shell treats literally are returned
/// unchanged, everything else is single-quoted.
pub fn shell_quote(value: &str) -> Cow<'_, str> {
    let is_plain = !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"/._-+:,@%=".contains(&b));
    if is_plain {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(format!("'{}'", value.replace('\'', r"'\''")))
    }
}

/// Build a `sh -c <command>` invocation.
pub fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

/// Values substituted into a [`CommandTemplate`].
#[derive(Debug, Clone, Copy)]
pub struct Substitutions<'a> {
    pub filename: &'a Path,
    pub benchmark: &'a str,
}

/// Deserializer command line with placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate(String);

impl CommandTemplate {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fail if a required placeholder is absent.
    pub fn check(&self) -> Result<(), UsageError> {
        if !self.0.contains(FILENAME_PLACEHOLDER) {
            return Err(UsageError::MissingPlaceholder {
                placeholder: FILENAME_PLACEHOLDER,
            });
        }
        Ok(())
    }

    /// Substitute every placeholder occurrence with its quoted value.
    pub fn render(&self, substitutions: &Substitutions<'_>) -> Result<String, UsageError> {
        self.check()?;
        let filename = substitutions.filename.to_string_lossy();
        Ok(self
            .0
            .replace(FILENAME_PLACEHOLDER, &shell_quote(&filename))
            .replace(BENCHMARK_PLACEHOLDER, &shell_quote(substitutions.benchmark)))
    }
}

/// Where the checksum sits in the captured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputConvention {
    /// The whole trimmed output is the checksum.
    WholeOutput,
    /// A profiling wrapper may append output; the checksum is the first token.
    FirstToken,
}

/// Parse the checksum printed by a deserializer.
pub fn parse_checksum(output: &str, convention: OutputConvention) -> Option<i64> {
    let token = match convention {
        OutputConvention::WholeOutput => output.trim(),
        OutputConvention::FirstToken => output.split_whitespace().next()?,
    };
    token.parse().ok()
}

/// Result of one deserializer run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// `None` when stdout could not be parsed.
    pub checksum: Option<i64>,
    /// Raw captured standard output.
    pub stdout: String,
    /// Spawn to exit detection.
    pub elapsed: Duration,
    pub status: ExitStatus,
}

impl RunOutcome {
    /// Checksum with unparseable output mapped to [`INVALID_CHECKSUM`].
    pub fn checksum_or_invalid(&self) -> i64 {
        self.checksum.unwrap_or(INVALID_CHECKSUM)
    }
}

/// Runs deserializer commands one at a time.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    poll_interval: Duration,
    status_interval: Duration,
    cancel: Arc<AtomicBool>,
}

impl ProcessRunner {
    /// Create a runner with default intervals.
    pub fn new() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            status_interval: DEFAULT_STATUS_INTERVAL,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Set the interval between liveness checks.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the interval between status log lines.
    pub fn status_interval(mut self, interval: Duration) -> Self {
        self.status_interval = interval;
        self
    }

    /// Share a cancellation flag. Setting it kills the running child.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    /// Handle to the cancellation flag.
    pub fn cancellation(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Run a deserializer and collect its checksum and elapsed time.
    ///
    /// The template is checked before anything is spawned. Unparseable
    /// output is logged and reported as `checksum: None`, not as an error.
    pub fn run(
        &self,
        template: &CommandTemplate,
        substitutions: &Substitutions<'_>,
        profiler: Option<&Profiler>,
    ) -> JsonmarkResult<RunOutcome> {
        let rendered = template.render(substitutions)?;
        let (command, convention) = match profiler {
            Some(profiler) => (profiler.wrap(&rendered), OutputConvention::FirstToken),
            None => (rendered, OutputConvention::WholeOutput),
        };

        tracing::debug!(command = %command, "Spawning deserializer");
        let start = Instant::now();
        let mut child = shell_command(&command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| ProcessError::Spawn {
                command: command.clone(),
                source: e,
            })?;
        let pid = child.id();

        let sampler = match profiler.map(|p| p.attach(pid)).transpose() {
            Ok(sampler) => sampler.flatten(),
            Err(e) => {
                abandon(&mut child);
                return Err(e.into());
            }
        };
        let capture = match spawn_capture(child.stdout.take()) {
            Ok(capture) => capture,
            Err(e) => {
                abandon(&mut child);
                return Err(e.into());
            }
        };

        let status = self.wait(&mut child, start)?;
        let elapsed = start.elapsed();
        tracing::debug!(
            pid,
            status = %status,
            elapsed_ms = elapsed.as_millis(),
            "Deserializer exited"
        );

        if let Some(sampler) = sampler {
            match sampler.finish() {
                Ok(rows) => tracing::debug!(rows, "Resource sampler stopped"),
                Err(e) => tracing::warn!(error = %e, "Resource sampler failed"),
            }
        }

        let raw = capture
            .join()
            .map_err(|_| ProcessError::Capture {
                reason: "capture thread panicked".to_string(),
            })?
            .map_err(|e| ProcessError::Capture {
                reason: e.to_string(),
            })?;
        let stdout = String::from_utf8_lossy(&raw).into_owned();

        let checksum = parse_checksum(&stdout, convention);
        if checksum.is_none() {
            tracing::error!("Expected checksum from output. Standard output to follow");
            tracing::error!("{}", stdout);
        }

        Ok(RunOutcome {
            checksum,
            stdout,
            elapsed,
            status,
        })
    }

    fn wait(&self, child: &mut Child, start: Instant) -> Result<ExitStatus, ProcessError> {
        let pid = child.id();
        let mut next_status = self.status_interval;

        loop {
            if self.cancel.load(Ordering::Acquire) {
                abandon(child);
                return Err(ProcessError::Cancelled {
                    elapsed_ms: start.elapsed().as_millis(),
                });
            }

            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {}
                Err(e) => {
                    abandon(child);
                    return Err(ProcessError::Wait { pid, source: e });
                }
            }

            let elapsed = start.elapsed();
            if elapsed >= next_status {
                tracing::info!(pid, "Deserializer running: {:.2}s", elapsed.as_secs_f64());
                next_status += self.status_interval;
            }
            thread::sleep(self.poll_interval);
        }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Kill and reap a child the runner gives up on.
fn abandon(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!(pid = child.id(), error = %e, "Kill failed");
    }
    let _ = child.wait();
}

fn spawn_capture(
    stdout: Option<ChildStdout>,
) -> Result<JoinHandle<std::io::Result<Vec<u8>>>, ProcessError> {
    let mut stdout = stdout.ok_or_else(|| ProcessError::Capture {
        reason: "stdout was not piped".to_string(),
    })?;
    thread::Builder::new()
        .name("jsonmark-stdout".to_string())
        .spawn(move || {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf)?;
            Ok(buf)
        })
        .map_err(|e| ProcessError::Capture {
            reason: format!("failed to start capture thread: {}", e),
        })
}
