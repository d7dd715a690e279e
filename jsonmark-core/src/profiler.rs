// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Resource profiling of deserializer runs.
//!
//! Two backends write the same plain-text log: one header line followed by
//! whitespace-separated rows of `elapsed cpu% real_mib virtual_mib`.
//!
//! - [`Profiler::Psrecord`] wraps the command line with the external
//!   `psrecord` tool, which must be on `PATH`.
//! - [`Profiler::Sampler`] polls the child and its descendants in-process.
//!
//! [`summarize`] reads either log back into max/median/p95 figures.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use sysinfo::{Pid, Process, System};

use crate::error::ProfileError;
use crate::runner::shell_quote;
use crate::stats::OrderStats;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;
/// Guards the parent walk against cycles in a racy process table.
const MAX_TREE_DEPTH: usize = 64;

/// Default interval between in-process samples.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Profiling backend and the log file it writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Profiler {
    Psrecord { log: PathBuf },
    Sampler { log: PathBuf, interval: Duration },
}

impl Profiler {
    pub fn log_path(&self) -> &Path {
        match self {
            Profiler::Psrecord { log } | Profiler::Sampler { log, .. } => log,
        }
    }

    /// Command line to actually spawn.
    pub fn wrap(&self, command: &str) -> String {
        match self {
            Profiler::Psrecord { log } => format!(
                "psrecord --log {} --include-children {}",
                shell_quote(&log.to_string_lossy()),
                shell_quote(command)
            ),
            Profiler::Sampler { .. } => command.to_string(),
        }
    }

    /// Start sampling `pid` if this backend samples in-process.
    ///
    /// The first row is written before returning, while the child is known
    /// to still be in the process table.
    pub(crate) fn attach(&self, pid: u32) -> Result<Option<SamplerHandle>, ProfileError> {
        match self {
            Profiler::Psrecord { .. } => Ok(None),
            Profiler::Sampler { log, interval } => {
                SamplerHandle::start(pid, log.clone(), *interval).map(Some)
            }
        }
    }
}

struct ResourceSample {
    cpu_percent: f32,
    real_bytes: u64,
    virtual_bytes: u64,
}

fn in_tree(processes: &HashMap<Pid, Process>, mut pid: Pid, root: Pid) -> bool {
    for _ in 0..MAX_TREE_DEPTH {
        if pid == root {
            return true;
        }
        match processes.get(&pid).and_then(Process::parent) {
            Some(parent) => pid = parent,
            None => return false,
        }
    }
    false
}

/// Sum usage over `root` and all of its descendants.
fn sample_tree(system: &mut System, root: Pid) -> Option<ResourceSample> {
    system.refresh_processes();
    let processes = system.processes();
    if !processes.contains_key(&root) {
        return None;
    }

    let mut sample = ResourceSample {
        cpu_percent: 0.0,
        real_bytes: 0,
        virtual_bytes: 0,
    };
    for (pid, process) in processes {
        if in_tree(processes, *pid, root) {
            sample.cpu_percent += process.cpu_usage();
            sample.real_bytes += process.memory();
            sample.virtual_bytes += process.virtual_memory();
        }
    }
    Some(sample)
}

struct SampleLog {
    writer: BufWriter<File>,
    path: PathBuf,
    rows: usize,
}

impl SampleLog {
    fn create(path: PathBuf) -> Result<Self, ProfileError> {
        let file = File::create(&path).map_err(|e| ProfileError::Io {
            context: "creating profile log",
            path: path.clone(),
            source: e,
        })?;
        let mut log = Self {
            writer: BufWriter::new(file),
            path,
            rows: 0,
        };
        let header = format!(
            "# {:^12} {:^12} {:^12} {:^12}",
            "Elapsed time", "CPU (%)", "Real (MB)", "Virtual (MB)"
        );
        log.write_line(&header)?;
        Ok(log)
    }

    fn record(&mut self, elapsed: Duration, sample: &ResourceSample) -> Result<(), ProfileError> {
        let row = format!(
            "{:12.3} {:12.3} {:12.3} {:12.3}",
            elapsed.as_secs_f64(),
            sample.cpu_percent,
            sample.real_bytes as f64 / BYTES_PER_MIB,
            sample.virtual_bytes as f64 / BYTES_PER_MIB
        );
        self.write_line(&row)?;
        self.rows += 1;
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> Result<(), ProfileError> {
        writeln!(self.writer, "{}", line).map_err(|e| ProfileError::Io {
            context: "writing profile log",
            path: self.path.clone(),
            source: e,
        })
    }

    fn finish(mut self) -> Result<usize, ProfileError> {
        self.writer.flush().map_err(|e| ProfileError::Io {
            context: "flushing profile log",
            path: self.path.clone(),
            source: e,
        })?;
        Ok(self.rows)
    }
}

/// Background sampler bound to one child process.
pub(crate) struct SamplerHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<Result<usize, ProfileError>>>,
}

impl SamplerHandle {
    fn start(pid: u32, log: PathBuf, interval: Duration) -> Result<Self, ProfileError> {
        let start = Instant::now();
        let root = Pid::from_u32(pid);
        let mut system = System::new();
        let mut log = SampleLog::create(log)?;
        if let Some(sample) = sample_tree(&mut system, root) {
            log.record(start.elapsed(), &sample)?;
        }

        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let thread = thread::Builder::new()
            .name("jsonmark-sampler".to_string())
            .spawn(move || {
                while !flag.load(Ordering::Acquire) {
                    thread::sleep(interval);
                    match sample_tree(&mut system, root) {
                        Some(sample) => log.record(start.elapsed(), &sample)?,
                        None => break,
                    }
                }
                log.finish()
            })
            .map_err(|e| ProfileError::Io {
                context: "starting sampler thread",
                path: PathBuf::new(),
                source: e,
            })?;

        Ok(Self {
            stop,
            thread: Some(thread),
        })
    }

    /// Stop sampling and return the number of rows written.
    pub(crate) fn finish(mut self) -> Result<usize, ProfileError> {
        self.stop.store(true, Ordering::Release);
        match self.thread.take() {
            Some(thread) => thread.join().unwrap_or(Ok(0)),
            None => Ok(0),
        }
    }
}

impl Drop for SamplerHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}

/// CPU and memory figures of one profiled run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceSummary {
    /// CPU percentage; may exceed 100 on multiple cores.
    pub cpu: OrderStats,
    /// Resident memory in MiB.
    pub mem: OrderStats,
    pub samples: usize,
}

impl ResourceSummary {
    pub fn log(&self) {
        tracing::info!(
            "CPU (%)  : max={:.2}  50%={:.2}  95%={:.2}",
            self.cpu.max,
            self.cpu.median,
            self.cpu.p95
        );
        tracing::info!(
            "MEM (MiB): max={:.2}  50%={:.2}  95%={:.2}",
            self.mem.max,
            self.mem.median,
            self.mem.p95
        );
    }
}

/// Read a profile log and compute CPU and memory statistics.
pub fn summarize(path: &Path) -> Result<ResourceSummary, ProfileError> {
    let content = fs::read_to_string(path).map_err(|e| ProfileError::Io {
        context: "reading profile log",
        path: path.to_path_buf(),
        source: e,
    })?;
    summarize_log(&content).map_err(|e| match e {
        ProfileError::NoSamples { .. } => ProfileError::NoSamples {
            path: path.to_path_buf(),
        },
        other => other,
    })
}

fn summarize_log(content: &str) -> Result<ResourceSummary, ProfileError> {
    let mut cpu = Vec::new();
    let mut mem = Vec::new();

    for (index, line) in content.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let columns: Vec<&str> = line.split_whitespace().collect();
        let column = |i: usize| columns.get(i).and_then(|v| v.parse::<f64>().ok());
        match (column(1), column(2)) {
            (Some(c), Some(m)) => {
                cpu.push(c);
                mem.push(m);
            }
            _ => {
                return Err(ProfileError::Malformed {
                    line: index + 1,
                    content: line.to_string(),
                })
            }
        }
    }

    let samples = cpu.len();
    match (OrderStats::from_samples(cpu), OrderStats::from_samples(mem)) {
        (Some(cpu), Some(mem)) => Ok(ResourceSummary { cpu, mem, samples }),
        _ => Err(ProfileError::NoSamples {
            path: PathBuf::new(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{CommandTemplate, ProcessRunner, Substitutions};
    use tempfile::{NamedTempFile, TempDir};

    const PSRECORD_LOG: &str = "\
# Elapsed time   CPU (%)     Real (MB)   Virtual (MB)
       0.000        0.000        4.000       10.000
       0.100       50.000        8.000       12.000
       0.200      100.000       12.000       14.000
       0.300      150.000       16.000       16.000
";

    #[test]
    fn test_summarize_psrecord_log() {
        let summary = summarize_log(PSRECORD_LOG).unwrap();
        assert_eq!(summary.samples, 4);
        assert_eq!(summary.cpu.max, 150.0);
        assert_eq!(summary.cpu.median, 75.0);
        assert!((summary.cpu.p95 - 142.5).abs() < 1e-9);
        assert_eq!(summary.mem.max, 16.0);
        assert_eq!(summary.mem.median, 10.0);
    }

    #[test]
    fn test_header_only_has_no_samples() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "# Elapsed time CPU (%) Real (MB) Virtual (MB)\n").unwrap();

        let err = summarize(file.path()).unwrap_err();
        match err {
            ProfileError::NoSamples { path } => assert_eq!(path, file.path()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_row() {
        let log = "# header\n 0.0 1.0 2.0 3.0\n 0.1 n/a 2.0 3.0\n";
        assert!(matches!(
            summarize_log(log),
            Err(ProfileError::Malformed { line: 3, .. })
        ));
    }

    #[test]
    fn test_missing_log_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = summarize(&dir.path().join("absent.log")).unwrap_err();
        assert!(matches!(err, ProfileError::Io { .. }));
    }

    #[test]
    fn test_psrecord_wrap_quotes_command() {
        let profiler = Profiler::Psrecord {
            log: PathBuf::from("/tmp/profile.log"),
        };
        assert_eq!(
            profiler.wrap("./deser /tmp/simple1.1.compact"),
            "psrecord --log /tmp/profile.log --include-children './deser /tmp/simple1.1.compact'"
        );
        assert_eq!(profiler.log_path(), Path::new("/tmp/profile.log"));
    }

    #[test]
    fn test_sampler_leaves_command_unchanged() {
        let profiler = Profiler::Sampler {
            log: PathBuf::from("/tmp/profile.log"),
            interval: DEFAULT_SAMPLE_INTERVAL,
        };
        assert_eq!(profiler.wrap("cat x"), "cat x");
    }

    #[test]
    fn test_sampler_profiles_child() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("profile.log");
        let profiler = Profiler::Sampler {
            log: log.clone(),
            interval: Duration::from_millis(20),
        };

        let template = CommandTemplate::new("sleep 0.3; test -d $FILENAME && echo 11");
        let substitutions = Substitutions {
            filename: dir.path(),
            benchmark: "smoke",
        };
        let outcome = ProcessRunner::new()
            .run(&template, &substitutions, Some(&profiler))
            .unwrap();
        assert_eq!(outcome.checksum, Some(11));

        let summary = summarize(&log).unwrap();
        assert!(summary.samples >= 2);
        assert!(summary.mem.max > 0.0);
        assert!(summary.cpu.max >= 0.0);
    }
}
