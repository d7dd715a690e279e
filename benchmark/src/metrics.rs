// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Sweep measurements and the patterns that pull them out of jsonmark logs.

use chrono::{DateTime, Utc};
use jsonmark_core::stats;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sysinfo::System;

lazy_static! {
    static ref DESERIALIZE_TIME: Regex =
        Regex::new(r"Deserialize time taken: (\d+\.\d+)s").unwrap();
    static ref CPU_P95: Regex = Regex::new(r"CPU.*95%=(\d+\.\d+)").unwrap();
    static ref MEM_P95: Regex = Regex::new(r"MEM.*95%=(\d+\.\d+)").unwrap();
}

/// A figure logged by `jsonmark`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogPattern {
    /// Deserialization wall-clock seconds.
    DeserializeTime,
    /// 95th percentile CPU utilisation.
    CpuP95,
    /// 95th percentile resident memory in MiB.
    MemP95,
}

impl LogPattern {
    fn regex(&self) -> &'static Regex {
        match self {
            LogPattern::DeserializeTime => &*DESERIALIZE_TIME,
            LogPattern::CpuP95 => &*CPU_P95,
            LogPattern::MemP95 => &*MEM_P95,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.regex().as_str()
    }

    /// First match in `output`, parsed as a number.
    pub fn extract(&self, output: &str) -> Option<f64> {
        self.regex().captures(output)?.get(1)?.as_str().parse().ok()
    }
}

/// `100 * value / baseline`; `None` when the baseline is not positive.
pub fn percent_of(value: f64, baseline: f64) -> Option<f64> {
    (baseline > 0.0).then(|| 100.0 * value / baseline)
}

/// Everything measured for one variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantResult {
    pub variant: String,
    /// Seconds of each timing run, in run order
    pub times_secs: Vec<f64>,
    pub time_avg_secs: f64,
    pub cpu_p95_percent: f64,
    pub mem_p95_mib: f64,
    /// Average time relative to the baseline variant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_of_baseline: Option<f64>,
}

impl VariantResult {
    /// Build from raw figures; the baseline percentage is filled in by the report.
    pub fn new(
        variant: impl Into<String>,
        times_secs: Vec<f64>,
        cpu_p95: f64,
        mem_p95: f64,
    ) -> Self {
        Self {
            variant: variant.into(),
            time_avg_secs: stats::mean(&times_secs).unwrap_or_default(),
            times_secs,
            cpu_p95_percent: cpu_p95,
            mem_p95_mib: mem_p95,
            percent_of_baseline: None,
        }
    }
}

/// System information captured at sweep time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub os_version: String,
    pub kernel_version: Option<String>,
    pub cpu_model: String,
    pub cpu_cores: usize,
    pub memory_bytes: u64,
    pub hostname: String,
}

impl SystemInfo {
    /// Collect current system information.
    pub fn collect() -> Self {
        let sys = System::new_all();

        Self {
            os: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// Complete sweep report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub benchmark_suite: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub system_info: SystemInfo,
    pub iterations: u32,
    /// Variant results in roster order, baseline first.
    pub results: Vec<VariantResult>,
}

impl SweepReport {
    /// Create an empty report.
    pub fn new(iterations: u32) -> Self {
        Self {
            benchmark_suite: "jsonmark-sweep".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            system_info: SystemInfo::collect(),
            iterations,
            results: Vec::new(),
        }
    }

    /// Append a result and compute its percentage of the baseline.
    pub fn add_result(&mut self, mut result: VariantResult) {
        let baseline = self
            .results
            .first()
            .map_or(result.time_avg_secs, |b| b.time_avg_secs);
        result.percent_of_baseline = percent_of(result.time_avg_secs, baseline);
        self.results.push(result);
    }

    pub fn baseline(&self) -> Option<&VariantResult> {
        self.results.first()
    }
}
