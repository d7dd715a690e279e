// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Sweep report output.
//!
//! Reports are saved as timestamped JSON files and rendered as a Markdown
//! table for pasting into a README.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{SweepError, SweepResult};
use crate::metrics::SweepReport;

/// JSON reporter for sweep results.
pub struct JsonReporter {
    /// Output directory for report files
    output_dir: PathBuf,
}

impl JsonReporter {
    /// Create a reporter, creating the output directory if needed.
    pub fn new(output_dir: impl AsRef<Path>) -> SweepResult<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir).map_err(|e| SweepError::Io {
            context: "creating report directory",
            source: e,
        })?;
        Ok(Self { output_dir })
    }

    /// Save a report as `sweep_<timestamp>.json` and return its path.
    pub fn save(&self, report: &SweepReport) -> SweepResult<PathBuf> {
        let timestamp = report.timestamp.format("%Y-%m-%dT%H-%M-%SZ");
        let filepath = self.output_dir.join(format!("sweep_{}.json", timestamp));

        let file = File::create(&filepath).map_err(|e| SweepError::Io {
            context: "creating report file",
            source: e,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, report)?;
        writer.flush().map_err(|e| SweepError::Io {
            context: "writing report file",
            source: e,
        })?;

        Ok(filepath)
    }
}

/// Render one table row per variant, baseline first.
pub fn markdown_table(report: &SweepReport) -> String {
    let runs = report
        .results
        .iter()
        .map(|r| r.times_secs.len())
        .max()
        .unwrap_or(report.iterations as usize);

    let mut header = String::from("| benchmark |");
    let mut rule = String::from("|---|");
    for run in 1..=runs {
        let _ = write!(header, " time_{} |", run);
        rule.push_str("---:|");
    }
    header.push_str(" time_avg | cpu (95th util %) | mem (95th MiB) | % time |");
    rule.push_str("---:|---:|---:|---:|");

    let mut table = format!("{}\n{}\n", header, rule);
    for result in &report.results {
        let _ = write!(table, "| {} |", result.variant);
        for run in 0..runs {
            match result.times_secs.get(run) {
                Some(secs) => {
                    let _ = write!(table, " {:.2} |", secs);
                }
                None => table.push_str(" |"),
            }
        }
        let percent = result
            .percent_of_baseline
            .map_or_else(|| "n/a".to_string(), |p| format!("{:.2}", p));
        let _ = writeln!(
            table,
            " {:.2} | {:.2} | {:.2} | {} |",
            result.time_avg_secs, result.cpu_p95_percent, result.mem_p95_mib, percent
        );
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::VariantResult;
    use tempfile::TempDir;

    fn sample_report() -> SweepReport {
        let mut report = SweepReport::new(2);
        report.add_result(VariantResult::new("python-json", vec![10.0, 12.0], 99.8, 30.5));
        report.add_result(VariantResult::new("rust", vec![2.5, 3.0], 100.0, 12.25));
        report
    }

    #[test]
    fn test_reporter_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let reporter = JsonReporter::new(temp_dir.path().join("data")).unwrap();

        let path = reporter.save(&sample_report()).unwrap();
        assert!(path.starts_with(temp_dir.path().join("data")));

        let loaded: SweepReport = serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(loaded.results.len(), 2);
        assert_eq!(loaded.results[1].variant, "rust");
        assert_eq!(loaded.results[1].percent_of_baseline, Some(25.0));
    }

    #[test]
    fn test_markdown_table() {
        let table = markdown_table(&sample_report());
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(
            lines[0],
            "| benchmark | time_1 | time_2 | time_avg \
             | cpu (95th util %) | mem (95th MiB) | % time |"
        );
        assert_eq!(lines[1], "|---|---:|---:|---:|---:|---:|---:|");
        assert_eq!(
            lines[2],
            "| python-json | 10.00 | 12.00 | 11.00 | 99.80 | 30.50 | 100.00 |"
        );
        assert_eq!(lines[3], "| rust | 2.50 | 3.00 | 2.75 | 100.00 | 12.25 | 25.00 |");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_missing_percentage_rendered() {
        let mut report = SweepReport::new(1);
        report.add_result(VariantResult::new("instant", vec![0.0], 0.0, 0.0));
        assert!(markdown_table(&report).contains("| n/a |"));
    }
}
