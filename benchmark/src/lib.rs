// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! jsonmark Sweep Framework
//!
//! Runs the full jsonmark pipeline for every deserializer variant listed in
//! a YAML roster and compares their timings against the first variant.
//!
//! # Measurements
//!
//! - **Timing**: `Deserialize time taken` averaged over several runs
//! - **Resources**: 95th percentile CPU and memory from one profiled run
//!
//! # Data Output
//!
//! A Markdown table on stdout and a timestamped JSON report per sweep.

pub mod config;
pub mod error;
pub mod harness;
pub mod metrics;
pub mod reporter;

pub use config::{SweepConfig, SweepLoader};
pub use error::{SweepError, SweepResult};
pub use harness::SweepHarness;
pub use metrics::{LogPattern, SweepReport, SystemInfo, VariantResult};
pub use reporter::{markdown_table, JsonReporter};
