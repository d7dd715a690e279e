// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! jsonmark Core Library
//!
//! Benchmark orchestration for external JSON deserializers. Generates a
//! seeded synthetic corpus, caches it per benchmark version and serializer,
//! runs a deserializer command against it, verifies the checksum it reports
//! and optionally profiles its CPU and memory use.

pub mod benchmark;
pub mod checksum;
pub mod corpus;
pub mod dataset;
pub mod error;
pub mod profiler;
pub mod runner;
pub mod serializer;
pub mod stats;

// Re-export commonly used types
pub use benchmark::{BenchmarkDefinition, BenchmarkRegistry, BUILTIN_BENCHMARKS};
pub use checksum::{ChecksumVerdict, INVALID_CHECKSUM};
pub use corpus::{CorpusFile, Materialized};
pub use dataset::{FieldSource, Record};
pub use error::{
    CorpusError, DefinitionError, JsonmarkError, JsonmarkResult, ProcessError, ProfileError,
    UsageError,
};
pub use profiler::{Profiler, ResourceSummary};
pub use runner::{CommandTemplate, ProcessRunner, RunOutcome, Substitutions};
pub use serializer::SerializerKind;
pub use stats::OrderStats;
