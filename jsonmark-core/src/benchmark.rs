// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Benchmark definitions and the start-up validated registry.

use std::collections::HashSet;
use std::fmt;

use crate::dataset::{self, simple_schema, Dataset, Schema};
use crate::error::{DefinitionError, UsageError};
use crate::serializer::SerializerKind;

/// Seed shared by the built-in benchmarks.
pub const DEFAULT_SEED: u64 = 42;

/// Maximum benchmark name length.
const MAX_NAME_LEN: usize = 64;

/// A named, versioned workload.
#[derive(Clone, Copy)]
pub struct BenchmarkDefinition {
    pub name: &'static str,
    /// Bumping the version invalidates cached corpora.
    pub version: u32,
    pub seed: u64,
    pub iterations: u64,
    pub schema: Schema,
    /// Sum of `integer_1 + integer_2` over all records under `seed`.
    pub expected_checksum: i64,
}

impl BenchmarkDefinition {
    /// Corpus file name for a serializer: `{name}.{version}.{serializer}`.
    pub fn cache_filename(&self, serializer: SerializerKind) -> String {
        format!("{}.{}.{}", self.name, self.version, serializer)
    }

    /// A fresh record stream for this benchmark.
    pub fn dataset(&self) -> Dataset {
        dataset::generate(self.schema, self.iterations, self.seed)
    }

    fn validate(&self) -> Result<(), DefinitionError> {
        if self.name.is_empty() || self.name.len() > MAX_NAME_LEN {
            return Err(DefinitionError::InvalidFieldValue {
                field: "name",
                value: self.name.to_string(),
                reason: format!("Name must be 1 to {} characters", MAX_NAME_LEN),
            });
        }

        // The name ends up in file names and shell command lines
        if !self
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(DefinitionError::InvalidFieldValue {
                field: "name",
                value: self.name.to_string(),
                reason: "Name must contain only alphanumeric characters, hyphens, and underscores"
                    .to_string(),
            });
        }

        if self.version == 0 {
            return Err(DefinitionError::InvalidFieldValue {
                field: "version",
                value: self.version.to_string(),
                reason: "Version must be at least 1".to_string(),
            });
        }

        if self.iterations == 0 {
            return Err(DefinitionError::InvalidFieldValue {
                field: "iterations",
                value: self.iterations.to_string(),
                reason: "Iterations must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}

impl fmt::Debug for BenchmarkDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BenchmarkDefinition")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("seed", &self.seed)
            .field("iterations", &self.iterations)
            .field("expected_checksum", &self.expected_checksum)
            .finish_non_exhaustive()
    }
}

/// The built-in benchmarks, in listing order.
pub const BUILTIN_BENCHMARKS: &[BenchmarkDefinition] = &[
    BenchmarkDefinition {
        name: "simple1",
        version: 1,
        seed: DEFAULT_SEED,
        iterations: 1_000_000,
        schema: simple_schema,
        expected_checksum: 1_208_657,
    },
    BenchmarkDefinition {
        name: "smoke",
        version: 1,
        seed: DEFAULT_SEED,
        iterations: 1_000,
        schema: simple_schema,
        expected_checksum: -481,
    },
];

/// Closed set of benchmark definitions, looked up by name.
#[derive(Debug)]
pub struct BenchmarkRegistry {
    definitions: Vec<BenchmarkDefinition>,
}

impl BenchmarkRegistry {
    /// Validate and register a list of definitions.
    pub fn new(
        definitions: impl IntoIterator<Item = BenchmarkDefinition>,
    ) -> Result<Self, DefinitionError> {
        let mut seen = HashSet::new();
        let mut registered = Vec::new();

        for definition in definitions {
            definition.validate()?;
            if !seen.insert(definition.name) {
                return Err(DefinitionError::DuplicateName {
                    name: definition.name.to_string(),
                });
            }
            registered.push(definition);
        }

        Ok(Self {
            definitions: registered,
        })
    }

    /// Registry of [`BUILTIN_BENCHMARKS`].
    pub fn builtin() -> Result<Self, DefinitionError> {
        Self::new(BUILTIN_BENCHMARKS.iter().copied())
    }

    /// Look up a benchmark by name.
    pub fn get(&self, name: &str) -> Result<&BenchmarkDefinition, UsageError> {
        self.definitions
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| UsageError::UnknownBenchmark {
                name: name.to_string(),
                available: self.names().collect::<Vec<_>>().join(", "),
            })
    }

    /// Registered names in listing order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.definitions.iter().map(|d| d.name)
    }
}
