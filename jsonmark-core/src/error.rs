// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for jsonmark.
//!
//! Every failure class of a benchmark run has its own enum so the CLI can
//! decide per class whether to abort, exit with a usage code, or only log.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for a benchmark invocation.
#[derive(Debug, Error)]
pub enum JsonmarkError {
    // =========================================================================
    // Usage Errors - Raised Before Any Side Effect
    // =========================================================================
    #[error("Usage error: {0}")]
    Usage(#[from] UsageError),

    #[error("Invalid benchmark definition: {0}")]
    Definition(#[from] DefinitionError),

    // =========================================================================
    // Generation Errors - No Partial Success
    // =========================================================================
    #[error("Corpus error: {0}")]
    Corpus(#[from] CorpusError),

    // =========================================================================
    // Deserializer Process Errors
    // =========================================================================
    #[error("Process error: {0}")]
    Process(#[from] ProcessError),

    // =========================================================================
    // Profiling Errors - Only Fail The Profiling Step
    // =========================================================================
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),
}

impl JsonmarkError {
    /// Process exit code the CLI should use for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            JsonmarkError::Usage(_) => 2,
            _ => 1,
        }
    }
}

/// Bad invocation. Nothing has been generated or spawned yet.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("DESERIALIZER_CMD missing placeholder: {placeholder}")]
    MissingPlaceholder { placeholder: &'static str },

    #[error("DESERIALIZER_CMD is required unless --only-serialize is set")]
    MissingCommand,

    #[error("Unknown benchmark: {name} (available: {available})")]
    UnknownBenchmark { name: String, available: String },
}

/// Registry entries are checked once at start-up.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Duplicate benchmark name: {name}")]
    DuplicateName { name: String },
}

/// Failures while resolving or writing the corpus file.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("IO error: {context} ({path}) - {source}")]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode record {index}: {source}")]
    Encode {
        index: u64,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures of the external deserializer process itself.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for process {pid}: {source}")]
    Wait {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to capture standard output: {reason}")]
    Capture { reason: String },

    #[error("Run cancelled after {elapsed_ms}ms")]
    Cancelled { elapsed_ms: u128 },
}

/// Failures of the resource profiling step.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("IO error: {context} ({path}) - {source}")]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No resource samples collected in {path}")]
    NoSamples { path: PathBuf },

    #[error("Malformed profile log line {line}: {content:?}")]
    Malformed { line: usize, content: String },
}

/// Result type alias using JsonmarkError.
pub type JsonmarkResult<T> = Result<T, JsonmarkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_placeholder_display() {
        let err = UsageError::MissingPlaceholder {
            placeholder: "$FILENAME",
        };
        assert_eq!(
            err.to_string(),
            "DESERIALIZER_CMD missing placeholder: $FILENAME"
        );
    }

    #[test]
    fn test_exit_codes() {
        let usage: JsonmarkError = UsageError::MissingCommand.into();
        assert_eq!(usage.exit_code(), 2);

        let profile: JsonmarkError = ProfileError::NoSamples {
            path: PathBuf::from("/tmp/profile.log"),
        }
        .into();
        assert_eq!(profile.exit_code(), 1);
        assert!(matches!(profile, JsonmarkError::Profile(_)));
    }
}
