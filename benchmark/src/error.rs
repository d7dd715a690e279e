// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Errors raised by a sweep. Any of them aborts the whole sweep.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Sweep configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Sweep configuration parse error: {message}")]
    ConfigParse { message: String },

    #[error("Invalid sweep configuration: {field} - {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Variant {variant}: `{command}` exited with {status}. Output follows:\n{output}")]
    CommandFailed {
        variant: String,
        command: String,
        status: String,
        output: String,
    },

    #[error("Variant {variant}: pattern {pattern:?} not found. Output follows:\n{output}")]
    PatternMissing {
        variant: String,
        pattern: &'static str,
        output: String,
    },

    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SweepResult<T> = Result<T, SweepError>;
