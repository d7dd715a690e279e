// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML sweep roster with strict validation.
//!
//! ```yaml
//! iterations: 3
//! workdir: .
//! run_command: "make JSONMARK_COMMAND='jsonmark --cache-dir cache --benchmark simple1' $VARIANT"
//! profile_command: "make JSONMARK_COMMAND='jsonmark --profile --cache-dir cache --benchmark simple1' $VARIANT"
//! variants:
//!   - python-json
//!   - rust
//! ```
//!
//! The first variant is the baseline every other one is compared against.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use jsonmark_core::runner::shell_quote;
use serde::{Deserialize, Serialize};

use crate::error::{SweepError, SweepResult};

/// Replaced by the (quoted) variant name in both commands.
pub const VARIANT_PLACEHOLDER: &str = "$VARIANT";

/// Raw roster as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSweepConfig {
    #[serde(default = "default_iterations")]
    iterations: u32,
    #[serde(default)]
    workdir: Option<PathBuf>,
    run_command: String,
    profile_command: String,
    variants: Vec<String>,
}

fn default_iterations() -> u32 {
    3
}

/// Validated sweep roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepConfig {
    /// Timing runs per variant.
    pub iterations: u32,
    /// Working directory of every command; the current one if unset.
    pub workdir: Option<PathBuf>,
    pub run_command: String,
    pub profile_command: String,
    /// Variant names in report order, baseline first.
    pub variants: Vec<String>,
}

impl SweepConfig {
    /// Override the number of timing runs.
    pub fn with_iterations(mut self, iterations: u32) -> SweepResult<Self> {
        validate_iterations(iterations)?;
        self.iterations = iterations;
        Ok(self)
    }

    /// Timing command for one variant.
    pub fn run_command_for(&self, variant: &str) -> String {
        substitute(&self.run_command, variant)
    }

    /// Profiling command for one variant.
    pub fn profile_command_for(&self, variant: &str) -> String {
        substitute(&self.profile_command, variant)
    }
}

fn substitute(template: &str, variant: &str) -> String {
    template.replace(VARIANT_PLACEHOLDER, &shell_quote(variant))
}

fn validate_iterations(iterations: u32) -> SweepResult<()> {
    if iterations == 0 {
        return Err(SweepError::InvalidConfig {
            field: "iterations",
            reason: "At least one timing run is required".to_string(),
        });
    }
    Ok(())
}

/// Roster loader with strict validation.
pub struct SweepLoader;

impl SweepLoader {
    /// Load and validate a roster from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> SweepResult<SweepConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SweepError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SweepError::Io {
            context: "reading sweep configuration",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate a roster from a YAML string.
    pub fn load_string(content: &str) -> SweepResult<SweepConfig> {
        let raw: RawSweepConfig =
            serde_yaml::from_str(content).map_err(|e| SweepError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Self::validate(raw)
    }

    fn validate(raw: RawSweepConfig) -> SweepResult<SweepConfig> {
        validate_iterations(raw.iterations)?;

        for (field, command) in [
            ("run_command", &raw.run_command),
            ("profile_command", &raw.profile_command),
        ] {
            if !command.contains(VARIANT_PLACEHOLDER) {
                return Err(SweepError::InvalidConfig {
                    field,
                    reason: format!("Command must contain {}", VARIANT_PLACEHOLDER),
                });
            }
        }

        if raw.variants.is_empty() {
            return Err(SweepError::InvalidConfig {
                field: "variants",
                reason: "At least one variant must be listed".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for variant in &raw.variants {
            if variant.trim().is_empty() {
                return Err(SweepError::InvalidConfig {
                    field: "variants",
                    reason: "Variant names must not be empty".to_string(),
                });
            }
            if !seen.insert(variant.as_str()) {
                return Err(SweepError::InvalidConfig {
                    field: "variants",
                    reason: format!("Duplicate variant: {}", variant),
                });
            }
        }

        Ok(SweepConfig {
            iterations: raw.iterations,
            workdir: raw.workdir,
            run_command: raw.run_command,
            profile_command: raw.profile_command,
            variants: raw.variants,
        })
    }
}
