// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Checksum contract between the orchestrator and deserializers.
//!
//! A mismatch is observational: it is logged for human review and never
//! aborts a run or changes the exit code.

use crate::dataset::Record;

/// Value used when a deserializer's output could not be parsed.
pub const INVALID_CHECKSUM: i64 = 0;

/// Outcome of comparing a reported checksum against the expected one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumVerdict {
    Match,
    Mismatch { expected: i64, actual: i64 },
}

impl ChecksumVerdict {
    pub fn is_match(&self) -> bool {
        matches!(self, ChecksumVerdict::Match)
    }
}

/// Compare `actual` against `expected`, logging an error on mismatch.
pub fn validate(actual: i64, expected: i64) -> ChecksumVerdict {
    if actual == expected {
        tracing::debug!(checksum = actual, "Checksum matches");
        return ChecksumVerdict::Match;
    }

    tracing::error!("Expected checksum {} but got back {}", expected, actual);
    ChecksumVerdict::Mismatch { expected, actual }
}

/// Reference accumulator: signed 64-bit wrapping sum of both integer fields.
pub fn accumulate<'a>(records: impl IntoIterator<Item = &'a Record>) -> i64 {
    records
        .into_iter()
        .fold(0i64, |acc, record| acc.wrapping_add(record.checksum_term()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{generate, simple_schema};

    #[test]
    fn test_validate_match() {
        assert_eq!(validate(5, 5), ChecksumVerdict::Match);
        assert!(validate(-481, -481).is_match());
    }

    #[test]
    fn test_validate_mismatch_is_not_fatal() {
        let verdict = validate(5, 6);
        assert_eq!(
            verdict,
            ChecksumVerdict::Mismatch {
                expected: 6,
                actual: 5
            }
        );
        assert!(!verdict.is_match());
    }

    #[test]
    fn test_accumulate_matches_generated_terms() {
        let records: Vec<Record> = generate(simple_schema, 10, 42).collect();
        assert_eq!(accumulate(&records), 764);
        assert_eq!(accumulate(&records[..0]), 0);
    }

    #[test]
    fn test_accumulate_wraps() {
        let mut record = generate(simple_schema, 1, 42).next().unwrap();
        record.integer_1 = i64::MAX;
        record.integer_2 = 1;
        assert_eq!(accumulate([&record]), i64::MIN);
    }
}
