// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for toolpath loading and simulation control
//!
//! Scheduler-level degeneracies (zero-length segments, empty paths) are
//! resolved where they occur and never show up here. Geometric validity of
//! CSG operands is a construction-time guarantee, not a runtime error.

use thiserror::Error;

/// A toolpath file that cannot be turned into a path
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolpathError {
    /// A numeric field of a recognized command is not a finite number
    #[error("line {line}: field {field} is not a number: {text:?}")]
    MalformedNumber {
        /// 1-based line number
        line: usize,
        /// 1-based field index (the command code is field 0)
        field: usize,
        /// The offending text, trimmed
        text: String,
    },

    /// A recognized command is missing coordinates
    #[error("line {line}: {code} expects {expected} coordinate(s), found {found}")]
    MissingField {
        /// 1-based line number
        line: usize,
        /// Command code
        code: String,
        /// Number of coordinates the command updates
        expected: usize,
        /// Number of fields present after the code
        found: usize,
    },
}

impl ToolpathError {
    /// Line the diagnostic refers to
    pub fn line(&self) -> usize {
        match self {
            Self::MalformedNumber { line, .. } | Self::MissingField { line, .. } => *line,
        }
    }
}

/// Simulation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// Feed rate must be positive and finite
    #[error("invalid feed rate: {0}")]
    InvalidFeedRate(f64),

    /// Configuration values out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The toolpath was rejected
    #[error("toolpath rejected: {0}")]
    Toolpath(#[from] ToolpathError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_mentions_line() {
        let err = ToolpathError::MalformedNumber {
            line: 7,
            field: 2,
            text: "abc".into(),
        };
        assert_eq!(err.line(), 7);
        assert!(err.to_string().starts_with("line 7:"));

        let sim: SimError = err.into();
        assert!(sim.to_string().contains("line 7"));
    }
}
