// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for primitive queries, tessellation and text I/O

use std::collections::TryReserveError;
use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ShapeError>;

/// Errors reported by primitives, meshes and the field reader.
#[derive(Debug, Error)]
pub enum ShapeError {
    /// A buffer could not be reserved.
    #[error("failed to allocate {what}")]
    AllocationFailure {
        what: &'static str,
        #[source]
        source: TryReserveError,
    },

    /// The ellipsoid solver produced no usable root, or the primitive is degenerate.
    #[error("fatal numeric inconsistency: {0}")]
    FatalNumericInconsistency(String),

    /// A text field could not be parsed into the expected value.
    #[error("malformed input at line {line}: {message}")]
    MalformedInput { line: usize, message: String },

    /// A text field is not recognized by the primitive being read.
    #[error("unknown key '{key}' at line {line}")]
    UnknownKey { line: usize, key: String },

    /// Tessellation needs at least three divisions.
    #[error("invalid division count {0} (at least 3 required)")]
    InvalidDivision(u32),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ShapeError {
    pub fn allocation(what: &'static str, source: TryReserveError) -> Self {
        Self::AllocationFailure { what, source }
    }

    pub fn numeric(details: impl Into<String>) -> Self {
        Self::FatalNumericInconsistency(details.into())
    }

    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            line,
            message: message.into(),
        }
    }

    /// Whether a caller may skip the offending field and keep reading.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MalformedInput { .. } | Self::UnknownKey { .. })
    }
}
