// SPDX-License-Identifier: MIT
//! Error taxonomy for decoding and aggregation
//!
//! Every variant is fatal: a malformed header invalidates all of the offset
//! arithmetic that follows it, so nothing here is retried or recovered locally.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::descriptor::DescriptorError;

/// Errors raised while validating or decoding the binary format
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Unsupported version: expected 1, got {0}")]
    UnsupportedVersion(u8),

    #[error("File is flagged as corrupt (flag = {0})")]
    CorruptFile(u8),

    #[error("Unexpected header length: expected 429, got {0}")]
    UnexpectedHeaderLength(u32),

    #[error("Truncated read: needed {expected} bytes for {context}")]
    TruncatedRead {
        context: &'static str,
        expected: usize,
    },

    #[error("Record layout is {actual} bytes wide, expected {expected}")]
    LayoutSizeMismatch { expected: usize, actual: usize },

    #[error("File size mismatch: header implies {expected} bytes, file has {actual}")]
    FileSizeMismatch { expected: u64, actual: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FormatError {
    /// Map a failed read of `expected` bytes onto the taxonomy.
    ///
    /// End-of-file becomes [`FormatError::TruncatedRead`]; anything else stays an I/O error.
    pub(crate) fn from_read(err: std::io::Error, context: &'static str, expected: usize) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            FormatError::TruncatedRead { context, expected }
        } else {
            FormatError::Io(err)
        }
    }
}

/// Errors raised while folding positions into a bounding box
#[derive(Debug, Error, PartialEq)]
pub enum AggregationError {
    #[error("Cannot compute a bounding box over zero records")]
    EmptyInput,

    #[error("NaN position in record {index}")]
    NanPosition { index: u64 },
}

/// Top-level error for a pipeline run
#[derive(Debug, Error)]
pub enum Error {
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("Aggregation error: {0}")]
    Aggregation(#[from] AggregationError),

    #[error("Descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
