//! Errors raised while aggregating DRAGEN metric files.
//!
//! File-level errors ([`ParseError`], [`ReadError`], [`MergeConflict`]) are
//! recorded in the aggregation report and never abort a run. Only
//! [`AggregateError::NoSamplesFound`] is fatal.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use super::engine::AggregationReport;
use super::kind::MetricKind;
use super::record::SampleKey;

/// An error encountered while parsing the contents of a metric file. Line
/// numbers are one-based.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The file holds no usable rows.
    #[error("file contains no data rows")]
    Empty,

    /// A row could not be read as CSV at all.
    #[error("line {line}: malformed row: {message}")]
    Malformed {
        /// Offending line.
        line: usize,
        /// Description from the CSV reader.
        message: String,
    },

    /// A row has an unexpected number of columns.
    #[error("line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        /// Offending line.
        line: usize,
        /// Human readable description of the accepted column counts.
        expected: &'static str,
        /// Number of columns found.
        found: usize,
    },

    /// A column that must be numeric holds something else.
    #[error("line {line}: non-numeric value `{value}` for `{column}`")]
    NotNumeric {
        /// Offending line.
        line: usize,
        /// Column or metric name.
        column: String,
        /// The raw value.
        value: String,
    },

    /// The same metric appears twice within one file.
    #[error("line {line}: duplicate metric `{name}`")]
    DuplicateMetric {
        /// Offending line.
        line: usize,
        /// Metric name.
        name: String,
    },

    /// The same contig appears twice within one file.
    #[error("line {line}: duplicate contig `{name}`")]
    DuplicateContig {
        /// Offending line.
        line: usize,
        /// Contig name.
        name: String,
    },

    /// The same series block appears twice within one file.
    #[error("line {line}: duplicate series `{name}`")]
    DuplicateSeries {
        /// Offending line.
        line: usize,
        /// Series label.
        name: String,
    },

    /// Histogram bucket bounds do not strictly increase.
    #[error("line {line}: bucket `{label}` does not increase on the previous bucket ({previous})")]
    BucketOrder {
        /// Offending line.
        line: usize,
        /// Offending bucket label.
        label: String,
        /// Bound of the previous bucket.
        previous: u64,
    },

    /// The counts of a histogram add up to more than a metric can hold.
    #[error("line {line}: count of bucket `{label}` overflows the histogram total")]
    CountOverflow {
        /// Offending line.
        line: usize,
        /// Offending bucket label.
        label: String,
    },

    /// A header row does not match the schema.
    #[error("line {line}: unexpected header `{found}`, expected `{expected}`")]
    Header {
        /// Offending line.
        line: usize,
        /// The header that was found.
        found: String,
        /// The expected header.
        expected: String,
    },
}

impl ParseError {
    /// The line that caused the error, if the error is tied to a row.
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Empty => None,
            ParseError::Malformed { line, .. }
            | ParseError::ColumnCount { line, .. }
            | ParseError::NotNumeric { line, .. }
            | ParseError::DuplicateMetric { line, .. }
            | ParseError::DuplicateContig { line, .. }
            | ParseError::DuplicateSeries { line, .. }
            | ParseError::BucketOrder { line, .. }
            | ParseError::CountOverflow { line, .. }
            | ParseError::Header { line, .. } => Some(*line),
        }
    }
}

/// An error encountered while reading a metric file from its source.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The read did not complete within the configured per-file timeout.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// The underlying I/O failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The task reading the file panicked or was cancelled.
    #[error("reading task did not complete: {0}")]
    Task(String),
}

/// Why a single file did not contribute to the store.
#[derive(Debug, Error)]
pub enum FileError {
    /// The file could not be read.
    #[error("could not read file: {0}")]
    Read(#[from] ReadError),

    /// The file could not be parsed.
    #[error("could not parse file: {0}")]
    Parse(#[from] ParseError),

    /// The file duplicates data already in the store.
    #[error(transparent)]
    Conflict(#[from] MergeConflict),
}

/// A second file provided data for a (sample, kind, qualifier) that was
/// already populated. This is a configuration-level problem: the later file's
/// contribution is dropped.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{kind} data for `{key}` was already provided by {}; ignoring {}", .existing.display(), .incoming.display())]
pub struct MergeConflict {
    /// The conflicting key.
    pub key: SampleKey,
    /// The conflicting kind.
    pub kind: MetricKind,
    /// The file that populated the slot first.
    pub existing: PathBuf,
    /// The file whose contribution was rejected.
    pub incoming: PathBuf,
}

/// Run-level errors.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// No file contributed a usable record. The report is kept so the caller
    /// can still show which files were rejected and why.
    #[error("no DRAGEN reports were found")]
    NoSamplesFound(Box<AggregationReport>),
}
