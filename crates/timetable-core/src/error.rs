//! Core error types.

use std::io;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Result type for timetable operations.
pub type TimetableResult<T> = Result<T, TimetableError>;

/// Errors that can occur while editing, loading or saving a timetable.
#[derive(Debug, Error)]
pub enum TimetableError {
    /// Start time is not strictly before end time.
    #[error("start time: {start} must be before end time: {end}")]
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// An event without a venue cannot take part in a venue-ordered sort.
    #[error("event {event_id} has no venue assigned")]
    UnassignedVenue { event_id: i32 },

    /// A string field cannot be written to the line-oriented file.
    #[error("{field} {value:?} contains a line break")]
    InvalidField { field: &'static str, value: String },

    /// Malformed timetable file.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// IO error while reading or writing the timetable file.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TimetableError {
    /// Creates an IO error for the given path.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised while decoding the timetable text format.
///
/// Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input ended before an expected token.
    #[error("line {line}: expected {expected}, found end of input")]
    MissingToken { line: usize, expected: &'static str },

    /// A token could not be parsed as an integer.
    #[error("line {line}: invalid integer {value:?}")]
    InvalidInteger { line: usize, value: String },

    /// A token could not be parsed as a boolean.
    #[error("line {line}: invalid boolean {value:?}")]
    InvalidBoolean { line: usize, value: String },

    /// A token could not be parsed as an ISO-8601 local date-time.
    #[error("line {line}: invalid date-time {value:?}")]
    InvalidDateTime { line: usize, value: String },

    /// Unknown meeting type token.
    #[error("line {line}: unknown meeting type {value:?}")]
    UnknownMeetingType { line: usize, value: String },

    /// Record tag other than `lecture` or `meeting`.
    #[error("line {line}: unknown event record {value:?}")]
    UnknownRecord { line: usize, value: String },

    /// The venue count is negative.
    #[error("line {line}: negative venue count {count}")]
    NegativeCount { line: usize, count: i32 },

    /// An event record has start not strictly before end.
    #[error("line {line}: start time {start} must be before end time {end}")]
    InvalidRange {
        line: usize,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

impl ParseError {
    /// Returns the line the error refers to.
    pub fn line(&self) -> usize {
        match self {
            Self::MissingToken { line, .. }
            | Self::InvalidInteger { line, .. }
            | Self::InvalidBoolean { line, .. }
            | Self::InvalidDateTime { line, .. }
            | Self::UnknownMeetingType { line, .. }
            | Self::UnknownRecord { line, .. }
            | Self::NegativeCount { line, .. }
            | Self::InvalidRange { line, .. } => *line,
        }
    }
}
