//! Client error types.

use std::fmt;

use timetable_core::TimetableError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// IO error on the console or a file.
    Io(std::io::Error),
    /// Timetable load/save or validation error.
    Timetable(TimetableError),
    /// Output serialization failed.
    Serialization(String),
    /// The input ended in the middle of a prompt.
    EndOfInput,
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Timetable(err) => write!(f, "timetable error: {}", err),
            Self::Serialization(msg) => write!(f, "serialization failed: {}", msg),
            Self::EndOfInput => write!(f, "unexpected end of input"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Timetable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<TimetableError> for ClientError {
    fn from(err: TimetableError) -> Self {
        Self::Timetable(err)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
