//! Core types: venues, events, the timetable container and its file format

pub mod error;
pub mod event;
pub mod format;
pub mod timetable;
pub mod tracing;
pub mod venue;

pub use error::{ParseError, TimetableError, TimetableResult};
pub use event::{Event, EventKind, Lecture, Meeting, MeetingType, UnknownMeetingType};
pub use format::{format_datetime, parse_datetime};
pub use timetable::{LoadOutcome, Timetable};
pub use self::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use venue::Venue;
