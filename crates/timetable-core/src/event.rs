//! Event types for the timetable.
//!
//! This module provides the scheduled items a timetable holds:
//! - [`Event`]: the shared scheduling fields (id, time range, requirement
//!   flags, assigned venue) plus an [`EventKind`] payload
//! - [`Meeting`] and [`Lecture`]: the two kinds of event
//! - [`MeetingType`]: the category of a meeting
//!
//! Venue assignment and requirement changes are validated here. A rejected
//! change is logged and reported through a `false` return, never an error;
//! only an invalid time range is an error.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{TimetableError, TimetableResult};
use crate::format::format_datetime;
use crate::venue::Venue;

/// The category of a meeting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeetingType {
    /// Staff meeting.
    Staff,
    /// Learning and teaching committee.
    Ltc,
    /// Subject panel.
    SubjectPanel,
    /// Any other kind of meeting.
    #[default]
    Other,
}

/// Error returned when a token names no meeting type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown meeting type {0:?}")]
pub struct UnknownMeetingType(pub String);

impl MeetingType {
    /// All meeting types, in menu order.
    pub const ALL: [MeetingType; 4] = [Self::Staff, Self::Ltc, Self::SubjectPanel, Self::Other];

    /// Returns the token used in the timetable file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Staff => "STAFF",
            Self::Ltc => "LTC",
            Self::SubjectPanel => "SUBJECT_PANEL",
            Self::Other => "OTHER",
        }
    }

    /// Returns a human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Staff => "staff meeting",
            Self::Ltc => "learning and teaching meeting",
            Self::SubjectPanel => "subject panel meeting",
            Self::Other => "other kind of meeting",
        }
    }

    /// Maps a numbered menu choice (`1` to `4`) to a meeting type.
    ///
    /// Anything unrecognised selects [`MeetingType::Other`].
    pub fn from_menu_choice(choice: &str) -> Self {
        match choice.trim() {
            "1" => Self::Staff,
            "2" => Self::Ltc,
            "3" => Self::SubjectPanel,
            _ => Self::Other,
        }
    }
}

impl FromStr for MeetingType {
    type Err = UnknownMeetingType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownMeetingType(s.to_string()))
    }
}

impl fmt::Display for MeetingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Meeting-specific fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Meeting {
    /// The name of the meeting.
    pub meeting_name: String,
    /// Who organised the meeting.
    pub organiser: String,
    /// The kind of meeting.
    pub meeting_type: MeetingType,
}

impl Meeting {
    /// Creates meeting details.
    pub fn new(
        meeting_name: impl Into<String>,
        organiser: impl Into<String>,
        meeting_type: MeetingType,
    ) -> Self {
        Self {
            meeting_name: meeting_name.into(),
            organiser: organiser.into(),
            meeting_type,
        }
    }
}

/// Lecture-specific fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lecture {
    /// The module being taught.
    pub module_code: String,
    /// The lecturer's name.
    pub lecturer_name: String,
    /// The lecturer's staff number.
    pub lecturer_number: i32,
}

impl Lecture {
    /// Creates lecture details.
    pub fn new(
        module_code: impl Into<String>,
        lecturer_name: impl Into<String>,
        lecturer_number: i32,
    ) -> Self {
        Self {
            module_code: module_code.into(),
            lecturer_name: lecturer_name.into(),
            lecturer_number,
        }
    }
}

/// The kind of an event, with its kind-specific fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    Meeting(Meeting),
    Lecture(Lecture),
}

impl EventKind {
    /// Returns the record tag used in the timetable file.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Meeting(_) => "meeting",
            Self::Lecture(_) => "lecture",
        }
    }
}

impl From<Meeting> for EventKind {
    fn from(meeting: Meeting) -> Self {
        Self::Meeting(meeting)
    }
}

impl From<Lecture> for EventKind {
    fn from(lecture: Lecture) -> Self {
        Self::Lecture(lecture)
    }
}

/// A scheduled event.
///
/// Two events are equal when their ids are equal, whatever their other
/// fields hold. The venue is a copy of the venue the event was validated
/// against; the timetable owns the authoritative venue list.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    id: i32,
    start: NaiveDateTime,
    end: NaiveDateTime,
    projector_needed: bool,
    adjustable_seating_required: bool,
    venue: Option<Venue>,
    #[serde(flatten)]
    kind: EventKind,
}

impl Event {
    /// Creates an event with no requirements and no venue.
    ///
    /// Fails with [`TimetableError::InvalidRange`] unless `start < end`.
    pub fn new(
        id: i32,
        kind: impl Into<EventKind>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> TimetableResult<Self> {
        check_range(start, end)?;
        Ok(Self {
            id,
            start,
            end,
            projector_needed: false,
            adjustable_seating_required: false,
            venue: None,
            kind: kind.into(),
        })
    }

    /// Creates a meeting event.
    pub fn meeting(
        id: i32,
        meeting: Meeting,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> TimetableResult<Self> {
        Self::new(id, meeting, start, end)
    }

    /// Creates a lecture event.
    pub fn lecture(
        id: i32,
        lecture: Lecture,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> TimetableResult<Self> {
        Self::new(id, lecture, start, end)
    }

    /// Builder method to set the data projector requirement.
    ///
    /// Goes through [`Event::set_data_projector_required`], so an
    /// incompatible change is still rejected.
    pub fn with_projector_needed(mut self, needed: bool) -> Self {
        self.set_data_projector_required(needed);
        self
    }

    /// Builder method to set the adjustable seating requirement.
    pub fn with_adjustable_seating_required(mut self, required: bool) -> Self {
        self.set_adjustable_seating_required(required);
        self
    }

    /// Returns the event id.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Returns the start time.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Returns the end time.
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn projector_needed(&self) -> bool {
        self.projector_needed
    }

    pub fn adjustable_seating_required(&self) -> bool {
        self.adjustable_seating_required
    }

    /// Returns the assigned venue, if any.
    pub fn venue(&self) -> Option<&Venue> {
        self.venue.as_ref()
    }

    /// Returns the name of the assigned venue, if any.
    pub fn venue_name(&self) -> Option<&str> {
        self.venue.as_ref().map(Venue::name)
    }

    /// Returns the kind-specific fields.
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Returns the kind-specific fields for editing.
    pub fn kind_mut(&mut self) -> &mut EventKind {
        &mut self.kind
    }

    /// Assigns a venue if it offers every facility this event requires.
    ///
    /// On mismatch the previous venue (possibly none) is kept, a warning is
    /// logged and `false` is returned.
    pub fn set_venue(&mut self, venue: &Venue) -> bool {
        if !venue.satisfies(self.projector_needed, self.adjustable_seating_required) {
            warn!(
                event_id = self.id,
                venue = venue.name(),
                projector_needed = self.projector_needed,
                adjustable_seating_required = self.adjustable_seating_required,
                "Event requires a data projector or adjustable seating the venue does not have"
            );
            return false;
        }
        debug!(event_id = self.id, venue = venue.name(), "Assigned venue");
        self.venue = Some(venue.clone());
        true
    }

    pub(crate) fn clear_venue(&mut self) {
        self.venue = None;
    }

    /// Sets the data projector requirement.
    ///
    /// Requiring a projector is rejected (warning, `false`) while the
    /// assigned venue has none.
    pub fn set_data_projector_required(&mut self, required: bool) -> bool {
        if let Some(venue) = &self.venue
            && required
            && !venue.has_data_projector()
        {
            warn!(
                event_id = self.id,
                venue = venue.name(),
                "Venue has no data projector; change the venue first"
            );
            return false;
        }
        self.projector_needed = required;
        true
    }

    /// Sets the adjustable seating requirement.
    ///
    /// Requiring adjustable seating is rejected (warning, `false`) while the
    /// assigned venue has none.
    pub fn set_adjustable_seating_required(&mut self, required: bool) -> bool {
        if let Some(venue) = &self.venue
            && required
            && !venue.has_adjustable_seating()
        {
            warn!(
                event_id = self.id,
                venue = venue.name(),
                "Venue has no adjustable seating; change the venue first"
            );
            return false;
        }
        self.adjustable_seating_required = required;
        true
    }

    /// Sets both times, or neither when `start >= end`.
    pub fn set_start_and_end_time(
        &mut self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> TimetableResult<()> {
        check_range(start, end)?;
        self.start = start;
        self.end = end;
        Ok(())
    }

    /// Compares two events by start time only.
    ///
    /// Events starting together are order-equal; the venue tie-break is
    /// applied by [`crate::Timetable::sort_events`].
    pub fn cmp_by_start(&self, other: &Self) -> Ordering {
        self.start.cmp(&other.start)
    }
}

fn check_range(start: NaiveDateTime, end: NaiveDateTime) -> TimetableResult<()> {
    if start >= end {
        return Err(TimetableError::InvalidRange { start, end });
    }
    Ok(())
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Event {}

impl Hash for Event {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EventKind::Meeting(m) => write!(
                f,
                "Meeting {{ name: {:?}, organiser: {:?}, type: {}, id: {}, data projector: {}",
                m.meeting_name, m.organiser, m.meeting_type, self.id, self.projector_needed
            )?,
            EventKind::Lecture(l) => write!(
                f,
                "Lecture {{ module: {:?}, lecturer: {:?} ({}), id: {}, adjustable seating: {}",
                l.module_code,
                l.lecturer_name,
                l.lecturer_number,
                self.id,
                self.adjustable_seating_required
            )?,
        }
        write!(
            f,
            ", venue: {}, start: {}, end: {} }}",
            self.venue_name().unwrap_or("none"),
            format_datetime(self.start),
            format_datetime(self.end)
        )
    }
}
