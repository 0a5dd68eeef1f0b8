//! Line-oriented timetable file format.
//!
//! A timetable file holds one token per line. The venue block comes first,
//! prefixed by its length, followed by one record per event:
//!
//! ```text
//! 2                      venue count
//! Room A                 venue name
//! true                   has data projector
//! false                  has adjustable seating
//! Hall
//! false
//! true
//! meeting                record tag: meeting | lecture
//! 1                      event id
//! 2020-03-01T09:00       start (ISO-8601 local date-time)
//! 2020-03-01T10:00       end
//! true                   data projector needed
//! Staff sync             meeting: name, organiser, type
//! Chris                  lecture: module code, lecturer name,
//! STAFF                           lecturer number, adjustable seating
//! Room A                 venue name (empty when unassigned)
//! ```
//!
//! The last record is not followed by a newline. Event records name their
//! venue, so the venue block must be fully read before any record.


use std::iter::{Map, Peekable};
use std::str::Split;

use chrono::{NaiveDateTime, Timelike};
use tracing::{debug, warn};

use crate::error::{ParseError, TimetableError, TimetableResult};
use crate::event::{Event, EventKind, Lecture, Meeting, MeetingType};
use crate::timetable::Timetable;
use crate::venue::Venue;

const MEETING_TAG: &str = "meeting";
const LECTURE_TAG: &str = "lecture";

/// Formats a date-time the way ISO local date-times are printed: seconds
/// and fraction are only written when non-zero.
pub fn format_datetime(dt: NaiveDateTime) -> String {
    let pattern = if dt.nanosecond() != 0 {
        "%Y-%m-%dT%H:%M:%S%.f"
    } else if dt.second() != 0 {
        "%Y-%m-%dT%H:%M:%S"
    } else {
        "%Y-%m-%dT%H:%M"
    };
    dt.format(pattern).to_string()
}

/// Parses an ISO-8601 local date-time, with or without seconds.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    s.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").ok())
}

/// Encodes a timetable to the file format.
///
/// Fails with [`TimetableError::InvalidField`] if a string field contains a
/// line break, since it could not be read back.
pub fn encode(timetable: &Timetable) -> TimetableResult<String> {
    let venues = timetable.venues();
    let events = timetable.events();
    let mut out = String::new();

    push_line(&mut out, venues.len());
    for venue in venues {
        push_line(&mut out, checked("venue name", venue.name())?);
        push_line(&mut out, venue.has_data_projector());
        push_line(&mut out, venue.has_adjustable_seating());
    }

    for (pos, event) in events.iter().enumerate() {
        push_line(&mut out, event.kind().tag());
        push_line(&mut out, event.id());
        push_line(&mut out, format_datetime(event.start()));
        push_line(&mut out, format_datetime(event.end()));
        push_line(&mut out, event.projector_needed());

        match event.kind() {
            EventKind::Meeting(meeting) => {
                push_line(&mut out, checked("meeting name", &meeting.meeting_name)?);
                push_line(&mut out, checked("organiser", &meeting.organiser)?);
                push_line(&mut out, meeting.meeting_type);
            }
            EventKind::Lecture(lecture) => {
                push_line(&mut out, checked("module code", &lecture.module_code)?);
                push_line(&mut out, checked("lecturer name", &lecture.lecturer_name)?);
                push_line(&mut out, lecture.lecturer_number);
                push_line(&mut out, event.adjustable_seating_required());
            }
        }

        out.push_str(checked("venue name", event.venue_name().unwrap_or_default())?);
        if pos + 1 < events.len() {
            out.push('\n');
        }
    }

    Ok(out)
}

/// Decodes the file format into a new timetable.
///
/// Unknown venue names leave the event without a venue, and so do venues
/// that lack a facility the event requires. Duplicate venue names and event
/// ids are skipped. Both cases are logged, not errors.
pub fn decode(input: &str) -> Result<Timetable, ParseError> {
    let mut tokens = Tokens::new(input);
    let mut timetable = Timetable::new();

    let (line, count) = tokens.next_int("venue count")?;
    if count < 0 {
        return Err(ParseError::NegativeCount { line, count });
    }

    for _ in 0..count {
        let (_, name) = tokens.next_token("venue name")?;
        let has_data_projector = tokens.next_bool("data projector flag")?;
        let has_adjustable_seating = tokens.next_bool("adjustable seating flag")?;

        let venue = Venue::new(name)
            .with_data_projector(has_data_projector)
            .with_adjustable_seating(has_adjustable_seating);
        if !timetable.add_venue(venue) {
            warn!(venue = name, "Skipping duplicate or unnamed venue");
        }
    }

    while tokens.skip_blank_lines() {
        let event = read_event(&mut tokens, &timetable)?;
        let id = event.id();
        if !timetable.add_event(event) {
            warn!(event_id = id, "Skipping duplicate event");
        }
    }

    debug!(
        venues = timetable.venues().len(),
        events = timetable.events().len(),
        "Decoded timetable"
    );
    Ok(timetable)
}

fn read_event(tokens: &mut Tokens<'_>, timetable: &Timetable) -> Result<Event, ParseError> {
    let (tag_line, tag) = tokens.next_token("event record")?;
    if tag != MEETING_TAG && tag != LECTURE_TAG {
        return Err(ParseError::UnknownRecord {
            line: tag_line,
            value: tag.to_string(),
        });
    }

    let (_, id) = tokens.next_int("event id")?;
    let (start_line, start) = tokens.next_datetime("start time")?;
    let (_, end) = tokens.next_datetime("end time")?;
    let projector_needed = tokens.next_bool("data projector flag")?;

    let (kind, adjustable_seating_required) = if tag == LECTURE_TAG {
        let (_, module_code) = tokens.next_token("module code")?;
        let (_, lecturer_name) = tokens.next_token("lecturer name")?;
        let (_, lecturer_number) = tokens.next_int("lecturer number")?;
        let seating = tokens.next_bool("adjustable seating flag")?;
        (
            EventKind::from(Lecture::new(module_code, lecturer_name, lecturer_number)),
            seating,
        )
    } else {
        let (_, meeting_name) = tokens.next_token("meeting name")?;
        let (_, organiser) = tokens.next_token("organiser")?;
        let (type_line, type_token) = tokens.next_token("meeting type")?;
        let meeting_type = type_token.parse::<MeetingType>().map_err(|e| {
            ParseError::UnknownMeetingType {
                line: type_line,
                value: e.0,
            }
        })?;
        (
            EventKind::from(Meeting::new(meeting_name, organiser, meeting_type)),
            false,
        )
    };

    let mut event = Event::new(id, kind, start, end).map_err(|_| ParseError::InvalidRange {
        line: start_line,
        start,
        end,
    })?;
    event.set_data_projector_required(projector_needed);
    event.set_adjustable_seating_required(adjustable_seating_required);

    let (venue_line, venue_name) = tokens.next_token("venue name")?;
    if !venue_name.is_empty() {
        match timetable.search_for_venue(venue_name) {
            Some(venue) => {
                event.set_venue(venue);
            }
            None => warn!(
                line = venue_line,
                event_id = id,
                venue = venue_name,
                "Unknown venue; event loaded without one"
            ),
        }
    }

    Ok(event)
}

fn push_line(out: &mut String, token: impl ToString) {
    out.push_str(&token.to_string());
    out.push('\n');
}

fn checked<'a>(field: &'static str, value: &'a str) -> TimetableResult<&'a str> {
    if value.contains(['\n', '\r']) {
        return Err(TimetableError::InvalidField {
            field,
            value: value.to_string(),
        });
    }
    Ok(value)
}

type SplitLines<'a> = Map<Split<'a, char>, fn(&'a str) -> &'a str>;

/// Line tokenizer tracking 1-based line numbers.
///
/// Unlike [`str::lines`], a final empty line after the last `\n` is kept as
/// a token: it is the empty venue of an unassigned last event.
struct Tokens<'a> {
    lines: Peekable<SplitLines<'a>>,
    line: usize,
}

fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        let strip: fn(&'a str) -> &'a str = strip_cr;
        Self {
            lines: input.split('\n').map(strip).peekable(),
            line: 0,
        }
    }

    fn next_token(&mut self, expected: &'static str) -> Result<(usize, &'a str), ParseError> {
        match self.lines.next() {
            Some(token) => {
                self.line += 1;
                Ok((self.line, token))
            }
            None => Err(ParseError::MissingToken {
                line: self.line + 1,
                expected,
            }),
        }
    }

    fn next_int(&mut self, expected: &'static str) -> Result<(usize, i32), ParseError> {
        let (line, token) = self.next_token(expected)?;
        let value = token.parse().map_err(|_| ParseError::InvalidInteger {
            line,
            value: token.to_string(),
        })?;
        Ok((line, value))
    }

    fn next_bool(&mut self, expected: &'static str) -> Result<bool, ParseError> {
        let (line, token) = self.next_token(expected)?;
        if token.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if token.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(ParseError::InvalidBoolean {
                line,
                value: token.to_string(),
            })
        }
    }

    fn next_datetime(
        &mut self,
        expected: &'static str,
    ) -> Result<(usize, NaiveDateTime), ParseError> {
        let (line, token) = self.next_token(expected)?;
        let value = parse_datetime(token).ok_or_else(|| ParseError::InvalidDateTime {
            line,
            value: token.to_string(),
        })?;
        Ok((line, value))
    }

    /// Skips blank lines between records; returns true if a token follows.
    fn skip_blank_lines(&mut self) -> bool {
        while let Some(token) = self.lines.peek() {
            if !token.trim().is_empty() {
                return true;
            }
            self.lines.next();
            self.line += 1;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 3, day)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    mod datetime {
        use super::*;

        #[test]
        fn minutes_only_when_seconds_are_zero() {
            assert_eq!(format_datetime(at(1, 9, 0)), "2020-03-01T09:00");
        }

        #[test]
        fn seconds_and_fraction() {
            let dt = NaiveDate::from_ymd_opt(2020, 3, 1)
                .unwrap()
                .and_hms_opt(9, 0, 30)
                .unwrap();
            assert_eq!(format_datetime(dt), "2020-03-01T09:00:30");

            let dt = NaiveDate::from_ymd_opt(2020, 3, 1)
                .unwrap()
                .and_hms_milli_opt(9, 0, 30, 250)
                .unwrap();
            assert_eq!(format_datetime(dt), "2020-03-01T09:00:30.250");
        }

        #[test]
        fn parse_accepts_both_precisions() {
            assert_eq!(parse_datetime("2020-03-01T09:00"), Some(at(1, 9, 0)));
            assert_eq!(parse_datetime("2020-03-01T09:00:00"), Some(at(1, 9, 0)));
            assert!(parse_datetime("2020-03-01 09:00").is_none());
            assert!(parse_datetime("tomorrow").is_none());
        }
    }

    mod decoding {
        use super::*;

        const VENUES: &str = "2\nRoom A\ntrue\nfalse\nHall\nfalse\ntrue\n";

        #[test]
        fn empty_file_with_zero_venues() {
            let timetable = decode("0").unwrap();
            assert!(timetable.venues().is_empty());
            assert!(timetable.events().is_empty());

            let timetable = decode("0\n").unwrap();
            assert!(timetable.events().is_empty());
        }

        #[test]
        fn completely_empty_input_is_an_error() {
            let err = decode("").unwrap_err();
            assert_eq!(
                err,
                ParseError::InvalidInteger {
                    line: 1,
                    value: String::new()
                }
            );
        }

        #[test]
        fn meeting_and_lecture_records() {
            let input = format!(
                "{VENUES}meeting\n1\n2020-03-01T09:00\n2020-03-01T10:00\ntrue\nStaff sync\nChris\nSTAFF\nRoom A\n\
                 lecture\n2\n2020-03-01T11:00\n2020-03-01T12:00\nFALSE\nCS12020\nJamie Gregory\n42\ntrue\nHall"
            );
            let timetable = decode(&input).unwrap();
            assert_eq!(timetable.venues().len(), 2);

            let meeting = timetable.search_for_event(1).unwrap();
            assert_eq!(meeting.start(), at(1, 9, 0));
            assert!(meeting.projector_needed());
            assert!(!meeting.adjustable_seating_required());
            assert_eq!(meeting.venue_name(), Some("Room A"));
            assert_eq!(
                meeting.kind(),
                &EventKind::Meeting(Meeting::new("Staff sync", "Chris", MeetingType::Staff))
            );

            let lecture = timetable.search_for_event(2).unwrap();
            assert!(!lecture.projector_needed());
            assert!(lecture.adjustable_seating_required());
            assert_eq!(lecture.venue_name(), Some("Hall"));
            assert_eq!(
                lecture.kind(),
                &EventKind::Lecture(Lecture::new("CS12020", "Jamie Gregory", 42))
            );
        }

        #[test]
        fn crlf_line_endings() {
            let input = "1\r\nRoom A\r\ntrue\r\ntrue\r\nmeeting\r\n1\r\n2020-03-01T09:00\r\n\
                         2020-03-01T10:00\r\nfalse\r\nm\r\no\r\nLTC\r\nRoom A\r\n";
            let timetable = decode(input).unwrap();
            assert_eq!(timetable.search_for_venue("Room A").unwrap().name(), "Room A");
            assert_eq!(
                timetable.search_for_event(1).unwrap().venue_name(),
                Some("Room A")
            );
        }

        #[test]
        fn unknown_venue_leaves_event_unassigned() {
            let input = format!(
                "{VENUES}meeting\n1\n2020-03-01T09:00\n2020-03-01T10:00\nfalse\nm\no\nOTHER\nNowhere"
            );
            let timetable = decode(&input).unwrap();
            assert!(timetable.search_for_event(1).unwrap().venue().is_none());
        }

        #[test]
        fn incompatible_venue_leaves_event_unassigned() {
            // Room A has no adjustable seating.
            let input = format!(
                "{VENUES}lecture\n2\n2020-03-01T11:00\n2020-03-01T12:00\nfalse\nCS1\nJ\n1\ntrue\nRoom A"
            );
            let timetable = decode(&input).unwrap();
            let lecture = timetable.search_for_event(2).unwrap();
            assert!(lecture.adjustable_seating_required());
            assert!(lecture.venue().is_none());
        }

        #[test]
        fn empty_venue_line_means_unassigned() {
            let input = "0\nmeeting\n1\n2020-03-01T09:00\n2020-03-01T10:00\nfalse\nm\no\nOTHER\n";
            let timetable = decode(input).unwrap();
            assert!(timetable.search_for_event(1).unwrap().venue().is_none());
        }

        #[test]
        fn duplicates_are_skipped() {
            let input = "2\nRoom A\ntrue\nfalse\nRoom A\nfalse\nfalse\n\
                         meeting\n1\n2020-03-01T09:00\n2020-03-01T10:00\nfalse\nfirst\no\nOTHER\nRoom A\n\
                         meeting\n1\n2020-03-02T09:00\n2020-03-02T10:00\nfalse\nsecond\no\nOTHER\nRoom A";
            let timetable = decode(input).unwrap();
            assert_eq!(timetable.venues().len(), 1);
            assert!(timetable.venues()[0].has_data_projector());
            assert_eq!(timetable.events().len(), 1);
            assert_eq!(timetable.events()[0].start(), at(1, 9, 0));
        }

        #[test]
        fn unnamed_venue_is_skipped() {
            let input = "2\n\ntrue\ntrue\nHall\nfalse\nfalse\n\
                         meeting\n1\n2020-03-01T09:00\n2020-03-01T10:00\nfalse\nm\no\nOTHER\n";
            let timetable = decode(input).unwrap();
            let names: Vec<&str> = timetable.venues().iter().map(Venue::name).collect();
            assert_eq!(names, ["Hall"]);
            assert!(timetable.search_for_event(1).unwrap().venue().is_none());
        }

        #[test]
        fn trailing_blank_lines_are_ignored() {
            let input = format!(
                "{VENUES}meeting\n1\n2020-03-01T09:00\n2020-03-01T10:00\nfalse\nm\no\nOTHER\nHall\n\n\n"
            );
            assert_eq!(decode(&input).unwrap().events().len(), 1);
        }
    }

    mod malformed {
        use super::*;

        #[test]
        fn unknown_meeting_type() {
            let input = "0\nmeeting\n1\n2020-03-01T09:00\n2020-03-01T10:00\nfalse\nm\no\nBOARD\n";
            assert_eq!(
                decode(input).unwrap_err(),
                ParseError::UnknownMeetingType {
                    line: 9,
                    value: "BOARD".to_string()
                }
            );
        }

        #[test]
        fn unknown_record_tag() {
            let input = "0\nseminar\n1\n";
            assert_eq!(
                decode(input).unwrap_err(),
                ParseError::UnknownRecord {
                    line: 2,
                    value: "seminar".to_string()
                }
            );
        }

        #[test]
        fn bad_timestamp() {
            let input = "0\nlecture\n1\n2020-13-01T09:00\n";
            assert_eq!(
                decode(input).unwrap_err(),
                ParseError::InvalidDateTime {
                    line: 4,
                    value: "2020-13-01T09:00".to_string()
                }
            );
        }

        #[test]
        fn bad_boolean_in_venue_block() {
            let err = decode("1\nRoom A\nyes\nfalse\n").unwrap_err();
            assert_eq!(
                err,
                ParseError::InvalidBoolean {
                    line: 3,
                    value: "yes".to_string()
                }
            );
        }

        #[test]
        fn truncated_record() {
            let input = "0\nlecture\n1\n2020-03-01T09:00\n2020-03-01T10:00\nfalse\nCS1\n";
            assert_eq!(
                decode(input).unwrap_err(),
                ParseError::MissingToken {
                    line: 8,
                    expected: "lecturer name"
                }
            );
        }

        #[test]
        fn non_numeric_venue_count() {
            assert!(matches!(
                decode("two\n").unwrap_err(),
                ParseError::InvalidInteger { line: 1, .. }
            ));
            assert!(matches!(
                decode("-1\n").unwrap_err(),
                ParseError::NegativeCount { line: 1, count: -1 }
            ));
        }

        #[test]
        fn reversed_range() {
            let input = "0\nmeeting\n1\n2020-03-01T10:00\n2020-03-01T09:00\nfalse\nm\no\nSTAFF\n\n";
            assert_eq!(
                decode(input).unwrap_err(),
                ParseError::InvalidRange {
                    line: 4,
                    start: at(1, 10, 0),
                    end: at(1, 9, 0)
                }
            );
        }
    }

    mod encoding {
        use super::*;

        #[test]
        fn empty_timetable() {
            assert_eq!(encode(&Timetable::new()).unwrap(), "0\n");
        }

        #[test]
        fn no_trailing_newline_after_last_record() {
            let mut timetable = Timetable::new();
            timetable.add_venue(Venue::new("Hall"));
            let mut event = Event::meeting(
                1,
                Meeting::new("m", "o", MeetingType::Ltc),
                at(1, 9, 0),
                at(1, 10, 0),
            )
            .unwrap();
            event.set_venue(&Venue::new("Hall"));
            timetable.add_event(event);

            let text = encode(&timetable).unwrap();
            assert!(text.ends_with("LTC\nHall"));
        }

        #[test]
        fn unassigned_venue_writes_empty_line() {
            let mut timetable = Timetable::new();
            for id in [1, 2] {
                timetable.add_event(
                    Event::lecture(id, Lecture::new("CS1", "J", 7), at(1, 9, 0), at(1, 10, 0))
                        .unwrap(),
                );
            }
            let text = encode(&timetable).unwrap();
            assert!(text.contains("7\nfalse\n\nlecture\n2\n"));
            assert!(text.ends_with("7\nfalse\n"));

            let reloaded = decode(&text).unwrap();
            assert_eq!(reloaded.events().len(), 2);
            assert!(reloaded.events().iter().all(|e| e.venue().is_none()));
        }

        #[test]
        fn line_break_in_field_is_rejected() {
            let mut timetable = Timetable::new();
            timetable.add_event(
                Event::meeting(
                    1,
                    Meeting::new("two\nlines", "o", MeetingType::Other),
                    at(1, 9, 0),
                    at(1, 10, 0),
                )
                .unwrap(),
            );
            let err = encode(&timetable).unwrap_err();
            assert!(matches!(
                err,
                TimetableError::InvalidField {
                    field: "meeting name",
                    ..
                }
            ));
        }
    }
}
