//! The timetable container.
//!
//! A [`Timetable`] owns the venue list and the event list of one session and
//! persists both to a text file (see [`crate::format`]).

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::error::{TimetableError, TimetableResult};
use crate::event::Event;
use crate::format;
use crate::venue::Venue;

/// What [`Timetable::load`] found on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The file was read and replaced the timetable.
    Loaded,
    /// The file does not exist; the timetable was reset to empty.
    Missing,
}

/// Events and venues for one session.
///
/// Event ids and venue names are unique: adding an equal entity a second
/// time is refused with a `false` return.
#[derive(Debug, Clone, Default)]
pub struct Timetable {
    events: Vec<Event>,
    venues: Vec<Venue>,
}

impl Timetable {
    /// Creates an empty timetable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event unless one with the same id exists.
    ///
    /// The event's venue is re-bound to the venue registered under the same
    /// name. An unknown or incompatible venue is cleared with a warning and
    /// the event is added without one.
    pub fn add_event(&mut self, mut event: Event) -> bool {
        if self.events.contains(&event) {
            debug!(event_id = event.id(), "Event already exists");
            return false;
        }
        self.rebind_venue(&mut event);
        debug!(event_id = event.id(), kind = event.kind().tag(), "Added event");
        self.events.push(event);
        true
    }

    fn rebind_venue(&self, event: &mut Event) {
        let Some(name) = event.venue_name() else {
            return;
        };
        match self.search_for_venue(name) {
            Some(registered) => {
                if !event.set_venue(registered) {
                    event.clear_venue();
                }
            }
            None => {
                warn!(
                    event_id = event.id(),
                    venue = name,
                    "Venue is not registered; event added without one"
                );
                event.clear_venue();
            }
        }
    }

    /// Appends a venue unless one with the same name exists.
    ///
    /// A venue with an empty name is refused: an empty venue line in the
    /// file means "no venue".
    pub fn add_venue(&mut self, venue: Venue) -> bool {
        if venue.name().is_empty() {
            warn!("Refusing venue with an empty name");
            return false;
        }
        if self.venues.contains(&venue) {
            debug!(venue = venue.name(), "Venue already exists");
            return false;
        }
        debug!(venue = venue.name(), "Added venue");
        self.venues.push(venue);
        true
    }

    /// Removes the event with the given id. Returns whether it was found.
    pub fn remove_event(&mut self, event_id: i32) -> bool {
        match self.events.iter().position(|e| e.id() == event_id) {
            Some(pos) => {
                self.events.remove(pos);
                debug!(event_id, "Removed event");
                true
            }
            None => false,
        }
    }

    /// Returns the event with the given id.
    pub fn search_for_event(&self, event_id: i32) -> Option<&Event> {
        self.events.iter().find(|e| e.id() == event_id)
    }

    /// Moves an event to new times.
    ///
    /// Returns `Ok(false)` if no event has this id, and fails with
    /// [`TimetableError::InvalidRange`] unless `start < end`.
    pub fn reschedule_event(
        &mut self,
        event_id: i32,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> TimetableResult<bool> {
        let Some(event) = self.events.iter_mut().find(|e| e.id() == event_id) else {
            return Ok(false);
        };
        event.set_start_and_end_time(start, end)?;
        debug!(event_id, "Rescheduled event");
        Ok(true)
    }

    /// Returns the venue with exactly this name.
    pub fn search_for_venue(&self, name: &str) -> Option<&Venue> {
        self.venues.iter().find(|v| v.name() == name)
    }

    /// Assigns a registered venue to a registered event.
    ///
    /// Returns false if either is unknown or the venue lacks a facility the
    /// event requires.
    pub fn assign_venue(&mut self, event_id: i32, venue_name: &str) -> bool {
        let Some(venue) = self.venues.iter().find(|v| v.name() == venue_name) else {
            warn!(venue = venue_name, "No such venue");
            return false;
        };
        let Some(event) = self.events.iter_mut().find(|e| e.id() == event_id) else {
            warn!(event_id, "No such event");
            return false;
        };
        event.set_venue(venue)
    }

    /// Sorts events by start time, then by venue name.
    ///
    /// Every event needs a venue for the tie-break; otherwise this fails
    /// with [`TimetableError::UnassignedVenue`] and the order is unchanged.
    pub fn sort_events(&mut self) -> TimetableResult<()> {
        if let Some(event) = self.events.iter().find(|e| e.venue().is_none()) {
            return Err(TimetableError::UnassignedVenue {
                event_id: event.id(),
            });
        }
        self.events
            .sort_by(|a, b| a.cmp_by_start(b).then_with(|| a.venue_name().cmp(&b.venue_name())));
        Ok(())
    }

    /// Sorts venues by name.
    pub fn sort_venues(&mut self) {
        self.venues.sort();
    }

    /// Returns a copy of the events in their current order.
    pub fn obtain_all_events(&self) -> Vec<Event> {
        self.events.clone()
    }

    /// Returns a copy of the venues in their current order.
    pub fn obtain_all_venues(&self) -> Vec<Venue> {
        self.venues.clone()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn venues(&self) -> &[Venue] {
        &self.venues
    }

    /// Replaces this timetable with the contents of a file.
    ///
    /// The file is decoded into a fresh timetable first, so on error `self`
    /// is left as it was. A missing file is treated as first use: the
    /// timetable is emptied and [`LoadOutcome::Missing`] is returned.
    pub fn load(&mut self, path: impl AsRef<Path>) -> TimetableResult<LoadOutcome> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(
                    path = %path.display(),
                    "Timetable file does not exist; assuming first use and starting empty"
                );
                *self = Self::new();
                return Ok(LoadOutcome::Missing);
            }
            Err(e) => return Err(TimetableError::io(path, e)),
        };

        *self = format::decode(&text)?;
        info!(
            path = %path.display(),
            venues = self.venues.len(),
            events = self.events.len(),
            "Loaded timetable"
        );
        Ok(LoadOutcome::Loaded)
    }

    /// Writes the timetable to a file, replacing its contents.
    pub fn save(&self, path: impl AsRef<Path>) -> TimetableResult<()> {
        let path = path.as_ref();
        let text = format::encode(self)?;

        let file = File::create(path).map_err(|e| TimetableError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(text.as_bytes())
            .and_then(|()| writer.flush())
            .map_err(|e| TimetableError::io(path, e))?;

        info!(
            path = %path.display(),
            venues = self.venues.len(),
            events = self.events.len(),
            "Saved timetable"
        );
        Ok(())
    }
}

impl fmt::Display for Timetable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Venues in timetable system are:")?;
        for venue in &self.venues {
            writeln!(f, "{venue}")?;
        }
        writeln!(f)?;
        writeln!(f, "Events in timetable are:")?;
        for event in &self.events {
            writeln!(f, "{event}")?;
        }
        Ok(())
    }
}
