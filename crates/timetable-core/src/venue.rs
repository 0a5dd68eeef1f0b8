//! Bookable venues.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

/// A named room with capability flags.
///
/// Equality, hashing and ordering use only the (case-sensitive) name, so a
/// timetable never holds two venues with the same name regardless of their
/// flags.
#[derive(Debug, Clone, Serialize)]
pub struct Venue {
    name: String,
    has_data_projector: bool,
    has_adjustable_seating: bool,
}

impl Venue {
    /// Creates a venue with no facilities.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            has_data_projector: false,
            has_adjustable_seating: false,
        }
    }

    /// Builder method to set the data projector flag.
    pub fn with_data_projector(mut self, has_data_projector: bool) -> Self {
        self.has_data_projector = has_data_projector;
        self
    }

    /// Builder method to set the adjustable seating flag.
    pub fn with_adjustable_seating(mut self, has_adjustable_seating: bool) -> Self {
        self.has_adjustable_seating = has_adjustable_seating;
        self
    }

    /// Returns the venue name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the venue has a data projector.
    pub fn has_data_projector(&self) -> bool {
        self.has_data_projector
    }

    /// Returns true if the venue has adjustable seating.
    pub fn has_adjustable_seating(&self) -> bool {
        self.has_adjustable_seating
    }

    /// Returns true if this venue offers every facility the event requires.
    pub fn satisfies(&self, projector_needed: bool, adjustable_seating_required: bool) -> bool {
        (!projector_needed || self.has_data_projector)
            && (!adjustable_seating_required || self.has_adjustable_seating)
    }
}

impl PartialEq for Venue {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Venue {}

impl Hash for Venue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Venue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Venue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Venue {{ name: {:?}, data projector: {}, adjustable seating: {} }}",
            self.name, self.has_data_projector, self.has_adjustable_seating
        )
    }
}
