//! Non-interactive listing of a timetable file.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use timetable_core::{Event, LoadOutcome, Timetable, Venue};

use crate::error::ClientResult;

#[derive(Serialize)]
struct Listing<'a> {
    venues: &'a [Venue],
    events: &'a [Event],
}

/// Sorts venues by name and events by start time then venue.
///
/// Events stay in insertion order while any of them has no venue.
pub fn sort_for_display(timetable: &mut Timetable) {
    timetable.sort_venues();
    if let Err(e) = timetable.sort_events() {
        warn!(error = %e, "Listing events in insertion order");
    }
}

/// Prints every venue and event stored in `path`.
///
/// A missing file lists an empty timetable.
pub fn list<W: Write>(path: &Path, json: bool, sort: bool, out: &mut W) -> ClientResult<()> {
    let mut timetable = Timetable::new();
    if timetable.load(path)? == LoadOutcome::Missing {
        debug!(path = %path.display(), "Nothing to list");
    }
    if sort {
        sort_for_display(&mut timetable);
    }

    if json {
        let listing = Listing {
            venues: timetable.venues(),
            events: timetable.events(),
        };
        serde_json::to_writer_pretty(&mut *out, &listing)?;
        writeln!(out)?;
    } else {
        write!(out, "{timetable}")?;
    }
    Ok(())
}
