//! Interactive menu over a timetable.
//!
//! The menu reads answers from any [`BufRead`] and writes prompts to any
//! [`Write`], so a session can be replayed from memory in tests. Running out
//! of input ends the session as if `q` had been chosen.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use timetable_core::{
    Event, Lecture, LoadOutcome, Meeting, MeetingType, Timetable, Venue, format_datetime,
};

use crate::commands::list::sort_for_display;
use crate::error::{ClientError, ClientResult};

/// A menu choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    AddEvent,
    SearchEvent,
    RemoveEvent,
    AddVenue,
    PrintAll,
    Quit,
}

impl MenuAction {
    /// Parses a menu answer (`1` to `5`, or `q` in either case).
    pub fn parse(answer: &str) -> Option<Self> {
        match answer.trim().to_uppercase().as_str() {
            "1" => Some(Self::AddEvent),
            "2" => Some(Self::SearchEvent),
            "3" => Some(Self::RemoveEvent),
            "4" => Some(Self::AddVenue),
            "5" => Some(Self::PrintAll),
            "Q" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Asks for the timetable file name on the console.
pub fn prompt_filename<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> ClientResult<PathBuf> {
    write!(output, "Please enter the filename of timetable information: ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(ClientError::EndOfInput);
    }
    let name = line.trim();
    if name.is_empty() {
        return Err(ClientError::Config("no timetable file given".into()));
    }
    Ok(PathBuf::from(name))
}

/// Parses `year month day hour minutes` typed on one line.
pub fn parse_datetime_fields(line: &str) -> Result<NaiveDateTime, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let [year, month, day, hour, minute] = parts.as_slice() else {
        return Err("Enter five numbers: year month day hour minutes".to_string());
    };

    let year: i32 = year.parse().map_err(|_| "Use integers".to_string())?;
    let month = parse_field(month)?;
    let day = parse_field(day)?;
    let hour = parse_field(hour)?;
    let minute = parse_field(minute)?;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .ok_or_else(|| format!("Try again. {year}-{month}-{day} {hour}:{minute} is not a valid date/time"))
}

fn parse_field(s: &str) -> Result<u32, String> {
    s.parse().map_err(|_| "Use integers".to_string())
}

/// Names the first facility the venue lacks for this event.
fn missing_facility(event: &Event, venue: &Venue) -> Option<&'static str> {
    if event.projector_needed() && !venue.has_data_projector() {
        Some("a data projector")
    } else if event.adjustable_seating_required() && !venue.has_adjustable_seating() {
        Some("adjustable seating")
    } else {
        None
    }
}

/// An interactive session editing one timetable file.
pub struct Menu<R, W> {
    input: R,
    output: W,
    timetable: Timetable,
    path: PathBuf,
    sort_on_display: bool,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    /// Creates a session for the given file. Nothing is read until
    /// [`Menu::initialise`].
    pub fn new(input: R, output: W, path: impl Into<PathBuf>) -> Self {
        Self {
            input,
            output,
            timetable: Timetable::new(),
            path: path.into(),
            sort_on_display: true,
        }
    }

    /// Builder: sort venues and events before displaying everything.
    pub fn with_sort_on_display(mut self, sort: bool) -> Self {
        self.sort_on_display = sort;
        self
    }

    pub fn timetable(&self) -> &Timetable {
        &self.timetable
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Consumes the session, returning the timetable and the output sink.
    pub fn into_parts(self) -> (Timetable, W) {
        (self.timetable, self.output)
    }

    /// Loads the file, runs the menu until quit, then displays and saves
    /// everything.
    pub fn run(&mut self) -> ClientResult<()> {
        self.initialise()?;
        self.run_menu()?;
        self.print_all()?;
        self.save()?;
        writeln!(self.output, "***********GOODBYE**********")?;
        Ok(())
    }

    /// Loads the timetable file. A missing file starts an empty timetable.
    pub fn initialise(&mut self) -> ClientResult<()> {
        writeln!(self.output, "Using file {}", self.path.display())?;
        if self.timetable.load(&self.path)? == LoadOutcome::Missing {
            writeln!(
                self.output,
                "The file {} does not exist. Assuming first use and an empty file.",
                self.path.display()
            )?;
        }
        Ok(())
    }

    /// Runs menu actions until `q` or the end of input.
    pub fn run_menu(&mut self) -> ClientResult<()> {
        loop {
            self.print_menu()?;
            writeln!(self.output, "What would you like to do:")?;
            let Some(answer) = self.read_line()? else {
                break;
            };

            let result = match MenuAction::parse(&answer) {
                Some(MenuAction::Quit) => break,
                Some(MenuAction::AddEvent) => self.add_event(),
                Some(MenuAction::SearchEvent) => self.search_for_event(),
                Some(MenuAction::RemoveEvent) => self.remove_event(),
                Some(MenuAction::AddVenue) => self.add_venue(),
                Some(MenuAction::PrintAll) => self.print_all(),
                None => writeln!(self.output, "Try again").map_err(ClientError::from),
            };

            match result {
                Ok(()) => {}
                Err(ClientError::EndOfInput) => {
                    debug!("Input ended during a prompt");
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Displays every venue and event.
    pub fn print_all(&mut self) -> ClientResult<()> {
        if self.sort_on_display {
            sort_for_display(&mut self.timetable);
        }
        write!(self.output, "{}", self.timetable)?;
        Ok(())
    }

    /// Writes the timetable back to its file.
    pub fn save(&mut self) -> ClientResult<()> {
        self.timetable.save(&self.path)?;
        writeln!(self.output, "Saved timetable to {}", self.path.display())?;
        Ok(())
    }

    fn print_menu(&mut self) -> ClientResult<()> {
        writeln!(self.output, "1 -  add a new event")?;
        writeln!(self.output, "2 -  search for a booked event")?;
        writeln!(self.output, "3 -  remove a timetable event")?;
        writeln!(self.output, "4 -  add a venue")?;
        writeln!(self.output, "5 -  display everything")?;
        writeln!(self.output, "q -  Quit")?;
        Ok(())
    }

    fn read_line(&mut self) -> ClientResult<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn prompt(&mut self, message: &str) -> ClientResult<String> {
        writeln!(self.output, "{message}")?;
        self.read_line()?.ok_or(ClientError::EndOfInput)
    }

    fn prompt_yes_no(&mut self, message: &str) -> ClientResult<String> {
        Ok(self.prompt(message)?.trim().to_uppercase())
    }

    fn prompt_int(&mut self, message: &str) -> ClientResult<Option<i32>> {
        Ok(self.prompt(message)?.trim().parse().ok())
    }

    fn prompt_meeting_type(&mut self) -> ClientResult<MeetingType> {
        let choices: Vec<String> = MeetingType::ALL
            .iter()
            .enumerate()
            .map(|(i, t)| format!("{} - {}", i + 1, t.description()))
            .collect();
        let answer = self.prompt(&format!(
            "Meeting type, enter the number ({})",
            choices.join(", ")
        ))?;
        let meeting_type = MeetingType::from_menu_choice(&answer);
        writeln!(self.output, "Meeting type selected: {meeting_type}")?;
        Ok(meeting_type)
    }

    fn prompt_datetime(&mut self) -> ClientResult<NaiveDateTime> {
        loop {
            let line = self.prompt("On one line (numbers): year month day hour minutes")?;
            match parse_datetime_fields(&line) {
                Ok(dt) => {
                    writeln!(
                        self.output,
                        "The date/time you entered was: {}",
                        format_datetime(dt)
                    )?;
                    return Ok(dt);
                }
                Err(msg) => writeln!(self.output, "{msg}")?,
            }
        }
    }

    fn prompt_start_end(&mut self) -> ClientResult<(NaiveDateTime, NaiveDateTime)> {
        loop {
            writeln!(self.output, "Enter start time for timetable event")?;
            let start = self.prompt_datetime()?;
            writeln!(self.output, "Enter end time for timetable event")?;
            let end = self.prompt_datetime()?;
            if start < end {
                return Ok((start, end));
            }
            writeln!(
                self.output,
                "Start time: {} must be before end time: {}",
                format_datetime(start),
                format_datetime(end)
            )?;
        }
    }

    /// Asks for a new event id; `None` if it is not a number or is taken.
    fn prompt_new_event_id(&mut self) -> ClientResult<Option<i32>> {
        let Some(id) =
            self.prompt_int("Enter the unique timetable event identifier: (unique number)")?
        else {
            writeln!(self.output, "Incorrect data type")?;
            return Ok(None);
        };
        if self.timetable.search_for_event(id).is_some() {
            writeln!(self.output, "An event with ID {id} already exists")?;
            return Ok(None);
        }
        Ok(Some(id))
    }

    fn add_event(&mut self) -> ClientResult<()> {
        let choice = self.prompt_yes_no("Meeting or Lecture? (M/L)")?;
        match choice.as_str() {
            "M" => self.add_meeting(),
            "L" => self.add_lecture(),
            _ => {
                writeln!(self.output, "Unknown event kind {choice:?}")?;
                Ok(())
            }
        }
    }

    fn add_meeting(&mut self) -> ClientResult<()> {
        let meeting_name = self.prompt("Enter meeting name:")?;
        let organiser = self.prompt("Enter organiser name:")?;
        let meeting_type = self.prompt_meeting_type()?;

        let Some(id) = self.prompt_new_event_id()? else {
            return Ok(());
        };
        let (start, end) = self.prompt_start_end()?;
        let projector_needed = self.prompt_yes_no("Is a data projector required? (Y/N)")? != "N";

        let event = Event::meeting(
            id,
            Meeting::new(meeting_name, organiser, meeting_type),
            start,
            end,
        )?
        .with_projector_needed(projector_needed);
        self.place_event(event)
    }

    fn add_lecture(&mut self) -> ClientResult<()> {
        let module_code = self.prompt("Enter module code:")?;
        let lecturer_name = self.prompt("Enter lecturer name:")?;
        let Some(lecturer_number) = self.prompt_int("Set lecturer number")? else {
            writeln!(self.output, "Incorrect data type")?;
            return Ok(());
        };

        let Some(id) = self.prompt_new_event_id()? else {
            return Ok(());
        };
        let (start, end) = self.prompt_start_end()?;
        let seating_required =
            self.prompt_yes_no("Is adjustable seating required? (Y/N)")? != "N";

        let event = Event::lecture(
            id,
            Lecture::new(module_code, lecturer_name, lecturer_number),
            start,
            end,
        )?
        .with_adjustable_seating_required(seating_required);
        self.place_event(event)
    }

    /// Asks for a compatible venue, then adds the event.
    ///
    /// The event is dropped if the user gives up on an unknown venue.
    fn place_event(&mut self, mut event: Event) -> ClientResult<()> {
        loop {
            let name = self.prompt("Enter venue name")?;
            match self.timetable.search_for_venue(&name).cloned() {
                Some(venue) => {
                    if let Some(missing) = missing_facility(&event, &venue) {
                        writeln!(
                            self.output,
                            "Selected venue does not have {missing}. Choose a different venue"
                        )?;
                        continue;
                    }
                    event.set_venue(&venue);
                    let id = event.id();
                    if self.timetable.add_event(event) {
                        writeln!(self.output, "Added event {id}")?;
                    } else {
                        writeln!(self.output, "An event with ID {id} already exists")?;
                    }
                    return Ok(());
                }
                None => {
                    let answer = self.prompt_yes_no(&format!(
                        "Venue {name} does not exist. Try a different venue? (Y/N)"
                    ))?;
                    if answer != "Y" {
                        writeln!(self.output, "Event {} was not added", event.id())?;
                        return Ok(());
                    }
                }
            }
        }
    }

    fn search_for_event(&mut self) -> ClientResult<()> {
        let Some(id) = self.prompt_int("Enter unique event ID?")? else {
            writeln!(self.output, "This is not an integer")?;
            return Ok(());
        };
        match self.timetable.search_for_event(id) {
            Some(event) => writeln!(self.output, "{event}")?,
            None => writeln!(self.output, "Could not find booked timetable event: {id}")?,
        }
        Ok(())
    }

    fn remove_event(&mut self) -> ClientResult<()> {
        let Some(id) =
            self.prompt_int("Which booked event do you want to remove? Enter its ID:")?
        else {
            writeln!(self.output, "This is not an integer")?;
            return Ok(());
        };
        if self.timetable.remove_event(id) {
            writeln!(self.output, "Removed event {id}")?;
        } else {
            writeln!(self.output, "Unable to find event {id}")?;
        }
        Ok(())
    }

    fn add_venue(&mut self) -> ClientResult<()> {
        let name = loop {
            let name = self.prompt("Enter the venue name")?;
            if name.is_empty() {
                writeln!(self.output, "A venue needs a name")?;
            } else if self.timetable.search_for_venue(&name).is_none() {
                break name;
            } else {
                writeln!(
                    self.output,
                    "This venue already exists. Give it a different name"
                )?;
            }
        };

        let has_data_projector = self.prompt_yes_no("Does it have a data projector? (Y/N)")? == "Y";
        let has_adjustable_seating =
            self.prompt_yes_no("Does it have adjustable seating? (Y/N)")? == "Y";

        self.timetable.add_venue(
            Venue::new(name.clone())
                .with_data_projector(has_data_projector)
                .with_adjustable_seating(has_adjustable_seating),
        );
        writeln!(self.output, "Added venue {name}")?;
        Ok(())
    }
}
