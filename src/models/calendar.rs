//! Calendar primitives: weekdays, time windows, and weekly busy tables.
//!
//! # Time Model
//! Instants are wall-clock `NaiveDateTime` values in the locale of the
//! target week. A scheduling week starts on Saturday 00:00 and spans
//! exactly 7 days.
//!
//! # Busy tables
//! A [`WeeklyBusyTable`] is the raw availability input supplied by the
//! session source: for each weekday name, the list of `HH:MM` intervals
//! during which a participant is *not* free. Entries are kept as raw
//! strings so that malformed input can be skipped during resolution
//! instead of failing deserialization.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Wall-clock format used by busy tables and clock payloads.
pub const CLOCK_FORMAT: &str = "%H:%M";

/// A time interval [start, end).
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    /// Interval start (inclusive).
    pub start: NaiveDateTime,
    /// Interval end (exclusive).
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Creates a window from a start instant and a length.
    pub fn starting_at(start: NaiveDateTime, length: Duration) -> Self {
        Self::new(start, start + length)
    }

    /// Length of this window.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Whether an instant falls within this window.
    #[inline]
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        instant >= self.start && instant < self.end
    }

    /// Whether an instant falls strictly between start and end.
    #[inline]
    pub fn contains_strictly(&self, instant: NaiveDateTime) -> bool {
        instant > self.start && instant < self.end
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Clips this window to `bounds`. Returns `None` if nothing remains.
    pub fn clamp_to(&self, bounds: &Self) -> Option<Self> {
        let start = self.start.max(bounds.start);
        let end = self.end.min(bounds.end);
        (end > start).then(|| Self::new(start, end))
    }
}

/// Day of the scheduling week, in table order (Saturday first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekDay {
    Saturday,
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl WeekDay {
    /// All days in table order.
    pub const ALL: [WeekDay; 7] = [
        WeekDay::Saturday,
        WeekDay::Sunday,
        WeekDay::Monday,
        WeekDay::Tuesday,
        WeekDay::Wednesday,
        WeekDay::Thursday,
        WeekDay::Friday,
    ];

    /// The designated first day of every scheduling week.
    pub const FIRST: WeekDay = WeekDay::Saturday;

    /// The last day of the table; its overnight entries wrap to day one.
    pub const LAST: WeekDay = WeekDay::Friday;

    /// Days elapsed since the start of the week.
    #[inline]
    pub fn offset(self) -> i64 {
        self as i64
    }

    /// Table key for this day.
    pub fn key(self) -> &'static str {
        match self {
            WeekDay::Saturday => "saturday",
            WeekDay::Sunday => "sunday",
            WeekDay::Monday => "monday",
            WeekDay::Tuesday => "tuesday",
            WeekDay::Wednesday => "wednesday",
            WeekDay::Thursday => "thursday",
            WeekDay::Friday => "friday",
        }
    }

    /// Capitalized display name, used in session names.
    pub fn label(self) -> &'static str {
        match self {
            WeekDay::Saturday => "Saturday",
            WeekDay::Sunday => "Sunday",
            WeekDay::Monday => "Monday",
            WeekDay::Tuesday => "Tuesday",
            WeekDay::Wednesday => "Wednesday",
            WeekDay::Thursday => "Thursday",
            WeekDay::Friday => "Friday",
        }
    }

    /// Calendar date of this day in the week starting at `week_start`.
    pub fn date_in_week(self, week_start: NaiveDate) -> NaiveDate {
        week_start + Duration::days(self.offset())
    }
}

impl From<WeekDay> for Weekday {
    fn from(day: WeekDay) -> Self {
        match day {
            WeekDay::Saturday => Weekday::Sat,
            WeekDay::Sunday => Weekday::Sun,
            WeekDay::Monday => Weekday::Mon,
            WeekDay::Tuesday => Weekday::Tue,
            WeekDay::Wednesday => Weekday::Wed,
            WeekDay::Thursday => Weekday::Thu,
            WeekDay::Friday => Weekday::Fri,
        }
    }
}

/// One raw busy entry as delivered by the session source.
///
/// Both fields are optional so that a partially filled entry survives
/// deserialization; such entries are skipped during resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BusyInterval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl BusyInterval {
    /// Creates a complete entry.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
        }
    }

    /// Parses both ends as wall-clock times.
    ///
    /// Returns `None` when either end is missing or unparsable.
    pub fn parse(&self) -> Option<(NaiveTime, NaiveTime)> {
        let start = parse_clock(self.start.as_deref()?)?;
        let end = parse_clock(self.end.as_deref()?)?;
        Some((start, end))
    }
}

/// Parses an `HH:MM` wall-clock string.
///
/// Surrounding whitespace makes the string malformed.
pub fn parse_clock(text: &str) -> Option<NaiveTime> {
    if text.trim() != text {
        return None;
    }
    NaiveTime::parse_from_str(text, CLOCK_FORMAT).ok()
}

/// Per-weekday busy intervals for one participant.
///
/// Keys are lowercase weekday names; unknown keys are carried but ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct WeeklyBusyTable {
    days: HashMap<String, Vec<BusyInterval>>,
}

impl WeeklyBusyTable {
    /// Creates an empty table (always free).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: adds a busy interval on `day`.
    pub fn with_busy(mut self, day: WeekDay, start: &str, end: &str) -> Self {
        self.add(day, BusyInterval::new(start, end));
        self
    }

    /// Appends a raw entry on `day`.
    pub fn add(&mut self, day: WeekDay, interval: BusyInterval) {
        self.days
            .entry(day.key().to_string())
            .or_default()
            .push(interval);
    }

    /// Raw entries for `day` (empty if the day is absent).
    pub fn entries(&self, day: WeekDay) -> &[BusyInterval] {
        self.days.get(day.key()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of raw entries across the known weekdays.
    pub fn entry_count(&self) -> usize {
        WeekDay::ALL.iter().map(|d| self.entries(*d).len()).sum()
    }

    /// Whether no weekday carries any entry.
    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }
}
