//! Timetable (solution) model.
//!
//! A timetable is the sink-facing view of a solved assignment: every
//! session with its chosen start, its effective duration (base plus
//! permitted nested sessions), and the sessions nested inside it.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::descriptor::minutes;
use super::SessionId;

/// A complete weekly timetable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timetable {
    /// First day of the scheduled week.
    pub week_start: Option<NaiveDate>,
    /// Scheduled sessions, ordered by start then session id.
    pub entries: Vec<TimetableEntry>,
}

/// One scheduled session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimetableEntry {
    pub session: SessionId,
    /// Descriptor name.
    pub name: String,
    /// Descriptor kind tag (`prayer`, `tuition`, `activity`).
    pub kind: String,
    pub start: NaiveDateTime,
    /// `start + effective_duration`.
    pub end: NaiveDateTime,
    #[serde(with = "minutes")]
    pub base_duration: Duration,
    #[serde(with = "minutes")]
    pub effective_duration: Duration,
    /// Sessions legitimately nested inside this one.
    #[serde(default)]
    pub nested: Vec<SessionId>,
}

impl TimetableEntry {
    /// Creates an entry with no nested sessions.
    pub fn new(
        session: SessionId,
        name: impl Into<String>,
        kind: impl Into<String>,
        start: NaiveDateTime,
        base_duration: Duration,
    ) -> Self {
        Self {
            session,
            name: name.into(),
            kind: kind.into(),
            start,
            end: start + base_duration,
            base_duration,
            effective_duration: base_duration,
            nested: Vec::new(),
        }
    }

    /// Records nested sessions and the resulting effective duration.
    pub fn with_nested(mut self, nested: Vec<SessionId>, effective_duration: Duration) -> Self {
        self.nested = nested;
        self.effective_duration = effective_duration;
        self.end = self.start + effective_duration;
        self
    }

    /// Base duration in whole minutes.
    pub fn own_minutes(&self) -> i64 {
        self.base_duration.num_minutes()
    }
}

impl Timetable {
    /// Creates an empty timetable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the week start.
    pub fn for_week(mut self, week_start: NaiveDate) -> Self {
        self.week_start = Some(week_start);
        self
    }

    /// Adds an entry, keeping entries ordered by start.
    pub fn add_entry(&mut self, entry: TimetableEntry) {
        let pos = self
            .entries
            .partition_point(|e| (e.start, e.session) <= (entry.start, entry.session));
        self.entries.insert(pos, entry);
    }

    /// Finds the entry for a session.
    pub fn entry_for(&self, session: SessionId) -> Option<&TimetableEntry> {
        self.entries.iter().find(|e| e.session == session)
    }

    /// All entries starting on `date`.
    pub fn entries_on(&self, date: NaiveDate) -> Vec<&TimetableEntry> {
        self.entries
            .iter()
            .filter(|e| e.start.date() == date)
            .collect()
    }

    /// Sum of base durations, in minutes.
    pub fn busy_minutes(&self) -> i64 {
        self.entries.iter().map(TimetableEntry::own_minutes).sum()
    }

    /// Latest end across all entries.
    pub fn last_end(&self) -> Option<NaiveDateTime> {
        self.entries.iter().map(|e| e.end).max()
    }

    /// Pairs `(earlier, later)` where `later` starts inside `earlier`'s
    /// effective window without being nested in it.
    ///
    /// Entries with the same start are reported with the lower session id
    /// first. An empty list means the timetable has no double bookings.
    pub fn overlaps(&self) -> Vec<(SessionId, SessionId)> {
        let mut found = Vec::new();
        for (i, host) in self.entries.iter().enumerate() {
            for other in &self.entries[i + 1..] {
                if other.start >= host.end {
                    break;
                }
                if !host.nested.contains(&other.session) {
                    found.push((host.session, other.session));
                }
            }
        }
        found
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
