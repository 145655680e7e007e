//! Weekly availability generation.
//!
//! Converts a participant's weekly busy table into the list of free
//! minute-instants of one concrete week.
//!
//! # Resolution rules
//! - An entry whose end is at or before its start is *overnight*: it runs
//!   from `start` on its day to `end` on the following day.
//! - The table is cyclic. An overnight entry on the last weekday also
//!   blocks the first day of the *same* week from 00:00 to `end`, standing
//!   in for the previous week's Friday night.
//! - Entries with a missing or unparsable start or end are skipped.
//!
//! # Complexity
//! O(e + m) where e = busy entries and m = 10,080 week minutes: each busy
//! window is stamped onto a per-minute bitmap, then the bitmap is read
//! back in order.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use tracing::debug;

use crate::error::{Result, ScheduleError};
use crate::models::{TimeWindow, WeekDay, WeeklyBusyTable};

/// Minutes in one scheduling week.
pub const WEEK_MINUTES: usize = 7 * 24 * 60;

/// Free-minute generator bound to one scheduling week.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use u_timetable::availability::{AvailabilityGenerator, WEEK_MINUTES};
/// use u_timetable::models::{WeekDay, WeeklyBusyTable};
///
/// let week = NaiveDate::from_ymd_opt(2025, 12, 6).unwrap(); // Saturday
/// let generator = AvailabilityGenerator::new(week).unwrap();
///
/// let table = WeeklyBusyTable::new().with_busy(WeekDay::Monday, "09:00", "10:00");
/// assert_eq!(generator.free_minutes(&table).len(), WEEK_MINUTES - 60);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AvailabilityGenerator {
    week_start: NaiveDate,
}

impl AvailabilityGenerator {
    /// Creates a generator for the week beginning on `week_start`.
    ///
    /// Fails with [`ScheduleError::InvalidWeekStart`] unless the date is a
    /// Saturday.
    pub fn new(week_start: NaiveDate) -> Result<Self> {
        let weekday = week_start.weekday();
        let first: Weekday = WeekDay::FIRST.into();
        if weekday != first {
            return Err(ScheduleError::InvalidWeekStart {
                date: week_start,
                weekday,
            });
        }
        Ok(Self { week_start })
    }

    pub fn week_start(&self) -> NaiveDate {
        self.week_start
    }

    /// The first instant of the week (Saturday 00:00).
    pub fn week_origin(&self) -> NaiveDateTime {
        self.week_start.and_time(NaiveTime::MIN)
    }

    /// The whole week as a window.
    pub fn week_window(&self) -> TimeWindow {
        TimeWindow::starting_at(self.week_origin(), Duration::minutes(WEEK_MINUTES as i64))
    }

    /// Resolves a busy table into absolute busy windows.
    ///
    /// Windows are *not* clipped to the week; an overnight entry on the
    /// last weekday ends on the following Saturday.
    pub fn busy_windows(&self, table: &WeeklyBusyTable) -> Vec<TimeWindow> {
        let mut windows = Vec::with_capacity(table.entry_count() + 1);

        for day in WeekDay::ALL {
            let date = day.date_in_week(self.week_start);
            for entry in table.entries(day) {
                let Some((start, end)) = entry.parse() else {
                    debug!(day = day.key(), ?entry, "skipping malformed busy entry");
                    continue;
                };

                let overnight = end <= start;
                let end_date = if overnight {
                    date + Duration::days(1)
                } else {
                    date
                };
                windows.push(TimeWindow::new(date.and_time(start), end_date.and_time(end)));

                if overnight && day == WeekDay::LAST {
                    windows.push(TimeWindow::new(
                        self.week_origin(),
                        self.week_start.and_time(end),
                    ));
                }
            }
        }

        windows
    }

    /// Per-minute busy flags for the week (index = minutes since origin).
    pub fn busy_mask(&self, table: &WeeklyBusyTable) -> Vec<bool> {
        let week = self.week_window();
        let mut mask = vec![false; WEEK_MINUTES];

        for window in self.busy_windows(table) {
            let Some(clipped) = window.clamp_to(&week) else {
                continue;
            };
            let from = minute_index(week.start, clipped.start);
            let to = minute_index(week.start, clipped.end);
            for slot in &mut mask[from..to] {
                *slot = true;
            }
        }

        mask
    }

    /// Ascending list of free minute-instants in the week.
    pub fn free_minutes(&self, table: &WeeklyBusyTable) -> Vec<NaiveDateTime> {
        let origin = self.week_origin();
        self.busy_mask(table)
            .into_iter()
            .enumerate()
            .filter(|(_, busy)| !busy)
            .map(|(minute, _)| origin + Duration::minutes(minute as i64))
            .collect()
    }
}

/// Whole minutes from `origin` to `instant`, rounding partial minutes up.
fn minute_index(origin: NaiveDateTime, instant: NaiveDateTime) -> usize {
    let seconds = (instant - origin).num_seconds();
    (seconds.max(0) as usize).div_ceil(60)
}
