//! Scheduling request: everything one weekly run needs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::domain::{CalculationMethod, Location};
use crate::models::{ActivityDescriptor, Student, TuitionDescriptor, WeeklyBusyTable};
use crate::roster::Roster;

/// A generic activity to place, with the periods it must avoid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRequest {
    pub descriptor: ActivityDescriptor,
    /// Periods when the activity cannot start.
    #[serde(default)]
    pub busy: WeeklyBusyTable,
    /// Prayers may nest inside the activity.
    #[serde(default)]
    pub interruptible: bool,
    /// How many times per week the activity happens.
    #[serde(default = "once")]
    pub occurrences: u32,
}

fn once() -> u32 {
    1
}

impl ActivityRequest {
    pub fn new(descriptor: ActivityDescriptor) -> Self {
        Self {
            descriptor,
            busy: WeeklyBusyTable::new(),
            interruptible: false,
            occurrences: 1,
        }
    }

    pub fn with_busy(mut self, busy: WeeklyBusyTable) -> Self {
        self.busy = busy;
        self
    }

    /// Allows prayers to nest inside this activity.
    pub fn interruptible(mut self) -> Self {
        self.interruptible = true;
        self
    }

    pub fn with_occurrences(mut self, occurrences: u32) -> Self {
        self.occurrences = occurrences;
        self
    }
}

/// Where and how prayer times are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrayerSettings {
    pub location: Location,
    #[serde(default)]
    pub method: CalculationMethod,
}

/// Input container for one weekly scheduling run.
///
/// Tuitions reference students by id; every referenced id must appear in
/// `students`. Prayers are scheduled only when `prayer` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    /// Saturday that begins the week.
    pub week_start: NaiveDate,
    #[serde(default)]
    pub students: Vec<Student>,
    /// One entry per lesson occurrence.
    #[serde(default)]
    pub tuitions: Vec<TuitionDescriptor>,
    #[serde(default)]
    pub activities: Vec<ActivityRequest>,
    #[serde(default)]
    pub prayer: Option<PrayerSettings>,
    #[serde(default)]
    pub config: SchedulerConfig,
}

impl ScheduleRequest {
    /// Creates an empty request for the week beginning on `week_start`.
    pub fn new(week_start: NaiveDate) -> Self {
        Self {
            week_start,
            students: Vec::new(),
            tuitions: Vec::new(),
            activities: Vec::new(),
            prayer: None,
            config: SchedulerConfig::default(),
        }
    }

    pub fn with_student(mut self, student: Student) -> Self {
        self.students.push(student);
        self
    }

    pub fn with_tuition(mut self, tuition: TuitionDescriptor) -> Self {
        self.tuitions.push(tuition);
        self
    }

    /// Adds every student and lesson of an imported roster.
    pub fn with_roster(mut self, roster: Roster) -> Self {
        self.students.extend(roster.students);
        self.tuitions.extend(roster.tuitions);
        self
    }

    pub fn with_activity(mut self, activity: ActivityRequest) -> Self {
        self.activities.push(activity);
        self
    }

    /// Schedules the week's prayers for `location`.
    pub fn with_prayers(mut self, location: Location, method: CalculationMethod) -> Self {
        self.prayer = Some(PrayerSettings { location, method });
        self
    }

    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Looks up a student by id.
    pub fn student(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }
}
