//! Session descriptors: immutable metadata for each kind of activity.
//!
//! A descriptor says *what* a session is (a prayer, a tuition lesson, a
//! generic activity); the [`Session`](super::Session) wraps it with the
//! scheduling data the solver needs. Descriptors are created by the
//! session source before a run and never change afterwards.
//!
//! # Domain Mappings
//!
//! | Variant | Domain source | Typical duration |
//! |---------|---------------|------------------|
//! | Prayer | clock source (one instant) | 15 min |
//! | Tuition | intersection of student availability | 90 min |
//! | Activity | the activity's own busy table | varies |

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::{WeekDay, WeeklyBusyTable};
use crate::error::ScheduleError;

/// Default scheduling priority when the source does not supply one.
pub const DEFAULT_PRIORITY: i32 = 10;

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

/// The five daily prayers, in daily order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PrayerKind {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerKind {
    /// All prayers in daily order.
    pub const ALL: [PrayerKind; 5] = [
        PrayerKind::Fajr,
        PrayerKind::Dhuhr,
        PrayerKind::Asr,
        PrayerKind::Maghrib,
        PrayerKind::Isha,
    ];

    /// Name as used in clock-source payloads.
    pub fn name(self) -> &'static str {
        match self {
            PrayerKind::Fajr => "Fajr",
            PrayerKind::Dhuhr => "Dhuhr",
            PrayerKind::Asr => "Asr",
            PrayerKind::Maghrib => "Maghrib",
            PrayerKind::Isha => "Isha",
        }
    }
}

/// One weekly prayer occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerDescriptor {
    pub kind: PrayerKind,
    pub day: WeekDay,
    #[serde(default = "default_priority")]
    pub priority: i32,
}

impl PrayerDescriptor {
    pub fn new(kind: PrayerKind, day: WeekDay) -> Self {
        Self {
            kind,
            day,
            priority: DEFAULT_PRIORITY,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// e.g. `Fajr_Saturday`.
    pub fn name(&self) -> String {
        format!("{}_{}", self.kind.name(), self.day.label())
    }
}

/// Tuition subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    Math,
    Physics,
    Chemistry,
    Biology,
    IT,
    Geography,
}

impl Subject {
    pub fn name(self) -> &'static str {
        match self {
            Subject::Math => "Math",
            Subject::Physics => "Physics",
            Subject::Chemistry => "Chemistry",
            Subject::Biology => "Biology",
            Subject::IT => "IT",
            Subject::Geography => "Geography",
        }
    }
}

impl FromStr for Subject {
    type Err = ScheduleError;

    /// Exact, case-sensitive match on the subject name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Math" => Ok(Subject::Math),
            "Physics" => Ok(Subject::Physics),
            "Chemistry" => Ok(Subject::Chemistry),
            "Biology" => Ok(Subject::Biology),
            "IT" => Ok(Subject::IT),
            "Geography" => Ok(Subject::Geography),
            other => Err(ScheduleError::UnknownSubject(other.to_string())),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A student taking part in tuition sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Unique student identifier (assigned by the session source).
    pub id: String,
    pub first_name: String,
    pub family_name: String,
    pub grade: u8,
    /// Weekly periods when the student is *not* free.
    #[serde(default)]
    pub busy: WeeklyBusyTable,
}

impl Student {
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        family_name: impl Into<String>,
        grade: u8,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            family_name: family_name.into(),
            grade,
            busy: WeeklyBusyTable::new(),
        }
    }

    /// Sets the busy table.
    pub fn with_busy(mut self, busy: WeeklyBusyTable) -> Self {
        self.busy = busy;
        self
    }
}

/// A tuition lesson given to one or more students.
///
/// The descriptor references students by id; their availability is
/// looked up from the request when the domain is generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuitionDescriptor {
    /// Participating student ids (first entry is the owning student).
    pub students: Vec<String>,
    /// First names, in the same order as `students`, for naming.
    #[serde(default)]
    pub student_names: Vec<String>,
    pub subject: Subject,
    /// Overrides the configured default lesson length.
    #[serde(default, with = "optional_minutes")]
    pub duration: Option<Duration>,
    #[serde(default = "default_priority")]
    pub priority: i32,
}

impl TuitionDescriptor {
    pub fn new(subject: Subject) -> Self {
        Self {
            students: Vec::new(),
            student_names: Vec::new(),
            subject,
            duration: None,
            priority: DEFAULT_PRIORITY,
        }
    }

    /// Adds a participating student.
    pub fn with_student(mut self, student: &Student) -> Self {
        self.students.push(student.id.clone());
        self.student_names.push(student.first_name.clone());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Student first names joined by `_`, followed by the subject.
    pub fn name(&self) -> String {
        let mut name = String::new();
        for first in &self.student_names {
            name.push_str(first);
            name.push('_');
        }
        name.push_str(self.subject.name());
        name
    }

    /// Same subject and same set of students, regardless of order.
    pub fn same_lesson(&self, other: &Self) -> bool {
        let mine: BTreeSet<&str> = self.students.iter().map(String::as_str).collect();
        let theirs: BTreeSet<&str> = other.students.iter().map(String::as_str).collect();
        self.subject == other.subject && mine == theirs
    }
}

/// Category of a generic activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityKind {
    Gym,
    Sleep,
    Work,
    Meal,
    Other,
}

/// A generic personal activity (gym, meal, work block, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDescriptor {
    pub label: String,
    pub kind: ActivityKind,
    #[serde(with = "minutes")]
    pub duration: Duration,
    #[serde(default = "default_priority")]
    pub priority: i32,
}

impl ActivityDescriptor {
    pub fn new(label: impl Into<String>, kind: ActivityKind, duration: Duration) -> Self {
        Self {
            label: label.into(),
            kind,
            duration,
            priority: DEFAULT_PRIORITY,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Metadata describing one schedulable activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SessionDescriptor {
    Prayer(PrayerDescriptor),
    Tuition(TuitionDescriptor),
    Activity(ActivityDescriptor),
}

impl SessionDescriptor {
    /// Display name used in logs and timetables.
    pub fn name(&self) -> String {
        match self {
            SessionDescriptor::Prayer(p) => p.name(),
            SessionDescriptor::Tuition(t) => t.name(),
            SessionDescriptor::Activity(a) => a.label.clone(),
        }
    }

    /// Source-assigned priority.
    pub fn priority(&self) -> i32 {
        match self {
            SessionDescriptor::Prayer(p) => p.priority,
            SessionDescriptor::Tuition(t) => t.priority,
            SessionDescriptor::Activity(a) => a.priority,
        }
    }

    /// Short kind tag (`prayer`, `tuition`, `activity`).
    pub fn kind(&self) -> &'static str {
        match self {
            SessionDescriptor::Prayer(_) => "prayer",
            SessionDescriptor::Tuition(_) => "tuition",
            SessionDescriptor::Activity(_) => "activity",
        }
    }

    pub fn is_prayer(&self) -> bool {
        matches!(self, SessionDescriptor::Prayer(_))
    }
}

impl From<PrayerDescriptor> for SessionDescriptor {
    fn from(d: PrayerDescriptor) -> Self {
        SessionDescriptor::Prayer(d)
    }
}

impl From<TuitionDescriptor> for SessionDescriptor {
    fn from(d: TuitionDescriptor) -> Self {
        SessionDescriptor::Tuition(d)
    }
}

impl From<ActivityDescriptor> for SessionDescriptor {
    fn from(d: ActivityDescriptor) -> Self {
        SessionDescriptor::Activity(d)
    }
}

/// Serde helper: `Duration` as whole minutes.
pub(crate) mod minutes {
    use chrono::Duration;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_i64(d.num_minutes())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let m = i64::deserialize(d)?;
        Duration::try_minutes(m)
            .ok_or_else(|| D::Error::custom(format!("duration out of range: {m} min")))
    }
}

/// Serde helper: `Option<Duration>` as whole minutes.
pub(crate) mod optional_minutes {
    use chrono::Duration;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => s.serialize_some(&d.num_minutes()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        match Option::<i64>::deserialize(d)? {
            Some(m) => Duration::try_minutes(m)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("duration out of range: {m} min"))),
            None => Ok(None),
        }
    }
}
