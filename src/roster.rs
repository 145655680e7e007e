//! Student roster import.
//!
//! Decodes the session-source export, a JSON array of user accounts each
//! owning a list of students, into [`Student`]s and one
//! [`TuitionDescriptor`] per weekly lesson.
//!
//! ```json
//! [{"students": [{
//!     "id": "s1",
//!     "basicInfo": {"firstName": "Ali", "lastName": "Hassan", "grade": 11},
//!     "availability": {"sunday": [{"start": "08:00", "end": "15:00"}]},
//!     "subjects": [{"name": "Math", "sharedWith": ["s2"], "lessonsPerWeek": 2}]
//! }]}]
//! ```
//!
//! # Lesson expansion
//! A subject entry yields `lessonsPerWeek` identical descriptors. A shared
//! lesson appears in each participant's subject list; only the first
//! occurrence (same subject, same set of students) is kept.

use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::{Result, ScheduleError};
use crate::models::{Student, Subject, TuitionDescriptor, WeeklyBusyTable};

#[derive(Debug, Deserialize)]
struct RawUser {
    #[serde(default)]
    students: Vec<RawStudent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStudent {
    id: String,
    basic_info: RawBasicInfo,
    #[serde(default)]
    availability: WeeklyBusyTable,
    #[serde(default)]
    subjects: Vec<RawSubject>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBasicInfo {
    first_name: String,
    last_name: String,
    grade: u8,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSubject {
    name: String,
    #[serde(default)]
    shared_with: Vec<String>,
    #[serde(default = "one_lesson")]
    lessons_per_week: u32,
}

fn one_lesson() -> u32 {
    1
}

/// Students and the weekly tuition lessons they need.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub students: Vec<Student>,
    /// One entry per lesson occurrence, in source order.
    pub tuitions: Vec<TuitionDescriptor>,
}

impl Roster {
    /// Decodes a session-source export.
    ///
    /// # Errors
    /// - [`ScheduleError::Roster`] for malformed JSON or missing keys
    /// - [`ScheduleError::UnknownSubject`] for a subject outside the catalogue
    /// - [`ScheduleError::UnknownStudent`] for a `sharedWith` id with no student
    pub fn from_json_str(text: &str) -> Result<Self> {
        let users: Vec<RawUser> = serde_json::from_str(text)?;
        let raw: Vec<RawStudent> = users.into_iter().flat_map(|u| u.students).collect();

        let students: Vec<Student> = raw
            .iter()
            .map(|s| {
                Student::new(
                    s.id.clone(),
                    s.basic_info.first_name.clone(),
                    s.basic_info.last_name.clone(),
                    s.basic_info.grade,
                )
                .with_busy(s.availability.clone())
            })
            .collect();
        let by_id: HashMap<&str, &Student> = students.iter().map(|s| (s.id.as_str(), s)).collect();

        let mut tuitions: Vec<TuitionDescriptor> = Vec::new();
        for student in &raw {
            for entry in &student.subjects {
                let subject: Subject = entry.name.parse()?;

                let mut lesson = TuitionDescriptor::new(subject);
                for id in std::iter::once(&student.id).chain(&entry.shared_with) {
                    let participant = by_id
                        .get(id.as_str())
                        .ok_or_else(|| ScheduleError::UnknownStudent(id.clone()))?;
                    lesson = lesson.with_student(participant);
                }

                if tuitions.iter().any(|t| t.same_lesson(&lesson)) {
                    debug!(lesson = %lesson.name(), "shared lesson already listed");
                    continue;
                }
                for _ in 0..entry.lessons_per_week {
                    tuitions.push(lesson.clone());
                }
            }
        }

        info!(
            students = students.len(),
            lessons = tuitions.len(),
            "roster imported"
        );
        Ok(Self { students, tuitions })
    }

    /// Looks up a student by id.
    pub fn student(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }
}
