//! Error types for timetable construction.
//!
//! Every fatal condition in the pipeline maps to one [`ScheduleError`]
//! variant. A search that finds no timetable is *not* an error; it is
//! reported through [`SearchOutcome`](crate::csp::SearchOutcome).

use chrono::{NaiveDate, Weekday};
use thiserror::Error;

use crate::models::SessionId;
use crate::validation::ValidationError;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Fatal errors raised while building or running a scheduling problem.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The week-start date does not fall on the designated first weekday.
    #[error("week start {date} is a {weekday}, expected a Saturday")]
    InvalidWeekStart { date: NaiveDate, weekday: Weekday },

    /// A variable was handed to the engine without a domain entry.
    #[error("session '{name}' ({id}) has no domain entry")]
    MissingDomain { id: SessionId, name: String },

    /// A constraint references a variable the engine does not know.
    #[error("constraint references unknown session {0}")]
    UnknownVariable(SessionId),

    /// Two variables share the same identity.
    #[error("session {0} was registered more than once")]
    DuplicateVariable(SessionId),

    /// The clock source failed or returned an unusable payload.
    #[error("could not resolve prayer times for {date}: {reason}")]
    ClockResolution { date: NaiveDate, reason: String },

    /// A subject name outside the known catalogue.
    #[error("unknown subject: {0}")]
    UnknownSubject(String),

    /// A roster entry references a student id that does not exist.
    #[error("unknown student id: {0}")]
    UnknownStudent(String),

    /// The request failed integrity checks.
    #[error("invalid schedule request: {}", join_messages(.0))]
    InvalidRequest(Vec<ValidationError>),

    /// Configuration text could not be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// The session-source export could not be decoded.
    #[error("roster decode error: {0}")]
    Roster(#[from] serde_json::Error),
}

impl ScheduleError {
    /// Shorthand for a clock-resolution failure.
    pub fn clock(date: NaiveDate, reason: impl Into<String>) -> Self {
        Self::ClockResolution {
            date,
            reason: reason.into(),
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_invalid_week_start_message() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 7).unwrap();
        let err = ScheduleError::InvalidWeekStart {
            date,
            weekday: Weekday::Sun,
        };
        assert_eq!(
            err.to_string(),
            "week start 2025-12-07 is a Sun, expected a Saturday"
        );
    }

    #[test]
    fn test_invalid_request_joins_messages() {
        let err = ScheduleError::InvalidRequest(vec![
            ValidationError::new(ValidationErrorKind::DuplicateId, "Duplicate student ID: s1"),
            ValidationError::new(ValidationErrorKind::EmptyTuition, "Tuition 'Math' has no students"),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid schedule request: Duplicate student ID: s1; Tuition 'Math' has no students"
        );
    }
}
