//! Input validation for scheduling requests.
//!
//! Checks structural integrity of students, tuitions, activities, and
//! configuration before any domain is generated. Detects:
//! - Duplicate student IDs and activity labels
//! - Tuitions without students
//! - Tuitions referencing unknown students
//! - Non-positive durations, and lengths or offsets beyond one week
//! - Negative tolerances and zero search budgets
//!
//! All problems are collected; validation never stops at the first one.

use std::collections::HashSet;

use crate::availability::WEEK_MINUTES;
use crate::config::SchedulerConfig;
use crate::scheduler::ScheduleRequest;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two students share an ID, or two activities share a label.
    DuplicateId,
    /// A tuition has no participating students.
    EmptyTuition,
    /// A tuition references a student that doesn't exist.
    UnknownStudent,
    /// A session or configured length is zero or negative.
    NonPositiveDuration,
    /// A session length, offset, or tolerance exceeds one week.
    DurationOutOfRange,
    /// A nested-session tolerance is negative.
    NegativeTolerance,
    /// A search budget of zero.
    InvalidBudget,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a scheduling request.
///
/// Checks:
/// 1. No duplicate student IDs or activity labels
/// 2. Every tuition has at least one student
/// 3. Every tuition student ID refers to a listed student
/// 4. Explicit tuition and activity durations are positive and at most
///    one week
/// 5. Configuration values are in range
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_request(request: &ScheduleRequest) -> ValidationResult {
    let mut errors = Vec::new();

    let mut student_ids = HashSet::new();
    for s in &request.students {
        if !student_ids.insert(s.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate student ID: {}", s.id),
            ));
        }
    }

    for t in &request.tuitions {
        if t.students.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyTuition,
                format!("Tuition '{}' has no students", t.name()),
            ));
        }

        for id in &t.students {
            if !student_ids.contains(id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownStudent,
                    format!("Tuition '{}' references unknown student '{}'", t.name(), id),
                ));
            }
        }

        if let Some(d) = t.duration {
            errors.extend(check_length(
                &format!("Tuition '{}'", t.name()),
                d.num_minutes(),
            ));
        }
    }

    let mut labels = HashSet::new();
    for a in &request.activities {
        if !labels.insert(a.descriptor.label.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate activity label: {}", a.descriptor.label),
            ));
        }
        errors.extend(check_length(
            &format!("Activity '{}'", a.descriptor.label),
            a.descriptor.duration.num_minutes(),
        ));
    }

    errors.extend(validate_config(&request.config));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn beyond_week(minutes: i64) -> bool {
    minutes.unsigned_abs() > WEEK_MINUTES as u64
}

/// A length must lie in `1..=WEEK_MINUTES`.
fn check_length(what: &str, minutes: i64) -> Option<ValidationError> {
    if minutes <= 0 {
        Some(ValidationError::new(
            ValidationErrorKind::NonPositiveDuration,
            format!("{what} has non-positive duration: {minutes} min"),
        ))
    } else if beyond_week(minutes) {
        Some(ValidationError::new(
            ValidationErrorKind::DurationOutOfRange,
            format!("{what} is longer than a week: {minutes} min"),
        ))
    } else {
        None
    }
}

fn validate_config(config: &SchedulerConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(check_length(
        "Default tuition length",
        config.default_tuition_minutes,
    ));
    errors.extend(check_length("Prayer length", config.prayer.duration_minutes));

    let offsets = [
        ("readiness margin", config.prayer.readiness_margin_minutes),
        ("Fajr congregation offset", config.prayer.congregation.fajr),
        ("Dhuhr congregation offset", config.prayer.congregation.dhuhr),
        ("Asr congregation offset", config.prayer.congregation.asr),
        ("Maghrib congregation offset", config.prayer.congregation.maghrib),
        ("Isha congregation offset", config.prayer.congregation.isha),
    ];
    for (what, minutes) in offsets {
        if beyond_week(minutes) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DurationOutOfRange,
                format!("Prayer {what} exceeds a week: {minutes} min"),
            ));
        }
    }

    let tolerances = [
        ("prayer", config.tolerance.prayer),
        ("tuition", config.tolerance.tuition),
        ("activity", config.tolerance.activity),
    ];
    for (kind, minutes) in tolerances {
        if minutes < 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NegativeTolerance,
                format!("Negative {kind} tolerance: {minutes} min"),
            ));
        } else if beyond_week(minutes) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DurationOutOfRange,
                format!("{kind} tolerance exceeds a week: {minutes} min"),
            ));
        }
    }

    if config.max_search_steps == Some(0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidBudget,
            "Search step budget must be at least 1",
        ));
    }
    if config.time_budget_ms == Some(0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidBudget,
            "Search time budget must be at least 1 ms",
        ));
    }

    errors
}
