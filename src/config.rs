//! Scheduler configuration.
//!
//! Every field has a default, so an empty document is a valid
//! configuration. Durations are expressed in whole minutes; the
//! `Duration` accessors clamp them to one week either way, and
//! [`validate_request`](crate::validation::validate_request) rejects
//! values outside that range.
//!
//! ```
//! use u_timetable::config::SchedulerConfig;
//!
//! let config = SchedulerConfig::from_toml_str(r#"
//!     variable_order = "minimum_remaining_values"
//!
//!     [tolerance]
//!     tuition = 15
//!
//!     [prayer.congregation]
//!     fajr = 25
//! "#).unwrap();
//!
//! assert_eq!(config.tolerance.tuition, 15);
//! assert_eq!(config.tolerance.prayer, 0);
//! assert_eq!(config.prayer.congregation.fajr, 25);
//! assert_eq!(config.default_tuition_minutes, 90);
//! ```

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::time::Duration as StdDuration;

use crate::availability::WEEK_MINUTES;
use crate::csp::{SearchLimits, VariableOrder};
use crate::error::Result;
use crate::models::PrayerKind;

/// Nested-session tolerance per session kind (minutes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    pub prayer: i64,
    pub tuition: i64,
    pub activity: i64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            prayer: 0,
            tuition: 10,
            activity: 0,
        }
    }
}

/// Minutes between the call to prayer and the congregation, per prayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CongregationOffsets {
    pub fajr: i64,
    pub dhuhr: i64,
    pub asr: i64,
    pub maghrib: i64,
    pub isha: i64,
}

impl Default for CongregationOffsets {
    fn default() -> Self {
        Self {
            fajr: 20,
            dhuhr: 10,
            asr: 10,
            maghrib: 5,
            isha: 10,
        }
    }
}

impl CongregationOffsets {
    pub fn minutes(&self, kind: PrayerKind) -> i64 {
        match kind {
            PrayerKind::Fajr => self.fajr,
            PrayerKind::Dhuhr => self.dhuhr,
            PrayerKind::Asr => self.asr,
            PrayerKind::Maghrib => self.maghrib,
            PrayerKind::Isha => self.isha,
        }
    }
}

/// How a prayer clock time becomes a session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrayerTiming {
    /// Length of a prayer session.
    pub duration_minutes: i64,
    /// Time needed to be ready before the congregation.
    pub readiness_margin_minutes: i64,
    pub congregation: CongregationOffsets,
}

impl Default for PrayerTiming {
    fn default() -> Self {
        Self {
            duration_minutes: 15,
            readiness_margin_minutes: 10,
            congregation: CongregationOffsets::default(),
        }
    }
}

impl PrayerTiming {
    pub fn duration(&self) -> Duration {
        clamped_minutes(self.duration_minutes)
    }

    pub fn readiness_margin(&self) -> Duration {
        clamped_minutes(self.readiness_margin_minutes)
    }

    pub fn congregation_offset(&self, kind: PrayerKind) -> Duration {
        clamped_minutes(self.congregation.minutes(kind))
    }
}

/// `minutes` as a `Duration`, clamped to plus or minus one week.
fn clamped_minutes(minutes: i64) -> Duration {
    let week = WEEK_MINUTES as i64;
    Duration::try_minutes(minutes.clamp(-week, week)).unwrap_or_else(Duration::zero)
}

/// Top-level scheduler configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub tolerance: Tolerances,
    pub prayer: PrayerTiming,
    /// Lesson length for tuitions without an explicit duration.
    pub default_tuition_minutes: i64,
    /// Tuitions and interruptible activities accept prayers nested inside.
    pub prayers_interrupt_sessions: bool,
    /// Node budget for the search (`None` = unbounded).
    pub max_search_steps: Option<u64>,
    /// Wall-clock budget for the search in milliseconds.
    pub time_budget_ms: Option<u64>,
    pub variable_order: VariableOrder,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tolerance: Tolerances::default(),
            prayer: PrayerTiming::default(),
            default_tuition_minutes: 90,
            prayers_interrupt_sessions: true,
            max_search_steps: None,
            time_budget_ms: None,
            variable_order: VariableOrder::Declaration,
        }
    }
}

impl SchedulerConfig {
    /// Parses a TOML document; missing fields take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn default_tuition_duration(&self) -> Duration {
        clamped_minutes(self.default_tuition_minutes)
    }

    pub fn prayer_tolerance(&self) -> Duration {
        clamped_minutes(self.tolerance.prayer)
    }

    pub fn tuition_tolerance(&self) -> Duration {
        clamped_minutes(self.tolerance.tuition)
    }

    pub fn activity_tolerance(&self) -> Duration {
        clamped_minutes(self.tolerance.activity)
    }

    /// Search bounds derived from the budget fields.
    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            max_steps: self.max_search_steps,
            time_budget: self.time_budget_ms.map(StdDuration::from_millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = SchedulerConfig::default();
        assert_eq!(c.tuition_tolerance(), Duration::minutes(10));
        assert_eq!(c.prayer_tolerance(), Duration::zero());
        assert_eq!(c.default_tuition_duration(), Duration::minutes(90));
        assert_eq!(c.prayer.duration(), Duration::minutes(15));
        assert_eq!(c.prayer.readiness_margin(), Duration::minutes(10));
        assert_eq!(c.prayer.congregation_offset(PrayerKind::Maghrib), Duration::minutes(5));
        assert!(c.prayers_interrupt_sessions);
        assert_eq!(c.variable_order, VariableOrder::Declaration);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(SchedulerConfig::from_toml_str("").unwrap(), SchedulerConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides() {
        let c = SchedulerConfig::from_toml_str(
            r#"
            prayers_interrupt_sessions = false
            max_search_steps = 5000
            time_budget_ms = 250

            [prayer]
            readiness_margin_minutes = 5
            "#,
        )
        .unwrap();

        assert!(!c.prayers_interrupt_sessions);
        assert_eq!(c.prayer.readiness_margin(), Duration::minutes(5));
        assert_eq!(c.prayer.duration_minutes, 15);
        let limits = c.search_limits();
        assert_eq!(limits.max_steps, Some(5000));
        assert_eq!(limits.time_budget, Some(StdDuration::from_millis(250)));
    }

    #[test]
    fn test_oversized_minutes_clamp_to_a_week() {
        let c = SchedulerConfig::from_toml_str(
            r#"
            default_tuition_minutes = 9223372036854775807

            [prayer]
            readiness_margin_minutes = -9223372036854775807
            "#,
        )
        .unwrap();

        assert_eq!(c.default_tuition_duration(), Duration::weeks(1));
        assert_eq!(c.prayer.readiness_margin(), -Duration::weeks(1));

        let request = crate::scheduler::ScheduleRequest::new(
            chrono::NaiveDate::from_ymd_opt(2025, 12, 6).unwrap(),
        )
        .with_config(c);
        let errors = crate::validation::validate_request(&request).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let err = SchedulerConfig::from_toml_str("default_tuition_minutes = \"long\"").unwrap_err();
        assert!(matches!(err, crate::error::ScheduleError::Config(_)));
    }
}
