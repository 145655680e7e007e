//! No-overlap constraint with nested-session allowances.
//!
//! A session's window is `[start, start + effective duration)`. Another
//! session may start inside it only if it is listed in the host's
//! `allowed_overlap` set, starts more than `tolerance` after the host,
//! and starts before the host's *base* end. Such nested sessions extend
//! the host's effective duration by their own base duration.
//!
//! # Asymmetry
//! The test only asks whether *other* sessions start inside *this*
//! session's window. It never asks whether this session starts inside a
//! longer session that began earlier; that direction is covered only by
//! the earlier session's own constraint, if it is re-evaluated.

use chrono::{Duration, NaiveDateTime};
use std::collections::BTreeSet;

use super::{Constraint, Variables};
use crate::models::{Assignment, Session, SessionId};

/// Sessions legitimately nested inside `session` under `assignment`.
///
/// Recomputed from scratch on every call; returns an empty set when
/// `session` is unassigned.
pub fn overlap_set(
    session: &Session,
    assignment: &Assignment,
    tolerance: Duration,
) -> BTreeSet<SessionId> {
    let Some(start) = assignment.get(session.id) else {
        return BTreeSet::new();
    };
    let base_end = start + session.base_duration;

    assignment
        .iter()
        .filter(|(other, other_start)| {
            *other != session.id
                && *other_start > start
                && *other_start < base_end
                && session.may_contain(*other)
                && *other_start - start > tolerance
        })
        .map(|(other, _)| other)
        .collect()
}

/// Base duration of `session` plus the base durations of `nested`.
pub fn effective_duration(
    session: &Session,
    nested: &BTreeSet<SessionId>,
    variables: &Variables,
) -> Duration {
    nested
        .iter()
        .filter_map(|id| variables.get(*id))
        .fold(session.base_duration, |total, s| total + s.base_duration)
}

/// Forbids other sessions from starting inside one session's window.
#[derive(Debug, Clone)]
pub struct OverlapConstraint {
    scope: [SessionId; 1],
    tolerance: Duration,
}

impl OverlapConstraint {
    /// Creates the constraint for `session`.
    pub fn new(session: SessionId, tolerance: Duration) -> Self {
        Self {
            scope: [session],
            tolerance,
        }
    }

    pub fn session(&self) -> SessionId {
        self.scope[0]
    }

    pub fn tolerance(&self) -> Duration {
        self.tolerance
    }

    /// First session (in id order) that starts inside this session's
    /// window without being a permitted nested session.
    ///
    /// `None` when satisfied, including when the session is unassigned.
    pub fn conflict(&self, assignment: &Assignment, variables: &Variables) -> Option<SessionId> {
        let session = variables.get(self.session())?;
        let start = assignment.get(session.id)?;

        let nested = overlap_set(session, assignment, self.tolerance);
        let end = start + effective_duration(session, &nested, variables);

        assignment
            .iter()
            .filter(|(other, _)| *other != session.id && !nested.contains(other))
            .find(|(_, other_start)| starts_inside(*other_start, start, end))
            .map(|(other, _)| other)
    }
}

#[inline]
fn starts_inside(instant: NaiveDateTime, start: NaiveDateTime, end: NaiveDateTime) -> bool {
    instant > start && instant < end
}

impl Constraint for OverlapConstraint {
    fn scope(&self) -> &[SessionId] {
        &self.scope
    }

    fn satisfied(&self, assignment: &Assignment, variables: &Variables) -> bool {
        self.conflict(assignment, variables).is_none()
    }

    fn name(&self) -> &'static str {
        "no-overlap"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityDescriptor, ActivityKind, PrayerDescriptor, PrayerKind, WeekDay};
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 12, 6)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn lesson(id: usize) -> Session {
        let d = Duration::minutes(90);
        Session::new(
            SessionId(id),
            ActivityDescriptor::new(format!("L{id}"), ActivityKind::Work, d),
            d,
        )
    }

    fn prayer(id: usize) -> Session {
        Session::new(
            SessionId(id),
            PrayerDescriptor::new(PrayerKind::Dhuhr, WeekDay::Saturday),
            Duration::minutes(15),
        )
    }

    fn vars(sessions: Vec<Session>) -> Variables {
        Variables::new(sessions).unwrap()
    }

    #[test]
    fn test_unassigned_is_vacuously_satisfied() {
        let v = vars(vec![lesson(0), lesson(1)]);
        let c = OverlapConstraint::new(SessionId(0), Duration::zero());
        let a = Assignment::new().with(SessionId(1), at(9, 0));
        assert!(c.satisfied(&a, &v));
    }

    #[test]
    fn test_start_inside_window_is_rejected() {
        let v = vars(vec![lesson(0), lesson(1)]);
        let c = OverlapConstraint::new(SessionId(0), Duration::zero());

        let a = Assignment::new()
            .with(SessionId(0), at(9, 0))
            .with(SessionId(1), at(10, 0));
        assert!(!c.satisfied(&a, &v));
        assert_eq!(c.conflict(&a, &v), Some(SessionId(1)));
    }

    #[test]
    fn test_window_bounds_are_exclusive() {
        let v = vars(vec![lesson(0), lesson(1)]);
        let c = OverlapConstraint::new(SessionId(0), Duration::zero());

        // Same start: not strictly after.
        let same = Assignment::new()
            .with(SessionId(0), at(9, 0))
            .with(SessionId(1), at(9, 0));
        assert!(c.satisfied(&same, &v));

        // Exactly at the end: not strictly before.
        let touching = Assignment::new()
            .with(SessionId(0), at(9, 0))
            .with(SessionId(1), at(10, 30));
        assert!(c.satisfied(&touching, &v));
    }

    #[test]
    fn test_asymmetric_check() {
        // Session 1 starts inside 0's window, but 1's constraint only
        // looks forward from 1's own start.
        let v = vars(vec![lesson(0), lesson(1)]);
        let a = Assignment::new()
            .with(SessionId(0), at(9, 0))
            .with(SessionId(1), at(10, 0));
        assert!(!OverlapConstraint::new(SessionId(0), Duration::zero()).satisfied(&a, &v));
        assert!(OverlapConstraint::new(SessionId(1), Duration::zero()).satisfied(&a, &v));
    }

    #[test]
    fn test_allowed_nested_session_extends_duration() {
        let host = lesson(0).allow_overlap(SessionId(1));
        let v = vars(vec![host.clone(), prayer(1), lesson(2)]);
        let c = OverlapConstraint::new(SessionId(0), Duration::minutes(10));

        let a = Assignment::new()
            .with(SessionId(0), at(12, 0))
            .with(SessionId(1), at(12, 30));
        let nested = overlap_set(&host, &a, c.tolerance());
        assert_eq!(nested, BTreeSet::from([SessionId(1)]));
        assert_eq!(effective_duration(&host, &nested, &v), Duration::minutes(105));
        assert!(c.satisfied(&a, &v));

        // The grown window now covers 13:30..13:45 as well.
        let crowded = a.clone().with(SessionId(2), at(13, 40));
        assert_eq!(c.conflict(&crowded, &v), Some(SessionId(2)));

        let after = a.with(SessionId(2), at(13, 45));
        assert!(c.satisfied(&after, &v));
    }

    #[test]
    fn test_allowed_session_within_tolerance_is_rejected() {
        let host = lesson(0).allow_overlap(SessionId(1));
        let v = vars(vec![host.clone(), prayer(1)]);
        let c = OverlapConstraint::new(SessionId(0), Duration::minutes(10));

        // 10 minutes after start does not exceed the tolerance.
        let a = Assignment::new()
            .with(SessionId(0), at(12, 0))
            .with(SessionId(1), at(12, 10));
        assert!(overlap_set(&host, &a, c.tolerance()).is_empty());
        assert!(!c.satisfied(&a, &v));

        let a = Assignment::new()
            .with(SessionId(0), at(12, 0))
            .with(SessionId(1), at(12, 11));
        assert!(c.satisfied(&a, &v));
    }

    #[test]
    fn test_nesting_requires_start_inside_base_window() {
        let host = lesson(0).allow_overlap(SessionId(1));
        let a = Assignment::new()
            .with(SessionId(0), at(12, 0))
            .with(SessionId(1), at(13, 30));
        assert!(overlap_set(&host, &a, Duration::zero()).is_empty());
    }

    #[test]
    fn test_satisfied_is_idempotent() {
        let host = lesson(0).allow_overlap(SessionId(1));
        let v = vars(vec![host.clone(), prayer(1), lesson(2)]);
        let c = OverlapConstraint::new(SessionId(0), Duration::minutes(10));
        let a = Assignment::new()
            .with(SessionId(0), at(12, 0))
            .with(SessionId(1), at(12, 30))
            .with(SessionId(2), at(13, 40));

        let first = (c.satisfied(&a, &v), overlap_set(&host, &a, c.tolerance()));
        let second = (c.satisfied(&a, &v), overlap_set(&host, &a, c.tolerance()));
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_stale_overlaps_between_branches() {
        let host = lesson(0).allow_overlap(SessionId(1));
        let v = vars(vec![host.clone(), prayer(1), lesson(2)]);
        let c = OverlapConstraint::new(SessionId(0), Duration::minutes(10));

        // Branch 1: prayer nested, window grows.
        let branch1 = Assignment::new()
            .with(SessionId(0), at(12, 0))
            .with(SessionId(1), at(12, 30));
        assert!(c.satisfied(&branch1, &v));

        // Branch 2: prayer elsewhere; the lesson's window is back to 90 min.
        let branch2 = Assignment::new()
            .with(SessionId(0), at(12, 0))
            .with(SessionId(1), at(18, 0))
            .with(SessionId(2), at(13, 35));
        assert!(overlap_set(&host, &branch2, c.tolerance()).is_empty());
        assert!(c.satisfied(&branch2, &v));
    }
}
