//! Constraint-satisfaction core.
//!
//! A small CSP engine specialised for timetabling: variables are
//! [`Session`]s, values are start instants, and constraints are checked
//! against a partial [`Assignment`]. The search is a plain depth-first
//! backtracking search; no propagation or learning is performed.
//!
//! # Consistency scope
//! When a variable is assigned, only the constraints registered for *that*
//! variable are evaluated, against the whole current assignment. A
//! constraint attached to an earlier variable is never re-checked when a
//! later variable is placed. [`OverlapConstraint`] is instantiated once per
//! session and scans every assigned session, which keeps this scope
//! workable for timetables.
//!
//! # Usage
//!
//! ```
//! use chrono::{Duration, NaiveDate};
//! use std::collections::HashMap;
//! use u_timetable::csp::{ConstraintEngine, OverlapConstraint, SearchOutcome};
//! use u_timetable::models::{ActivityDescriptor, ActivityKind, Session, SessionId};
//!
//! let nine = NaiveDate::from_ymd_opt(2025, 12, 6).unwrap().and_hms_opt(9, 0, 0).unwrap();
//! let hour = Duration::minutes(60);
//! let a = Session::new(SessionId(0), ActivityDescriptor::new("Gym", ActivityKind::Gym, hour), hour);
//! let b = Session::new(SessionId(1), ActivityDescriptor::new("Work", ActivityKind::Work, hour), hour);
//!
//! let domains = HashMap::from([
//!     (SessionId(0), vec![nine]),
//!     (SessionId(1), vec![nine + Duration::minutes(30), nine + hour]),
//! ]);
//! let mut engine = ConstraintEngine::new(vec![a, b], domains).unwrap();
//! engine.add_constraint(OverlapConstraint::new(SessionId(1), Duration::zero())).unwrap();
//!
//! let report = engine.backtracking_search();
//! assert!(matches!(report.outcome, SearchOutcome::Solved(_)));
//! ```
//!
//! # Reference
//! Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach",
//! Ch. 6 (Constraint Satisfaction Problems)

mod engine;
mod overlap;
mod selection;

pub use engine::{ConstraintEngine, SearchLimits, SearchOutcome, SearchReport, SearchStats};
pub use overlap::{effective_duration, overlap_set, OverlapConstraint};
pub use selection::{
    DeclarationOrder, HighestPriority, MinimumRemainingValues, VariableOrder, VariableSelector,
};

use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::fmt::Debug;

use crate::error::{Result, ScheduleError};
use crate::models::{Assignment, Session, SessionId};

/// Legal start instants per session.
pub type Domains = HashMap<SessionId, Vec<NaiveDateTime>>;

/// A constraint over a set of sessions.
///
/// Implementations must be pure: `satisfied` may not retain state between
/// calls, so evaluating it twice on the same assignment gives the same
/// answer.
pub trait Constraint: Send + Sync + Debug {
    /// Sessions this constraint is registered for.
    fn scope(&self) -> &[SessionId];

    /// Whether the (partial) assignment satisfies this constraint.
    fn satisfied(&self, assignment: &Assignment, variables: &Variables) -> bool;

    /// Constraint name for logging.
    fn name(&self) -> &'static str {
        "constraint"
    }
}

/// The engine's variable set, in declaration order, with id lookup.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    sessions: Vec<Session>,
    positions: HashMap<SessionId, usize>,
}

impl Variables {
    /// Indexes `sessions`; fails on a repeated [`SessionId`].
    pub fn new(sessions: Vec<Session>) -> Result<Self> {
        let mut positions = HashMap::with_capacity(sessions.len());
        for (pos, session) in sessions.iter().enumerate() {
            if positions.insert(session.id, pos).is_some() {
                return Err(ScheduleError::DuplicateVariable(session.id));
            }
        }
        Ok(Self {
            sessions,
            positions,
        })
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.positions.get(&id).map(|&pos| &self.sessions[pos])
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.positions.contains_key(&id)
    }

    /// Declaration-order position of `id`.
    pub fn position(&self, id: SessionId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    /// Sessions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
