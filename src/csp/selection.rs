//! Variable-selection strategies for the backtracking search.
//!
//! The search asks a [`VariableSelector`] which unassigned session to
//! branch on next. Swapping the selector changes the visit order without
//! touching the search loop.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

use super::{Domains, Variables};
use crate::models::{Assignment, SessionId};

/// Picks the next variable to assign.
pub trait VariableSelector: Send + Sync + Debug {
    /// Strategy name for logging.
    fn name(&self) -> &'static str;

    /// Returns an unassigned session, or `None` if all are assigned.
    fn select(
        &self,
        variables: &Variables,
        domains: &Domains,
        assignment: &Assignment,
    ) -> Option<SessionId>;
}

/// First unassigned variable in declaration order.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclarationOrder;

impl VariableSelector for DeclarationOrder {
    fn name(&self) -> &'static str {
        "declaration"
    }

    fn select(&self, variables: &Variables, _: &Domains, assignment: &Assignment) -> Option<SessionId> {
        variables
            .iter()
            .map(|s| s.id)
            .find(|id| !assignment.contains(*id))
    }
}

/// Unassigned variable with the smallest domain (MRV).
///
/// Ties go to the earlier-declared variable.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimumRemainingValues;

impl VariableSelector for MinimumRemainingValues {
    fn name(&self) -> &'static str {
        "mrv"
    }

    fn select(
        &self,
        variables: &Variables,
        domains: &Domains,
        assignment: &Assignment,
    ) -> Option<SessionId> {
        let mut best: Option<(usize, SessionId)> = None;
        for id in variables.iter().map(|s| s.id) {
            if assignment.contains(id) {
                continue;
            }
            let size = domains.get(&id).map_or(0, Vec::len);
            match best {
                Some((best_size, _)) if size >= best_size => {}
                _ => best = Some((size, id)),
            }
        }
        best.map(|(_, id)| id)
    }
}

/// Unassigned variable with the highest descriptor priority.
///
/// Ties go to the earlier-declared variable.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighestPriority;

impl VariableSelector for HighestPriority {
    fn name(&self) -> &'static str {
        "priority"
    }

    fn select(&self, variables: &Variables, _: &Domains, assignment: &Assignment) -> Option<SessionId> {
        let mut best: Option<(i32, SessionId)> = None;
        for session in variables.iter() {
            if assignment.contains(session.id) {
                continue;
            }
            let priority = session.priority();
            match best {
                Some((best_priority, _)) if priority <= best_priority => {}
                _ => best = Some((priority, session.id)),
            }
        }
        best.map(|(_, id)| id)
    }
}

/// Configurable choice of selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableOrder {
    /// Declaration order (prayers, then tuitions, then activities).
    #[default]
    Declaration,
    /// Smallest remaining domain first.
    MinimumRemainingValues,
    /// Highest descriptor priority first.
    Priority,
}

impl VariableOrder {
    /// Builds the selector for this order.
    pub fn selector(self) -> Arc<dyn VariableSelector> {
        match self {
            VariableOrder::Declaration => Arc::new(DeclarationOrder),
            VariableOrder::MinimumRemainingValues => Arc::new(MinimumRemainingValues),
            VariableOrder::Priority => Arc::new(HighestPriority),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityDescriptor, ActivityKind, Session};
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 12, 6)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn session(id: usize, priority: i32) -> Session {
        let d = Duration::minutes(30);
        Session::new(
            SessionId(id),
            ActivityDescriptor::new(format!("A{id}"), ActivityKind::Other, d).with_priority(priority),
            d,
        )
    }

    fn fixture() -> (Variables, Domains) {
        let vars = Variables::new(vec![session(0, 1), session(1, 5), session(2, 5)]).unwrap();
        let domains = Domains::from([
            (SessionId(0), vec![at(8), at(9), at(10)]),
            (SessionId(1), vec![at(8), at(9)]),
            (SessionId(2), vec![at(8), at(9)]),
        ]);
        (vars, domains)
    }

    #[test]
    fn test_declaration_order() {
        let (vars, domains) = fixture();
        let a = Assignment::new().with(SessionId(0), at(8));
        assert_eq!(DeclarationOrder.select(&vars, &domains, &a), Some(SessionId(1)));
    }

    #[test]
    fn test_mrv_prefers_smallest_domain_then_declaration() {
        let (vars, domains) = fixture();
        let a = Assignment::new();
        assert_eq!(
            MinimumRemainingValues.select(&vars, &domains, &a),
            Some(SessionId(1))
        );
    }

    #[test]
    fn test_priority_prefers_highest_then_declaration() {
        let (vars, domains) = fixture();
        let a = Assignment::new().with(SessionId(1), at(8));
        assert_eq!(HighestPriority.select(&vars, &domains, &a), Some(SessionId(2)));
    }

    #[test]
    fn test_all_assigned_yields_none() {
        let (vars, domains) = fixture();
        let a = Assignment::new()
            .with(SessionId(0), at(8))
            .with(SessionId(1), at(9))
            .with(SessionId(2), at(10));
        for order in [
            VariableOrder::Declaration,
            VariableOrder::MinimumRemainingValues,
            VariableOrder::Priority,
        ] {
            assert_eq!(order.selector().select(&vars, &domains, &a), None);
        }
    }

    #[test]
    fn test_variable_order_serde() {
        let order: VariableOrder = serde_json::from_str("\"minimum_remaining_values\"").unwrap();
        assert_eq!(order, VariableOrder::MinimumRemainingValues);
        assert_eq!(order.selector().name(), "mrv");
    }
}
