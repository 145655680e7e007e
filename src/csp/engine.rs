//! Constraint engine and backtracking search.
//!
//! # Algorithm
//!
//! 1. Pick the next unassigned variable via the [`VariableSelector`]
//!    (declaration order by default).
//! 2. Try each value of its domain in domain order.
//! 3. Extend the assignment; if the variable's own constraints hold,
//!    recurse. Otherwise (or if the recursion fails) undo and try the next
//!    value.
//! 4. Succeed when every variable is assigned; fail when the root's
//!    alternatives are exhausted.
//!
//! The search is deterministic for fixed inputs.
//!
//! # Hardening
//! [`SearchLimits`] bound the number of visited nodes and the wall-clock
//! time. Both are checked on entry to every recursion step; hitting one
//! ends the search with [`SearchOutcome::Interrupted`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant};

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use super::selection::{DeclarationOrder, VariableSelector};
use super::{Constraint, Domains, Variables};
use crate::error::{Result, ScheduleError};
use crate::models::{Assignment, Session, SessionId};

/// Bounds on a single search run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchLimits {
    /// Maximum number of search nodes (recursion entries).
    pub max_steps: Option<u64>,
    /// Wall-clock budget measured from the start of the search.
    pub time_budget: Option<StdDuration>,
}

impl SearchLimits {
    /// No limits.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_steps(mut self, steps: u64) -> Self {
        self.max_steps = Some(steps);
        self
    }

    pub fn with_time_budget(mut self, budget: StdDuration) -> Self {
        self.time_budget = Some(budget);
        self
    }
}

/// Counters collected during a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Recursion entries.
    pub nodes: u64,
    /// Candidate values tested for consistency.
    pub checks: u64,
    /// Variables whose domain was exhausted.
    pub backtracks: u64,
}

/// Result of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Every variable received a consistent value.
    Solved(Assignment),
    /// The search space was exhausted without a solution.
    NoSolution,
    /// A [`SearchLimits`] bound was hit first.
    Interrupted,
}

impl SearchOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, SearchOutcome::Solved(_))
    }

    /// The solved assignment, if any.
    pub fn into_assignment(self) -> Option<Assignment> {
        match self {
            SearchOutcome::Solved(a) => Some(a),
            _ => None,
        }
    }
}

/// Outcome plus statistics.
#[derive(Debug, Clone)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    pub stats: SearchStats,
}

enum Step {
    Found,
    Dead,
    Interrupted,
}

struct SearchState {
    stats: SearchStats,
    limits: SearchLimits,
    started: Instant,
}

impl SearchState {
    fn exceeded(&self) -> bool {
        if let Some(max) = self.limits.max_steps {
            if self.stats.nodes > max {
                return true;
            }
        }
        if let Some(budget) = self.limits.time_budget {
            if self.started.elapsed() > budget {
                return true;
            }
        }
        false
    }
}

/// Variables, domains, and per-variable constraint lists.
///
/// The engine holds no state across runs; build one per scheduling week.
#[derive(Debug)]
pub struct ConstraintEngine {
    variables: Variables,
    domains: Domains,
    constraints: HashMap<SessionId, Vec<Arc<dyn Constraint>>>,
    selector: Arc<dyn VariableSelector>,
    limits: SearchLimits,
}

impl ConstraintEngine {
    /// Creates an engine over `variables`.
    ///
    /// # Errors
    /// - [`ScheduleError::MissingDomain`] if a variable has no domain entry.
    /// - [`ScheduleError::UnknownVariable`] if a domain entry names no variable.
    /// - [`ScheduleError::DuplicateVariable`] if two variables share an id.
    pub fn new(variables: Vec<Session>, domains: Domains) -> Result<Self> {
        let variables = Variables::new(variables)?;

        for session in variables.iter() {
            if !domains.contains_key(&session.id) {
                return Err(ScheduleError::MissingDomain {
                    id: session.id,
                    name: session.name(),
                });
            }
        }
        if let Some(stray) = domains.keys().find(|id| !variables.contains(**id)) {
            return Err(ScheduleError::UnknownVariable(*stray));
        }

        let constraints = variables.iter().map(|s| (s.id, Vec::new())).collect();

        info!(
            variables = variables.len(),
            domain_values = domains.values().map(Vec::len).sum::<usize>(),
            "constraint engine created"
        );

        Ok(Self {
            variables,
            domains,
            constraints,
            selector: Arc::new(DeclarationOrder),
            limits: SearchLimits::default(),
        })
    }

    /// Replaces the variable-selection strategy.
    pub fn with_selector<S: VariableSelector + 'static>(mut self, selector: S) -> Self {
        self.selector = Arc::new(selector);
        self
    }

    /// Same as [`with_selector`](Self::with_selector) for a shared strategy.
    pub fn with_shared_selector(mut self, selector: Arc<dyn VariableSelector>) -> Self {
        self.selector = selector;
        self
    }

    /// Sets search limits.
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Registers a constraint on every session in its scope.
    ///
    /// Fails with [`ScheduleError::UnknownVariable`] if the scope names a
    /// session outside the engine; nothing is registered in that case.
    pub fn add_constraint<C: Constraint + 'static>(&mut self, constraint: C) -> Result<()> {
        if let Some(unknown) = constraint
            .scope()
            .iter()
            .find(|id| !self.variables.contains(**id))
        {
            return Err(ScheduleError::UnknownVariable(*unknown));
        }

        let constraint: Arc<dyn Constraint> = Arc::new(constraint);
        for id in constraint.scope() {
            if let Some(list) = self.constraints.get_mut(id) {
                list.push(Arc::clone(&constraint));
            }
        }
        Ok(())
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Domain of `id` (empty slice for unknown ids).
    pub fn domain(&self, id: SessionId) -> &[NaiveDateTime] {
        self.domains.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn domains(&self) -> &Domains {
        &self.domains
    }

    /// Number of constraints registered for `id`.
    pub fn constraint_count(&self, id: SessionId) -> usize {
        self.constraints.get(&id).map_or(0, Vec::len)
    }

    /// Whether every constraint registered for `variable` is satisfied.
    pub fn consistent(&self, variable: SessionId, assignment: &Assignment) -> bool {
        self.constraints.get(&variable).map_or(true, |list| {
            list.iter()
                .all(|c| c.satisfied(assignment, &self.variables))
        })
    }

    /// Runs the search from an empty assignment.
    pub fn backtracking_search(&self) -> SearchReport {
        let mut assignment = Assignment::new();
        self.search(&mut assignment)
    }

    /// Runs the search from a caller-supplied partial assignment.
    ///
    /// Pre-assigned sessions are kept as-is and are not re-checked.
    /// Fails with [`ScheduleError::UnknownVariable`] if the assignment
    /// names a session outside the engine.
    pub fn backtracking_search_from(&self, mut assignment: Assignment) -> Result<SearchReport> {
        if let Some((stray, _)) = assignment.iter().find(|(id, _)| !self.variables.contains(*id)) {
            return Err(ScheduleError::UnknownVariable(stray));
        }
        Ok(self.search(&mut assignment))
    }

    fn search(&self, assignment: &mut Assignment) -> SearchReport {
        let mut state = SearchState {
            stats: SearchStats::default(),
            limits: self.limits,
            started: Instant::now(),
        };

        let outcome = match self.backtrack(assignment, &mut state) {
            Step::Found => SearchOutcome::Solved(std::mem::take(assignment)),
            Step::Dead => SearchOutcome::NoSolution,
            Step::Interrupted => SearchOutcome::Interrupted,
        };

        let stats = state.stats;
        match &outcome {
            SearchOutcome::Solved(_) => info!(
                selector = self.selector.name(),
                nodes = stats.nodes,
                backtracks = stats.backtracks,
                "search solved"
            ),
            SearchOutcome::NoSolution => info!(
                selector = self.selector.name(),
                nodes = stats.nodes,
                backtracks = stats.backtracks,
                "search exhausted without a solution"
            ),
            SearchOutcome::Interrupted => warn!(
                selector = self.selector.name(),
                nodes = stats.nodes,
                elapsed_ms = state.started.elapsed().as_millis() as u64,
                "search interrupted by limits"
            ),
        }

        SearchReport { outcome, stats }
    }

    fn backtrack(&self, assignment: &mut Assignment, state: &mut SearchState) -> Step {
        state.stats.nodes += 1;
        if state.exceeded() {
            return Step::Interrupted;
        }

        if assignment.len() == self.variables.len() {
            return Step::Found;
        }

        let Some(variable) = self
            .selector
            .select(&self.variables, &self.domains, assignment)
        else {
            return Step::Found;
        };

        for &value in self.domain(variable) {
            assignment.assign(variable, value);
            state.stats.checks += 1;

            if self.consistent(variable, assignment) {
                match self.backtrack(assignment, state) {
                    Step::Found => return Step::Found,
                    Step::Interrupted => return Step::Interrupted,
                    Step::Dead => {}
                }
            }
            assignment.unassign(variable);
        }

        state.stats.backtracks += 1;
        debug!(session = %variable, "domain exhausted, backtracking");
        Step::Dead
    }
}
