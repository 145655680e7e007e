//! Assignment: session → chosen start instant.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::SessionId;

/// A partial or total mapping from sessions to start instants.
///
/// Ordered by [`SessionId`], so iteration is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assignment {
    starts: BTreeMap<SessionId, NaiveDateTime>,
}

impl Assignment {
    /// Creates an empty assignment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns `start` to `session`, returning the previous value.
    pub fn assign(&mut self, session: SessionId, start: NaiveDateTime) -> Option<NaiveDateTime> {
        self.starts.insert(session, start)
    }

    /// Builder form of [`assign`](Self::assign).
    pub fn with(mut self, session: SessionId, start: NaiveDateTime) -> Self {
        self.assign(session, start);
        self
    }

    /// Removes the value for `session`.
    pub fn unassign(&mut self, session: SessionId) -> Option<NaiveDateTime> {
        self.starts.remove(&session)
    }

    pub fn get(&self, session: SessionId) -> Option<NaiveDateTime> {
        self.starts.get(&session).copied()
    }

    pub fn contains(&self, session: SessionId) -> bool {
        self.starts.contains_key(&session)
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Iterates `(session, start)` pairs in session order.
    pub fn iter(&self) -> impl Iterator<Item = (SessionId, NaiveDateTime)> + '_ {
        self.starts.iter().map(|(id, start)| (*id, *start))
    }
}

impl FromIterator<(SessionId, NaiveDateTime)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (SessionId, NaiveDateTime)>>(iter: I) -> Self {
        Self {
            starts: iter.into_iter().collect(),
        }
    }
}
