//! Session model: the CSP variable.
//!
//! A session is identified by its [`SessionId`], never by value. Two
//! weekly occurrences of the same lesson carry equal descriptors but are
//! distinct variables.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::descriptor::minutes;
use super::SessionDescriptor;

/// Identity of a session within one scheduling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub usize);

impl SessionId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A schedulable activity instance.
///
/// The effective duration of a session is its base duration plus the
/// durations of the permitted sessions nested inside it for a given
/// assignment. That set is computed on demand by
/// [`overlap_set`](crate::csp::overlap_set); the session itself holds no
/// search state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub descriptor: SessionDescriptor,
    #[serde(with = "minutes")]
    pub base_duration: Duration,
    /// Sessions permitted to start inside this one's window.
    #[serde(default)]
    pub allowed_overlap: BTreeSet<SessionId>,
}

impl Session {
    /// Creates a session with no overlap allowances.
    pub fn new(id: SessionId, descriptor: impl Into<SessionDescriptor>, base_duration: Duration) -> Self {
        Self {
            id,
            descriptor: descriptor.into(),
            base_duration,
            allowed_overlap: BTreeSet::new(),
        }
    }

    /// Permits `other` to nest inside this session.
    pub fn allow_overlap(mut self, other: SessionId) -> Self {
        self.allowed_overlap.insert(other);
        self
    }

    /// Permits every session in `others` to nest inside this session.
    pub fn allow_overlaps(mut self, others: impl IntoIterator<Item = SessionId>) -> Self {
        self.allowed_overlap.extend(others);
        self
    }

    #[inline]
    pub fn may_contain(&self, other: SessionId) -> bool {
        self.allowed_overlap.contains(&other)
    }

    pub fn name(&self) -> String {
        self.descriptor.name()
    }

    pub fn priority(&self) -> i32 {
        self.descriptor.priority()
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({} min, priority {})",
            self.id,
            self.descriptor.name(),
            self.base_duration.num_minutes(),
            self.priority()
        )
    }
}
