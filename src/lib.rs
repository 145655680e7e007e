//! Weekly personal timetabling as a constraint-satisfaction problem.
//!
//! Places prayers, tuition lessons, and generic activities into one
//! Saturday-to-Friday week. Every session is a CSP variable whose domain is
//! the set of minute-instants it may start at; a no-overlap constraint per
//! session keeps sessions apart, except for declared nested sessions
//! (a prayer inside a lesson).
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Session`, `SessionDescriptor`, `Student`,
//!   `WeeklyBusyTable`, `Assignment`, `Timetable`
//! - **`availability`**: Busy tables → free minute-instants of one week
//! - **`domain`**: Start-time domains for tuitions, activities, and prayers;
//!   prayer clock sources
//! - **`csp`**: Constraint engine, overlap constraint, backtracking search
//! - **`roster`**: Student/lesson import from the session-source export
//! - **`validation`**: Request integrity checks
//! - **`scheduler`**: End-to-end weekly driver
//! - **`config`**: Tolerances, prayer timing, search budgets (TOML)
//!
//! # Architecture
//!
//! Sources (roster, clock) feed domain generation; the engine is a pure
//! function of sessions, domains, and constraints; the scheduler turns a
//! solved assignment into a `Timetable` for whatever sink stores it.
//!
//! # References
//!
//! - Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach", Ch. 6
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

pub mod availability;
pub mod config;
pub mod csp;
pub mod domain;
pub mod error;
pub mod models;
pub mod roster;
pub mod scheduler;
pub mod validation;

pub use error::{Result, ScheduleError};
