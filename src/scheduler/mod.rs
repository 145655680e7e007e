//! Weekly scheduling driver.
//!
//! Ties the pipeline together: a [`ScheduleRequest`] goes in, sessions and
//! domains are generated, the constraint engine searches, and a
//! [`Timetable`](crate::models::Timetable) comes out.
//!
//! # Reference
//! Russell & Norvig (2020), "Artificial Intelligence: A Modern Approach",
//! Ch. 6.3 (Backtracking Search for CSPs)

mod request;
mod weekly;

pub use request::{ActivityRequest, PrayerSettings, ScheduleRequest};
pub use weekly::{ScheduleOutcome, WeeklyScheduler};
