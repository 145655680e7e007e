//! Timetabling domain models.
//!
//! Provides the data types for describing a weekly timetabling problem
//! and its solution.
//!
//! # Domain Mappings
//!
//! | u-timetable | CSP term | Example |
//! |-------------|----------|---------|
//! | Session | Variable | "Ali_Math", second lesson of the week |
//! | domain (`Vec<NaiveDateTime>`) | Domain | every free start minute |
//! | Assignment | Assignment | session → start minute |
//! | Timetable | Solution view | what the sink stores or renders |

mod assignment;
mod calendar;
mod descriptor;
mod session;
mod timetable;

pub use assignment::Assignment;
pub use calendar::{parse_clock, BusyInterval, TimeWindow, WeekDay, WeeklyBusyTable, CLOCK_FORMAT};
pub use descriptor::{
    ActivityDescriptor, ActivityKind, PrayerDescriptor, PrayerKind, SessionDescriptor, Student,
    Subject, TuitionDescriptor, DEFAULT_PRIORITY,
};
pub use session::{Session, SessionId};
pub use timetable::{Timetable, TimetableEntry};
