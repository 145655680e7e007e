//! Domain generation: the candidate start instants of each session.
//!
//! - Tuition: minutes when every participating student is free.
//! - Activity: minutes free in the activity's own busy table.
//! - Prayer: one instant derived from the clock source ([`prayer`]).
//!
//! All domains are sorted ascending and may be empty; an empty domain makes
//! the search report no solution rather than fail.

pub mod clock;
pub mod prayer;

pub use clock::{CalculationMethod, ClockSource, Location, PrayerTimes, StaticClock, TableClock};
pub use prayer::{week_prayers, PrayerDomainGenerator};

use chrono::NaiveDateTime;

use crate::availability::AvailabilityGenerator;
use crate::models::{Student, WeeklyBusyTable};

/// Minutes of the week when all `students` are free.
///
/// # Algorithm
/// Intersects the students' busy masks minute by minute, so the cost is
/// `O(students × 10 080)` regardless of how many intervals each table has.
/// An empty student list yields an empty domain.
pub fn tuition_domain(generator: &AvailabilityGenerator, students: &[&Student]) -> Vec<NaiveDateTime> {
    let Some((first, rest)) = students.split_first() else {
        return Vec::new();
    };

    let mut busy = generator.busy_mask(&first.busy);
    for student in rest {
        for (slot, taken) in busy.iter_mut().zip(generator.busy_mask(&student.busy)) {
            *slot |= taken;
        }
    }

    let origin = generator.week_origin();
    busy.iter()
        .enumerate()
        .filter(|(_, taken)| !**taken)
        .map(|(minute, _)| origin + chrono::Duration::minutes(minute as i64))
        .collect()
}

/// Minutes of the week free in `busy`.
pub fn activity_domain(generator: &AvailabilityGenerator, busy: &WeeklyBusyTable) -> Vec<NaiveDateTime> {
    generator.free_minutes(busy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::WEEK_MINUTES;
    use crate::models::WeekDay;
    use chrono::NaiveDate;

    fn generator() -> AvailabilityGenerator {
        AvailabilityGenerator::new(NaiveDate::from_ymd_opt(2025, 12, 6).unwrap()).unwrap()
    }

    fn student(id: &str, busy: WeeklyBusyTable) -> Student {
        Student::new(id, id, "Test", 10).with_busy(busy)
    }

    #[test]
    fn test_single_student_matches_free_minutes() {
        let g = generator();
        let busy = WeeklyBusyTable::new().with_busy(WeekDay::Sunday, "08:00", "15:00");
        let s = student("a", busy.clone());

        let domain = tuition_domain(&g, &[&s]);
        assert_eq!(domain, g.free_minutes(&busy));
        assert_eq!(domain.len(), WEEK_MINUTES - 420);
    }

    #[test]
    fn test_intersection_of_students() {
        let g = generator();
        let a = student("a", WeeklyBusyTable::new().with_busy(WeekDay::Sunday, "08:00", "12:00"));
        let b = student("b", WeeklyBusyTable::new().with_busy(WeekDay::Sunday, "10:00", "14:00"));

        let domain = tuition_domain(&g, &[&a, &b]);
        assert_eq!(domain.len(), WEEK_MINUTES - 360);
        assert!(domain.windows(2).all(|w| w[0] < w[1]));

        let sunday = WeekDay::Sunday.date_in_week(g.week_start());
        let nine = sunday.and_hms_opt(9, 0, 0).unwrap();
        let thirteen = sunday.and_hms_opt(13, 0, 0).unwrap();
        let fourteen = sunday.and_hms_opt(14, 0, 0).unwrap();
        assert!(!domain.contains(&nine));
        assert!(!domain.contains(&thirteen));
        assert!(domain.contains(&fourteen));
    }

    #[test]
    fn test_fully_busy_student_empties_shared_domain() {
        let g = generator();
        let mut always_busy = WeeklyBusyTable::new();
        for day in WeekDay::ALL {
            always_busy = always_busy.with_busy(day, "00:00", "00:00");
        }
        let busy = student("busy", always_busy);
        let free = student("free", WeeklyBusyTable::new());

        assert_eq!(tuition_domain(&g, &[&free]).len(), WEEK_MINUTES);
        assert!(tuition_domain(&g, &[&free, &busy]).is_empty());
        assert!(tuition_domain(&g, &[&busy, &free]).is_empty());
    }

    #[test]
    fn test_no_students_means_empty_domain() {
        assert!(tuition_domain(&generator(), &[]).is_empty());
    }

    #[test]
    fn test_activity_domain() {
        let g = generator();
        let busy = WeeklyBusyTable::new().with_busy(WeekDay::Friday, "00:00", "23:59");
        assert_eq!(activity_domain(&g, &busy).len(), WEEK_MINUTES - 1439);
    }
}
