//! Weekly timetable scheduler.
//!
//! # Algorithm
//!
//! 1. Validate the request; reject it with every problem found.
//! 2. Declare sessions in the order prayers → tuitions → activities,
//!    numbering them sequentially.
//! 3. Generate each session's domain (clock source, student availability,
//!    or the activity's busy table).
//! 4. Register one [`OverlapConstraint`] per session, with the nesting
//!    tolerance of the session's kind.
//! 5. Run the backtracking search and turn a solved assignment into a
//!    [`Timetable`].
//!
//! # Complexity
//! Domain generation is O(s × 10 080) for s sessions. The search is
//! exponential in the worst case; bound it with `max_search_steps` or
//! `time_budget_ms`.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::ScheduleRequest;
use crate::availability::AvailabilityGenerator;
use crate::config::SchedulerConfig;
use crate::csp::{
    effective_duration, overlap_set, ConstraintEngine, Domains, OverlapConstraint, SearchOutcome,
    SearchStats, Variables,
};
use crate::domain::{activity_domain, tuition_domain, week_prayers, ClockSource, PrayerDomainGenerator};
use crate::error::{Result, ScheduleError};
use crate::models::{Assignment, Session, SessionDescriptor, SessionId, Student, Timetable, TimetableEntry};
use crate::validation::validate_request;

/// Result of a scheduling run.
#[derive(Debug, Clone)]
pub enum ScheduleOutcome {
    /// Every session was placed.
    Scheduled {
        timetable: Timetable,
        stats: SearchStats,
    },
    /// No placement satisfies the constraints.
    Infeasible { stats: SearchStats },
    /// The search budget ran out first.
    Interrupted { stats: SearchStats },
}

impl ScheduleOutcome {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, ScheduleOutcome::Scheduled { .. })
    }

    pub fn timetable(&self) -> Option<&Timetable> {
        match self {
            ScheduleOutcome::Scheduled { timetable, .. } => Some(timetable),
            _ => None,
        }
    }

    pub fn stats(&self) -> SearchStats {
        match self {
            ScheduleOutcome::Scheduled { stats, .. }
            | ScheduleOutcome::Infeasible { stats }
            | ScheduleOutcome::Interrupted { stats } => *stats,
        }
    }
}

/// Builds and solves one week's timetabling problem.
///
/// # Example
///
/// ```
/// use chrono::{Duration, NaiveDate};
/// use u_timetable::domain::{PrayerTimes, StaticClock};
/// use u_timetable::models::{ActivityDescriptor, ActivityKind};
/// use u_timetable::scheduler::{ActivityRequest, ScheduleRequest, WeeklyScheduler};
///
/// let week = NaiveDate::from_ymd_opt(2025, 12, 6).unwrap();
/// let request = ScheduleRequest::new(week).with_activity(ActivityRequest::new(
///     ActivityDescriptor::new("Gym", ActivityKind::Gym, Duration::minutes(60)),
/// ));
///
/// let scheduler = WeeklyScheduler::new(StaticClock::new(PrayerTimes::new()));
/// let outcome = scheduler.run(&request).unwrap();
/// let timetable = outcome.timetable().unwrap();
/// assert_eq!(timetable.len(), 1);
/// assert_eq!(timetable.entries[0].start, week.and_hms_opt(0, 0, 0).unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct WeeklyScheduler<C> {
    clock: C,
}

impl<C: ClockSource> WeeklyScheduler<C> {
    /// Creates a scheduler resolving prayer times through `clock`.
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Schedules the request's week.
    ///
    /// # Errors
    /// - [`ScheduleError::InvalidRequest`] if validation fails
    /// - [`ScheduleError::InvalidWeekStart`] if the week does not start on Saturday
    /// - [`ScheduleError::ClockResolution`] if prayer times cannot be resolved
    ///
    /// An unsatisfiable or interrupted search is reported through
    /// [`ScheduleOutcome`], not as an error.
    pub fn run(&self, request: &ScheduleRequest) -> Result<ScheduleOutcome> {
        validate_request(request).map_err(ScheduleError::InvalidRequest)?;
        let generator = AvailabilityGenerator::new(request.week_start)?;
        let config = &request.config;

        let (sessions, domains) = self.declare_sessions(request, &generator)?;
        let tolerances: Vec<(SessionId, Duration)> = sessions
            .iter()
            .map(|s| (s.id, tolerance_for(config, &s.descriptor)))
            .collect();

        let mut engine = ConstraintEngine::new(sessions, domains)?
            .with_shared_selector(config.variable_order.selector())
            .with_limits(config.search_limits());
        for (id, tolerance) in tolerances {
            engine.add_constraint(OverlapConstraint::new(id, tolerance))?;
        }

        let report = engine.backtracking_search();
        let stats = report.stats;
        let outcome = match report.outcome {
            SearchOutcome::Solved(assignment) => {
                let timetable =
                    build_timetable(request.week_start, engine.variables(), &assignment, config);
                for (host, other) in timetable.overlaps() {
                    warn!(%host, %other, "session starts inside an earlier session");
                }
                info!(
                    week = %request.week_start,
                    sessions = timetable.len(),
                    busy_minutes = timetable.busy_minutes(),
                    "timetable scheduled"
                );
                ScheduleOutcome::Scheduled { timetable, stats }
            }
            SearchOutcome::NoSolution => {
                warn!(week = %request.week_start, nodes = stats.nodes, "no feasible timetable");
                ScheduleOutcome::Infeasible { stats }
            }
            SearchOutcome::Interrupted => {
                warn!(week = %request.week_start, nodes = stats.nodes, "search budget exhausted");
                ScheduleOutcome::Interrupted { stats }
            }
        };
        Ok(outcome)
    }

    fn declare_sessions(
        &self,
        request: &ScheduleRequest,
        generator: &AvailabilityGenerator,
    ) -> Result<(Vec<Session>, Domains)> {
        let config = &request.config;
        let mut sessions: Vec<Session> = Vec::new();
        let mut domains = Domains::new();

        if let Some(settings) = &request.prayer {
            let mut prayers = PrayerDomainGenerator::new(
                &self.clock,
                settings.location,
                settings.method,
                config.prayer,
                request.week_start,
            );
            for prayer in week_prayers() {
                let id = SessionId(sessions.len());
                domains.insert(id, prayers.domain(&prayer)?);
                sessions.push(Session::new(id, prayer, config.prayer.duration()));
            }
        }

        let prayer_ids: Vec<SessionId> = sessions.iter().map(|s| s.id).collect();
        let interrupt = |session: Session, interruptible: bool| {
            if interruptible && config.prayers_interrupt_sessions {
                session.allow_overlaps(prayer_ids.iter().copied())
            } else {
                session
            }
        };

        // Repeated lessons share one domain.
        let mut tuition_domains: HashMap<Vec<&str>, Vec<NaiveDateTime>> = HashMap::new();
        for tuition in &request.tuitions {
            let mut key: Vec<&str> = tuition.students.iter().map(String::as_str).collect();
            key.sort_unstable();
            let domain = tuition_domains
                .entry(key)
                .or_insert_with(|| {
                    let students: Vec<&Student> = tuition
                        .students
                        .iter()
                        .filter_map(|id| request.student(id))
                        .collect();
                    tuition_domain(generator, &students)
                })
                .clone();

            let id = SessionId(sessions.len());
            let duration = tuition
                .duration
                .unwrap_or_else(|| config.default_tuition_duration());
            if domain.is_empty() {
                debug!(lesson = %tuition.name(), "no common free minute");
            }
            domains.insert(id, domain);
            sessions.push(interrupt(Session::new(id, tuition.clone(), duration), true));
        }

        for activity in &request.activities {
            let domain = activity_domain(generator, &activity.busy);
            for _ in 0..activity.occurrences {
                let id = SessionId(sessions.len());
                domains.insert(id, domain.clone());
                let session = Session::new(id, activity.descriptor.clone(), activity.descriptor.duration);
                sessions.push(interrupt(session, activity.interruptible));
            }
        }

        info!(
            prayers = prayer_ids.len(),
            tuitions = request.tuitions.len(),
            total = sessions.len(),
            "sessions declared"
        );
        Ok((sessions, domains))
    }
}

/// Nesting tolerance applied to a host session of the given kind.
fn tolerance_for(config: &SchedulerConfig, descriptor: &SessionDescriptor) -> Duration {
    match descriptor {
        SessionDescriptor::Prayer(_) => config.prayer_tolerance(),
        SessionDescriptor::Tuition(_) => config.tuition_tolerance(),
        SessionDescriptor::Activity(_) => config.activity_tolerance(),
    }
}

fn build_timetable(
    week_start: NaiveDate,
    variables: &Variables,
    assignment: &Assignment,
    config: &SchedulerConfig,
) -> Timetable {
    let mut timetable = Timetable::new().for_week(week_start);
    for session in variables.iter() {
        let Some(start) = assignment.get(session.id) else {
            continue;
        };
        let nested = overlap_set(session, assignment, tolerance_for(config, &session.descriptor));
        let effective = effective_duration(session, &nested, variables);
        timetable.add_entry(
            TimetableEntry::new(
                session.id,
                session.name(),
                session.descriptor.kind(),
                start,
                session.base_duration,
            )
            .with_nested(nested.into_iter().collect(), effective),
        );
    }
    timetable
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CalculationMethod, Location, PrayerTimes, StaticClock, TableClock};
    use crate::models::{
        ActivityDescriptor, ActivityKind, PrayerKind, Subject, TuitionDescriptor, WeekDay,
        WeeklyBusyTable,
    };
    use crate::scheduler::ActivityRequest;
    use crate::validation::ValidationErrorKind;
    use chrono::NaiveTime;

    fn week() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 6).unwrap()
    }

    fn sat(h: u32, m: u32) -> NaiveDateTime {
        week().and_hms_opt(h, m, 0).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn clock() -> StaticClock {
        StaticClock::new(
            PrayerTimes::new()
                .with(PrayerKind::Fajr, hm(5, 0))
                .with(PrayerKind::Dhuhr, hm(11, 50))
                .with(PrayerKind::Asr, hm(14, 40))
                .with(PrayerKind::Maghrib, hm(17, 0))
                .with(PrayerKind::Isha, hm(18, 20)),
        )
    }

    /// Busy all week except Saturday `from`..`until`.
    fn free_on_saturday(from: &str, until: &str) -> WeeklyBusyTable {
        let mut table = WeeklyBusyTable::new()
            .with_busy(WeekDay::Saturday, "00:00", from)
            .with_busy(WeekDay::Saturday, until, "00:00");
        for day in &WeekDay::ALL[1..] {
            table = table.with_busy(*day, "00:00", "00:00");
        }
        table
    }

    fn ali() -> Student {
        Student::new("s1", "Ali", "Hassan", 11).with_busy(free_on_saturday("14:00", "18:00"))
    }

    fn request() -> ScheduleRequest {
        ScheduleRequest::new(week())
            .with_student(ali())
            .with_tuition(TuitionDescriptor::new(Subject::Math).with_student(&ali()))
            .with_activity(
                ActivityRequest::new(ActivityDescriptor::new(
                    "Gym",
                    ActivityKind::Gym,
                    Duration::minutes(60),
                ))
                .with_busy(free_on_saturday("16:00", "23:00"))
                .interruptible(),
            )
            .with_prayers(Location::new(29.95, 31.07), CalculationMethod::default())
    }

    #[test]
    fn test_full_week_with_nested_prayers() {
        let outcome = WeeklyScheduler::new(clock()).run(&request()).unwrap();
        let timetable = outcome.timetable().unwrap();

        assert_eq!(timetable.len(), 35 + 2);
        assert!(timetable.overlaps().is_empty());

        // Asr starts at 14:40 + 10 - 10, forty minutes into the lesson.
        let math = timetable.entries.iter().find(|e| e.name == "Ali_Math").unwrap();
        assert_eq!(math.start, sat(14, 0));
        assert_eq!(math.effective_duration, Duration::minutes(105));
        assert_eq!(math.end, sat(15, 45));
        let asr = timetable.entry_for(math.nested[0]).unwrap();
        assert_eq!(asr.name, "Asr_Saturday");
        assert_eq!(asr.start, sat(14, 40));

        // Maghrib (16:55) nests inside the interruptible gym session.
        let gym = timetable.entries.iter().find(|e| e.name == "Gym").unwrap();
        assert_eq!(gym.start, sat(16, 0));
        assert_eq!(gym.end, sat(17, 15));
        assert_eq!(gym.kind, "activity");

        assert!(outcome.stats().nodes >= 38);
    }

    #[test]
    fn test_prayers_disabled_keeps_sessions_apart() {
        let mut request = request();
        request.config.prayers_interrupt_sessions = false;

        let outcome = WeeklyScheduler::new(clock()).run(&request).unwrap();
        let timetable = outcome.timetable().unwrap();
        let math = timetable.entries.iter().find(|e| e.name == "Ali_Math").unwrap();

        // Asr no longer nests; the first start it does not fall strictly
        // inside is Asr's own minute.
        assert_eq!(math.start, sat(14, 40));
        assert!(math.nested.is_empty());
    }

    #[test]
    fn test_empty_domain_is_infeasible() {
        let busy = Student::new("s2", "Omar", "Said", 10).with_busy(free_on_saturday("00:00", "00:00"));
        let request = ScheduleRequest::new(week())
            .with_tuition(TuitionDescriptor::new(Subject::IT).with_student(&busy))
            .with_student(busy);

        let outcome = WeeklyScheduler::new(clock()).run(&request).unwrap();
        assert!(matches!(outcome, ScheduleOutcome::Infeasible { .. }));
        assert!(outcome.timetable().is_none());
    }

    #[test]
    fn test_step_budget_interrupts() {
        let mut request = request();
        request.config.max_search_steps = Some(5);

        let outcome = WeeklyScheduler::new(clock()).run(&request).unwrap();
        assert!(matches!(outcome, ScheduleOutcome::Interrupted { .. }));
    }

    #[test]
    fn test_invalid_request_is_rejected() {
        let request = ScheduleRequest::new(week()).with_tuition(TuitionDescriptor::new(Subject::Biology));
        let err = WeeklyScheduler::new(clock()).run(&request).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidRequest(errors) if errors.len() == 1));
    }

    #[test]
    fn test_oversized_activity_is_rejected_before_search() {
        let request = request().with_activity(ActivityRequest::new(ActivityDescriptor::new(
            "Sabbatical",
            ActivityKind::Other,
            Duration::minutes(1_000_000_000_000),
        )));
        let err = WeeklyScheduler::new(clock()).run(&request).unwrap_err();
        assert!(matches!(
            err,
            ScheduleError::InvalidRequest(errors)
                if errors.len() == 1 && errors[0].kind == ValidationErrorKind::DurationOutOfRange
        ));
    }

    #[test]
    fn test_oversized_config_is_rejected_before_search() {
        let mut config = SchedulerConfig::default();
        config.default_tuition_minutes = i64::MAX;
        let request = request().with_config(config);
        let err = WeeklyScheduler::new(clock()).run(&request).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidRequest(errors) if errors.len() == 1));
    }

    #[test]
    fn test_week_must_start_on_saturday() {
        let request = ScheduleRequest::new(NaiveDate::from_ymd_opt(2025, 12, 8).unwrap());
        let err = WeeklyScheduler::new(clock()).run(&request).unwrap_err();
        assert!(matches!(err, ScheduleError::InvalidWeekStart { .. }));
    }

    #[test]
    fn test_clock_failure_aborts_run() {
        let err = WeeklyScheduler::new(TableClock::new()).run(&request()).unwrap_err();
        assert!(matches!(err, ScheduleError::ClockResolution { date, .. } if date == week()));
    }

    #[test]
    fn test_later_session_inside_earlier_window_is_not_rechecked() {
        // Both weekly lessons land on 14:00: the second one's constraint only
        // looks at sessions starting after it.
        let request = ScheduleRequest::new(week())
            .with_student(ali())
            .with_tuition(TuitionDescriptor::new(Subject::Math).with_student(&ali()))
            .with_tuition(TuitionDescriptor::new(Subject::Math).with_student(&ali()));

        let outcome = WeeklyScheduler::new(clock()).run(&request).unwrap();
        let timetable = outcome.timetable().unwrap();
        assert!(timetable.entries.iter().all(|e| e.start == sat(14, 0)));
        assert_eq!(timetable.overlaps(), vec![(SessionId(0), SessionId(1))]);
    }
}
