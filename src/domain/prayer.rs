//! Prayer domains.
//!
//! Each prayer occurrence gets a single-instant domain: the moment one
//! must be ready to leave, `clock time + congregation offset - readiness
//! margin`, on the occurrence's date.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use tracing::debug;

use super::clock::{CalculationMethod, ClockSource, Location, PrayerTimes};
use crate::config::PrayerTiming;
use crate::error::{Result, ScheduleError};
use crate::models::{PrayerDescriptor, PrayerKind, WeekDay};

/// All 35 weekly prayer occurrences, Saturday first, Fajr first.
pub fn week_prayers() -> Vec<PrayerDescriptor> {
    WeekDay::ALL
        .iter()
        .flat_map(|&day| PrayerKind::ALL.iter().map(move |&kind| PrayerDescriptor::new(kind, day)))
        .collect()
}

/// Generates prayer domains for one week, resolving each date once.
#[derive(Debug)]
pub struct PrayerDomainGenerator<C> {
    clock: C,
    location: Location,
    method: CalculationMethod,
    timing: PrayerTiming,
    week_start: NaiveDate,
    cache: HashMap<NaiveDate, PrayerTimes>,
}

impl<C: ClockSource> PrayerDomainGenerator<C> {
    pub fn new(
        clock: C,
        location: Location,
        method: CalculationMethod,
        timing: PrayerTiming,
        week_start: NaiveDate,
    ) -> Self {
        Self {
            clock,
            location,
            method,
            timing,
            week_start,
            cache: HashMap::new(),
        }
    }

    /// Clock times for `date`, from cache or the clock source.
    fn times_on(&mut self, date: NaiveDate) -> Result<&PrayerTimes> {
        if !self.cache.contains_key(&date) {
            debug!(%date, method = self.method.0, "resolving prayer times");
            let times = self.clock.prayer_times(date, &self.location, self.method)?;
            self.cache.insert(date, times);
        }
        self.cache
            .get(&date)
            .ok_or_else(|| ScheduleError::clock(date, "prayer times cache miss"))
    }

    /// The single start instant for `prayer`.
    pub fn start_for(&mut self, prayer: &PrayerDescriptor) -> Result<NaiveDateTime> {
        let date = prayer.day.date_in_week(self.week_start);
        let clock_time = self
            .times_on(date)?
            .get(prayer.kind)
            .ok_or_else(|| {
                ScheduleError::clock(date, format!("no {} time", prayer.kind.name()))
            })?;

        Ok(date.and_time(clock_time) + self.timing.congregation_offset(prayer.kind)
            - self.timing.readiness_margin())
    }

    /// One-element domain for `prayer`.
    pub fn domain(&mut self, prayer: &PrayerDescriptor) -> Result<Vec<NaiveDateTime>> {
        Ok(vec![self.start_for(prayer)?])
    }

    /// Number of distinct dates resolved so far.
    pub fn resolved_dates(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::{StaticClock, TableClock};
    use chrono::NaiveTime;
    use std::cell::Cell;

    fn week() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 6).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn times() -> PrayerTimes {
        PrayerTimes::new()
            .with(PrayerKind::Fajr, hm(5, 0))
            .with(PrayerKind::Dhuhr, hm(11, 50))
            .with(PrayerKind::Asr, hm(14, 40))
            .with(PrayerKind::Maghrib, hm(17, 0))
            .with(PrayerKind::Isha, hm(18, 20))
    }

    /// Counts how often the clock is consulted.
    struct CountingClock {
        calls: Cell<usize>,
    }

    impl ClockSource for CountingClock {
        fn prayer_times(&self, _: NaiveDate, _: &Location, _: CalculationMethod) -> Result<PrayerTimes> {
            self.calls.set(self.calls.get() + 1);
            Ok(times())
        }
    }

    fn generator<C: ClockSource>(clock: C) -> PrayerDomainGenerator<C> {
        PrayerDomainGenerator::new(
            clock,
            Location::new(29.95, 31.07),
            CalculationMethod(5),
            PrayerTiming::default(),
            week(),
        )
    }

    #[test]
    fn test_week_prayers() {
        let prayers = week_prayers();
        assert_eq!(prayers.len(), 35);
        assert_eq!(prayers[0].name(), "Fajr_Saturday");
        assert_eq!(prayers[4].name(), "Isha_Saturday");
        assert_eq!(prayers[34].name(), "Isha_Friday");
    }

    #[test]
    fn test_start_applies_offset_and_margin() {
        let mut g = generator(StaticClock::new(times()));

        // Fajr: 05:00 + 20 - 10
        let fajr = PrayerDescriptor::new(PrayerKind::Fajr, WeekDay::Saturday);
        assert_eq!(g.start_for(&fajr).unwrap(), week().and_time(hm(5, 10)));

        // Maghrib on Monday: 17:00 + 5 - 10
        let maghrib = PrayerDescriptor::new(PrayerKind::Maghrib, WeekDay::Monday);
        let monday = WeekDay::Monday.date_in_week(week());
        assert_eq!(g.domain(&maghrib).unwrap(), vec![monday.and_time(hm(16, 55))]);
    }

    #[test]
    fn test_dates_resolved_once() {
        let clock = CountingClock { calls: Cell::new(0) };
        let mut g = generator(&clock);
        for prayer in week_prayers() {
            g.domain(&prayer).unwrap();
        }
        assert_eq!(clock.calls.get(), 7);
        assert_eq!(g.resolved_dates(), 7);
    }

    #[test]
    fn test_clock_failure_surfaces() {
        let clock = TableClock::new().with_day(week(), times());
        let mut g = generator(clock);

        let sat = PrayerDescriptor::new(PrayerKind::Asr, WeekDay::Saturday);
        assert!(g.domain(&sat).is_ok());

        let sun = PrayerDescriptor::new(PrayerKind::Asr, WeekDay::Sunday);
        assert!(matches!(
            g.domain(&sun),
            Err(ScheduleError::ClockResolution { .. })
        ));
    }
}
