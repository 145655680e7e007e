//! Prayer clock sources.
//!
//! The clock source is an external collaborator: given a date, a location,
//! and a calculation method, it returns the clock time of each prayer.
//! Resolution must finish before any domain is generated, so the trait is
//! synchronous; network-backed implementations fetch (or cache) ahead of
//! time and hand over a [`TableClock`].

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{Result, ScheduleError};
use crate::models::{parse_clock, PrayerKind};

/// Geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Calculation-method identifier understood by the clock source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalculationMethod(pub u8);

impl Default for CalculationMethod {
    /// Method 2 (ISNA).
    fn default() -> Self {
        CalculationMethod(2)
    }
}

/// Clock times of the five prayers on one date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerTimes {
    times: BTreeMap<PrayerKind, NaiveTime>,
}

#[derive(Deserialize)]
struct ApiResponse {
    code: u16,
    data: Option<ApiData>,
}

#[derive(Deserialize)]
struct ApiData {
    timings: HashMap<String, String>,
}

impl PrayerTimes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: sets the time of one prayer.
    pub fn with(mut self, kind: PrayerKind, time: NaiveTime) -> Self {
        self.times.insert(kind, time);
        self
    }

    pub fn get(&self, kind: PrayerKind) -> Option<NaiveTime> {
        self.times.get(&kind).copied()
    }

    /// Whether all five prayers are present.
    pub fn is_complete(&self) -> bool {
        PrayerKind::ALL.iter().all(|k| self.times.contains_key(k))
    }

    /// Parses a clock-source response body for `date`.
    ///
    /// Expected shape: `{"code": 200, "data": {"timings": {"Fajr": "05:01", ...}}}`.
    /// Times may carry a trailing zone suffix (`"05:01 (EET)"`). Extra
    /// timings (Sunrise, Midnight, ...) are ignored.
    pub fn from_api_payload(date: NaiveDate, body: &str) -> Result<Self> {
        let response: ApiResponse = serde_json::from_str(body)
            .map_err(|e| ScheduleError::clock(date, format!("malformed payload: {e}")))?;

        if response.code != 200 {
            return Err(ScheduleError::clock(
                date,
                format!("clock source answered with code {}", response.code),
            ));
        }
        let data = response
            .data
            .ok_or_else(|| ScheduleError::clock(date, "payload has no data"))?;

        let mut times = PrayerTimes::new();
        for kind in PrayerKind::ALL {
            let raw = data
                .timings
                .get(kind.name())
                .ok_or_else(|| ScheduleError::clock(date, format!("missing {} time", kind.name())))?;
            let clock = raw
                .split_whitespace()
                .next()
                .and_then(parse_clock)
                .ok_or_else(|| {
                    ScheduleError::clock(date, format!("unparsable {} time '{raw}'", kind.name()))
                })?;
            times.times.insert(kind, clock);
        }
        Ok(times)
    }
}

/// Resolves prayer clock times.
pub trait ClockSource {
    fn prayer_times(
        &self,
        date: NaiveDate,
        location: &Location,
        method: CalculationMethod,
    ) -> Result<PrayerTimes>;
}

impl<C: ClockSource + ?Sized> ClockSource for &C {
    fn prayer_times(
        &self,
        date: NaiveDate,
        location: &Location,
        method: CalculationMethod,
    ) -> Result<PrayerTimes> {
        (**self).prayer_times(date, location, method)
    }
}

/// Returns the same times for every date.
#[derive(Debug, Clone)]
pub struct StaticClock {
    times: PrayerTimes,
}

impl StaticClock {
    pub fn new(times: PrayerTimes) -> Self {
        Self { times }
    }
}

impl ClockSource for StaticClock {
    fn prayer_times(&self, date: NaiveDate, _: &Location, _: CalculationMethod) -> Result<PrayerTimes> {
        if !self.times.is_complete() {
            return Err(ScheduleError::clock(date, "static clock is missing prayers"));
        }
        Ok(self.times.clone())
    }
}

/// Pre-resolved times per date; unknown dates fail.
#[derive(Debug, Clone, Default)]
pub struct TableClock {
    days: HashMap<NaiveDate, PrayerTimes>,
}

impl TableClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_day(mut self, date: NaiveDate, times: PrayerTimes) -> Self {
        self.insert(date, times);
        self
    }

    pub fn insert(&mut self, date: NaiveDate, times: PrayerTimes) {
        self.days.insert(date, times);
    }

    /// Parses and stores one clock-source response.
    pub fn insert_payload(&mut self, date: NaiveDate, body: &str) -> Result<()> {
        let times = PrayerTimes::from_api_payload(date, body)?;
        self.insert(date, times);
        Ok(())
    }
}

impl ClockSource for TableClock {
    fn prayer_times(&self, date: NaiveDate, _: &Location, _: CalculationMethod) -> Result<PrayerTimes> {
        self.days
            .get(&date)
            .cloned()
            .ok_or_else(|| ScheduleError::clock(date, "no times recorded for this date"))
    }
}
