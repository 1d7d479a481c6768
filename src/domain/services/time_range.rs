use crate::domain::errors::{DomainError, DomainResult};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A wall-clock time of day with minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClockTime {
    hour: u8,
    minute: u8,
}

impl ClockTime {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Minutes since midnight, 0..=1439.
    pub fn minutes_since_midnight(&self) -> u32 {
        self.hour as u32 * 60 + self.minute as u32
    }

    /// The naive local instant of this time on `date`.
    pub fn on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(NaiveTime::MIN) + Duration::minutes(self.minutes_since_midnight() as i64)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_clock_time(s)
    }
}

/// Parse `HH:MM` (24-hour clock). A single-digit hour such as `9:00` is
/// accepted and means the same as `09:00`.
pub fn parse_clock_time(s: &str) -> DomainResult<ClockTime> {
    static CLOCK_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = CLOCK_REGEX
        .get_or_init(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("Invalid clock time regex"));

    let invalid = || DomainError::InvalidFormat {
        field: "time".to_string(),
        value: s.to_string(),
    };

    let caps = re.captures(s.trim()).ok_or_else(invalid)?;
    let hour: u8 = caps[1].parse().map_err(|_| invalid())?;
    let minute: u8 = caps[2].parse().map_err(|_| invalid())?;

    ClockTime::new(hour, minute).ok_or_else(invalid)
}

/// Parse a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(s: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| DomainError::InvalidFormat {
        field: "date".to_string(),
        value: s.to_string(),
    })
}

/// True iff `[a_start, a_end)` and `[b_start, b_end)` share any point. Intervals
/// that only touch at a boundary do not overlap.
pub fn overlaps<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && b_start < a_end
}

/// A half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval<T> {
    pub start: T,
    pub end: T,
}

impl<T: Ord + Copy> Interval<T> {
    pub fn new(start: T, end: T) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, other: &Interval<T>) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// The maximal disjoint free sub-intervals of `[window_start, window_end)`
/// left over once `busy` is removed, sorted ascending.
///
/// `busy` may be unsorted, may overlap itself, and may extend past the window.
pub fn free_intervals<T: Ord + Copy>(
    window_start: T,
    window_end: T,
    busy: &[Interval<T>],
) -> Vec<Interval<T>> {
    if window_end <= window_start {
        return Vec::new();
    }

    let mut clipped: Vec<Interval<T>> = busy
        .iter()
        .map(|b| Interval::new(b.start.max(window_start), b.end.min(window_end)))
        .filter(|b| !b.is_empty())
        .collect();
    clipped.sort_by_key(|b| b.start);

    // Merge overlapping and adjacent busy intervals.
    let mut merged: Vec<Interval<T>> = Vec::with_capacity(clipped.len());
    for interval in clipped {
        match merged.last_mut() {
            Some(last) if interval.start <= last.end => {
                last.end = last.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }

    let mut free = Vec::with_capacity(merged.len() + 1);
    let mut cursor = window_start;
    for interval in &merged {
        if cursor < interval.start {
            free.push(Interval::new(cursor, interval.start));
        }
        cursor = cursor.max(interval.end);
    }
    if cursor < window_end {
        free.push(Interval::new(cursor, window_end));
    }
    free
}

/// Human-readable length of a span of minutes: "45 mins", "1 hour", "1.5 hours".
pub fn format_duration_minutes(minutes: i64) -> String {
    if minutes < 60 {
        return format!("{} mins", minutes);
    }
    if minutes == 60 {
        return "1 hour".to_string();
    }
    let hours = minutes as f64 / 60.0;
    let rendered = format!("{:.2}", hours);
    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{} hours", rendered)
}

/// Render minutes since the start of a day as `HH:MM`, with the day end as `24:00`.
pub fn format_day_offset(minutes: i64) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}
