//! Budget cycle resolution.
//!
//! A cycle is a monthly period that starts on the user's anchor day (the day
//! the salary is credited) rather than on the 1st. When the anchor does not
//! exist in a month (31 in April, 30 in February) the cycle starts on the
//! last day of that month instead.
//!
//! Everything here is pure: the reference date is always passed in, the
//! clock is never read.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

/// Distance used to land safely inside the month following a cycle start.
const NEXT_CYCLE_LOOKAHEAD_DAYS: i64 = 32;

/// Day of month (1–31) on which a user's cycle begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct AnchorDay(u32);

impl AnchorDay {
    pub const DEFAULT: AnchorDay = AnchorDay(8);

    pub fn new(day: u32) -> ResultEngine<Self> {
        if (1..=31).contains(&day) {
            Ok(Self(day))
        } else {
            Err(EngineError::InvalidAnchorDay(format!(
                "{day} is not between 1 and 31"
            )))
        }
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for AnchorDay {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for AnchorDay {
    type Error = EngineError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i32> for AnchorDay {
    type Error = EngineError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        let day = u32::try_from(value).map_err(|_| {
            EngineError::InvalidAnchorDay(format!("{value} is not between 1 and 31"))
        })?;
        Self::new(day)
    }
}

impl From<AnchorDay> for u32 {
    fn from(value: AnchorDay) -> Self {
        value.0
    }
}

impl core::fmt::Display for AnchorDay {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of days in the given calendar month.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if NaiveDate::from_ymd_opt(year, 2, 29).is_some() => 29,
        2 => 28,
        _ => 31,
    }
}

/// Day the cycle starts on in the given month: the anchor clamped to the
/// month length.
#[must_use]
pub fn target_day(year: i32, month: u32, anchor: AnchorDay) -> u32 {
    anchor.get().min(days_in_month(year, month))
}

/// Start date of the cycle containing `today`.
///
/// If this month's (clamped) anchor has been reached the cycle started this
/// month, otherwise it started on the previous month's own clamped anchor.
#[must_use]
pub fn cycle_start(today: NaiveDate, anchor: AnchorDay) -> NaiveDate {
    let current = target_day(today.year(), today.month(), anchor);
    if today.day() >= current {
        return today - Duration::days(i64::from(today.day() - current));
    }

    let first_of_month = today - Duration::days(i64::from(today.day() - 1));
    let last_of_prev = first_of_month - Duration::days(1);
    let previous = target_day(last_of_prev.year(), last_of_prev.month(), anchor);
    last_of_prev - Duration::days(i64::from(last_of_prev.day() - previous))
}

/// Start of the cycle following the one that begins on `start`.
#[must_use]
pub fn next_cycle_start(start: NaiveDate, anchor: AnchorDay) -> NaiveDate {
    cycle_start(start + Duration::days(NEXT_CYCLE_LOOKAHEAD_DAYS), anchor)
}

/// Date range a statement is computed over.
///
/// `start` is inclusive and `end` exclusive (`[start, end)`). An open window
/// has no upper bound and is used for the live view of the running cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleWindow {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl CycleWindow {
    /// Window without upper bound.
    #[must_use]
    pub fn open(start: NaiveDate) -> Self {
        Self { start, end: None }
    }

    /// Window closed at `end`, or at the next cycle start when `end` is not
    /// given.
    #[must_use]
    pub fn closed(start: NaiveDate, end: Option<NaiveDate>, anchor: AnchorDay) -> Self {
        Self {
            start,
            end: Some(end.unwrap_or_else(|| next_cycle_start(start, anchor))),
        }
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && self.end.is_none_or(|end| date < end)
    }
}
