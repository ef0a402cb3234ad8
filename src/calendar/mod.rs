/// Calendar utilities
///
/// All day arithmetic in the crate goes through this module. Day boundaries
/// are UTC midnight everywhere: "today", "yesterday", day keys and enumerated
/// target days are all derived from the same `day_of` conversion.

pub mod clock;

pub use clock::{Clock, FixedClock, SystemClock};

use std::sync::Arc;
use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};

use crate::domain::DomainError;

/// Format used for day keys, e.g. `2024-01-07`
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Calendar bound to a clock
///
/// Cloning is cheap; all clones observe the same clock.
#[derive(Debug, Clone)]
pub struct Calendar {
    clock: Arc<dyn Clock>,
}

impl Calendar {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Calendar backed by the system clock
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Calendar frozen at `instant`
    pub fn fixed(instant: DateTime<Utc>) -> Self {
        Self::new(Arc::new(FixedClock::new(instant)))
    }

    /// The current instant
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// The current UTC calendar day
    pub fn today(&self) -> NaiveDate {
        day_of(self.now())
    }

    /// The current day as a `YYYY-MM-DD` key
    pub fn today_key(&self) -> String {
        day_key(self.now())
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::system()
    }
}

/// The UTC calendar day containing `instant`
pub fn day_of(instant: DateTime<Utc>) -> NaiveDate {
    instant.date_naive()
}

/// Convert an instant to its `YYYY-MM-DD` key
pub fn day_key(instant: DateTime<Utc>) -> String {
    format_day_key(day_of(instant))
}

pub fn format_day_key(day: NaiveDate) -> String {
    day.format(DAY_KEY_FORMAT).to_string()
}

/// Parse a `YYYY-MM-DD` key
pub fn parse_day_key(key: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(key.trim(), DAY_KEY_FORMAT)
        .map_err(|e| DomainError::InvalidDate(format!("'{}' is not a YYYY-MM-DD day key: {}", key, e)))
}

/// Signed number of calendar days from `a` to `b`
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// The day before `day`; the earliest representable day is its own predecessor
pub fn previous_day(day: NaiveDate) -> NaiveDate {
    day.pred_opt().unwrap_or(day)
}

/// First day of the `window_days` window ending at `end`
///
/// `None` for an empty window. Windows reaching past the earliest
/// representable day start there instead.
pub fn window_start(end: NaiveDate, window_days: u32) -> Option<NaiveDate> {
    let span = window_days.checked_sub(1)?;
    Some(
        end.checked_sub_days(Days::new(u64::from(span)))
            .unwrap_or(NaiveDate::MIN),
    )
}

/// Every day in `start..=end`, oldest first
pub fn days_from(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

/// The `window_days` days ending at `end` (inclusive), oldest first
pub fn trailing_days(end: NaiveDate, window_days: u32) -> Vec<NaiveDate> {
    match window_start(end, window_days) {
        Some(start) => days_from(start, end).collect(),
        None => Vec::new(),
    }
}

/// Every day in `start..=end` whose weekday is in `target_days`, in order
///
/// Returns an empty list when `start > end` or the target set is empty.
pub fn enumerate_target_days(
    start: NaiveDate,
    end: NaiveDate,
    target_days: &[Weekday],
) -> Vec<NaiveDate> {
    if target_days.is_empty() || start > end {
        return Vec::new();
    }

    days_from(start, end)
        .filter(|day| target_days.contains(&day.weekday()))
        .collect()
}

/// Weekday for an index where 0 is Sunday and 6 is Saturday
pub fn weekday_from_index(index: u8) -> Result<Weekday, DomainError> {
    match index {
        0 => Ok(Weekday::Sun),
        1 => Ok(Weekday::Mon),
        2 => Ok(Weekday::Tue),
        3 => Ok(Weekday::Wed),
        4 => Ok(Weekday::Thu),
        5 => Ok(Weekday::Fri),
        6 => Ok(Weekday::Sat),
        other => Err(DomainError::InvalidWeekday(other)),
    }
}

/// Sunday-based index of a weekday (Sunday = 0)
pub fn weekday_index(weekday: Weekday) -> u8 {
    weekday.num_days_from_sunday() as u8
}
