//! Calendar date and day-boundary helpers
//!
//! Every instant in editdesk is a time-zone-naive local wall-clock value
//! ([`NaiveDateTime`]). These helpers turn the loose date/time strings that
//! arrive from the command line or a JSON payload into unambiguous instants
//! and half-open ranges, so nothing downstream has to reason about
//! end-of-day rollover.
//!
//! | Input | Helper | Result |
//! |-------|--------|--------|
//! | `2024-3-9` | [`parse_calendar_date`] | `NaiveDate` |
//! | date + `18:30` | [`combine_date_and_time`] | `NaiveDateTime` |
//! | date + `24:00` | [`combine_date_and_time`] | next day 00:00 |
//! | date | [`day_range`] | `[00:00, next 00:00)` |
//! | date | [`week_range`] | Monday-start 7 days |
//! | from, to | [`inclusive_day_range`] | both days included |
//! | `2024-12` | [`month_range`] | `[12-01, 01-01)` |

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("Invalid date: '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Invalid time: '{0}' (expected HH:MM between 00:00 and 24:00)")]
    InvalidTime(String),
}

/// Hour value that, paired with minute 0, means midnight of the next day
const MIDNIGHT_SENTINEL_HOUR: u32 = 24;

/// Half-open range of instants: `start` inclusive, `end` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    /// Returns true if the instant falls inside the range
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant < self.end
    }

    /// Number of whole calendar days covered
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// First calendar day in the range
    pub fn first_day(&self) -> NaiveDate {
        self.start.date()
    }

    /// Last calendar day in the range (inclusive)
    pub fn last_day(&self) -> NaiveDate {
        (self.end - Duration::days(1)).date()
    }
}

/// Parses a `YYYY-M-D` calendar date
///
/// Month and day may be one or two digits. Empty, non-numeric or zero
/// components are rejected, and so is a day that doesn't exist in the
/// given month (no silent rollover into the next month).
pub fn parse_calendar_date(text: &str) -> Result<NaiveDate, DateError> {
    let invalid = || DateError::InvalidDate(text.to_string());
    let trimmed = text.trim();

    let mut parts = trimmed.split('-');
    let (Some(year), Some(month), Some(day), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let year: i32 = parse_component(year, 4).ok_or_else(invalid)?;
    let month: u32 = parse_component(month, 2).ok_or_else(invalid)?;
    let day: u32 = parse_component(day, 2).ok_or_else(invalid)?;

    if year == 0 || month == 0 || day == 0 {
        return Err(invalid());
    }

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Parses an all-digit component of at most `max_len` characters
fn parse_component<T: std::str::FromStr>(raw: &str, max_len: usize) -> Option<T> {
    if raw.is_empty() || raw.len() > max_len || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Midnight at the start of the given day
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Combines a calendar day with an `HH:MM` wall-clock time
///
/// `24:00` is accepted and means midnight of the following day. Any other
/// hour must be in `0..=23` and minutes in `0..=59`; out-of-range values
/// are rejected instead of rolling the date forward. A missing minute
/// component (`"9"`) is read as `:00`.
pub fn combine_date_and_time(date: NaiveDate, time: &str) -> Result<NaiveDateTime, DateError> {
    let invalid = || DateError::InvalidTime(time.to_string());
    let trimmed = time.trim();

    let (hour_str, minute_str) = match trimmed.split_once(':') {
        Some((h, m)) => (h, m),
        None => (trimmed, "0"),
    };

    let hour: u32 = parse_component(hour_str, 2).ok_or_else(invalid)?;
    let minute: u32 = parse_component(minute_str, 2).ok_or_else(invalid)?;

    if hour == MIDNIGHT_SENTINEL_HOUR && minute == 0 {
        let next_day = date.succ_opt().ok_or_else(invalid)?;
        return Ok(start_of_day(next_day));
    }

    let clock = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)?;
    Ok(date.and_time(clock))
}

/// A single calendar day: `[start_of_day(date), start_of_day(date + 1))`
pub fn day_range(date: NaiveDate) -> DateRange {
    let start = start_of_day(date);
    DateRange {
        start,
        end: start + Duration::days(1),
    }
}

/// The Monday-start week containing `anchor`
pub fn week_range(anchor: NaiveDate) -> DateRange {
    let offset = i64::from(anchor.weekday().num_days_from_monday());
    let start = start_of_day(anchor - Duration::days(offset));
    DateRange {
        start,
        end: start + Duration::days(7),
    }
}

/// Range covering `from` through `to`, both days included
pub fn inclusive_day_range(from: NaiveDate, to: NaiveDate) -> DateRange {
    DateRange {
        start: start_of_day(from),
        end: start_of_day(to) + Duration::days(1),
    }
}

/// Calendar month given as `YYYY-M`
pub fn month_range(text: &str) -> Result<DateRange, DateError> {
    let invalid = || DateError::InvalidDate(text.to_string());
    let (year, month) = text.trim().split_once('-').ok_or_else(invalid)?;

    let year: i32 = parse_component(year, 4).ok_or_else(invalid)?;
    let month: u32 = parse_component(month, 2).ok_or_else(invalid)?;
    if year == 0 {
        return Err(invalid());
    }

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;

    Ok(DateRange {
        start: start_of_day(first),
        end: start_of_day(next),
    })
}

/// Parses a loose instant: a calendar date (start of day), a local
/// `YYYY-MM-DDTHH:MM[:SS]` / `YYYY-MM-DD HH:MM[:SS]` timestamp, or an
/// RFC 3339 timestamp converted to local wall-clock time
pub fn parse_instant(text: &str) -> Result<NaiveDateTime, DateError> {
    let trimmed = text.trim();

    if let Ok(date) = parse_calendar_date(trimmed) {
        return Ok(start_of_day(date));
    }

    for fmt in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(instant) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(instant);
        }
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(&Local).naive_local());
    }

    Err(DateError::InvalidDate(text.to_string()))
}

/// Current local wall-clock time, truncated to whole seconds
pub fn now_local() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Today's local calendar date
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}
