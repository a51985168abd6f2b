//! Shifts and business-hours validation
//!
//! A shift is one member's working window on one calendar day. Times are
//! entered as wall-clock strings scoped to that day and must fall inside
//! the desk's fixed operating window, 09:00 to 24:00. `24:00` is written
//! as-is and lands on the following day's midnight.
//!
//! [`ShiftWindow`] is always built fresh from raw input, either by
//! [`build_and_validate`] on create or [`ShiftWindow::rebuild`] on update,
//! and is never mutated in place.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::date::{combine_date_and_time, parse_calendar_date, start_of_day, DateError};
use super::patch::{self, Patch, PatchError};

/// First hour of the business window
pub const BUSINESS_START_HOUR: u32 = 9;

/// A business-hours rule that a shift window broke
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum BusinessHoursViolation {
    #[error("end time must be after start time")]
    EndNotAfterStart,

    #[error("start time must be 09:00 or later")]
    StartBeforeOpening,

    #[error("end time must be no later than 24:00")]
    EndAfterClosing,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShiftError {
    #[error("Invalid shift date: '{0}'")]
    InvalidDate(String),

    #[error("Invalid shift time: '{0}'")]
    InvalidTime(String),

    #[error("{0}")]
    BusinessHours(#[from] BusinessHoursViolation),
}

impl From<DateError> for ShiftError {
    fn from(err: DateError) -> Self {
        match err {
            DateError::InvalidDate(raw) => ShiftError::InvalidDate(raw),
            DateError::InvalidTime(raw) => ShiftError::InvalidTime(raw),
        }
    }
}

/// A validated shift time window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftWindow {
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ShiftWindow {
    /// Re-validates a stored window against an update
    ///
    /// The base date is the patch's date when set, otherwise the existing
    /// date. A time left out of the patch keeps the stored instant exactly
    /// as it was, but the resulting pair is still checked against the
    /// business window of the (possibly new) base date.
    pub fn rebuild(
        existing: &ShiftWindow,
        date: Patch<&str>,
        start_time: Patch<&str>,
        end_time: Patch<&str>,
    ) -> Result<Self, ShiftError> {
        let base = match date {
            Patch::Set(raw) => parse_calendar_date(raw)?,
            Patch::Unset | Patch::SetNull => existing.date,
        };

        let start = match start_time {
            Patch::Set(raw) => combine_date_and_time(base, raw)?,
            Patch::Unset | Patch::SetNull => existing.start,
        };
        let end = match end_time {
            Patch::Set(raw) => combine_date_and_time(base, raw)?,
            Patch::Unset | Patch::SetNull => existing.end,
        };

        validate_business_hours(start, end, base)?;

        Ok(Self {
            date: base,
            start,
            end,
        })
    }

    /// Length of the shift
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Parses and validates a new shift window
pub fn build_and_validate(
    date_text: &str,
    start_text: &str,
    end_text: &str,
) -> Result<ShiftWindow, ShiftError> {
    let date = parse_calendar_date(date_text)?;
    let start = combine_date_and_time(date, start_text)?;
    let end = combine_date_and_time(date, end_text)?;

    validate_business_hours(start, end, date)?;

    Ok(ShiftWindow { date, start, end })
}

/// Checks a start/end pair against the business window of `base_date`
///
/// Rules are checked in order and the first failure is returned.
pub fn validate_business_hours(
    start: NaiveDateTime,
    end: NaiveDateTime,
    base_date: NaiveDate,
) -> Result<(), BusinessHoursViolation> {
    if start >= end {
        return Err(BusinessHoursViolation::EndNotAfterStart);
    }

    if start < opening_time(base_date) {
        return Err(BusinessHoursViolation::StartBeforeOpening);
    }

    if end > closing_time(base_date) {
        return Err(BusinessHoursViolation::EndAfterClosing);
    }

    Ok(())
}

/// 09:00 on the base date
pub fn opening_time(base_date: NaiveDate) -> NaiveDateTime {
    start_of_day(base_date) + Duration::hours(i64::from(BUSINESS_START_HOUR))
}

/// Midnight at the end of the base date
pub fn closing_time(base_date: NaiveDate) -> NaiveDateTime {
    start_of_day(base_date) + Duration::days(1)
}

/// A stored shift
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: i64,
    pub user_id: i64,
    /// Name of the member, joined in on reads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub memo: Option<String>,
    pub is_working: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Shift {
    pub fn window(&self) -> ShiftWindow {
        ShiftWindow {
            date: self.date,
            start: self.start_time,
            end: self.end_time,
        }
    }
}

/// Validated input for inserting a shift
#[derive(Debug, Clone, PartialEq)]
pub struct NewShift {
    pub user_id: i64,
    pub window: ShiftWindow,
    pub memo: Option<String>,
    pub is_working: bool,
}

impl NewShift {
    /// Validates raw create input
    pub fn parse(
        user_id: i64,
        date: &str,
        start_time: &str,
        end_time: &str,
        memo: Option<String>,
        is_working: bool,
    ) -> Result<Self, ShiftError> {
        let window = build_and_validate(date, start_time, end_time)?;
        Ok(Self {
            user_id,
            window,
            memo,
            is_working,
        })
    }
}

/// Partial update of a shift
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShiftPatch {
    pub date: Patch<String>,
    pub start_time: Patch<String>,
    pub end_time: Patch<String>,
    pub memo: Patch<String>,
    pub is_working: Patch<bool>,
    pub user_id: Patch<i64>,
}

impl ShiftPatch {
    /// Parses a JSON update body
    pub fn from_json(payload: &str) -> Result<Self, PatchError> {
        let parsed: Self = patch::from_json(payload)?;
        Ok(parsed.normalized())
    }

    /// Empty date/time strings behave like omitted fields
    pub fn normalized(self) -> Self {
        let blank_to_unset = |p: Patch<String>| match p.blank_as_null() {
            Patch::SetNull => Patch::Unset,
            other => other,
        };
        Self {
            date: blank_to_unset(self.date),
            start_time: blank_to_unset(self.start_time),
            end_time: blank_to_unset(self.end_time),
            ..self
        }
    }

    /// Applies the time-window portion of the patch to a stored shift
    pub fn resolve_window(&self, existing: &Shift) -> Result<ShiftWindow, ShiftError> {
        ShiftWindow::rebuild(
            &existing.window(),
            self.date.as_ref().map(String::as_str),
            self.start_time.as_ref().map(String::as_str),
            self.end_time.as_ref().map(String::as_str),
        )
    }

    /// Returns the shift as it looks after applying the patch
    ///
    /// The time window is always re-validated, even when the patch only
    /// touches the memo or the member.
    pub fn apply(&self, existing: &Shift, now: NaiveDateTime) -> Result<Shift, ShiftError> {
        let window = self.resolve_window(existing)?;

        Ok(Shift {
            id: existing.id,
            user_id: self.user_id.clone().apply_required(existing.user_id),
            user_name: existing.user_name.clone(),
            date: window.date,
            start_time: window.start,
            end_time: window.end,
            memo: self.memo.clone().apply(existing.memo.clone()),
            is_working: self.is_working.clone().apply_required(existing.is_working),
            created_at: existing.created_at,
            updated_at: now,
        })
    }
}
