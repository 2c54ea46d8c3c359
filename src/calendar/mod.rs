//! Month view of a reminder's history.
//!
//! Works at calendar-day granularity: a weekly reminder has one scheduled
//! day per week here even though its read period spans the whole week.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use std::collections::BTreeSet;

use crate::error::ValidationError;
use crate::types::{Frequency, ReadEvent, Reminder, Timing};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayState {
    Future,
    Completed,
    Missed,
    NotScheduled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub day: u32,
    pub state: DayState,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarMonth {
    pub year: i32,
    /// 1 = January.
    pub month: u32,
    /// Weekday of the 1st, 0 = Sunday. Leading blank cells in a Sunday-first grid.
    pub first_weekday: u32,
    pub days: Vec<CalendarDay>,
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, ValidationError> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(ValidationError::Month { year, month })
}

pub fn days_in_month(year: i32, month: u32) -> Result<u32, ValidationError> {
    let first = first_of_month(year, month)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or(ValidationError::Month { year, month })?;
    Ok(next.signed_duration_since(first).num_days() as u32)
}

/// Days of `month` on which the rule fires.
///
/// `month` is 1-based (3 = March), unlike the 0-based month index of
/// JavaScript `Date`: a 0-based caller asking for March with `2` gets
/// February. Weekly timings without a stored day have no scheduled days.
pub fn scheduled_days_in_month(
    timing: Option<&Timing>,
    year: i32,
    month: u32,
) -> Result<BTreeSet<u32>, ValidationError> {
    let first = first_of_month(year, month)?;
    let last_day = days_in_month(year, month)?;
    let Some(timing) = timing else {
        return Ok(BTreeSet::new());
    };

    Ok(first
        .iter_days()
        .take(last_day as usize)
        .filter(|date| match (timing.frequency, timing.day) {
            (Frequency::Daily, _) => true,
            (Frequency::Weekly, Some(day)) => {
                date.weekday().num_days_from_sunday() == u32::from(day)
            }
            (Frequency::Weekly, None) => false,
        })
        .map(|date| date.day())
        .collect())
}

/// Days of `month` with at least one read event for `reminder_id`, by local date in `tz`.
pub fn completed_days_in_month<Tz: TimeZone>(
    history: &[ReadEvent],
    reminder_id: &str,
    year: i32,
    month: u32,
    tz: &Tz,
) -> BTreeSet<u32> {
    history
        .iter()
        .filter(|event| event.reminder_id == reminder_id)
        .filter_map(|event| tz.timestamp_millis_opt(event.timestamp).earliest())
        .map(|at| at.date_naive())
        .filter(|date| date.year() == year && date.month() == month)
        .map(|date| date.day())
        .collect()
}

/// Classify every day of `month` for `reminder`, relative to the local date of `now`.
pub fn project_month<Tz: TimeZone>(
    reminder: &Reminder,
    history: &[ReadEvent],
    year: i32,
    month: u32,
    now: &DateTime<Tz>,
) -> Result<CalendarMonth, ValidationError> {
    let first = first_of_month(year, month)?;
    let scheduled = scheduled_days_in_month(reminder.timing.as_ref(), year, month)?;
    let completed = completed_days_in_month(history, &reminder.id, year, month, &now.timezone());
    let today = now.date_naive();

    let days = first
        .iter_days()
        .take(days_in_month(year, month)? as usize)
        .map(|date| {
            let day = date.day();
            let state = if date > today {
                DayState::Future
            } else if completed.contains(&day) {
                DayState::Completed
            } else if scheduled.contains(&day) {
                DayState::Missed
            } else {
                DayState::NotScheduled
            };
            CalendarDay { day, state, is_today: date == today }
        })
        .collect();

    Ok(CalendarMonth {
        year,
        month,
        first_weekday: first.weekday().num_days_from_sunday(),
        days,
    })
}
