//! Period arithmetic shared by read marks, schedulers and status display.
//!
//! A *period* is the window opened by the most recent occurrence of a
//! reminder's `time` (and weekday, for weekly rules) and closed by the next
//! one. A single read event anywhere inside the window satisfies the reminder.
//! All calendar math happens in the timezone carried by `now`.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone};

use crate::types::{TimeOfDay, Timing};

mod clock;
pub use clock::*;

/// Resolve a local wall-clock time on `date` to an instant in `tz`.
///
/// Ambiguous times (clocks turned back) take the earlier instant. Times
/// skipped by a forward jump resolve to the same wall time one hour later.
pub fn local_instant<Tz: TimeZone>(tz: &Tz, date: NaiveDate, time: TimeOfDay) -> DateTime<Tz> {
    let naive = date.and_time(time.as_naive());
    if let Some(at) = tz.from_local_datetime(&naive).earliest() {
        return at;
    }
    tz.from_local_datetime(&(naive + Duration::hours(1)))
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

// Days to walk forward from weekday `from` to reach weekday `to` (0 = Sunday).
fn days_until_weekday(from: u32, to: u8) -> i64 {
    (i64::from(to) - i64::from(from)).rem_euclid(7)
}

// Days to walk back from weekday `from` to reach weekday `to` (0 = Sunday).
fn days_since_weekday(from: u32, to: u8) -> i64 {
    (i64::from(from) - i64::from(to)).rem_euclid(7)
}

/// Start of the period containing `now`.
///
/// Without timing the period is the trailing 24 hours.
pub fn period_start<Tz: TimeZone>(timing: Option<&Timing>, now: &DateTime<Tz>) -> DateTime<Tz> {
    let Some(timing) = timing else {
        return now.clone() - Duration::hours(24);
    };

    let tz = now.timezone();
    let today = now.date_naive();
    let reset_today = local_instant(&tz, today, timing.time);

    match timing.weekday() {
        None => {
            if *now < reset_today {
                local_instant(&tz, today - Duration::days(1), timing.time)
            } else {
                reset_today
            }
        }
        Some(day) => {
            let mut days_back = days_since_weekday(today.weekday().num_days_from_sunday(), day);
            if days_back == 0 && *now < reset_today {
                days_back = 7;
            }
            local_instant(&tz, today - Duration::days(days_back), timing.time)
        }
    }
}

/// Whether `last_event_ms` (epoch milliseconds) satisfies the period containing `now`.
pub fn is_in_current_period<Tz: TimeZone>(
    timing: Option<&Timing>,
    last_event_ms: Option<i64>,
    now: &DateTime<Tz>,
) -> bool {
    match (timing, last_event_ms) {
        (Some(timing), Some(last)) => last >= period_start(Some(timing), now).timestamp_millis(),
        _ => false,
    }
}

/// First instant strictly after `now` at which the rule fires.
pub fn next_trigger<Tz: TimeZone>(timing: &Timing, now: &DateTime<Tz>) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();

    let mut date = today;
    if local_instant(&tz, today, timing.time) <= *now {
        date = today + Duration::days(1);
    }
    if let Some(day) = timing.weekday() {
        let ahead = days_until_weekday(date.weekday().num_days_from_sunday(), day);
        date = date + Duration::days(ahead);
    }

    local_instant(&tz, date, timing.time)
}
