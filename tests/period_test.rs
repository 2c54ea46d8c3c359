use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use wird_reminder::*;

fn tz() -> FixedOffset {
    FixedOffset::east_opt(3 * 3600).unwrap()
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
    tz().with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
}

fn daily(hour: u32, minute: u32) -> Timing {
    Timing::daily(TimeOfDay::new(hour, minute).unwrap())
}

fn weekly(day: u8, hour: u32, minute: u32) -> Timing {
    Timing::weekly(day, TimeOfDay::new(hour, minute).unwrap())
}

#[test]
fn daily_period_has_not_reset_before_reset_time() {
    let timing = daily(5, 0);
    let now = at(2025, 3, 12, 4, 0);

    assert_eq!(period_start(Some(&timing), &now), at(2025, 3, 11, 5, 0));

    let yesterday_after_reset = at(2025, 3, 11, 6, 0).timestamp_millis();
    let yesterday_before_reset = at(2025, 3, 11, 4, 0).timestamp_millis();
    assert!(is_in_current_period(Some(&timing), Some(yesterday_after_reset), &now));
    assert!(!is_in_current_period(Some(&timing), Some(yesterday_before_reset), &now));
}

#[test]
fn daily_period_starts_exactly_at_reset_time() {
    let timing = daily(5, 0);
    let now = at(2025, 3, 12, 5, 0);
    assert_eq!(period_start(Some(&timing), &now), now);
}

#[test]
fn weekly_period_spans_back_to_previous_occurrence() {
    // 2025-03-14 is a Friday.
    let timing = weekly(5, 13, 0);
    let now = at(2025, 3, 14, 12, 0);

    assert_eq!(period_start(Some(&timing), &now), at(2025, 3, 7, 13, 0));

    let monday = at(2025, 3, 10, 10, 0).timestamp_millis();
    let prior_thursday = at(2025, 3, 6, 10, 0).timestamp_millis();
    assert!(is_in_current_period(Some(&timing), Some(monday), &now));
    assert!(!is_in_current_period(Some(&timing), Some(prior_thursday), &now));
}

#[test]
fn weekly_period_resets_on_its_weekday() {
    let timing = weekly(5, 13, 0);
    let now = at(2025, 3, 14, 13, 30);
    assert_eq!(period_start(Some(&timing), &now), at(2025, 3, 14, 13, 0));
}

#[test]
fn weekly_without_day_falls_back_to_friday() {
    let timing = Timing { frequency: Frequency::Weekly, time: TimeOfDay::new(13, 0).unwrap(), day: None };
    // Sunday
    let now = at(2025, 3, 16, 9, 0);
    assert_eq!(period_start(Some(&timing), &now), at(2025, 3, 14, 13, 0));
    assert_eq!(next_trigger(&timing, &now), at(2025, 3, 21, 13, 0));
}

#[test]
fn missing_timing_or_event_is_never_in_period() {
    let now = at(2025, 3, 12, 12, 0);
    let recent = (now - Duration::minutes(5)).timestamp_millis();

    assert!(!is_in_current_period(None, Some(recent), &now));
    assert!(!is_in_current_period(Some(&daily(5, 0)), None, &now));
}

#[test]
fn untimed_period_is_trailing_day() {
    let now = at(2025, 3, 12, 12, 0);
    assert_eq!(period_start(None, &now), now - Duration::hours(24));
}

#[test]
fn next_trigger_is_today_when_still_ahead() {
    let now = at(2025, 3, 12, 4, 0);
    assert_eq!(next_trigger(&daily(5, 0), &now), at(2025, 3, 12, 5, 0));
}

#[test]
fn next_trigger_is_strictly_after_now() {
    let now = at(2025, 3, 12, 5, 0);
    assert_eq!(next_trigger(&daily(5, 0), &now), at(2025, 3, 13, 5, 0));
}

#[test]
fn weekly_trigger_skips_a_week_when_todays_time_has_passed() {
    let friday_afternoon = at(2025, 3, 14, 14, 0);
    assert_eq!(next_trigger(&weekly(5, 13, 0), &friday_afternoon), at(2025, 3, 21, 13, 0));

    let friday_morning = at(2025, 3, 14, 12, 0);
    assert_eq!(next_trigger(&weekly(5, 13, 0), &friday_morning), at(2025, 3, 14, 13, 0));
}

#[test]
fn weekly_trigger_walks_forward_to_weekday() {
    // Wednesday to the next Sunday.
    let now = at(2025, 3, 12, 8, 0);
    assert_eq!(next_trigger(&weekly(0, 7, 30), &now), at(2025, 3, 16, 7, 30));
}

#[test]
fn period_start_and_next_trigger_bracket_now() {
    let timings = [daily(0, 0), daily(23, 59), weekly(0, 6, 15), weekly(6, 22, 0), weekly(3, 12, 0)];
    let mut now = at(2025, 1, 1, 0, 0);
    for _ in 0..200 {
        for timing in &timings {
            let start = period_start(Some(timing), &now);
            let next = next_trigger(timing, &now);
            assert!(start <= now, "{:?} start {} after {}", timing, start, now);
            assert!(next > now, "{:?} next {} not after {}", timing, next, now);
            assert_eq!(next - start, Duration::minutes(i64::from(timing.period_minutes())));
        }
        now = now + Duration::minutes(97);
    }
}
