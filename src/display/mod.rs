use std::fmt::Write;

use crate::calendar::{CalendarMonth, DayState};
use crate::state::ReminderStatus;
use crate::types::{Frequency, Reminder, Target};

/// Sunday-first, matching `Timing::day`.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "الأحد",
    "الاثنين",
    "الثلاثاء",
    "الأربعاء",
    "الخميس",
    "الجمعة",
    "السبت",
];

const WEEKDAY_SHORT: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

pub fn weekday_name(day: u8) -> &'static str {
    WEEKDAY_NAMES.get(usize::from(day)).copied().unwrap_or("؟")
}

pub fn frequency_label(reminder: &Reminder) -> String {
    match reminder.timing {
        None => "مسبق الضبط".to_string(),
        Some(timing) => match (timing.frequency, timing.weekday()) {
            (Frequency::Weekly, Some(day)) => format!("أسبوعياً ({})", weekday_name(day)),
            _ => "يومياً".to_string(),
        },
    }
}

pub fn target_label(target: &Target) -> String {
    match *target {
        Target::Surah { surah_id } => format!("سورة {}", surah_id),
        Target::AyahRange { surah_id, start_ayah, end_ayah } => {
            format!("سورة {} ({}-{})", surah_id, start_ayah, end_ayah)
        }
        Target::Juz { juz_id } => format!("جزء {}", juz_id),
    }
}

/// One list row: read control, id, name, target, schedule.
///
/// Untimed reminders have no period to satisfy and get no read control.
pub fn render_reminder_line(status: &ReminderStatus) -> String {
    let reminder = &status.reminder;
    let mark = match (&reminder.timing, status.is_read) {
        (None, _) => " ",
        (Some(_), true) => "✓",
        (Some(_), false) => "·",
    };

    let mut line = format!(
        "[{}] {}  {}  {}  {}",
        mark,
        reminder.id,
        reminder.name,
        target_label(&reminder.target),
        frequency_label(reminder)
    );
    if let Some(timing) = reminder.timing {
        let _ = write!(line, " {}", timing.time);
    }
    if status.has_bookmark {
        line.push_str("  🔖");
    }
    if !reminder.enabled {
        line.push_str("  (off)");
    }
    line
}

fn day_cell(state: DayState) -> char {
    match state {
        DayState::Completed => '✓',
        DayState::Missed => '○',
        DayState::Future => ' ',
        DayState::NotScheduled => '·',
    }
}

/// Month grid with a weekday header and one 5-column cell per day.
pub fn render_calendar(month: &CalendarMonth) -> String {
    let mut out = format!("{:04}-{:02}\n", month.year, month.month);
    for name in WEEKDAY_SHORT {
        let _ = write!(out, " {:<4}", name);
    }
    out.push('\n');

    let mut column = month.first_weekday as usize % 7;
    out.push_str(&"     ".repeat(column));

    for day in &month.days {
        let cell = format!("{:>2}{}", day.day, day_cell(day.state));
        if day.is_today {
            let _ = write!(out, "[{}]", cell);
        } else {
            let _ = write!(out, " {} ", cell);
        }
        out.push(' ');

        column += 1;
        if column == 7 {
            out.push('\n');
            column = 0;
        }
    }
    if column != 0 {
        out.push('\n');
    }
    out.push_str("✓ read  ○ missed  · not scheduled\n");
    out
}
