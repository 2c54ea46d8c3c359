use serde::{Deserialize, Serialize};
use chrono::{NaiveTime, Timelike};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use super::string_or_number;

/// Weekday used for weekly reminders stored without a `day` (Friday).
pub const DEFAULT_WEEKLY_DAY: u8 = 5;

pub const DAILY_PERIOD_MINUTES: u32 = 1440;
pub const WEEKLY_PERIOD_MINUTES: u32 = 10080;

pub const SURAH_COUNT: u16 = 114;
pub const JUZ_COUNT: u8 = 30;

pub const CUSTOM_ID_PREFIX: &str = "custom_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderType {
    Surah,
    AyahRange,
    Juz,
}

/// What the reminder asks the user to read. The shape follows `ReminderType`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Target {
    #[serde(rename_all = "camelCase")]
    AyahRange {
        surah_id: u16,
        start_ayah: u16,
        end_ayah: u16,
    },
    #[serde(rename_all = "camelCase")]
    Surah { surah_id: u16 },
    #[serde(rename_all = "camelCase")]
    Juz { juz_id: u8 },
}

impl Target {
    pub fn kind(&self) -> ReminderType {
        match self {
            Target::Surah { .. } => ReminderType::Surah,
            Target::AyahRange { .. } => ReminderType::AyahRange,
            Target::Juz { .. } => ReminderType::Juz,
        }
    }

    pub fn surah_id(&self) -> Option<u16> {
        match self {
            Target::Surah { surah_id } | Target::AyahRange { surah_id, .. } => Some(*surah_id),
            Target::Juz { .. } => None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match *self {
            Target::Surah { surah_id } => check_surah(surah_id),
            Target::AyahRange { surah_id, start_ayah, end_ayah } => {
                check_surah(surah_id)?;
                if start_ayah == 0 || end_ayah < start_ayah {
                    return Err(ValidationError::AyahRange { start: start_ayah, end: end_ayah });
                }
                Ok(())
            }
            Target::Juz { juz_id } => {
                if juz_id == 0 || juz_id > JUZ_COUNT {
                    return Err(ValidationError::Juz(juz_id));
                }
                Ok(())
            }
        }
    }
}

fn check_surah(surah_id: u16) -> Result<(), ValidationError> {
    if surah_id == 0 || surah_id > SURAH_COUNT {
        return Err(ValidationError::Surah(surah_id));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
}

/// Wall-clock time of day, persisted as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(TimeOfDay)
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::Time(s.to_string());
        let (hours, minutes) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hours: u32 = hours.parse().map_err(|_| invalid())?;
        let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
        TimeOfDay::new(hours, minutes).ok_or_else(invalid)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Recurrence rule. `day` is 0 = Sunday .. 6 = Saturday and only meaningful for weekly timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    pub frequency: Frequency,
    #[serde(default)]
    pub time: TimeOfDay,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u8>,
}

impl Timing {
    pub fn daily(time: TimeOfDay) -> Self {
        Self { frequency: Frequency::Daily, time, day: None }
    }

    pub fn weekly(day: u8, time: TimeOfDay) -> Self {
        Self { frequency: Frequency::Weekly, time, day: Some(day) }
    }

    /// Repeat interval handed to interval-based schedulers.
    pub fn period_minutes(&self) -> u32 {
        match self.frequency {
            Frequency::Daily => DAILY_PERIOD_MINUTES,
            Frequency::Weekly => WEEKLY_PERIOD_MINUTES,
        }
    }

    /// Weekday the rule fires on, falling back to Friday for weekly data stored without one.
    pub fn weekday(&self) -> Option<u8> {
        match self.frequency {
            Frequency::Daily => None,
            Frequency::Weekly => Some(self.day.unwrap_or(DEFAULT_WEEKLY_DAY)),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match (self.frequency, self.day) {
            (Frequency::Weekly, None) => Err(ValidationError::MissingWeekday),
            (Frequency::Weekly, Some(day)) if day > 6 => Err(ValidationError::Weekday(day)),
            _ => Ok(()),
        }
    }
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ReminderType,
    pub target: Target,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<Timing>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Reminder {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        target: Target,
        timing: Option<Timing>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: target.kind(),
            target,
            timing,
            enabled: true,
        }
    }

    /// A user-created reminder; its id carries the creation time in epoch milliseconds.
    pub fn custom(
        name: impl Into<String>,
        target: Target,
        timing: Option<Timing>,
        now_ms: i64,
    ) -> Self {
        Self::new(format!("{}{}", CUSTOM_ID_PREFIX, now_ms), name, target, timing)
    }

    pub fn is_custom(&self) -> bool {
        self.id.starts_with(CUSTOM_ID_PREFIX)
    }

    /// Enabled and timed: the only reminders that hold a live schedule.
    pub fn is_schedulable(&self) -> bool {
        self.enabled && self.timing.is_some()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyField("id"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        if self.kind != self.target.kind() {
            return Err(ValidationError::TargetMismatch(self.kind));
        }
        self.target.validate()?;
        if let Some(timing) = &self.timing {
            timing.validate()?;
        }
        Ok(())
    }
}

/// Shallow patch applied by `ReminderStore::update`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderPatch {
    pub name: Option<String>,
    pub target: Option<Target>,
    pub timing: Option<Option<Timing>>,
    pub enabled: Option<bool>,
}

impl ReminderPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    pub fn timing(mut self, timing: Option<Timing>) -> Self {
        self.timing = Some(timing);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn apply(&self, reminder: &mut Reminder) {
        if let Some(name) = &self.name {
            reminder.name = name.clone();
        }
        if let Some(target) = &self.target {
            reminder.kind = target.kind();
            reminder.target = target.clone();
        }
        if let Some(timing) = self.timing {
            reminder.timing = timing;
        }
        if let Some(enabled) = self.enabled {
            reminder.enabled = enabled;
        }
    }
}
