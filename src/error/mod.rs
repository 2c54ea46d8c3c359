use std::fmt;

use crate::types::ReminderType;

/// Persistence failures. These always propagate to the caller.
#[derive(Debug)]
pub enum StoreError {
    IoError(std::io::Error),
    SerdeError(serde_json::Error),
    /// A stored document exists but is not the expected container.
    Corrupt(String),
    LockTimeout(&'static str),
}

impl std::error::Error for StoreError {}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::IoError(e) => write!(f, "IO error: {}", e),
            StoreError::SerdeError(e) => write!(f, "Serialization error: {}", e),
            StoreError::Corrupt(key) => {
                write!(f, "Stored value under '{}' has an unexpected shape", key)
            }
            StoreError::LockTimeout(store) => write!(f, "Timed out waiting for the {} lock", store),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::IoError(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::SerdeError(err)
    }
}

/// Raised by scheduler backends. The gateway logs these and never lets them escape.
#[derive(Debug)]
pub enum ScheduleError {
    PermissionDenied,
    Backend(String),
    Store(StoreError),
}

impl std::error::Error for ScheduleError {}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::PermissionDenied => write!(f, "Notification permission not granted"),
            ScheduleError::Backend(msg) => write!(f, "Scheduler backend error: {}", msg),
            ScheduleError::Store(e) => write!(f, "Scheduler storage error: {}", e),
        }
    }
}

impl From<StoreError> for ScheduleError {
    fn from(err: StoreError) -> Self {
        ScheduleError::Store(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField(&'static str),
    Time(String),
    MissingWeekday,
    Weekday(u8),
    Surah(u16),
    Juz(u8),
    AyahRange { start: u16, end: u16 },
    AyahOutOfBounds { surah: u16, end: u16, verses: u16 },
    TargetMismatch(ReminderType),
    VerseKey(String),
    Month { year: i32, month: u32 },
}

impl std::error::Error for ValidationError {}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "Field '{}' must not be empty", field),
            ValidationError::Time(raw) => write!(f, "Invalid time '{}', expected HH:MM", raw),
            ValidationError::MissingWeekday => {
                write!(f, "Weekly reminders need a day (0 = Sunday .. 6 = Saturday)")
            }
            ValidationError::Weekday(day) => write!(f, "Invalid weekday {}, expected 0-6", day),
            ValidationError::Surah(id) => write!(f, "Invalid surah {}, expected 1-114", id),
            ValidationError::Juz(id) => write!(f, "Invalid juz {}, expected 1-30", id),
            ValidationError::AyahRange { start, end } => {
                write!(f, "Invalid ayah range {}-{}", start, end)
            }
            ValidationError::AyahOutOfBounds { surah, end, verses } => {
                write!(f, "Surah {} has {} ayahs, range ends at {}", surah, verses, end)
            }
            ValidationError::TargetMismatch(kind) => {
                write!(f, "Target does not match reminder type {:?}", kind)
            }
            ValidationError::VerseKey(raw) => {
                write!(f, "Invalid verse key '{}', expected surah:ayah", raw)
            }
            ValidationError::Month { year, month } => write!(f, "Invalid month {}-{}", year, month),
        }
    }
}

/// Why a backup document was refused. Nothing is written in either case.
#[derive(Debug)]
pub enum ImportError {
    Parse(serde_json::Error),
    Shape(String),
    Store(StoreError),
}

impl std::error::Error for ImportError {}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Parse(e) => write!(f, "Backup file is not valid JSON: {}", e),
            ImportError::Shape(msg) => write!(f, "Backup file has an unexpected shape: {}", msg),
            ImportError::Store(e) => write!(f, "Failed to write imported data: {}", e),
        }
    }
}

impl From<StoreError> for ImportError {
    fn from(err: StoreError) -> Self {
        ImportError::Store(err)
    }
}

#[derive(Debug)]
pub enum WirdError {
    Store(StoreError),
    Validation(ValidationError),
    Import(ImportError),
    Catalog(String),
    Remote(reqwest::Error),
}

impl std::error::Error for WirdError {}

impl fmt::Display for WirdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WirdError::Store(e) => write!(f, "{}", e),
            WirdError::Validation(e) => write!(f, "{}", e),
            WirdError::Import(e) => write!(f, "{}", e),
            WirdError::Catalog(msg) => write!(f, "Presets catalog error: {}", msg),
            WirdError::Remote(e) => write!(f, "Quran API error: {}", e),
        }
    }
}

impl From<StoreError> for WirdError {
    fn from(err: StoreError) -> Self {
        WirdError::Store(err)
    }
}

impl From<ValidationError> for WirdError {
    fn from(err: ValidationError) -> Self {
        WirdError::Validation(err)
    }
}

impl From<ImportError> for WirdError {
    fn from(err: ImportError) -> Self {
        WirdError::Import(err)
    }
}

impl From<csv::Error> for WirdError {
    fn from(err: csv::Error) -> Self {
        WirdError::Catalog(err.to_string())
    }
}

impl From<reqwest::Error> for WirdError {
    fn from(err: reqwest::Error) -> Self {
        WirdError::Remote(err)
    }
}

impl From<serde_json::Error> for WirdError {
    fn from(err: serde_json::Error) -> Self {
        WirdError::Store(StoreError::SerdeError(err))
    }
}
