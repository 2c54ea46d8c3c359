use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use super::{AppState, Bookmarks};
use crate::error::{ImportError, StoreError};
use crate::storage::{Record, BOOKMARKS_KEY, READ_HISTORY_KEY, REFLECTIONS_KEY, USER_REMINDERS_KEY};
use crate::types::{ReadEvent, Reflection, Reminder};

pub const BACKUP_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub version: String,
    pub export_date: DateTime<Utc>,
    pub data: BackupData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackupData {
    #[serde(default)]
    pub user_reminders: Vec<Reminder>,
    #[serde(default)]
    pub read_history: Vec<ReadEvent>,
    #[serde(default)]
    pub bookmarks: Bookmarks,
    #[serde(default)]
    pub quran_reflections: Vec<Reflection>,
}

/// What an accepted import wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub reminders: Option<usize>,
    pub history: Option<usize>,
    pub bookmarks: Option<usize>,
    pub reflections: Option<usize>,
    pub rescheduled: usize,
}

#[derive(Clone, Copy)]
enum Container {
    Array,
    Object,
}

const SECTIONS: [(&str, Container); 4] = [
    (USER_REMINDERS_KEY, Container::Array),
    (READ_HISTORY_KEY, Container::Array),
    (BOOKMARKS_KEY, Container::Object),
    (REFLECTIONS_KEY, Container::Array),
];

fn shape(msg: impl Into<String>) -> ImportError {
    let msg = msg.into();
    log::warn!("Import rejected: {}", msg);
    ImportError::Shape(msg)
}

/// Locate the section map: `data` of a versioned backup, or the top level of
/// the flat layout older builds wrote.
fn sections(document: &Value) -> Result<&serde_json::Map<String, Value>, ImportError> {
    let Value::Object(top) = document else {
        return Err(shape("top level is not an object"));
    };
    match top.get("data") {
        Some(Value::Object(data)) => Ok(data),
        Some(_) => Err(shape("'data' is not an object")),
        None if SECTIONS.iter().any(|(key, _)| top.contains_key(*key)) => Ok(top),
        None => Err(shape("no 'data' section")),
    }
}

/// Check every present section and build the record to write. Nothing is
/// written unless all of them pass.
fn validated_record(
    data: &serde_json::Map<String, Value>,
) -> Result<(Record, ImportSummary), ImportError> {
    let mut record = Record::new();
    let mut summary = ImportSummary::default();

    for (key, container) in SECTIONS {
        let value = match data.get(key) {
            None | Some(Value::Null) => continue,
            Some(value) => value,
        };
        let len = match (container, value) {
            (Container::Array, Value::Array(items)) => items.len(),
            (Container::Object, Value::Object(entries)) => entries.len(),
            (Container::Array, _) => return Err(shape(format!("'{}' must be an array", key))),
            (Container::Object, _) => return Err(shape(format!("'{}' must be an object", key))),
        };

        // Elements must decode too, or the stores would fail on first read.
        let normalized = match key {
            USER_REMINDERS_KEY => to_normalized::<Vec<Reminder>>(key, value)?,
            READ_HISTORY_KEY => to_normalized::<Vec<ReadEvent>>(key, value)?,
            BOOKMARKS_KEY => to_normalized::<Bookmarks>(key, value)?,
            _ => to_normalized::<Vec<Reflection>>(key, value)?,
        };
        record.insert(key.to_string(), normalized);

        match key {
            USER_REMINDERS_KEY => summary.reminders = Some(len),
            READ_HISTORY_KEY => summary.history = Some(len),
            BOOKMARKS_KEY => summary.bookmarks = Some(len),
            _ => summary.reflections = Some(len),
        }
    }
    Ok((record, summary))
}

fn to_normalized<T>(key: &str, value: &Value) -> Result<Value, ImportError>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    let typed: T = serde_json::from_value(value.clone())
        .map_err(|e| shape(format!("'{}' has an invalid entry: {}", key, e)))?;
    serde_json::to_value(&typed).map_err(|e| ImportError::Store(StoreError::SerdeError(e)))
}

impl AppState {
    pub async fn export_backup(&self) -> Result<Backup, StoreError> {
        let data = BackupData {
            user_reminders: self.reminders.list().await?,
            read_history: self.history.list().await?,
            bookmarks: self.bookmarks.all().await?,
            quran_reflections: self.reflections.all().await?,
        };
        log::info!(
            "Exporting {} reminders, {} read events, {} bookmarks, {} reflections",
            data.user_reminders.len(),
            data.read_history.len(),
            data.bookmarks.len(),
            data.quran_reflections.len()
        );
        Ok(Backup {
            version: BACKUP_VERSION.to_string(),
            export_date: self.clock.now().with_timezone(&Utc),
            data,
        })
    }

    pub async fn export_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(&self.export_backup().await?)?)
    }

    /// Replace stored collections with those in `text`, then re-arm schedules.
    pub async fn import_backup(&self, text: &str) -> Result<ImportSummary, ImportError> {
        let document: Value = serde_json::from_str(text).map_err(|e| {
            log::warn!("Import rejected: {}", e);
            ImportError::Parse(e)
        })?;
        let (record, mut summary) = validated_record(sections(&document)?)?;
        if record.is_empty() {
            return Err(shape("backup contains no data"));
        }

        let previous: BTreeSet<String> =
            self.reminders.list().await?.into_iter().map(|r| r.id).collect();

        self.storage.set(record).await?;
        log::info!("Imported backup: {:?}", summary);

        let current = self.reminders.list().await?;
        let kept: BTreeSet<&str> = current.iter().map(|r| r.id.as_str()).collect();
        for id in previous.iter().filter(|id| !kept.contains(id.as_str())) {
            self.gateway.cancel(id).await;
        }
        for reminder in current.iter().filter(|r| !r.is_schedulable()) {
            self.gateway.cancel(&reminder.id).await;
        }
        summary.rescheduled = self.gateway.reschedule_all(&current).await;
        Ok(summary)
    }

    pub async fn clear_history(&self) -> Result<(), StoreError> {
        self.history.clear().await
    }

    /// Empty reminders, history and bookmarks, and cancel every schedule.
    pub async fn reset_all(&self) -> Result<(), StoreError> {
        for reminder in self.reminders.list().await? {
            self.gateway.cancel(&reminder.id).await;
        }

        let mut record = Record::new();
        record.insert(USER_REMINDERS_KEY.to_string(), Value::Array(Vec::new()));
        record.insert(READ_HISTORY_KEY.to_string(), Value::Array(Vec::new()));
        record.insert(
            BOOKMARKS_KEY.to_string(),
            serde_json::to_value(BTreeMap::<String, Value>::new())?,
        );
        self.storage.set(record).await?;
        log::info!("All reminder data reset");
        Ok(())
    }
}
