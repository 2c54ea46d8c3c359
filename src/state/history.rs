use std::sync::Arc;
use tokio::sync::Mutex;

use super::acquire_write_lock;
use crate::error::StoreError;
use crate::period::{is_in_current_period, period_start, Clock};
use crate::storage::{load_or_default, save, Storage, READ_HISTORY_KEY};
use crate::types::{ReadEvent, Reminder};

/// Most recent entries kept in `read_history`; older ones are evicted.
pub const HISTORY_LIMIT: usize = 1000;

/// Latest event for `reminder_id`, by position in the log.
pub fn last_read_in(history: &[ReadEvent], reminder_id: &str) -> Option<i64> {
    history
        .iter()
        .rev()
        .find(|event| event.reminder_id == reminder_id)
        .map(|event| event.timestamp)
}

/// Append-only log of completions.
pub struct ReadHistory {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl ReadHistory {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock, write_lock: Mutex::new(()) }
    }

    pub async fn list(&self) -> Result<Vec<ReadEvent>, StoreError> {
        load_or_default(self.storage.as_ref(), READ_HISTORY_KEY).await
    }

    pub async fn for_reminder(&self, reminder_id: &str) -> Result<Vec<ReadEvent>, StoreError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|event| event.reminder_id == reminder_id)
            .collect())
    }

    pub async fn last_read(&self, reminder_id: &str) -> Result<Option<i64>, StoreError> {
        Ok(last_read_in(&self.list().await?, reminder_id))
    }

    pub async fn is_read(&self, reminder: &Reminder) -> Result<bool, StoreError> {
        let last = self.last_read(&reminder.id).await?;
        Ok(is_in_current_period(reminder.timing.as_ref(), last, &self.clock.now()))
    }

    /// Record a completion now. Returns `false` when the current period is already satisfied.
    pub async fn add_read_mark(&self, reminder: &Reminder) -> Result<bool, StoreError> {
        let now = self.clock.now();
        let _guard = acquire_write_lock(&self.write_lock, "read history").await?;
        let mut history = self.list().await?;

        let last = last_read_in(&history, &reminder.id);
        if is_in_current_period(reminder.timing.as_ref(), last, &now) {
            return Ok(false);
        }

        history.push(ReadEvent {
            reminder_id: reminder.id.clone(),
            reminder_name: reminder.name.clone(),
            timestamp: now.timestamp_millis(),
        });
        if history.len() > HISTORY_LIMIT {
            let excess = history.len() - HISTORY_LIMIT;
            history.drain(..excess);
            log::debug!("Evicted {} old read events", excess);
        }

        save(self.storage.as_ref(), READ_HISTORY_KEY, &history).await?;
        log::info!("Marked {} as read", reminder.id);
        Ok(true)
    }

    /// Drop every event of `reminder` inside the current period. Returns how many were removed.
    pub async fn remove_read_mark(&self, reminder: &Reminder) -> Result<usize, StoreError> {
        let start = period_start(reminder.timing.as_ref(), &self.clock.now()).timestamp_millis();
        let _guard = acquire_write_lock(&self.write_lock, "read history").await?;
        let mut history = self.list().await?;

        let before = history.len();
        history.retain(|event| event.reminder_id != reminder.id || event.timestamp < start);
        let removed = before - history.len();

        if removed > 0 {
            save(self.storage.as_ref(), READ_HISTORY_KEY, &history).await?;
            log::info!("Removed {} read marks of {}", removed, reminder.id);
        }
        Ok(removed)
    }

    /// Flip the read state of the current period. Returns the new state.
    pub async fn toggle_read(&self, reminder: &Reminder) -> Result<bool, StoreError> {
        if self.is_read(reminder).await? {
            self.remove_read_mark(reminder).await?;
            Ok(false)
        } else {
            self.add_read_mark(reminder).await?;
            Ok(true)
        }
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        let _guard = acquire_write_lock(&self.write_lock, "read history").await?;
        save(self.storage.as_ref(), READ_HISTORY_KEY, &Vec::<ReadEvent>::new()).await?;
        log::info!("Read history cleared");
        Ok(())
    }
}
