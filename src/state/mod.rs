use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::{timeout, Duration};

use crate::error::StoreError;
use crate::period::{is_in_current_period, Clock};
use crate::presets::find_preset;
use crate::scheduler::{
    notification_content, reminder_id_from_alarm, NotificationContent, SchedulerGateway,
};
use crate::storage::Storage;
use crate::types::Reminder;

mod backup;
mod bookmarks;
mod history;
mod reflections;
mod reminders;
pub use backup::*;
pub use bookmarks::*;
pub use history::*;
pub use reflections::*;
pub use reminders::*;

const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Serialises read-modify-write cycles on one persisted collection.
pub(crate) async fn acquire_write_lock<'a>(
    lock: &'a Mutex<()>,
    store: &'static str,
) -> Result<MutexGuard<'a, ()>, StoreError> {
    match timeout(LOCK_TIMEOUT, lock.lock()).await {
        Ok(guard) => Ok(guard),
        Err(_) => {
            log::error!("Timeout while acquiring {} lock", store);
            Err(StoreError::LockTimeout(store))
        }
    }
}

/// Where a reminder stands in its current period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderStatus {
    pub reminder: Reminder,
    pub last_read_ms: Option<i64>,
    pub is_read: bool,
    pub has_bookmark: bool,
}

pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub clock: Arc<dyn Clock>,
    pub gateway: Arc<SchedulerGateway>,
    pub reminders: ReminderStore,
    pub history: ReadHistory,
    pub bookmarks: BookmarkStore,
    pub reflections: ReflectionStore,
    pub presets: Vec<Reminder>,
}

impl AppState {
    pub fn new(
        storage: Arc<dyn Storage>,
        gateway: Arc<SchedulerGateway>,
        clock: Arc<dyn Clock>,
        presets: Vec<Reminder>,
    ) -> Self {
        Self {
            reminders: ReminderStore::new(storage.clone(), gateway.clone()),
            history: ReadHistory::new(storage.clone(), clock.clone()),
            bookmarks: BookmarkStore::new(storage.clone(), clock.clone()),
            reflections: ReflectionStore::new(storage.clone(), clock.clone()),
            storage,
            clock,
            gateway,
            presets,
        }
    }

    /// Status of every stored reminder that is enabled.
    pub async fn active_statuses(&self) -> Result<Vec<ReminderStatus>, StoreError> {
        let reminders = self.reminders.active().await?;
        self.statuses(reminders).await
    }

    /// Status of every preset that is not currently enabled.
    pub async fn inactive_preset_statuses(&self) -> Result<Vec<ReminderStatus>, StoreError> {
        let stored = self.reminders.list().await?;
        let presets = crate::presets::inactive_presets(&self.presets, &stored)
            .into_iter()
            .cloned()
            .collect();
        self.statuses(presets).await
    }

    async fn statuses(&self, reminders: Vec<Reminder>) -> Result<Vec<ReminderStatus>, StoreError> {
        let history = self.history.list().await?;
        let bookmarks = self.bookmarks.all().await?;
        let now = self.clock.now();

        Ok(reminders
            .into_iter()
            .map(|reminder| {
                let last_read_ms = last_read_in(&history, &reminder.id);
                ReminderStatus {
                    is_read: is_in_current_period(reminder.timing.as_ref(), last_read_ms, &now),
                    has_bookmark: bookmarks.contains_key(&reminder.id),
                    last_read_ms,
                    reminder,
                }
            })
            .collect())
    }

    /// Stored reminder first, then the presets catalog.
    pub async fn find_reminder(&self, id: &str) -> Result<Option<Reminder>, StoreError> {
        if let Some(reminder) = self.reminders.get(id).await? {
            return Ok(Some(reminder));
        }
        Ok(find_preset(&self.presets, id).cloned())
    }

    /// Notification content for a fired `reminder_<id>` alarm.
    pub async fn on_alarm(&self, alarm: &str) -> Result<Option<NotificationContent>, StoreError> {
        let Some(reminder_id) = reminder_id_from_alarm(alarm) else {
            log::debug!("Ignoring alarm {}", alarm);
            return Ok(None);
        };
        log::info!("Alarm fired: {}", alarm);
        let reminder = self.find_reminder(reminder_id).await?;
        Ok(Some(notification_content(reminder.as_ref().map(|r| r.name.as_str()))))
    }

    pub async fn reschedule_all(&self) -> Result<usize, StoreError> {
        self.reminders.reschedule_all().await
    }
}
