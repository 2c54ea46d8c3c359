use std::sync::Arc;
use tokio::sync::Mutex;

use super::acquire_write_lock;
use crate::error::{StoreError, ValidationError, WirdError};
use crate::quran::ChapterIndex;
use crate::scheduler::SchedulerGateway;
use crate::storage::{load_or_default, save, Storage, USER_REMINDERS_KEY};
use crate::types::{Reminder, ReminderPatch, Target};

/// CRUD over `user_reminders`, keeping the scheduler in step with every change.
///
/// Scheduling failures after a successful write are logged by the gateway and
/// leave the reminder enabled but unscheduled.
pub struct ReminderStore {
    storage: Arc<dyn Storage>,
    gateway: Arc<SchedulerGateway>,
    chapters: Option<Arc<dyn ChapterIndex>>,
    write_lock: Mutex<()>,
}

impl ReminderStore {
    pub fn new(storage: Arc<dyn Storage>, gateway: Arc<SchedulerGateway>) -> Self {
        Self {
            storage,
            gateway,
            chapters: None,
            write_lock: Mutex::new(()),
        }
    }

    /// Check ayah ranges against real chapter lengths on `add` and `update`.
    pub fn set_chapter_index(&mut self, chapters: Arc<dyn ChapterIndex>) {
        self.chapters = Some(chapters);
    }

    pub async fn list(&self) -> Result<Vec<Reminder>, StoreError> {
        load_or_default(self.storage.as_ref(), USER_REMINDERS_KEY).await
    }

    pub async fn active(&self) -> Result<Vec<Reminder>, StoreError> {
        Ok(self.list().await?.into_iter().filter(|r| r.enabled).collect())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Reminder>, StoreError> {
        Ok(self.list().await?.into_iter().find(|r| r.id == id))
    }

    async fn validate(&self, reminder: &Reminder) -> Result<(), WirdError> {
        reminder.validate()?;

        let (Some(chapters), Target::AyahRange { surah_id, end_ayah, .. }) =
            (&self.chapters, &reminder.target)
        else {
            return Ok(());
        };
        match chapters.verses_count(*surah_id).await {
            Ok(Some(verses)) if *end_ayah > verses => Err(ValidationError::AyahOutOfBounds {
                surah: *surah_id,
                end: *end_ayah,
                verses,
            }
            .into()),
            Ok(_) => Ok(()),
            Err(e) => {
                log::warn!("Could not verify ayah range of surah {}: {}", surah_id, e);
                Ok(())
            }
        }
    }

    /// Store a new reminder as enabled and arm it. Returns `false` if the id is taken.
    pub async fn add(&self, reminder: Reminder) -> Result<bool, WirdError> {
        self.validate(&reminder).await?;

        let _guard = acquire_write_lock(&self.write_lock, "reminders").await?;
        let mut list = self.list().await?;
        if list.iter().any(|r| r.id == reminder.id) {
            log::debug!("Reminder {} already exists", reminder.id);
            return Ok(false);
        }

        let stored = Reminder { enabled: true, ..reminder };
        list.push(stored.clone());
        save(self.storage.as_ref(), USER_REMINDERS_KEY, &list).await?;
        log::info!("Added reminder {} ({})", stored.id, stored.name);

        self.gateway.schedule(&stored).await;
        Ok(true)
    }

    /// Merge `patch` into the stored reminder and re-arm or disarm it.
    pub async fn update(&self, id: &str, patch: ReminderPatch) -> Result<bool, WirdError> {
        let _guard = acquire_write_lock(&self.write_lock, "reminders").await?;
        let mut list = self.list().await?;
        let Some(index) = list.iter().position(|r| r.id == id) else {
            return Ok(false);
        };

        let mut updated = list[index].clone();
        patch.apply(&mut updated);
        self.validate(&updated).await?;

        list[index] = updated.clone();
        save(self.storage.as_ref(), USER_REMINDERS_KEY, &list).await?;
        log::info!("Updated reminder {}", id);

        if updated.enabled {
            self.gateway.schedule(&updated).await;
        } else {
            self.gateway.cancel(id).await;
        }
        Ok(true)
    }

    /// Delete a reminder and cancel its schedule. Unknown ids are a no-op.
    pub async fn remove(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = acquire_write_lock(&self.write_lock, "reminders").await?;
        let mut list = self.list().await?;
        let before = list.len();
        list.retain(|r| r.id != id);
        let removed = list.len() != before;

        if removed {
            save(self.storage.as_ref(), USER_REMINDERS_KEY, &list).await?;
            log::info!("Removed reminder {}", id);
        }
        self.gateway.cancel(id).await;
        Ok(removed)
    }

    pub async fn set_enabled(&self, id: &str, enabled: bool) -> Result<bool, StoreError> {
        let _guard = acquire_write_lock(&self.write_lock, "reminders").await?;
        let mut list = self.list().await?;
        let Some(reminder) = list.iter_mut().find(|r| r.id == id) else {
            return Ok(false);
        };
        reminder.enabled = enabled;
        let reminder = reminder.clone();
        save(self.storage.as_ref(), USER_REMINDERS_KEY, &list).await?;
        log::info!("Reminder {} {}", id, if enabled { "enabled" } else { "disabled" });

        if enabled {
            self.gateway.schedule(&reminder).await;
        } else {
            self.gateway.cancel(id).await;
        }
        Ok(true)
    }

    /// Switch semantics of the reminder list: on adds or re-enables; off
    /// disables custom reminders and drops presets, which the catalog can
    /// always regenerate.
    pub async fn set_active(&self, reminder: &Reminder, on: bool) -> Result<bool, WirdError> {
        let exists = self.get(&reminder.id).await?.is_some();
        match (on, exists) {
            (true, false) => self.add(reminder.clone()).await,
            (true, true) => Ok(self.set_enabled(&reminder.id, true).await?),
            (false, _) if reminder.is_custom() => Ok(self.set_enabled(&reminder.id, false).await?),
            (false, _) => Ok(self.remove(&reminder.id).await?),
        }
    }

    pub async fn reschedule_all(&self) -> Result<usize, StoreError> {
        let list = self.list().await?;
        Ok(self.gateway.reschedule_all(&list).await)
    }
}
