use async_trait::async_trait;
use std::sync::Arc;

use super::{
    notification_content, numeric_id, BackendKind, NotificationIdMap, PendingNotification, Repeat,
    SchedulerBackend,
};
use crate::error::ScheduleError;
use crate::storage::Storage;
use crate::types::{Reminder, Timing};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    Prompt,
}

/// Calendar recurrence understood by the OS scheduler. `weekday` is 1 = Sunday .. 7 = Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarRule {
    pub weekday: Option<u8>,
    pub hour: u32,
    pub minute: u32,
    pub allow_while_idle: bool,
}

impl CalendarRule {
    pub fn for_timing(timing: &Timing) -> Self {
        Self {
            weekday: timing.weekday().map(|day| day + 1),
            hour: timing.time.hour(),
            minute: timing.time.minute(),
            allow_while_idle: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeNotification {
    pub id: i32,
    pub title: String,
    pub body: String,
    pub on: CalendarRule,
    pub reminder_id: String,
    pub reminder_name: String,
}

/// Local-notification plugin of the mobile runtime.
#[async_trait]
pub trait LocalNotifications: Send + Sync {
    async fn request_permissions(&self) -> Result<PermissionState, ScheduleError>;

    async fn schedule(&self, notification: NativeNotification) -> Result<(), ScheduleError>;

    async fn cancel(&self, ids: &[i32]) -> Result<(), ScheduleError>;

    async fn pending(&self) -> Result<Vec<NativeNotification>, ScheduleError>;
}

pub struct NativeBackend {
    api: Arc<dyn LocalNotifications>,
    ids: NotificationIdMap,
}

impl NativeBackend {
    pub fn new(api: Arc<dyn LocalNotifications>, storage: Arc<dyn Storage>) -> Self {
        Self { api, ids: NotificationIdMap::new(storage) }
    }

    pub fn id_map(&self) -> &NotificationIdMap {
        &self.ids
    }
}

#[async_trait]
impl SchedulerBackend for NativeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Native
    }

    async fn schedule(&self, reminder: &Reminder, timing: &Timing) -> Result<(), ScheduleError> {
        if self.api.request_permissions().await? != PermissionState::Granted {
            return Err(ScheduleError::PermissionDenied);
        }

        let numeric = numeric_id(&reminder.id);
        if let Some(previous) = self.ids.get(&reminder.id).await? {
            if previous != numeric {
                self.api.cancel(&[previous]).await?;
            }
        }
        self.ids.store(&reminder.id, numeric).await?;

        if let Err(e) = self.api.cancel(&[numeric]).await {
            log::debug!("Nothing to cancel for notification {}: {}", numeric, e);
        }

        let content = notification_content(Some(&reminder.name));
        self.api
            .schedule(NativeNotification {
                id: numeric,
                title: content.title,
                body: content.body,
                on: CalendarRule::for_timing(timing),
                reminder_id: reminder.id.clone(),
                reminder_name: reminder.name.clone(),
            })
            .await?;

        log::info!("Native notification {} armed for reminder {}", numeric, reminder.id);
        Ok(())
    }

    async fn cancel(&self, reminder_id: &str) -> Result<(), ScheduleError> {
        let numeric = match self.ids.get(reminder_id).await? {
            Some(mapped) => mapped,
            None => numeric_id(reminder_id),
        };

        let cancelled = self.api.cancel(&[numeric]).await;
        self.ids.remove(reminder_id).await?;
        cancelled?;

        log::debug!("Native notification {} cancelled for reminder {}", numeric, reminder_id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<PendingNotification>, ScheduleError> {
        Ok(self
            .api
            .pending()
            .await?
            .into_iter()
            .map(|notification| PendingNotification {
                reminder_id: notification.reminder_id,
                next_fire_ms: None,
                repeat: Repeat::On {
                    weekday: notification.on.weekday,
                    hour: notification.on.hour,
                    minute: notification.on.minute,
                },
            })
            .collect())
    }
}
