//! Scheduler gateway: arms and disarms reminder notifications on exactly one
//! backend, chosen by the host application at startup.
//!
//! Backends report failures as `ScheduleError`. The gateway logs them and
//! returns a `ScheduleOutcome`, so a missed notification never aborts the
//! store operation that triggered it.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::ScheduleError;
use crate::types::{Frequency, Reminder, Timing};

mod extension;
mod ids;
mod native;
mod timer;
pub use extension::*;
pub use ids::*;
pub use native::*;
pub use timer::*;

pub const NOTIFICATION_TITLE: &str = "مُذكِّر الوِرد اليومي";
pub const ALARM_PREFIX: &str = "reminder_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Native,
    Extension,
    Timer,
}

/// How a pending notification repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    /// Fixed interval after the first fire. Drifts across DST changes.
    Every { minutes: u32 },
    /// Calendar match. `weekday` is 1 = Sunday .. 7 = Saturday.
    On { weekday: Option<u8>, hour: u32, minute: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingNotification {
    pub reminder_id: String,
    pub next_fire_ms: Option<i64>,
    pub repeat: Repeat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
}

pub fn notification_content(reminder_name: Option<&str>) -> NotificationContent {
    let body = match reminder_name {
        Some(name) => format!("حان وقت قراءة: {}", name),
        None => "حان وقت وردك اليومي!".to_string(),
    };
    NotificationContent { title: NOTIFICATION_TITLE.to_string(), body }
}

pub fn alarm_name(reminder_id: &str) -> String {
    format!("{}{}", ALARM_PREFIX, reminder_id)
}

pub fn reminder_id_from_alarm(name: &str) -> Option<&str> {
    name.strip_prefix(ALARM_PREFIX).filter(|id| !id.is_empty())
}

/// One native scheduling mechanism.
///
/// `schedule` must replace any earlier schedule for the same reminder, and
/// `cancel` must accept ids that were never scheduled.
#[async_trait]
pub trait SchedulerBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    async fn schedule(&self, reminder: &Reminder, timing: &Timing) -> Result<(), ScheduleError>;

    async fn cancel(&self, reminder_id: &str) -> Result<(), ScheduleError>;

    async fn list(&self) -> Result<Vec<PendingNotification>, ScheduleError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Scheduled,
    Cancelled,
    PermissionDenied,
    Failed,
}

pub struct SchedulerGateway {
    backend: Arc<dyn SchedulerBackend>,
}

impl SchedulerGateway {
    pub fn new(backend: Arc<dyn SchedulerBackend>) -> Self {
        log::info!("Scheduler gateway using {:?} backend", backend.kind());
        Self { backend }
    }

    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Bring the backend in line with the reminder: armed when enabled and
    /// timed, disarmed otherwise.
    pub async fn schedule(&self, reminder: &Reminder) -> ScheduleOutcome {
        let timing = match reminder.timing {
            Some(timing) if reminder.enabled => timing,
            _ => return self.cancel(&reminder.id).await,
        };

        if timing.frequency == Frequency::Weekly && timing.day.is_none() {
            log::warn!("Weekly reminder {} has no day, scheduling it for Friday", reminder.id);
        }

        match self.backend.schedule(reminder, &timing).await {
            Ok(()) => {
                log::info!(
                    "Scheduled reminder {} ({}) at {}",
                    reminder.id, reminder.name, timing.time
                );
                ScheduleOutcome::Scheduled
            }
            Err(ScheduleError::PermissionDenied) => {
                log::warn!(
                    "Notification permission denied, reminder {} stays unscheduled",
                    reminder.id
                );
                ScheduleOutcome::PermissionDenied
            }
            Err(e) => {
                log::error!("Failed to schedule reminder {}: {}", reminder.id, e);
                ScheduleOutcome::Failed
            }
        }
    }

    pub async fn cancel(&self, reminder_id: &str) -> ScheduleOutcome {
        match self.backend.cancel(reminder_id).await {
            Ok(()) => {
                log::debug!("Cancelled schedule for reminder {}", reminder_id);
                ScheduleOutcome::Cancelled
            }
            Err(e) => {
                log::error!("Failed to cancel reminder {}: {}", reminder_id, e);
                ScheduleOutcome::Failed
            }
        }
    }

    /// Re-arm every enabled, timed reminder. Returns how many were scheduled.
    pub async fn reschedule_all(&self, reminders: &[Reminder]) -> usize {
        let schedulable: Vec<&Reminder> = reminders.iter().filter(|r| r.is_schedulable()).collect();
        log::info!("Rescheduling {} reminders", schedulable.len());

        let mut scheduled = 0;
        for reminder in schedulable {
            if self.schedule(reminder).await == ScheduleOutcome::Scheduled {
                scheduled += 1;
            }
        }
        scheduled
    }

    pub async fn pending(&self) -> Vec<PendingNotification> {
        match self.backend.list().await {
            Ok(pending) => pending,
            Err(e) => {
                log::error!("Failed to list pending notifications: {}", e);
                Vec::new()
            }
        }
    }
}
