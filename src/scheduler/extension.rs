use async_trait::async_trait;
use std::sync::Arc;

use super::{
    alarm_name, reminder_id_from_alarm, BackendKind, PendingNotification, Repeat, SchedulerBackend,
};
use crate::error::ScheduleError;
use crate::period::{next_trigger, Clock};
use crate::types::{Reminder, Timing};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmInfo {
    pub when_ms: i64,
    pub period_in_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alarm {
    pub name: String,
    pub scheduled_time_ms: i64,
    pub period_in_minutes: Option<u32>,
}

/// Named-alarm API of a browser extension background context.
#[async_trait]
pub trait AlarmApi: Send + Sync {
    async fn create(&self, name: &str, info: AlarmInfo) -> Result<(), ScheduleError>;

    /// Returns whether an alarm with that name existed.
    async fn clear(&self, name: &str) -> Result<bool, ScheduleError>;

    async fn get_all(&self) -> Result<Vec<Alarm>, ScheduleError>;
}

pub struct ExtensionBackend {
    alarms: Arc<dyn AlarmApi>,
    clock: Arc<dyn Clock>,
}

impl ExtensionBackend {
    pub fn new(alarms: Arc<dyn AlarmApi>, clock: Arc<dyn Clock>) -> Self {
        Self { alarms, clock }
    }
}

#[async_trait]
impl SchedulerBackend for ExtensionBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Extension
    }

    async fn schedule(&self, reminder: &Reminder, timing: &Timing) -> Result<(), ScheduleError> {
        let name = alarm_name(&reminder.id);
        let next = next_trigger(timing, &self.clock.now());

        self.alarms.clear(&name).await?;
        self.alarms
            .create(
                &name,
                AlarmInfo {
                    when_ms: next.timestamp_millis(),
                    period_in_minutes: timing.period_minutes(),
                },
            )
            .await?;

        log::info!("Extension alarm {} set for {}", name, next);
        Ok(())
    }

    async fn cancel(&self, reminder_id: &str) -> Result<(), ScheduleError> {
        let name = alarm_name(reminder_id);
        if self.alarms.clear(&name).await? {
            log::debug!("Extension alarm {} cleared", name);
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<PendingNotification>, ScheduleError> {
        Ok(self
            .alarms
            .get_all()
            .await?
            .into_iter()
            .filter_map(|alarm| {
                let reminder_id = reminder_id_from_alarm(&alarm.name)?.to_string();
                Some(PendingNotification {
                    reminder_id,
                    next_fire_ms: Some(alarm.scheduled_time_ms),
                    repeat: Repeat::Every {
                        minutes: alarm.period_in_minutes.unwrap_or_default(),
                    },
                })
            })
            .collect())
    }
}
