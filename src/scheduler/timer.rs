use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use super::{
    notification_content, BackendKind, NotificationContent, PendingNotification, Repeat,
    SchedulerBackend,
};
use crate::error::ScheduleError;
use crate::period::{next_trigger, Clock};
use crate::types::{Reminder, Timing};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

const MINUTE_MS: i64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPermission {
    Granted,
    Denied,
    Default,
    /// The host has no notification primitive at all.
    Unsupported,
}

/// Notification primitive of a plain page or desktop session.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn permission(&self) -> NotificationPermission;

    async fn request_permission(&self) -> NotificationPermission;

    async fn show(&self, content: &NotificationContent);

    /// Blocking fallback used when notifications are unsupported.
    async fn alert(&self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerAlarm {
    pub id: String,
    pub name: String,
    pub next_time_ms: i64,
    pub period_minutes: u32,
}

/// In-process polling scheduler.
///
/// State lives only in memory: after a restart every enabled reminder must be
/// replayed through `SchedulerGateway::reschedule_all`.
pub struct TimerBackend {
    alarms: Mutex<Vec<TimerAlarm>>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TimerBackend {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            alarms: Mutex::new(Vec::new()),
            notifier,
            clock,
            poll_interval,
            worker: Mutex::new(None),
        }
    }

    /// Spawn the polling task. Calling `start` on a running backend does nothing.
    pub async fn start(self: &Arc<Self>) {
        let mut worker = self.worker.lock().await;
        if worker.is_some() {
            return;
        }

        let backend = Arc::clone(self);
        *worker = Some(tokio::spawn(async move {
            let mut ticker = interval(backend.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                backend.tick(backend.clock.now_ms()).await;
            }
        }));
        log::info!("Timer scheduler started, polling every {:?}", self.poll_interval);
    }

    pub async fn stop(&self) {
        if let Some(handle) = self.worker.lock().await.take() {
            handle.abort();
            log::info!("Timer scheduler stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.worker.lock().await.is_some()
    }

    pub async fn alarms(&self) -> Vec<TimerAlarm> {
        self.alarms.lock().await.clone()
    }

    /// Fire every alarm due at `now_ms` once and move it past `now_ms`.
    /// Returns the ids that fired.
    pub async fn tick(&self, now_ms: i64) -> Vec<String> {
        let due: Vec<TimerAlarm> = {
            let mut alarms = self.alarms.lock().await;
            alarms
                .iter_mut()
                .filter(|alarm| now_ms >= alarm.next_time_ms)
                .map(|alarm| {
                    let fired = alarm.clone();
                    let step = i64::from(alarm.period_minutes.max(1)) * MINUTE_MS;
                    while alarm.next_time_ms <= now_ms {
                        alarm.next_time_ms += step;
                    }
                    fired
                })
                .collect()
        };

        for alarm in &due {
            self.fire(alarm).await;
        }
        due.into_iter().map(|alarm| alarm.id).collect()
    }

    async fn fire(&self, alarm: &TimerAlarm) {
        let content = notification_content(Some(&alarm.name));
        match self.notifier.permission() {
            NotificationPermission::Granted => self.notifier.show(&content).await,
            NotificationPermission::Unsupported => {
                self.notifier.alert(&format!("حان وقت وردك: {}", alarm.name)).await;
            }
            NotificationPermission::Default => {
                if self.notifier.request_permission().await == NotificationPermission::Granted {
                    self.notifier.show(&content).await;
                } else {
                    log::warn!(
                        "Notification permission refused, reminder {} fired silently",
                        alarm.id
                    );
                }
            }
            NotificationPermission::Denied => {
                log::warn!("Notifications denied, reminder {} fired silently", alarm.id);
            }
        }
    }
}

#[async_trait]
impl SchedulerBackend for TimerBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Timer
    }

    async fn schedule(&self, reminder: &Reminder, timing: &Timing) -> Result<(), ScheduleError> {
        let next = next_trigger(timing, &self.clock.now());
        let mut alarms = self.alarms.lock().await;
        alarms.retain(|alarm| alarm.id != reminder.id);
        alarms.push(TimerAlarm {
            id: reminder.id.clone(),
            name: reminder.name.clone(),
            next_time_ms: next.timestamp_millis(),
            period_minutes: timing.period_minutes(),
        });
        log::info!("Timer alarm for {} set at {}", reminder.name, next);
        Ok(())
    }

    async fn cancel(&self, reminder_id: &str) -> Result<(), ScheduleError> {
        self.alarms.lock().await.retain(|alarm| alarm.id != reminder_id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<PendingNotification>, ScheduleError> {
        Ok(self
            .alarms
            .lock()
            .await
            .iter()
            .map(|alarm| PendingNotification {
                reminder_id: alarm.id.clone(),
                next_fire_ms: Some(alarm.next_time_ms),
                repeat: Repeat::Every { minutes: alarm.period_minutes },
            })
            .collect())
    }
}
