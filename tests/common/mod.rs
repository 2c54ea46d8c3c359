#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use wird_reminder::*;

pub fn local(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Local> {
    Local
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .earliest()
        .expect("valid local time")
}

pub fn time(hour: u32, minute: u32) -> TimeOfDay {
    TimeOfDay::new(hour, minute).expect("valid time of day")
}

pub fn daily_reminder(id: &str, hour: u32, minute: u32) -> Reminder {
    Reminder::new(id, format!("Reminder {}", id), Target::Surah { surah_id: 67 }, Some(Timing::daily(time(hour, minute))))
}

pub fn weekly_reminder(id: &str, day: u8, hour: u32, minute: u32) -> Reminder {
    Reminder::new(id, format!("Reminder {}", id), Target::Surah { surah_id: 18 }, Some(Timing::weekly(day, time(hour, minute))))
}

/// Settable clock.
pub struct FixedClock(Mutex<DateTime<Local>>);

impl FixedClock {
    pub fn at(now: DateTime<Local>) -> Arc<Self> {
        Arc::new(Self(Mutex::new(now)))
    }

    pub fn set(&self, now: DateTime<Local>) {
        *self.0.lock().unwrap() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.0.lock().unwrap()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Schedule(String),
    Cancel(String),
}

/// Backend that records calls and keeps one pending entry per reminder.
#[derive(Default)]
pub struct RecordingBackend {
    pub calls: Mutex<Vec<Call>>,
    pub pending: Mutex<BTreeMap<String, Timing>>,
    pub fail: Mutex<bool>,
}

impl RecordingBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn pending_ids(&self) -> Vec<String> {
        self.pending.lock().unwrap().keys().cloned().collect()
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

#[async_trait]
impl SchedulerBackend for RecordingBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Timer
    }

    async fn schedule(&self, reminder: &Reminder, timing: &Timing) -> Result<(), ScheduleError> {
        self.calls.lock().unwrap().push(Call::Schedule(reminder.id.clone()));
        if *self.fail.lock().unwrap() {
            return Err(ScheduleError::Backend("boom".to_string()));
        }
        self.pending.lock().unwrap().insert(reminder.id.clone(), *timing);
        Ok(())
    }

    async fn cancel(&self, reminder_id: &str) -> Result<(), ScheduleError> {
        self.calls.lock().unwrap().push(Call::Cancel(reminder_id.to_string()));
        self.pending.lock().unwrap().remove(reminder_id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<PendingNotification>, ScheduleError> {
        Ok(self
            .pending
            .lock()
            .unwrap()
            .iter()
            .map(|(id, timing)| PendingNotification {
                reminder_id: id.clone(),
                next_fire_ms: None,
                repeat: Repeat::Every { minutes: timing.period_minutes() },
            })
            .collect())
    }
}

/// In-memory `chrome.alarms`.
#[derive(Default)]
pub struct FakeAlarms {
    pub alarms: Mutex<BTreeMap<String, AlarmInfo>>,
}

#[async_trait]
impl AlarmApi for FakeAlarms {
    async fn create(&self, name: &str, info: AlarmInfo) -> Result<(), ScheduleError> {
        self.alarms.lock().unwrap().insert(name.to_string(), info);
        Ok(())
    }

    async fn clear(&self, name: &str) -> Result<bool, ScheduleError> {
        Ok(self.alarms.lock().unwrap().remove(name).is_some())
    }

    async fn get_all(&self) -> Result<Vec<Alarm>, ScheduleError> {
        Ok(self
            .alarms
            .lock()
            .unwrap()
            .iter()
            .map(|(name, info)| Alarm {
                name: name.clone(),
                scheduled_time_ms: info.when_ms,
                period_in_minutes: Some(info.period_in_minutes),
            })
            .collect())
    }
}

/// In-memory local-notifications plugin.
pub struct FakeLocalNotifications {
    pub permission: Mutex<PermissionState>,
    pub scheduled: Mutex<BTreeMap<i32, NativeNotification>>,
}

impl FakeLocalNotifications {
    pub fn new(permission: PermissionState) -> Arc<Self> {
        Arc::new(Self {
            permission: Mutex::new(permission),
            scheduled: Mutex::new(BTreeMap::new()),
        })
    }

    pub fn ids(&self) -> Vec<i32> {
        self.scheduled.lock().unwrap().keys().copied().collect()
    }
}

#[async_trait]
impl LocalNotifications for FakeLocalNotifications {
    async fn request_permissions(&self) -> Result<PermissionState, ScheduleError> {
        Ok(*self.permission.lock().unwrap())
    }

    async fn schedule(&self, notification: NativeNotification) -> Result<(), ScheduleError> {
        self.scheduled.lock().unwrap().insert(notification.id, notification);
        Ok(())
    }

    async fn cancel(&self, ids: &[i32]) -> Result<(), ScheduleError> {
        let mut scheduled = self.scheduled.lock().unwrap();
        for id in ids {
            scheduled.remove(id);
        }
        Ok(())
    }

    async fn pending(&self) -> Result<Vec<NativeNotification>, ScheduleError> {
        Ok(self.scheduled.lock().unwrap().values().cloned().collect())
    }
}

pub struct RecordingNotifier {
    pub permission: Mutex<NotificationPermission>,
    pub grant_on_request: bool,
    pub shown: Mutex<Vec<NotificationContent>>,
    pub alerts: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new(permission: NotificationPermission) -> Arc<Self> {
        Arc::new(Self {
            permission: Mutex::new(permission),
            grant_on_request: true,
            shown: Mutex::new(Vec::new()),
            alerts: Mutex::new(Vec::new()),
        })
    }

    pub fn shown(&self) -> Vec<NotificationContent> {
        self.shown.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn permission(&self) -> NotificationPermission {
        *self.permission.lock().unwrap()
    }

    async fn request_permission(&self) -> NotificationPermission {
        let granted = if self.grant_on_request {
            NotificationPermission::Granted
        } else {
            NotificationPermission::Denied
        };
        *self.permission.lock().unwrap() = granted;
        granted
    }

    async fn show(&self, content: &NotificationContent) {
        self.shown.lock().unwrap().push(content.clone());
    }

    async fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

/// Chapter index with a handful of real verse counts.
pub struct StaticChapters;

#[async_trait]
impl ChapterIndex for StaticChapters {
    async fn verses_count(&self, surah_id: u16) -> Result<Option<u16>, WirdError> {
        Ok(match surah_id {
            1 => Some(7),
            2 => Some(286),
            18 => Some(110),
            67 => Some(30),
            _ => None,
        })
    }
}

pub struct Harness {
    pub storage: Arc<MemoryStorage>,
    pub clock: Arc<FixedClock>,
    pub backend: Arc<RecordingBackend>,
    pub state: AppState,
}

pub fn harness(now: DateTime<Local>) -> Harness {
    harness_with_presets(now, Vec::new())
}

pub fn harness_with_presets(now: DateTime<Local>, presets: Vec<Reminder>) -> Harness {
    let storage = Arc::new(MemoryStorage::new());
    let clock = FixedClock::at(now);
    let backend = RecordingBackend::new();
    let gateway = Arc::new(SchedulerGateway::new(backend.clone()));
    let state = AppState::new(storage.clone(), gateway, clock.clone(), presets);
    Harness { storage, clock, backend, state }
}
