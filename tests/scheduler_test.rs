mod common;

use common::*;
use std::sync::Arc;
use wird_reminder::*;

#[test]
fn numeric_ids_follow_djb2_over_utf16() {
    assert_eq!(numeric_id("abc"), 193_485_963);
    assert_eq!(numeric_id("custom_1"), 473_527_856);
    assert_eq!(numeric_id("سورة"), 2_145_310_618);
}

#[test]
fn numeric_reminder_ids_are_used_directly() {
    assert_eq!(numeric_id("42"), 42);
    assert_eq!(numeric_id("-42"), 42);
    assert_eq!(numeric_id("2147483648"), 1);
}

#[test]
fn alarm_names_round_trip() {
    assert_eq!(alarm_name("custom_5"), "reminder_custom_5");
    assert_eq!(reminder_id_from_alarm("reminder_custom_5"), Some("custom_5"));
    assert_eq!(reminder_id_from_alarm("reminder_"), None);
    assert_eq!(reminder_id_from_alarm("daily_sync"), None);
}

#[test]
fn notification_body_falls_back_without_name() {
    assert_eq!(notification_content(Some("سورة الملك")).body, "حان وقت قراءة: سورة الملك");
    assert_eq!(notification_content(None).body, "حان وقت وردك اليومي!");
    assert_eq!(notification_content(None).title, NOTIFICATION_TITLE);
}

#[tokio::test]
async fn gateway_schedule_is_idempotent() {
    let backend = RecordingBackend::new();
    let gateway = SchedulerGateway::new(backend.clone());
    let reminder = daily_reminder("custom_1", 5, 0);

    assert_eq!(gateway.schedule(&reminder).await, ScheduleOutcome::Scheduled);
    assert_eq!(gateway.schedule(&reminder).await, ScheduleOutcome::Scheduled);

    assert_eq!(gateway.pending().await.len(), 1);
}

#[tokio::test]
async fn gateway_disarms_disabled_and_untimed_reminders() {
    let backend = RecordingBackend::new();
    let gateway = SchedulerGateway::new(backend.clone());

    let mut disabled = daily_reminder("a", 5, 0);
    disabled.enabled = false;
    let untimed = Reminder::new("b", "Yasin", Target::Surah { surah_id: 36 }, None);

    assert_eq!(gateway.schedule(&disabled).await, ScheduleOutcome::Cancelled);
    assert_eq!(gateway.schedule(&untimed).await, ScheduleOutcome::Cancelled);
    assert_eq!(backend.calls(), vec![Call::Cancel("a".into()), Call::Cancel("b".into())]);
}

#[tokio::test]
async fn gateway_swallows_backend_failures() {
    let backend = RecordingBackend::new();
    backend.set_failing(true);
    let gateway = SchedulerGateway::new(backend.clone());

    assert_eq!(gateway.schedule(&daily_reminder("a", 5, 0)).await, ScheduleOutcome::Failed);
    assert!(backend.pending_ids().is_empty());
}

#[tokio::test]
async fn reschedule_all_only_arms_enabled_timed_reminders() {
    let backend = RecordingBackend::new();
    let gateway = SchedulerGateway::new(backend.clone());

    let mut disabled = daily_reminder("off", 5, 0);
    disabled.enabled = false;
    let reminders = vec![
        daily_reminder("one", 5, 0),
        weekly_reminder("two", 5, 9, 0),
        disabled,
        Reminder::new("untimed", "Yasin", Target::Surah { surah_id: 36 }, None),
    ];

    assert_eq!(gateway.reschedule_all(&reminders).await, 2);
    assert_eq!(backend.pending_ids(), vec!["one".to_string(), "two".to_string()]);
}

#[tokio::test]
async fn native_backend_skips_when_permission_denied() {
    let api = FakeLocalNotifications::new(PermissionState::Denied);
    let storage = Arc::new(MemoryStorage::new());
    let gateway = SchedulerGateway::new(Arc::new(NativeBackend::new(api.clone(), storage)));

    let outcome = gateway.schedule(&daily_reminder("custom_1", 5, 0)).await;

    assert_eq!(outcome, ScheduleOutcome::PermissionDenied);
    assert!(api.ids().is_empty());
}

#[tokio::test]
async fn native_backend_uses_calendar_rule_and_stable_id() {
    let api = FakeLocalNotifications::new(PermissionState::Granted);
    let storage = Arc::new(MemoryStorage::new());
    let backend = Arc::new(NativeBackend::new(api.clone(), storage));
    let gateway = SchedulerGateway::new(backend.clone());
    let reminder = weekly_reminder("custom_1", 5, 9, 30);

    gateway.schedule(&reminder).await;
    gateway.schedule(&reminder).await;

    assert_eq!(api.ids(), vec![473_527_856]);
    let pending = api.pending().await.unwrap();
    assert_eq!(
        pending[0].on,
        CalendarRule { weekday: Some(6), hour: 9, minute: 30, allow_while_idle: true }
    );
    assert_eq!(pending[0].body, "حان وقت قراءة: Reminder custom_1");
    assert_eq!(backend.id_map().get("custom_1").await.unwrap(), Some(473_527_856));
}

#[tokio::test]
async fn native_cancel_clears_notification_and_mapping() {
    let api = FakeLocalNotifications::new(PermissionState::Granted);
    let storage = Arc::new(MemoryStorage::new());
    let backend = Arc::new(NativeBackend::new(api.clone(), storage));
    let gateway = SchedulerGateway::new(backend.clone());

    gateway.schedule(&daily_reminder("custom_1", 5, 0)).await;
    assert_eq!(gateway.cancel("custom_1").await, ScheduleOutcome::Cancelled);
    assert_eq!(gateway.cancel("custom_1").await, ScheduleOutcome::Cancelled);

    assert!(api.ids().is_empty());
    assert!(backend.id_map().all().await.unwrap().is_empty());
}

#[tokio::test]
async fn extension_backend_replaces_named_alarm() {
    let alarms = Arc::new(FakeAlarms::default());
    let clock = FixedClock::at(local(2025, 3, 12, 4, 0));
    let gateway = SchedulerGateway::new(Arc::new(ExtensionBackend::new(alarms.clone(), clock)));

    gateway.schedule(&daily_reminder("custom_1", 5, 0)).await;
    gateway.schedule(&daily_reminder("custom_1", 5, 0)).await;

    let created = alarms.alarms.lock().unwrap().clone();
    assert_eq!(created.len(), 1);
    let info = created["reminder_custom_1"];
    assert_eq!(info.when_ms, local(2025, 3, 12, 5, 0).timestamp_millis());
    assert_eq!(info.period_in_minutes, DAILY_PERIOD_MINUTES);

    let pending = gateway.pending().await;
    assert_eq!(pending[0].reminder_id, "custom_1");
    assert_eq!(pending[0].repeat, Repeat::Every { minutes: 1440 });

    assert_eq!(gateway.cancel("never_scheduled").await, ScheduleOutcome::Cancelled);
}

fn timer(notifier: Arc<RecordingNotifier>, clock: Arc<FixedClock>) -> Arc<TimerBackend> {
    Arc::new(TimerBackend::new(notifier, clock, DEFAULT_POLL_INTERVAL))
}

#[tokio::test]
async fn timer_fires_once_and_advances_by_period() {
    let notifier = RecordingNotifier::new(NotificationPermission::Granted);
    let clock = FixedClock::at(local(2025, 3, 12, 4, 0));
    let backend = timer(notifier.clone(), clock);
    let gateway = SchedulerGateway::new(backend.clone());
    gateway.schedule(&daily_reminder("custom_1", 5, 0)).await;

    assert!(backend.tick(local(2025, 3, 12, 4, 59).timestamp_millis()).await.is_empty());

    let fired = backend.tick(local(2025, 3, 12, 5, 0).timestamp_millis()).await;
    assert_eq!(fired, vec!["custom_1".to_string()]);
    assert!(backend.tick(local(2025, 3, 12, 5, 0).timestamp_millis()).await.is_empty());

    // Missed days collapse into a single notification.
    let fired = backend.tick(local(2025, 3, 15, 6, 0).timestamp_millis()).await;
    assert_eq!(fired.len(), 1);
    assert_eq!(backend.alarms().await[0].next_time_ms, local(2025, 3, 16, 5, 0).timestamp_millis());

    assert_eq!(notifier.shown().len(), 2);
    assert_eq!(notifier.shown()[0].body, "حان وقت قراءة: Reminder custom_1");
}

#[tokio::test]
async fn timer_falls_back_to_alert_without_notifications() {
    let notifier = RecordingNotifier::new(NotificationPermission::Unsupported);
    let clock = FixedClock::at(local(2025, 3, 12, 4, 0));
    let backend = timer(notifier.clone(), clock);
    backend.schedule(&daily_reminder("a", 5, 0), &Timing::daily(time(5, 0))).await.unwrap();

    backend.tick(local(2025, 3, 12, 5, 0).timestamp_millis()).await;

    assert!(notifier.shown().is_empty());
    assert_eq!(notifier.alerts(), vec!["حان وقت وردك: Reminder a".to_string()]);
}

#[tokio::test]
async fn timer_requests_permission_on_first_fire() {
    let notifier = RecordingNotifier::new(NotificationPermission::Default);
    let clock = FixedClock::at(local(2025, 3, 12, 4, 0));
    let backend = timer(notifier.clone(), clock);
    backend.schedule(&daily_reminder("a", 5, 0), &Timing::daily(time(5, 0))).await.unwrap();

    backend.tick(local(2025, 3, 12, 5, 0).timestamp_millis()).await;

    assert_eq!(notifier.permission(), NotificationPermission::Granted);
    assert_eq!(notifier.shown().len(), 1);
}

#[tokio::test]
async fn timer_cancel_drops_alarm() {
    let notifier = RecordingNotifier::new(NotificationPermission::Granted);
    let clock = FixedClock::at(local(2025, 3, 12, 4, 0));
    let backend = timer(notifier.clone(), clock);
    let gateway = SchedulerGateway::new(backend.clone());

    gateway.schedule(&daily_reminder("a", 5, 0)).await;
    gateway.cancel("a").await;

    assert!(backend.alarms().await.is_empty());
    assert!(backend.tick(local(2025, 3, 13, 5, 0).timestamp_millis()).await.is_empty());
}

#[tokio::test]
async fn timer_start_and_stop() {
    let notifier = RecordingNotifier::new(NotificationPermission::Granted);
    let backend = timer(notifier, FixedClock::at(local(2025, 3, 12, 4, 0)));

    backend.start().await;
    backend.start().await;
    assert!(backend.is_running().await);

    backend.stop().await;
    assert!(!backend.is_running().await);
}
