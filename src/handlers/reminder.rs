use async_trait::async_trait;
use std::error::Error;
use std::sync::Arc;

use crate::scheduler::{NotificationContent, NotificationPermission, Notifier, TimerBackend};
use crate::state::AppState;

/// Terminal stand-in for desktop notifications: prints to stdout.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn permission(&self) -> NotificationPermission {
        NotificationPermission::Granted
    }

    async fn request_permission(&self) -> NotificationPermission {
        NotificationPermission::Granted
    }

    async fn show(&self, content: &NotificationContent) {
        log::info!("Notification: {}", content.body);
        println!("🔔 {}\n   {}", content.title, content.body);
    }

    async fn alert(&self, message: &str) {
        println!("🔔 {}", message);
    }
}

/// Arm every enabled reminder on the in-process timer and deliver
/// notifications until Ctrl-C.
pub async fn run_daemon(
    state: Arc<AppState>,
    timer: Arc<TimerBackend>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let scheduled = state.reschedule_all().await?;
    timer.start().await;

    log::info!("Reminder daemon running with {} scheduled reminders", scheduled);
    println!("Watching {} reminders. Press Ctrl-C to stop.", scheduled);
    for alarm in timer.alarms().await {
        log::debug!("{} next fires at {}", alarm.id, alarm.next_time_ms);
    }

    let result = tokio::signal::ctrl_c().await;
    timer.stop().await;
    log::info!("Reminder daemon stopped");
    result?;
    Ok(())
}
