use clap::Parser;
use std::error::Error;
use std::sync::Arc;

use wird_reminder::{
    command_handler, load_presets, AppState, Cli, Clock, Config, ConsoleNotifier, JsonFileStorage,
    QuranApiClient, SchedulerGateway, Storage, SystemClock, TimerBackend,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(data_file) = cli.data_file {
        config.data_file = data_file;
    }
    log::info!("Using data file {}", config.data_file.display());

    let presets = match load_presets(&config.presets_file) {
        Ok(presets) => presets,
        Err(e) => {
            log::warn!("No presets loaded from {}: {}", config.presets_file.display(), e);
            Vec::new()
        }
    };

    let storage: Arc<dyn Storage> = Arc::new(JsonFileStorage::new(config.data_file.clone()));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // A terminal session has no OS alarm service; the in-process timer is the only backend.
    let timer = Arc::new(TimerBackend::new(
        Arc::new(ConsoleNotifier),
        clock.clone(),
        config.poll_interval,
    ));
    let gateway = Arc::new(SchedulerGateway::new(timer.clone()));

    let mut state = AppState::new(storage.clone(), gateway, clock, presets);
    state
        .reminders
        .set_chapter_index(Arc::new(QuranApiClient::new(config.quran_api.clone(), storage)));

    command_handler(cli.command, Arc::new(state), timer).await
}
