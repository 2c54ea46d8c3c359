use std::env;
use std::path::PathBuf;
use tokio::time::Duration;

use crate::quran::DEFAULT_QURAN_API;

pub const VAR_DATA_FILE: &str = "WIRD_DATA_FILE";
pub const VAR_PRESETS_FILE: &str = "WIRD_PRESETS_FILE";
pub const VAR_POLL_SECONDS: &str = "WIRD_POLL_SECONDS";
pub const VAR_QURAN_API: &str = "WIRD_QURAN_API";

const DEFAULT_DATA_FILE: &str = "wird_data.json";
const DEFAULT_PRESETS_FILE: &str = "presets.csv";
const DEFAULT_POLL_SECONDS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_file: PathBuf,
    pub presets_file: PathBuf,
    /// Timer backend resolution, 1-59 seconds.
    pub poll_interval: Duration,
    pub quran_api: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            presets_file: PathBuf::from(DEFAULT_PRESETS_FILE),
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECONDS),
            quran_api: DEFAULT_QURAN_API.to_string(),
        }
    }
}

impl Config {
    /// Read the `WIRD_*` variables, after loading `.env` if one exists.
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            data_file: lookup(VAR_DATA_FILE).map(PathBuf::from).unwrap_or(defaults.data_file),
            presets_file: lookup(VAR_PRESETS_FILE)
                .map(PathBuf::from)
                .unwrap_or(defaults.presets_file),
            poll_interval: lookup(VAR_POLL_SECONDS)
                .map(|raw| parse_poll_seconds(&raw))
                .unwrap_or(defaults.poll_interval),
            quran_api: lookup(VAR_QURAN_API).unwrap_or(defaults.quran_api),
        }
    }
}

fn parse_poll_seconds(raw: &str) -> Duration {
    match raw.trim().parse::<u64>() {
        Ok(secs) => Duration::from_secs(secs.clamp(1, 59)),
        Err(_) => {
            log::warn!("Invalid {} '{}', using {}s", VAR_POLL_SECONDS, raw, DEFAULT_POLL_SECONDS);
            Duration::from_secs(DEFAULT_POLL_SECONDS)
        }
    }
}
