//! Key-value persistence behind every store.
//!
//! Each collection (`user_reminders`, `read_history`, ...) is one JSON value
//! rewritten wholesale on every mutation. Adapters make no transactional
//! promise across keys, but a single `set` call writes all of its entries
//! together.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::StoreError;

mod file;
mod memory;
pub use file::*;
pub use memory::*;

pub const USER_REMINDERS_KEY: &str = "user_reminders";
pub const READ_HISTORY_KEY: &str = "read_history";
pub const BOOKMARKS_KEY: &str = "bookmarks";
pub const REFLECTIONS_KEY: &str = "quran_reflections";
pub const NOTIFICATION_ID_MAPPINGS_KEY: &str = "notification_id_mappings";
pub const SURAH_METADATA_KEY: &str = "surah_metadata";

pub type Record = Map<String, Value>;

#[async_trait]
pub trait Storage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Values for the requested keys; absent keys are left out of the record.
    async fn get_many(&self, keys: &[&str]) -> Result<Record, StoreError>;

    async fn set(&self, items: Record) -> Result<(), StoreError>;

    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;
}

/// Typed read. An absent key (or an explicit `null`) reads as `None`.
pub async fn load<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match storage.get(key).await? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| {
                log::error!("Stored value under '{}' failed to decode: {}", key, e);
                StoreError::Corrupt(key.to_string())
            }),
    }
}

pub async fn load_or_default<T: DeserializeOwned + Default>(
    storage: &dyn Storage,
    key: &str,
) -> Result<T, StoreError> {
    Ok(load(storage, key).await?.unwrap_or_default())
}

pub async fn save<T: Serialize + ?Sized>(
    storage: &dyn Storage,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let mut items = Record::new();
    items.insert(key.to_string(), serde_json::to_value(value)?);
    storage.set(items).await
}
