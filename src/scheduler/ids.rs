use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::storage::{load_or_default, save, Storage, NOTIFICATION_ID_MAPPINGS_KEY};

const INT32_FOLD: u64 = 2_147_483_647;

/// Stable 32-bit notification id for a reminder id.
///
/// Numeric ids are folded directly; anything else goes through a djb2 hash
/// over UTF-16 code units with 32-bit wrapping. Collisions are possible.
pub fn numeric_id(reminder_id: &str) -> i32 {
    if let Ok(number) = reminder_id.parse::<i64>() {
        return fold(number);
    }

    let mut hash: i32 = 5381;
    for unit in reminder_id.encode_utf16() {
        hash = hash.wrapping_shl(5).wrapping_add(hash).wrapping_add(i32::from(unit));
    }
    fold(i64::from(hash))
}

fn fold(value: i64) -> i32 {
    // The remainder is below i32::MAX, so the cast is lossless.
    (value.unsigned_abs() % INT32_FOLD) as i32
}

/// Persisted `reminderId -> numericId` table used to cancel native notifications.
pub struct NotificationIdMap {
    storage: Arc<dyn Storage>,
    write_lock: Mutex<()>,
}

impl NotificationIdMap {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage, write_lock: Mutex::new(()) }
    }

    pub async fn all(&self) -> Result<BTreeMap<String, i32>, StoreError> {
        load_or_default(self.storage.as_ref(), NOTIFICATION_ID_MAPPINGS_KEY).await
    }

    pub async fn get(&self, reminder_id: &str) -> Result<Option<i32>, StoreError> {
        Ok(self.all().await?.get(reminder_id).copied())
    }

    pub async fn store(&self, reminder_id: &str, numeric: i32) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut mappings = self.all().await?;
        mappings.insert(reminder_id.to_string(), numeric);
        save(self.storage.as_ref(), NOTIFICATION_ID_MAPPINGS_KEY, &mappings).await
    }

    pub async fn remove(&self, reminder_id: &str) -> Result<Option<i32>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut mappings = self.all().await?;
        let removed = mappings.remove(reminder_id);
        if removed.is_some() {
            save(self.storage.as_ref(), NOTIFICATION_ID_MAPPINGS_KEY, &mappings).await?;
        }
        Ok(removed)
    }
}
