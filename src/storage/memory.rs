use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use super::{Record, Storage};
use crate::error::StoreError;

/// Process-local storage. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStorage {
    document: Mutex<Record>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: Record) -> Self {
        Self { document: Mutex::new(record) }
    }

    pub async fn snapshot(&self) -> Record {
        self.document.lock().await.clone()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.document.lock().await.get(key).cloned())
    }

    async fn get_many(&self, keys: &[&str]) -> Result<Record, StoreError> {
        let document = self.document.lock().await;
        Ok(keys
            .iter()
            .filter_map(|key| document.get(*key).map(|value| (key.to_string(), value.clone())))
            .collect())
    }

    async fn set(&self, items: Record) -> Result<(), StoreError> {
        self.document.lock().await.extend(items);
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut document = self.document.lock().await;
        for key in keys {
            document.remove(*key);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.document.lock().await.clear();
        Ok(())
    }
}
