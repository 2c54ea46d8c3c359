use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::{Record, Storage};
use crate::error::StoreError;

/// The whole key space kept as one pretty-printed JSON object on disk.
pub struct JsonFileStorage {
    path: PathBuf,
    io: Mutex<()>,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), io: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Record, StoreError> {
        if !self.path.exists() {
            return Ok(Record::new());
        }
        let json = tokio::fs::read_to_string(&self.path).await?;
        if json.trim().is_empty() {
            return Ok(Record::new());
        }
        match serde_json::from_str(&json)? {
            Value::Object(document) => Ok(document),
            _ => Err(StoreError::Corrupt(self.path.display().to_string())),
        }
    }

    async fn write_document(&self, document: &Record) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(document)?;

        // Write a sibling temp file first so a crash never leaves a truncated document.
        let temp_path = self.path.with_extension("tmp.json");
        let mut temp_file = File::create(&temp_path).await?;
        temp_file.write_all(json.as_bytes()).await?;
        temp_file.flush().await?;
        drop(temp_file);

        tokio::fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl Storage for JsonFileStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let _guard = self.io.lock().await;
        let mut document = self.read_document().await?;
        Ok(document.remove(key))
    }

    async fn get_many(&self, keys: &[&str]) -> Result<Record, StoreError> {
        let _guard = self.io.lock().await;
        let mut document = self.read_document().await?;
        Ok(keys
            .iter()
            .filter_map(|key| document.remove(*key).map(|value| (key.to_string(), value)))
            .collect())
    }

    async fn set(&self, items: Record) -> Result<(), StoreError> {
        let _guard = self.io.lock().await;
        let mut document = self.read_document().await?;
        document.extend(items);
        self.write_document(&document).await
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        let _guard = self.io.lock().await;
        let mut document = self.read_document().await?;
        for key in keys {
            document.remove(*key);
        }
        self.write_document(&document).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.io.lock().await;
        log::info!("Clearing storage file {}", self.path.display());
        self.write_document(&Record::new()).await
    }
}
