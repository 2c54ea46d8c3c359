use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::acquire_write_lock;
use crate::error::{StoreError, ValidationError, WirdError};
use crate::period::Clock;
use crate::storage::{load_or_default, save, Storage, REFLECTIONS_KEY};
use crate::types::{Reflection, SURAH_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Most recently updated first.
    #[default]
    Date,
    /// Surah, then ayah, ascending.
    Surah,
}

/// Notes attached to a single ayah. At most one per `(surah, ayah)`.
pub struct ReflectionStore {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl ReflectionStore {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock, write_lock: Mutex::new(()) }
    }

    pub async fn all(&self) -> Result<Vec<Reflection>, StoreError> {
        load_or_default(self.storage.as_ref(), REFLECTIONS_KEY).await
    }

    pub async fn get_by_ayah(
        &self,
        surah: u16,
        ayah: u16,
    ) -> Result<Option<Reflection>, StoreError> {
        Ok(self.all().await?.into_iter().find(|r| r.surah == surah && r.ayah == ayah))
    }

    /// Create or update the reflection for `(surah, ayah)`.
    pub async fn save(&self, surah: u16, ayah: u16, text: &str) -> Result<Reflection, WirdError> {
        if surah == 0 || surah > SURAH_COUNT {
            return Err(ValidationError::Surah(surah).into());
        }
        if ayah == 0 {
            return Err(ValidationError::VerseKey(format!("{}:{}", surah, ayah)).into());
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyField("text").into());
        }

        let now = self.clock.now();
        let now_utc = now.with_timezone(&Utc);

        let _guard = acquire_write_lock(&self.write_lock, "reflections").await?;
        let mut all = self.all().await?;
        let saved = match all.iter_mut().find(|r| r.surah == surah && r.ayah == ayah) {
            Some(existing) => {
                existing.text = text.to_string();
                existing.updated_at = now_utc;
                existing.clone()
            }
            None => {
                let created = Reflection {
                    id: format!("ref_{}_{}_{}", now.timestamp_millis(), surah, ayah),
                    surah,
                    ayah,
                    text: text.to_string(),
                    created_at: now_utc,
                    updated_at: now_utc,
                };
                all.push(created.clone());
                created
            }
        };

        save(self.storage.as_ref(), REFLECTIONS_KEY, &all).await?;
        log::debug!("Saved reflection {} on {}:{}", saved.id, surah, ayah);
        Ok(saved)
    }

    pub async fn delete(&self, surah: u16, ayah: u16) -> Result<bool, StoreError> {
        let _guard = acquire_write_lock(&self.write_lock, "reflections").await?;
        let mut all = self.all().await?;
        let before = all.len();
        all.retain(|r| !(r.surah == surah && r.ayah == ayah));
        if all.len() == before {
            return Ok(false);
        }
        save(self.storage.as_ref(), REFLECTIONS_KEY, &all).await?;
        Ok(true)
    }
}

/// Case-insensitive search over the text and the `سورة <n>` label.
pub fn filter_reflections<'a>(reflections: &'a [Reflection], query: &str) -> Vec<&'a Reflection> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return reflections.iter().collect();
    }
    reflections
        .iter()
        .filter(|r| {
            r.text.to_lowercase().contains(&query) || format!("سورة {}", r.surah).contains(&query)
        })
        .collect()
}

pub fn sort_reflections(reflections: &[Reflection], by: SortBy) -> Vec<Reflection> {
    let mut sorted = reflections.to_vec();
    match by {
        SortBy::Date => sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
        SortBy::Surah => sorted.sort_by_key(|r| (r.surah, r.ayah)),
    }
    sorted
}
