use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::acquire_write_lock;
use crate::error::{StoreError, WirdError};
use crate::period::Clock;
use crate::storage::{load_or_default, save, Storage, BOOKMARKS_KEY};
use crate::types::{Bookmark, VerseKey};

pub type Bookmarks = BTreeMap<String, Bookmark>;

/// One bookmark per reminder, overwritten on every save.
pub struct BookmarkStore {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl BookmarkStore {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock, write_lock: Mutex::new(()) }
    }

    pub async fn all(&self) -> Result<Bookmarks, StoreError> {
        load_or_default(self.storage.as_ref(), BOOKMARKS_KEY).await
    }

    pub async fn get(&self, reminder_id: &str) -> Result<Option<Bookmark>, StoreError> {
        Ok(self.all().await?.remove(reminder_id))
    }

    pub async fn save(
        &self,
        reminder_id: &str,
        verse_key: &str,
        word_position: u32,
    ) -> Result<Bookmark, WirdError> {
        let verse_key = VerseKey::parse(verse_key)?;
        let bookmark = Bookmark {
            verse_key: verse_key.to_string(),
            word_position,
            timestamp: self.clock.now_ms(),
        };

        let _guard = acquire_write_lock(&self.write_lock, "bookmarks").await?;
        let mut bookmarks = self.all().await?;
        bookmarks.insert(reminder_id.to_string(), bookmark.clone());
        save(self.storage.as_ref(), BOOKMARKS_KEY, &bookmarks).await?;
        log::debug!("Bookmark for {} set at {} word {}", reminder_id, verse_key, word_position);
        Ok(bookmark)
    }

    pub async fn remove(&self, reminder_id: &str) -> Result<bool, StoreError> {
        let _guard = acquire_write_lock(&self.write_lock, "bookmarks").await?;
        let mut bookmarks = self.all().await?;
        if bookmarks.remove(reminder_id).is_none() {
            return Ok(false);
        }
        save(self.storage.as_ref(), BOOKMARKS_KEY, &bookmarks).await?;
        Ok(true)
    }

    /// Tapping the bookmarked word again clears it. Returns the bookmark now in place, if any.
    pub async fn toggle(
        &self,
        reminder_id: &str,
        verse_key: &str,
        word_position: u32,
    ) -> Result<Option<Bookmark>, WirdError> {
        let normalized = VerseKey::parse(verse_key)?.to_string();
        if let Some(current) = self.get(reminder_id).await? {
            if current.verse_key == normalized && current.word_position == word_position {
                self.remove(reminder_id).await?;
                return Ok(None);
            }
        }
        Ok(Some(self.save(reminder_id, verse_key, word_position).await?))
    }
}
