use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::error::WirdError;
use crate::storage::{load, save, Storage, SURAH_METADATA_KEY};

pub const DEFAULT_QURAN_API: &str = "https://api.quran.com/api/v4";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: u16,
    pub verses_count: u16,
    #[serde(default)]
    pub name_simple: String,
    #[serde(default)]
    pub name_arabic: String,
}

#[derive(Debug, Deserialize)]
struct ChaptersResponse {
    chapters: Vec<Chapter>,
}

/// Chapter lengths used to bound ayah ranges.
#[async_trait]
pub trait ChapterIndex: Send + Sync {
    /// `None` when the surah is unknown to the index.
    async fn verses_count(&self, surah_id: u16) -> Result<Option<u16>, WirdError>;
}

/// Chapter list from the Quran.com API, cached in storage after the first fetch.
pub struct QuranApiClient {
    http: reqwest::Client,
    base_url: String,
    storage: Arc<dyn Storage>,
    chapters: OnceCell<Vec<Chapter>>,
}

impl QuranApiClient {
    pub fn new(base_url: impl Into<String>, storage: Arc<dyn Storage>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            storage,
            chapters: OnceCell::new(),
        }
    }

    pub async fn chapters(&self) -> Result<&[Chapter], WirdError> {
        let chapters = self.chapters.get_or_try_init(|| self.load_chapters()).await?;
        Ok(chapters.as_slice())
    }

    async fn load_chapters(&self) -> Result<Vec<Chapter>, WirdError> {
        let cached = load::<Vec<Chapter>>(self.storage.as_ref(), SURAH_METADATA_KEY).await?;
        if let Some(cached) = cached {
            if !cached.is_empty() {
                log::debug!("Using {} cached chapters", cached.len());
                return Ok(cached);
            }
        }

        let url = format!("{}/chapters", self.base_url);
        log::info!("Fetching chapter metadata from {}", url);
        let response: ChaptersResponse =
            self.http.get(&url).send().await?.error_for_status()?.json().await?;

        save(self.storage.as_ref(), SURAH_METADATA_KEY, &response.chapters).await?;
        Ok(response.chapters)
    }
}

#[async_trait]
impl ChapterIndex for QuranApiClient {
    async fn verses_count(&self, surah_id: u16) -> Result<Option<u16>, WirdError> {
        Ok(self
            .chapters()
            .await?
            .iter()
            .find(|chapter| chapter.id == surah_id)
            .map(|chapter| chapter.verses_count))
    }
}
