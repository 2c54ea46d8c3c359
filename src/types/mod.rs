use serde::{Deserialize, Deserializer, Serialize};
use chrono::{DateTime, Utc};

use crate::error::ValidationError;

mod reminder;
pub use reminder::*;

/// A completion of one reminder. `timestamp` is epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadEvent {
    #[serde(deserialize_with = "string_or_number")]
    pub reminder_id: String,
    #[serde(default)]
    pub reminder_name: String,
    pub timestamp: i64,
}

/// Last word the reader stopped at. At most one per reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub verse_key: String,
    #[serde(deserialize_with = "position_from_string_or_number")]
    pub word_position: u32,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reflection {
    pub id: String,
    pub surah: u16,
    pub ayah: u16,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `"surah:ayah"` reference into the mushaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VerseKey {
    pub surah: u16,
    pub ayah: u16,
}

impl VerseKey {
    pub fn parse(key: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::VerseKey(key.to_string());
        let (surah, ayah) = key.split_once(':').ok_or_else(invalid)?;
        let surah: u16 = surah.parse().map_err(|_| invalid())?;
        let ayah: u16 = ayah.parse().map_err(|_| invalid())?;
        if surah == 0 || surah > SURAH_COUNT || ayah == 0 {
            return Err(invalid());
        }
        Ok(Self { surah, ayah })
    }
}

impl std::fmt::Display for VerseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.surah, self.ayah)
    }
}

// Older builds and the presets catalog stored some ids as JSON numbers.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

// The browser reader keeps word positions as the DOM dataset string.
fn position_from_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPosition {
        Number(u32),
        Text(String),
    }

    match RawPosition::deserialize(deserializer)? {
        RawPosition::Number(number) => Ok(number),
        RawPosition::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid word position {:?}", text))),
    }
}
