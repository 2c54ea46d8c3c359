//! Static catalog of suggested reminders (Al-Kahf on Friday, Al-Mulk nightly, ...).

use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use crate::error::WirdError;
use crate::types::{Frequency, Reminder, ReminderType, Target, TimeOfDay, Timing};

/// One catalog row. Empty cells mean the column does not apply.
#[derive(Debug, Deserialize)]
struct PresetRow {
    id: String,
    name: String,
    #[serde(rename = "type")]
    kind: ReminderType,
    surah_id: Option<u16>,
    start_ayah: Option<u16>,
    end_ayah: Option<u16>,
    juz_id: Option<u8>,
    frequency: Option<Frequency>,
    time: Option<String>,
    day: Option<u8>,
}

impl PresetRow {
    fn into_reminder(self) -> Result<Reminder, WirdError> {
        let missing = |column: &str| {
            WirdError::Catalog(format!("preset '{}' is missing {}", self.id, column))
        };

        let target = match self.kind {
            ReminderType::Surah => Target::Surah {
                surah_id: self.surah_id.ok_or_else(|| missing("surah_id"))?,
            },
            ReminderType::AyahRange => Target::AyahRange {
                surah_id: self.surah_id.ok_or_else(|| missing("surah_id"))?,
                start_ayah: self.start_ayah.ok_or_else(|| missing("start_ayah"))?,
                end_ayah: self.end_ayah.ok_or_else(|| missing("end_ayah"))?,
            },
            ReminderType::Juz => Target::Juz {
                juz_id: self.juz_id.ok_or_else(|| missing("juz_id"))?,
            },
        };

        let timing = match self.frequency {
            None => None,
            Some(frequency) => {
                let time: TimeOfDay = self.time.as_deref().unwrap_or("00:00").parse()?;
                Some(Timing { frequency, time, day: self.day })
            }
        };

        let reminder = Reminder::new(self.id, self.name, target, timing);
        reminder.validate()?;
        Ok(reminder)
    }
}

fn collect_rows<R: Read>(mut rdr: csv::Reader<R>) -> Result<Vec<Reminder>, WirdError> {
    let mut presets = Vec::new();
    for result in rdr.deserialize() {
        let row: PresetRow = result?;
        presets.push(row.into_reminder()?);
    }
    Ok(presets)
}

/// Parse a catalog with header
/// `id,name,type,surah_id,start_ayah,end_ayah,juz_id,frequency,time,day`.
pub fn parse_presets<R: Read>(reader: R) -> Result<Vec<Reminder>, WirdError> {
    collect_rows(csv::Reader::from_reader(reader))
}

pub fn load_presets(path: impl AsRef<Path>) -> Result<Vec<Reminder>, WirdError> {
    let presets = collect_rows(csv::Reader::from_path(path.as_ref())?)?;
    log::info!("Loaded {} presets from {}", presets.len(), path.as_ref().display());
    Ok(presets)
}

/// Presets that are not stored as enabled reminders.
pub fn inactive_presets<'a>(catalog: &'a [Reminder], stored: &[Reminder]) -> Vec<&'a Reminder> {
    catalog
        .iter()
        .filter(|preset| !stored.iter().any(|r| r.id == preset.id && r.enabled))
        .collect()
}

pub fn find_preset<'a>(catalog: &'a [Reminder], id: &str) -> Option<&'a Reminder> {
    catalog.iter().find(|preset| preset.id == id)
}
