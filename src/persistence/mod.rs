use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::core::{
    Favs2AnkiError,
    VocabularyRecord,
};

pub mod checkpoint;
pub mod csv;
pub mod records;

pub use checkpoint::CheckpointStore;
pub use records::RecordStore;

const APP_NAME: &str = "favs2anki";

/// Where the high-water mark of the last sync lives.
pub trait Checkpoints {
    fn load(&self) -> Result<Option<DateTime<Utc>>, Favs2AnkiError>;
    fn save(&mut self, checkpoint: &DateTime<Utc>) -> Result<(), Favs2AnkiError>;
}

/// Destination of the vocabulary records produced by a sync.
pub trait RecordSink {
    /// Replaces whatever a previous sync wrote with `records`.
    fn write_snapshot(&mut self, records: &[VocabularyRecord]) -> Result<(), Favs2AnkiError>;
}

pub fn get_app_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        let app_dir = data_dir.join(APP_NAME);
        let _ = fs::create_dir_all(&app_dir);
        app_dir
    } else {
        PathBuf::from(".")
    }
}

pub fn save_json<T: Serialize>(data: &T, path: &Path) -> Result<(), Favs2AnkiError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(data)?;
    fs::write(path, json)?;
    log::debug!("Data saved to: {}", path.display());
    Ok(())
}

pub fn load_json<T: for<'de> Deserialize<'de> + Default>(path: &Path) -> Result<T, Favs2AnkiError> {
    if !path.exists() {
        return Ok(T::default());
    }

    let json = fs::read_to_string(path)?;
    let data: T = serde_json::from_str(&json)?;
    log::debug!("Data loaded from: {}", path.display());
    Ok(data)
}

pub fn load_json_or_default<T: for<'de> Deserialize<'de> + Default>(path: &Path) -> T {
    match load_json::<T>(path) {
        Ok(data) => data,
        Err(e) => {
            log::warn!("Failed to load {}: {}. Using defaults.", path.display(), e);
            T::default()
        }
    }
}
