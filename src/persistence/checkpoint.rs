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

use super::Checkpoints;
use crate::core::{
    utils::{
        format_timestamp,
        parse_timestamp,
    },
    Favs2AnkiError,
};

pub const CHECKPOINT_FILE: &str = "exec_date.txt";

/// Single-value marker file holding the creation date of the newest synced favourite.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(CHECKPOINT_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Checkpoints for CheckpointStore {
    /// Missing, empty and unreadable markers all mean "sync everything".
    fn load(&self) -> Result<Option<DateTime<Utc>>, Favs2AnkiError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let value = content.lines().next().unwrap_or_default().trim();
        if value.is_empty() {
            return Ok(None);
        }

        match parse_timestamp(value) {
            Ok(checkpoint) => Ok(Some(checkpoint)),
            Err(e) => {
                log::warn!("Ignoring checkpoint in {}: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    fn save(&mut self, checkpoint: &DateTime<Utc>) -> Result<(), Favs2AnkiError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let value = format_timestamp(checkpoint);
        fs::write(&self.path, &value)?;
        log::info!("Checkpoint updated: {}", value);
        Ok(())
    }
}
