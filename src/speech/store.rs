use std::{
    fs::{
        self,
        OpenOptions,
    },
    io::{
        ErrorKind,
        Write,
    },
    path::{
        Path,
        PathBuf,
    },
};

use uuid::Uuid;

use crate::core::Favs2AnkiError;

/// Directory of synthesized audio. Files are written once and never replaced.
#[derive(Debug, Clone)]
pub struct AudioStore {
    dir: PathBuf,
}

impl AudioStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn new_file_name() -> String {
        format!("azure-{}.mp3", Uuid::new_v4())
    }

    /// Writes `bytes` under a fresh unique name.
    pub fn save(&self, bytes: &[u8]) -> Result<Option<String>, Favs2AnkiError> {
        self.save_as(&Self::new_file_name(), bytes)
    }

    /// Writes `bytes` as `name`. An existing file with that name is left alone and
    /// `None` is returned.
    pub fn save_as(&self, name: &str, bytes: &[u8]) -> Result<Option<String>, Favs2AnkiError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                log::warn!("Audio file {} already exists, not overwriting", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        file.write_all(bytes)?;
        file.flush()?;
        log::debug!("Saved {} bytes of audio to {}", bytes.len(), path.display());
        Ok(Some(name.to_string()))
    }
}
