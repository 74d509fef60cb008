use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use genanki_rs::{
    Deck,
    Model,
    Note,
    Package,
};
use rand::seq::SliceRandom;
use uuid::Uuid;

use super::model::vocabulary_model;
use crate::core::{
    Favs2AnkiError,
    LanguagePair,
    VocabularyRecord,
};

pub const DECK_ID: i64 = 1613951331974;

/// A record laid out as note fields, with the audio file to bundle if any.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedNote {
    pub fields: [String; 6],
    pub tag: Option<String>,
    pub media: Option<PathBuf>,
}

/// Note identity, derived from the first field (the source word) alone.
pub fn note_guid(first_field: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, first_field.as_bytes()).simple().to_string()
}

/// Builds `.apkg` packages out of synced records.
pub struct DeckBuilder {
    deck_id: i64,
    deck_name: String,
    model: Model,
    audio_dir: PathBuf,
}

impl DeckBuilder {
    pub fn new(
        languages: &LanguagePair,
        deck_id: i64,
        deck_name: &str,
        model_id: i64,
        audio_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            deck_id,
            deck_name: deck_name.to_string(),
            model: vocabulary_model(languages, model_id),
            audio_dir: audio_dir.into(),
        }
    }

    pub fn prepare(&self, record: &VocabularyRecord) -> PreparedNote {
        let (audio_field, media) = match record.audio.as_str() {
            "" => (String::new(), None),
            name => {
                let path = self.audio_dir.join(name);
                if path.is_file() {
                    (format!("[sound:{name}]"), Some(path))
                } else {
                    log::warn!("Audio file {} is missing, note added without it", path.display());
                    (String::new(), None)
                }
            }
        };

        PreparedNote {
            fields: [
                record.source_word.clone(),
                record.source_sentence.clone(),
                audio_field,
                record.target_word.clone(),
                record.target_sentence.clone(),
                String::new(),
            ],
            tag: record.tag.map(|tag| tag.as_str().to_string()),
            media,
        }
    }

    /// Writes the records, in random order, as a package at `path` and returns
    /// the number of notes. Nothing is written for an empty batch.
    pub fn write_package(
        &self,
        records: &[VocabularyRecord],
        path: &Path,
    ) -> Result<usize, Favs2AnkiError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut notes: Vec<PreparedNote> = records.iter().map(|r| self.prepare(r)).collect();
        notes.shuffle(&mut rand::rng());

        let mut deck = Deck::new(self.deck_id, &self.deck_name, "");
        let mut media_files = Vec::new();
        for note in &notes {
            let fields: Vec<&str> = note.fields.iter().map(String::as_str).collect();
            let tags = note.tag.as_deref().map(|tag| vec![tag]);
            let guid = note_guid(&note.fields[0]);
            deck.add_note(Note::new_with_options(
                self.model.clone(),
                fields,
                None,
                tags,
                Some(&guid),
            )?);

            if let Some(media) = &note.media {
                media_files.push(media.to_string_lossy().into_owned());
            }
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let media_refs: Vec<&str> = media_files.iter().map(String::as_str).collect();
        let mut package = Package::new(vec![deck], media_refs)?;
        package.write_to_file(&path.to_string_lossy())?;

        log::info!("Wrote {} notes to {}", notes.len(), path.display());
        Ok(notes.len())
    }
}
