use std::{
    fs::{
        self,
        File,
    },
    io::{
        BufWriter,
        Write,
    },
    path::{
        Path,
        PathBuf,
    },
};

use super::{
    csv::{
        parse_rows,
        write_row,
    },
    RecordSink,
};
use crate::core::{
    Favs2AnkiError,
    LanguagePair,
    VocabularyRecord,
    WordTag,
};

pub const RECORDS_FILE: &str = "words_list.csv";

/// CSV snapshot of the records produced by the latest sync.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
    languages: LanguagePair,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>, languages: LanguagePair) -> Self {
        Self { path: path.into(), languages }
    }

    pub fn in_dir(dir: &Path, languages: LanguagePair) -> Self {
        Self::new(dir.join(RECORDS_FILE), languages)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `de_word,es_word,de_sentence,es_sentence,de_audio,tag` for a German/Spanish pair.
    pub fn headers(&self) -> [String; 6] {
        let src = &self.languages.source;
        let trg = &self.languages.target;
        [
            format!("{src}_word"),
            format!("{trg}_word"),
            format!("{src}_sentence"),
            format!("{trg}_sentence"),
            format!("{src}_audio"),
            "tag".to_string(),
        ]
    }

    pub fn load(&self) -> Result<Vec<VocabularyRecord>, Favs2AnkiError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let text = fs::read_to_string(&self.path)?;
        let mut rows = parse_rows(&text).into_iter();
        let Some(header) = rows.next() else {
            return Ok(Vec::new());
        };
        if header.len() != 6 {
            return Err(Favs2AnkiError::Custom(format!(
                "Unexpected header in {}: {:?}",
                self.path.display(),
                header
            )));
        }

        rows.map(|row| -> Result<VocabularyRecord, Favs2AnkiError> {
            let fields: [String; 6] = row.try_into().map_err(|row: Vec<String>| {
                Favs2AnkiError::Custom(format!("Expected 6 columns, found {}", row.len()))
            })?;
            let [source_word, target_word, source_sentence, target_sentence, audio, tag] = fields;

            Ok(VocabularyRecord::builder(source_word, target_word)
                .sentences(source_sentence, target_sentence)
                .audio(Some(audio))
                .tag(WordTag::parse(&tag))
                .build())
        })
        .collect()
    }
}

impl RecordSink for RecordStore {
    fn write_snapshot(&mut self, records: &[VocabularyRecord]) -> Result<(), Favs2AnkiError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut out = BufWriter::new(File::create(&self.path)?);
        write_row(&mut out, &self.headers())?;
        for record in records {
            write_row(
                &mut out,
                &[
                    record.source_word.as_str(),
                    record.target_word.as_str(),
                    record.source_sentence.as_str(),
                    record.target_sentence.as_str(),
                    record.audio.as_str(),
                    record.tag_str(),
                ],
            )?;
        }
        out.flush()?;

        log::info!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}
