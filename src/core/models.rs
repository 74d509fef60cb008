use std::fmt;

use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Deserializer,
    Serialize,
};

/// One favorite as returned by the remote endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFavoriteEntry {
    pub src_text: String,
    pub trg_text: String,
    pub src_lang: String,
    pub trg_lang: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub src_context: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub trg_context: String,
    pub creation_date: DateTime<Utc>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl RawFavoriteEntry {
    /// Orients the entry so that `source_lang` ends up on the source side.
    /// The remote may store the pair in either direction. `None` when neither
    /// side is in `source_lang`.
    pub fn orient(&self, source_lang: &str) -> Option<BilingualEntry> {
        if self.src_lang == source_lang {
            Some(BilingualEntry {
                source_word: self.src_text.clone(),
                target_word: self.trg_text.clone(),
                source_context: self.src_context.clone(),
                target_context: self.trg_context.clone(),
                created_at: self.creation_date,
            })
        } else if self.trg_lang == source_lang {
            Some(BilingualEntry {
                source_word: self.trg_text.clone(),
                target_word: self.src_text.clone(),
                source_context: self.trg_context.clone(),
                target_context: self.src_context.clone(),
                created_at: self.creation_date,
            })
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BilingualEntry {
    pub source_word: String,
    pub target_word: String,
    pub source_context: String, // may contain markup
    pub target_context: String, // may contain markup
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordTag {
    Adjective,
    Noun,
    Adverb,
    Verb,
    ConjunctionPreposition,
}

impl WordTag {
    /// Maps a dictionary part-of-speech abbreviation onto the closed tag set.
    /// The three noun genders collapse into `Noun`.
    pub fn from_pos(pos: &str) -> Option<Self> {
        match pos.trim() {
            "adj." => Some(WordTag::Adjective),
            "nn." | "nm." | "nf." => Some(WordTag::Noun),
            "adv." => Some(WordTag::Adverb),
            "v." => Some(WordTag::Verb),
            "conj./prep." => Some(WordTag::ConjunctionPreposition),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WordTag::Adjective => "adjective",
            WordTag::Noun => "noun",
            WordTag::Adverb => "adverb",
            WordTag::Verb => "verb",
            WordTag::ConjunctionPreposition => "conjunction/preposition",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "adjective" => Some(WordTag::Adjective),
            "noun" => Some(WordTag::Noun),
            "adverb" => Some(WordTag::Adverb),
            "verb" => Some(WordTag::Verb),
            "conjunction/preposition" => Some(WordTag::ConjunctionPreposition),
            _ => None,
        }
    }
}

impl fmt::Display for WordTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The enriched, persisted unit. Sentences are plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyRecord {
    pub source_word: String,
    pub target_word: String,
    pub source_sentence: String,
    pub target_sentence: String,
    pub audio: String, // filename inside the audio directory, or empty
    pub tag: Option<WordTag>,
}

impl VocabularyRecord {
    pub fn builder(
        source_word: impl Into<String>,
        target_word: impl Into<String>,
    ) -> VocabularyRecordBuilder {
        VocabularyRecordBuilder {
            record: VocabularyRecord {
                source_word: source_word.into(),
                target_word: target_word.into(),
                source_sentence: String::new(),
                target_sentence: String::new(),
                audio: String::new(),
                tag: None,
            },
        }
    }

    pub fn tag_str(&self) -> &str {
        self.tag.as_ref().map(WordTag::as_str).unwrap_or("")
    }
}

pub struct VocabularyRecordBuilder {
    record: VocabularyRecord,
}

impl VocabularyRecordBuilder {
    pub fn sentences(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.record.source_sentence = source.into();
        self.record.target_sentence = target.into();
        self
    }

    pub fn source_word(mut self, word: impl Into<String>) -> Self {
        self.record.source_word = word.into();
        self
    }

    pub fn audio(mut self, audio: Option<String>) -> Self {
        self.record.audio = audio.unwrap_or_default();
        self
    }

    pub fn tag(mut self, tag: Option<WordTag>) -> Self {
        self.record.tag = tag;
        self
    }

    pub fn build(self) -> VocabularyRecord {
        self.record
    }
}

/// Article and plural of a noun as reported by the inflection dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NounForms {
    pub article: String,
    pub plural: String,
}

impl NounForms {
    /// `das Haus - Häuser`, or `das Wetter` when there is no plural.
    pub fn compose(&self, noun: &str) -> String {
        if self.plural.is_empty() {
            format!("{} {}", self.article, noun)
        } else {
            format!("{} {} - {}", self.article, noun, self.plural)
        }
    }
}
