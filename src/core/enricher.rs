use super::{
    models::{
        BilingualEntry,
        VocabularyRecord,
    },
    utils::strip_html,
    WordTag,
};
use crate::{
    dictionary::ArticleLookup,
    reverso::WordTagger,
    speech::SpeechSynthesizer,
};

/// Which side of a favourite is the language being learned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: &str, target: &str) -> Self {
        Self { source: source.to_string(), target: target.to_string() }
    }
}

/// Turns oriented favourites into vocabulary records. Every lookup is best effort:
/// a failure leaves its field empty and never aborts the batch.
pub struct Enricher {
    languages: LanguagePair,
    inflected_language: String,
    tagger: Box<dyn WordTagger>,
    articles: Box<dyn ArticleLookup>,
    speech: Option<Box<dyn SpeechSynthesizer>>,
}

impl Enricher {
    pub fn new(
        languages: LanguagePair,
        inflected_language: &str,
        tagger: Box<dyn WordTagger>,
        articles: Box<dyn ArticleLookup>,
        speech: Option<Box<dyn SpeechSynthesizer>>,
    ) -> Self {
        let inflected_language = inflected_language.to_string();
        Self { languages, inflected_language, tagger, articles, speech }
    }

    pub fn languages(&self) -> &LanguagePair {
        &self.languages
    }

    #[cfg(test)]
    fn audio_enabled(&self) -> bool {
        self.speech.is_some()
    }

    pub fn enrich(&mut self, entry: &BilingualEntry) -> VocabularyRecord {
        let source_sentence = strip_html(&entry.source_context);
        let target_sentence = strip_html(&entry.target_context);

        let tag = self.word_tag(&entry.source_word, &entry.target_word);

        let source_word = match tag {
            Some(WordTag::Noun) if self.languages.source == self.inflected_language => {
                self.with_article(&entry.source_word)
            }
            _ => entry.source_word.clone(),
        };

        let audio = self.sentence_audio(&source_sentence);

        VocabularyRecord::builder(source_word, entry.target_word.clone())
            .sentences(source_sentence, target_sentence)
            .audio(audio)
            .tag(tag)
            .build()
    }

    fn word_tag(&self, source_word: &str, target_word: &str) -> Option<WordTag> {
        match self.tagger.tag(source_word, target_word) {
            Ok(tag) => tag,
            Err(e) => {
                log::warn!("Tagging {} failed: {}", source_word, e);
                None
            }
        }
    }

    fn with_article(&self, noun: &str) -> String {
        match self.articles.noun_forms(noun) {
            Ok(Some(forms)) => forms.compose(noun),
            Ok(None) => {
                log::warn!("No article found for {}", noun);
                noun.to_string()
            }
            Err(e) => {
                log::warn!("Article lookup for {} failed: {}", noun, e);
                noun.to_string()
            }
        }
    }

    fn sentence_audio(&mut self, sentence: &str) -> Option<String> {
        let speech = self.speech.as_mut()?;
        if sentence.is_empty() {
            return None;
        }
        speech.synthesize(sentence, &self.languages.source)
    }
}
