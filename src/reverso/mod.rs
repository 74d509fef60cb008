pub mod api;

pub use api::{
    FavoritesPage,
    ReversoClient,
};

use crate::core::{
    Favs2AnkiError,
    WordTag,
};

/// Source of a user's favourites, one page at a time, newest first.
pub trait FavoritesSource {
    fn fetch_page(
        &self,
        username: &str,
        start: usize,
        length: usize,
    ) -> Result<FavoritesPage, Favs2AnkiError>;
}

/// Part-of-speech lookup for a source/target word pair.
pub trait WordTagger {
    fn tag(&self, source_word: &str, target_word: &str) -> Result<Option<WordTag>, Favs2AnkiError>;
}

impl FavoritesSource for ReversoClient {
    fn fetch_page(
        &self,
        username: &str,
        start: usize,
        length: usize,
    ) -> Result<FavoritesPage, Favs2AnkiError> {
        self.get_favorites(username, start, length)
    }
}

impl WordTagger for ReversoClient {
    fn tag(&self, source_word: &str, target_word: &str) -> Result<Option<WordTag>, Favs2AnkiError> {
        self.get_word_tag(source_word, target_word)
    }
}
