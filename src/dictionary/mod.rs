pub mod inflection;

pub use inflection::LeoDictionary;

use crate::core::{
    Favs2AnkiError,
    NounForms,
};

/// Resolves the grammatical article and plural of a noun.
pub trait ArticleLookup {
    fn noun_forms(&self, noun: &str) -> Result<Option<NounForms>, Favs2AnkiError>;
}

impl ArticleLookup for LeoDictionary {
    fn noun_forms(&self, noun: &str) -> Result<Option<NounForms>, Favs2AnkiError> {
        self.get_noun_forms(noun)
    }
}
