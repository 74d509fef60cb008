pub mod enricher;
pub mod errors;
pub mod http;
pub mod models;
pub mod pipeline;
pub mod utils;

pub use enricher::{
    Enricher,
    LanguagePair,
};
pub use errors::Favs2AnkiError;
pub use models::{
    BilingualEntry,
    NounForms,
    RawFavoriteEntry,
    VocabularyRecord,
    WordTag,
};
pub use pipeline::{
    SyncEngine,
    SyncReport,
};
