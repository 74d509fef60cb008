pub mod anki;
pub mod core;
pub mod dictionary;
pub mod persistence;
pub mod reverso;
pub mod settings;
pub mod speech;

pub use crate::{
    core::{
        Favs2AnkiError,
        SyncEngine,
        SyncReport,
    },
    settings::Settings,
};
