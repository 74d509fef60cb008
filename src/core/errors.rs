use thiserror::Error;

#[derive(Error, Debug)]
pub enum Favs2AnkiError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error("Anki package error: {0}")]
    Anki(Box<genanki_rs::Error>),

    #[error("HTTP error {status} from {url}")]
    Http { status: u16, url: String },

    #[error("Invalid timestamp format: {0}")]
    InvalidTimestamp(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Favs2AnkiError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for Favs2AnkiError {
    fn from(error: std::io::Error) -> Self {
        Favs2AnkiError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for Favs2AnkiError {
    fn from(error: reqwest::Error) -> Self {
        Favs2AnkiError::Reqwest(Box::new(error))
    }
}

impl From<genanki_rs::Error> for Favs2AnkiError {
    fn from(error: genanki_rs::Error) -> Self {
        Favs2AnkiError::Anki(Box::new(error))
    }
}

impl From<chrono::ParseError> for Favs2AnkiError {
    fn from(error: chrono::ParseError) -> Self {
        Favs2AnkiError::InvalidTimestamp(error.to_string())
    }
}
