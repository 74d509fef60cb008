use std::{
    path::{
        Path,
        PathBuf,
    },
    time::Duration,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    core::{
        pipeline::DEFAULT_PAGE_SIZE,
        Favs2AnkiError,
        LanguagePair,
    },
    persistence::{
        get_app_data_dir,
        load_json_or_default,
        save_json,
    },
    anki::{
        DECK_ID,
        MODEL_ID,
    },
    speech::RetryPolicy,
};

pub const SETTINGS_FILE: &str = "settings.json";
pub const AUDIO_DIR: &str = "audios";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub username: String,
    pub source_lang: String,
    pub target_lang: String,
    /// Nouns of this language get their article and plural looked up.
    pub inflected_language: String,
    pub audio: bool,
    pub page_size: usize,
    pub reverso_url: String,
    pub dictionary_url: String,
    pub azure_region: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub azure_api_key: String,
    pub retry_after_secs: u64,
    /// Cap on any `Retry-After` wait requested by the speech service.
    pub max_retry_delay_secs: u64,
    pub max_retries: u32,
    /// Write an Anki package with the new words after each sync.
    pub build_deck: bool,
    pub deck_name: String,
    pub deck_id: i64,
    pub model_id: i64,
    /// Overrides the platform data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            username: String::new(),
            source_lang: "de".to_string(),
            target_lang: "es".to_string(),
            inflected_language: "de".to_string(),
            audio: true,
            page_size: DEFAULT_PAGE_SIZE,
            reverso_url: "https://context.reverso.net/".to_string(),
            dictionary_url: "https://dict.leo.org/alemán-español/".to_string(),
            azure_region: "westeurope".to_string(),
            azure_api_key: String::new(),
            retry_after_secs: 10,
            max_retry_delay_secs: 60,
            max_retries: 1,
            build_deck: true,
            deck_name: "Deutsch".to_string(),
            deck_id: DECK_ID,
            model_id: MODEL_ID,
            data_dir: None,
        }
    }
}

impl Settings {
    pub fn default_path() -> PathBuf {
        get_app_data_dir().join(SETTINGS_FILE)
    }

    /// Settings file if present, defaults otherwise, then environment overrides.
    pub fn load(path: &Path) -> Self {
        let mut settings: Settings = load_json_or_default(path);
        settings.apply_env(|key| std::env::var(key).ok());
        settings
    }

    pub fn save(&self, path: &Path) -> Result<(), Favs2AnkiError> {
        save_json(self, path)
    }

    /// `AZURE_API_KEY` and `AZURE_REGION` take precedence over the file.
    pub fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        if let Some(key) = lookup("AZURE_API_KEY").filter(|v| !v.trim().is_empty()) {
            self.azure_api_key = key.trim().to_string();
        }
        if let Some(region) = lookup("AZURE_REGION").filter(|v| !v.trim().is_empty()) {
            self.azure_region = region.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<(), Favs2AnkiError> {
        if self.username.trim().is_empty() {
            return Err(Favs2AnkiError::Custom(
                "No username configured; pass --user or set it in settings.json".to_string(),
            ));
        }
        if self.source_lang == self.target_lang {
            return Err(Favs2AnkiError::Custom(format!(
                "Source and target language are both {:?}",
                self.source_lang
            )));
        }
        if self.build_deck && self.deck_name.trim().is_empty() {
            return Err(Favs2AnkiError::Custom("deck_name must not be empty".to_string()));
        }
        if self.page_size == 0 {
            return Err(Favs2AnkiError::Custom("page_size must be greater than 0".to_string()));
        }
        Ok(())
    }

    /// Audio needs both the flag and credentials.
    pub fn audio_enabled(&self) -> bool {
        self.audio && !self.azure_api_key.is_empty() && !self.azure_region.is_empty()
    }

    pub fn languages(&self) -> LanguagePair {
        LanguagePair::new(&self.source_lang, &self.target_lang)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(get_app_data_dir)
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.data_dir().join(AUDIO_DIR)
    }

    /// `<data dir>/<deck name>.apkg`
    pub fn package_path(&self) -> PathBuf {
        self.data_dir().join(format!("{}.apkg", self.deck_name.trim()))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            default_delay: Duration::from_secs(self.retry_after_secs),
            max_delay: Duration::from_secs(self.max_retry_delay_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, r#"{ "username": "someone", "audio": false }"#).unwrap();

        let settings: Settings = load_json_or_default(&path);
        assert_eq!(settings.username, "someone");
        assert!(!settings.audio);
        assert_eq!(settings.source_lang, "de");
        assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        let settings = Settings {
            username: "someone".to_string(),
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };

        settings.save(&path).unwrap();
        let loaded: Settings = load_json_or_default(&path);
        assert_eq!(loaded, settings);
        assert_eq!(loaded.audio_dir(), dir.path().join(AUDIO_DIR));
        assert_eq!(loaded.package_path(), dir.path().join("Deutsch.apkg"));
    }

    #[test]
    fn test_env_overrides() {
        let env = HashMap::from([
            ("AZURE_API_KEY", " key-from-env ".to_string()),
            ("AZURE_REGION", String::new()),
        ]);
        let mut settings = Settings::default();
        settings.apply_env(|key| env.get(key).cloned());

        assert_eq!(settings.azure_api_key, "key-from-env");
        assert_eq!(settings.azure_region, "westeurope");
        assert!(settings.audio_enabled());

        settings.audio = false;
        assert!(!settings.audio_enabled());
    }

    #[test]
    fn test_validate() {
        let mut settings = Settings::default();
        assert!(settings.validate().is_err());

        settings.username = "someone".to_string();
        assert!(settings.validate().is_ok());

        settings.deck_name = " ".to_string();
        assert!(settings.validate().is_err());
        settings.build_deck = false;
        assert!(settings.validate().is_ok());

        settings.target_lang = "de".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_retry_policy() {
        let settings = Settings {
            retry_after_secs: 3,
            max_retry_delay_secs: 20,
            max_retries: 2,
            ..Default::default()
        };
        let policy = settings.retry_policy();
        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.default_delay, Duration::from_secs(3));
        assert_eq!(policy.delay_for(Some("600")), Duration::from_secs(20));
    }
}
