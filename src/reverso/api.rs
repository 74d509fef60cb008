use reqwest::blocking::Client;
use serde::{
    Deserialize,
    Serialize,
};

use crate::core::{
    http::{
        ensure_success,
        join_url,
    },
    models::RawFavoriteEntry,
    Favs2AnkiError,
    WordTag,
};

const FAVOURITES_PATH: &str = "bst-web-user/user/favourites/shared";
const QUERY_PATH: &str = "bst-query-service";
// Newest first.
const FAVOURITES_ORDER: u32 = 10;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesPage {
    #[serde(default)]
    pub results: Vec<RawFavoriteEntry>,
    #[serde(default)]
    pub num_total_results: usize,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    source_lang: &'a str,
    source_text: &'a str,
    target_lang: &'a str,
    target_text: &'a str,
    mode: u32,
    npage: u32,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    dictionary_entry_list: Vec<DictionaryEntry>,
}

#[derive(Debug, Deserialize)]
struct DictionaryEntry {
    #[serde(default)]
    pos: Option<String>,
}

/// Client for the favourites listing and the query service of Reverso Context.
#[derive(Clone)]
pub struct ReversoClient {
    client: Client,
    base_url: String,
    source_lang: String,
    target_lang: String,
}

impl ReversoClient {
    pub fn new(client: Client, base_url: &str, source_lang: &str, target_lang: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
        }
    }

    pub fn get_favorites(
        &self,
        username: &str,
        start: usize,
        length: usize,
    ) -> Result<FavoritesPage, Favs2AnkiError> {
        let url = join_url(&self.base_url, FAVOURITES_PATH);
        log::debug!("GET {} (user {}, start {}, length {})", url, username, start, length);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("userName", username.to_string()),
                ("start", start.to_string()),
                ("length", length.to_string()),
                ("order", FAVOURITES_ORDER.to_string()),
            ])
            .send()?;

        let page: FavoritesPage = ensure_success(resp)?.json()?;
        Ok(page)
    }

    pub fn get_word_tag(
        &self,
        source_word: &str,
        target_word: &str,
    ) -> Result<Option<WordTag>, Favs2AnkiError> {
        let body = QueryRequest {
            source_lang: &self.source_lang,
            source_text: source_word,
            target_lang: &self.target_lang,
            target_text: target_word,
            mode: 0,
            npage: 1,
        };

        let resp = self.client.post(join_url(&self.base_url, QUERY_PATH)).json(&body).send()?;
        let response: QueryResponse = ensure_success(resp)?.json()?;

        let pos = response.dictionary_entry_list.into_iter().next().and_then(|entry| entry.pos);
        Ok(match pos {
            Some(pos) => {
                let tag = WordTag::from_pos(&pos);
                if tag.is_none() {
                    log::debug!("Untagged part of speech {:?} for {}", pos, source_word);
                }
                tag
            }
            None => None,
        })
    }
}
