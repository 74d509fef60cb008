use std::sync::OnceLock;

use regex::Regex;
use reqwest::blocking::Client;

use crate::core::{
    http::{
        ensure_success,
        join_url,
    },
    utils::strip_html,
    Favs2AnkiError,
    NounForms,
};

static GERMAN_CELL_RE: OnceLock<Regex> = OnceLock::new();
static SAMP_RE: OnceLock<Regex> = OnceLock::new();
static SMALL_RE: OnceLock<Regex> = OnceLock::new();

const NOUN_SECTION_MARKERS: [&str; 2] = ["id=\"section-subst\"", "id='section-subst'"];

/// Noun lookups against the LEO dictionary pages.
pub struct LeoDictionary {
    client: Client,
    base_url: String,
}

impl LeoDictionary {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self { client, base_url: base_url.to_string() }
    }

    pub fn get_noun_forms(&self, noun: &str) -> Result<Option<NounForms>, Favs2AnkiError> {
        let url = join_url(&self.base_url, noun);
        log::debug!("GET {}", url);

        let resp = self.client.get(&url).send()?;
        let html = ensure_success(resp)?.text()?;
        Ok(parse_noun_forms(&html))
    }
}

/// Reads the first German entry of the noun section. The sample cell looks like
/// `<samp>das Haus <small>Häuser</small></samp>`: the first word is the article and
/// the `<small>` text is the plural.
pub fn parse_noun_forms(html: &str) -> Option<NounForms> {
    let section_start = NOUN_SECTION_MARKERS.iter().filter_map(|marker| html.find(marker)).min()?;
    let section = &html[section_start..];

    let cell_re = GERMAN_CELL_RE.get_or_init(|| {
        Regex::new(r#"(?is)<td[^>]*\blang\s*=\s*["']de["'][^>]*>(.*?)</td>"#).unwrap()
    });
    let samp_re = SAMP_RE.get_or_init(|| Regex::new(r"(?is)<samp[^>]*>(.*?)</samp>").unwrap());
    let small_re = SMALL_RE.get_or_init(|| Regex::new(r"(?is)<small[^>]*>(.*?)</small>").unwrap());

    let cell = cell_re.captures(section)?.get(1)?.as_str();
    let samp = samp_re.captures(cell)?.get(1)?.as_str();

    let article = strip_html(samp).split(' ').next().unwrap_or_default().to_string();
    if article.is_empty() {
        return None;
    }

    let plural = small_re
        .captures(samp)
        .and_then(|caps| caps.get(1))
        .map(|m| strip_html(m.as_str()))
        .unwrap_or_default();

    Some(NounForms { article, plural })
}
