use std::time::Duration;

use reqwest::blocking::{
    Client,
    Response,
};

use crate::core::Favs2AnkiError;

pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:87.0) Gecko/20100101 Firefox/87.0";

pub fn http_client() -> Result<Client, Favs2AnkiError> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(BROWSER_USER_AGENT)
        .build()
        .map_err(|e| Favs2AnkiError::Custom(format!("HTTP client build failed: {e}")))
}

pub fn ensure_success(resp: Response) -> Result<Response, Favs2AnkiError> {
    if !resp.status().is_success() {
        return Err(Favs2AnkiError::Http {
            status: resp.status().as_u16(),
            url: resp.url().to_string(),
        });
    }
    Ok(resp)
}

/// Joins a base URL and a path without doubling or dropping the slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
