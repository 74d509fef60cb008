use std::{
    thread,
    time::Duration,
};

use reqwest::{
    blocking::{
        Client,
        Response,
    },
    header::{
        AUTHORIZATION,
        CONTENT_TYPE,
        RETRY_AFTER,
        USER_AGENT,
    },
    StatusCode,
};

use super::{
    build_ssml,
    choose_voice,
    AudioStore,
    SpeechSynthesizer,
};
use crate::core::{
    http::ensure_success,
    Favs2AnkiError,
};

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const OUTPUT_FORMAT_HEADER: &str = "X-Microsoft-OutputFormat";
const OUTPUT_FORMAT: &str = "audio-24khz-96kbitrate-mono-mp3";
const CLIENT_NAME: &str = "favs2anki";

#[derive(Debug, Clone)]
pub struct AzureEndpoints {
    pub token_url: String,
    pub synthesis_url: String,
}

impl AzureEndpoints {
    pub fn for_region(region: &str) -> Self {
        Self {
            token_url: format!("https://{region}.api.cognitive.microsoft.com/sts/v1.0/issueToken"),
            synthesis_url: format!("https://{region}.tts.speech.microsoft.com/cognitiveservices/v1"),
        }
    }
}

/// How throttled (429) synthesis requests are retried.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    /// Used when the response carries no usable `Retry-After` header.
    pub default_delay: Duration,
    /// Upper bound on any wait, whatever the server asks for.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            default_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Wait before retrying, given the raw `Retry-After` value if any.
    pub fn delay_for(&self, retry_after: Option<&str>) -> Duration {
        retry_after
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(self.default_delay)
            .min(self.max_delay)
    }
}

/// Azure text-to-speech client.
///
/// The bearer token is requested on first use and kept for the lifetime of the
/// client. Expiry is not tracked.
pub struct AzureSpeech {
    client: Client,
    api_key: String,
    endpoints: AzureEndpoints,
    retry: RetryPolicy,
    store: AudioStore,
    access_token: Option<String>,
}

impl AzureSpeech {
    pub fn new(
        client: Client,
        api_key: &str,
        endpoints: AzureEndpoints,
        retry: RetryPolicy,
        store: AudioStore,
    ) -> Self {
        Self { client, api_key: api_key.to_string(), endpoints, retry, store, access_token: None }
    }

    #[cfg(test)]
    fn has_token(&self) -> bool {
        self.access_token.is_some()
    }

    fn access_token(&mut self) -> Result<String, Favs2AnkiError> {
        if let Some(token) = &self.access_token {
            return Ok(token.clone());
        }

        let resp = self
            .client
            .post(&self.endpoints.token_url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.api_key)
            .header(USER_AGENT, CLIENT_NAME)
            .body(Vec::new())
            .send()?;
        let token = ensure_success(resp)?.text()?.trim().to_string();

        if token.is_empty() {
            return Err(Favs2AnkiError::UnexpectedResponse("empty access token".to_string()));
        }

        log::debug!("Fetched speech access token");
        self.access_token = Some(token.clone());
        Ok(token)
    }

    fn post_ssml(&self, token: &str, body: &str) -> Result<Response, Favs2AnkiError> {
        let resp = self
            .client
            .post(&self.endpoints.synthesis_url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_TYPE, "application/ssml+xml")
            .header(OUTPUT_FORMAT_HEADER, OUTPUT_FORMAT)
            .header(USER_AGENT, CLIENT_NAME)
            .body(body.to_string())
            .send()?;
        Ok(resp)
    }

    fn retry_delay(&self, resp: &Response) -> Duration {
        let retry_after = resp.headers().get(RETRY_AFTER).and_then(|value| value.to_str().ok());
        self.retry.delay_for(retry_after)
    }

    /// Synthesizes `text` with a random voice of `language` and stores the audio.
    /// `Ok(None)` means there is nothing to store: no voice for the language, or
    /// the generated name already exists.
    pub fn synthesize_to_file(
        &mut self,
        text: &str,
        language: &str,
    ) -> Result<Option<String>, Favs2AnkiError> {
        let Some((locale, voice)) = choose_voice(language) else {
            log::warn!("No voices configured for language {:?}", language);
            return Ok(None);
        };

        let token = self.access_token()?;
        let body = build_ssml(locale, voice, text);

        let mut resp = self.post_ssml(&token, &body)?;
        let mut retries = 0;
        while resp.status() == StatusCode::TOO_MANY_REQUESTS && retries < self.retry.max_retries {
            let delay = self.retry_delay(&resp);
            log::info!("Speech service throttled, retrying in {}s", delay.as_secs());
            thread::sleep(delay);
            retries += 1;
            resp = self.post_ssml(&token, &body)?;
        }

        let bytes = ensure_success(resp)?.bytes()?;
        self.store.save(&bytes)
    }
}

impl SpeechSynthesizer for AzureSpeech {
    fn synthesize(&mut self, text: &str, language: &str) -> Option<String> {
        match self.synthesize_to_file(text, language) {
            Ok(name) => name,
            Err(e) => {
                log::warn!("Audio synthesis failed: {}", e);
                None
            }
        }
    }
}
