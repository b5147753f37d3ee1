//! Yandex Translate v2 client.

use super::{TranslationOutcome, Translator};
use crate::config::ENV_TRANSLATE_API_KEY;
use crate::lang::Language;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::{debug, warn};

const API_URL: &str = "https://translate.api.cloud.yandex.net/translate/v2/translate";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// API key wrapper that never leaks into logs.
#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateRequest<'a> {
    texts: [&'a str; 1],
    target_language_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_language_code: Option<&'a str>,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
struct Translation {
    text: String,
}

/// Translator backed by the Yandex Translate HTTP API.
///
/// When the API key is missing the translator is functionally disabled:
/// every call is a no-op `Skipped` outcome.
pub struct YandexTranslator {
    http: Client,
    api_key: Option<ApiKey>,
    base_url: String,
}

impl YandexTranslator {
    /// Create a translator, reading the API key from
    /// `YANDEX_TRANSLATE_API_KEY`.
    pub fn from_env(http: Client) -> Self {
        let api_key = env::var(ENV_TRANSLATE_API_KEY)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .map(ApiKey);
        if api_key.is_none() {
            debug!("YANDEX_TRANSLATE_API_KEY not set, translation disabled");
        }
        Self {
            http,
            api_key,
            base_url: API_URL.to_string(),
        }
    }

    /// Whether the translator has credentials to make calls.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: Some(ApiKey("test-key".to_string())),
            base_url: base_url.to_string(),
        }
    }

    async fn request(
        &self,
        key: &ApiKey,
        text: &str,
        target: Language,
        source: Option<Language>,
    ) -> Result<String, String> {
        let request = TranslateRequest {
            texts: [text],
            target_language_code: target.code(),
            source_language_code: source.map(Language::code),
        };

        let response = self
            .http
            .post(&self.base_url)
            .header("Authorization", format!("Api-Key {}", key.0))
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("translation service returned {}", status));
        }

        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| format!("malformed response body: {}", e))?;

        body.translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| "response contained no translations".to_string())
    }
}

#[async_trait]
impl Translator for YandexTranslator {
    async fn translate(
        &self,
        text: &str,
        target: Language,
        source: Option<Language>,
    ) -> TranslationOutcome {
        if text.is_empty() {
            return TranslationOutcome::Skipped(String::new());
        }

        let Some(key) = &self.api_key else {
            return TranslationOutcome::Skipped(text.to_string());
        };

        match self.request(key, text, target, source).await {
            Ok(translated) => {
                debug!(lang = %target, "translation complete");
                TranslationOutcome::Translated(translated)
            }
            Err(reason) => {
                warn!(lang = %target, %reason, "translation failed, keeping original text");
                TranslationOutcome::Failed {
                    original: text.to_string(),
                }
            }
        }
    }
}
