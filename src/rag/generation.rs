//! Answer generation through the YandexGPT completion endpoint.

use super::prompt::GroundedPrompt;
use crate::config::{ENV_GPT_API_KEY, ENV_GPT_FOLDER_ID};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::{debug, warn};

const API_URL: &str = "https://llm.api.cloud.yandex.net/foundationModels/v1/completion";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Sentinel shown when generation credentials are missing.
pub const NOT_CONFIGURED_MESSAGE: &str =
    "Answer generation is not configured. Set YANDEX_GPT_API_KEY and YANDEX_FOLDER_ID.";

/// Outcome of a generation call.
///
/// The orchestrator always receives renderable text; failures degrade to a
/// description instead of propagating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generated {
    /// The model produced an answer.
    Answer(String),
    /// Credentials are missing; no network call was made.
    NotConfigured,
    /// The call failed; carries a human-readable description.
    Failed(String),
}

impl Generated {
    /// The text to show the caller.
    pub fn into_text(self) -> String {
        match self {
            Generated::Answer(text) => text,
            Generated::NotConfigured => NOT_CONFIGURED_MESSAGE.to_string(),
            Generated::Failed(reason) => format!("Could not generate an answer: {}", reason),
        }
    }

    pub fn is_answer(&self) -> bool {
        matches!(self, Generated::Answer(_))
    }
}

/// Trait for generation backends.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Send the instruction pair to the model. Must not retry automatically.
    async fn generate(&self, prompt: &GroundedPrompt) -> Generated;
}

#[derive(Clone)]
struct Credentials {
    api_key: String,
    folder_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionRequest {
    model_uri: String,
    completion_options: CompletionOptions,
    messages: Vec<Message>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionOptions {
    stream: bool,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    text: String,
}

#[derive(Deserialize)]
struct CompletionResponse {
    result: CompletionResult,
}

#[derive(Deserialize)]
struct CompletionResult {
    alternatives: Vec<Alternative>,
}

#[derive(Deserialize)]
struct Alternative {
    message: Message,
}

/// Generation client backed by the YandexGPT HTTP API.
pub struct YandexGptClient {
    http: Client,
    credentials: Option<Credentials>,
    base_url: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl YandexGptClient {
    /// Create a client, reading credentials from `YANDEX_GPT_API_KEY` and
    /// `YANDEX_FOLDER_ID`.
    pub fn from_env(http: Client, model: &str, temperature: f64, max_tokens: u32) -> Self {
        let credentials = match (
            non_empty_env(ENV_GPT_API_KEY),
            non_empty_env(ENV_GPT_FOLDER_ID),
        ) {
            (Some(api_key), Some(folder_id)) => Some(Credentials { api_key, folder_id }),
            _ => {
                debug!("YandexGPT credentials not set, generation disabled");
                None
            }
        };

        Self {
            http,
            credentials,
            base_url: API_URL.to_string(),
            model: model.to_string(),
            temperature,
            max_tokens,
        }
    }

    /// Whether the client has credentials to make calls.
    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            credentials: Some(Credentials {
                api_key: "test-key".to_string(),
                folder_id: "test-folder".to_string(),
            }),
            base_url: base_url.to_string(),
            model: "yandexgpt-lite".to_string(),
            temperature: 0.4,
            max_tokens: 2000,
        }
    }

    async fn request(
        &self,
        creds: &Credentials,
        prompt: &GroundedPrompt,
    ) -> Result<String, String> {
        let request = CompletionRequest {
            model_uri: format!("gpt://{}/{}", creds.folder_id, self.model),
            completion_options: CompletionOptions {
                stream: false,
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            },
            messages: vec![
                Message {
                    role: "system".to_string(),
                    text: prompt.system_instruction.clone(),
                },
                Message {
                    role: "user".to_string(),
                    text: prompt.user_instruction.clone(),
                },
            ],
        };

        let response = self
            .http
            .post(&self.base_url)
            .header("Authorization", format!("Api-Key {}", creds.api_key))
            .header("x-folder-id", &creds.folder_id)
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| format!("request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("generation service returned {}", status));
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| format!("malformed response body: {}", e))?;

        body.result
            .alternatives
            .into_iter()
            .next()
            .map(|a| a.message.text)
            .ok_or_else(|| "response contained no alternatives".to_string())
    }
}

#[async_trait]
impl GenerationClient for YandexGptClient {
    async fn generate(&self, prompt: &GroundedPrompt) -> Generated {
        let Some(creds) = &self.credentials else {
            return Generated::NotConfigured;
        };

        match self.request(creds, prompt).await {
            Ok(text) => {
                debug!(model = %self.model, "generation complete");
                Generated::Answer(text)
            }
            Err(reason) => {
                warn!(%reason, "generation failed");
                Generated::Failed(reason)
            }
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
