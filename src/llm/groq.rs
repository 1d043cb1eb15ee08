//! Groq chat completions over plain HTTP.
//!
//! Posts to the OpenAI-compatible `/chat/completions` endpoint and parses the
//! JSON body by hand. The body is inspected whatever the HTTP status: an
//! `error` object with type `invalid_request_error` means the input did not
//! fit and is never retried, anything else that is not a usable choice is.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::{self, GROQ_BASE_URL};
use crate::error::CompletionError;

use super::message::{Message, SamplingParams, last_turn_preview, preview};
use super::provider::{CompletionProvider, CompletionStream, ProviderKind};
use super::retry::retry_with_backoff;
use super::streaming::{OpenAiEndpoint, stream_completion};

const INVALID_REQUEST_ERROR: &str = "invalid_request_error";

/// Request body for the chat completions endpoint.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: &'a [Message],
}

/// The parts of a completion response we read.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    error: Option<ApiErrorBody>,
    #[serde(default)]
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Direct-HTTP provider for Groq's OpenAI-compatible API.
#[derive(Debug, Clone)]
pub struct GroqProvider {
    http: reqwest::Client,
    base_url: String,
}

impl GroqProvider {
    pub fn new() -> Self {
        Self::with_base_url(GROQ_BASE_URL)
    }

    /// Point the provider at another OpenAI-compatible base URL (ending in `/v1`).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Single request/parse attempt.
    async fn try_once(
        &self,
        api_key: &str,
        model: &str,
        messages: &[Message],
        params: &SamplingParams,
    ) -> Result<String, CompletionError> {
        if config::debug_enabled() {
            debug!(
                "Sending messages ({}) (last message: `{}...`) to `{}`.",
                messages.len(),
                last_turn_preview(messages),
                model
            );
        }

        let body = ChatRequest {
            model,
            max_tokens: params.max_tokens,
            temperature: params.effective_temperature(),
            messages,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(CompletionError::Http)?;

        let text = response.text().await.map_err(CompletionError::Http)?;

        parse_chat_response(&text)
    }
}

impl Default for GroqProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionProvider for GroqProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Groq
    }

    async fn try_complete(
        &self,
        model: &str,
        messages: &[Message],
        params: &SamplingParams,
    ) -> Result<String, CompletionError> {
        let var = self.kind().credential_var();
        let Some(api_key) = config::credential(var) else {
            return Err(CompletionError::MissingCredential { var });
        };
        let api_key = api_key.as_str();

        let output = retry_with_backoff(
            || async {
                let result = self.try_once(api_key, model, messages, params).await;
                if result.is_err() && config::debug_enabled() {
                    debug!("Msgs: `{:?}`", messages);
                }
                result
            },
            CompletionError::is_fatal,
            |e| CompletionError::RetriesExhausted(Box::new(e)),
        )
        .await?;

        let output = output.trim().to_string();

        if config::debug_enabled() {
            debug!("Output: `{}...`.", preview(&output));
        }

        Ok(output)
    }

    fn stream(
        &self,
        model: &str,
        messages: &[Message],
        params: &SamplingParams,
    ) -> CompletionStream {
        let endpoint = OpenAiEndpoint {
            base_url: self.base_url.clone(),
            credential_var: self.kind().credential_var(),
        };
        stream_completion(endpoint, model, messages, params)
    }
}

/// Interpret a chat completions response body.
///
/// Returns the untrimmed content of the first choice.
fn parse_chat_response(body: &str) -> Result<String, CompletionError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| CompletionError::InvalidResponse(format!("{}: {}", e, body)))?;

    if let Some(api_error) = parsed.error {
        error!("{}", body);
        let kind = api_error.kind.unwrap_or_default();
        let message = api_error.message.unwrap_or_default();
        if kind == INVALID_REQUEST_ERROR {
            info!("Input + output is longer than max_position_id.");
            return Err(CompletionError::InvalidRequest(message));
        }
        return Err(CompletionError::Provider { kind, message });
    }

    let choice = parsed
        .choices
        .and_then(|choices| choices.into_iter().next())
        .ok_or_else(|| CompletionError::InvalidResponse("response has no choices".to_string()))?;

    choice.message.content.ok_or(CompletionError::NoContent)
}
