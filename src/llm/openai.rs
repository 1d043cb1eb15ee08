//! OpenAI chat completions through the `async-openai` SDK.

use async_openai::error::OpenAIError;
use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::config::{self, OPENAI_BASE_URL};
use crate::error::CompletionError;

use super::message::{Message, SamplingParams, last_turn_preview, preview};
use super::provider::{CompletionProvider, CompletionStream, ProviderKind};
use super::retry::retry_with_backoff;
use super::streaming::{OpenAiEndpoint, build_request, openai_client, stream_completion};

/// SDK-backed provider for the OpenAI API.
///
/// The SDK client is built per call so the credential is always read fresh
/// from the environment.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    base_url: String,
}

impl OpenAiProvider {
    pub fn new() -> Self {
        Self::with_base_url(OPENAI_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for OpenAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
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

        let client = openai_client(&api_key, &self.base_url);
        let request = build_request(model, messages, params, false);

        let output = retry_with_backoff(
            || {
                let client = &client;
                let request = request.clone();
                async move {
                    if config::debug_enabled() {
                        debug!(
                            "Sending messages ({}) (last message: `{}`) to `{}`.",
                            messages.len(),
                            last_turn_preview(messages),
                            model
                        );
                    }

                    let response = client
                        .chat()
                        .create(request)
                        .await
                        .map_err(map_openai_error)?;

                    let choice = response.choices.into_iter().next().ok_or_else(|| {
                        CompletionError::InvalidResponse("response has no choices".to_string())
                    })?;

                    choice.message.content.ok_or(CompletionError::NoContent)
                }
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

/// Map an SDK error, singling out the oversized-input rejection.
fn map_openai_error(err: OpenAIError) -> CompletionError {
    if let OpenAIError::ApiError(api_err) = &err
        && api_err.r#type.as_deref() == Some("invalid_request_error")
    {
        error!("{}", api_err.message);
        info!("Input + output is longer than max_position_id.");
        return CompletionError::InvalidRequest(api_err.message.clone());
    }
    CompletionError::Sdk(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::error::ApiError;

    fn api_error(kind: Option<&str>, message: &str) -> OpenAIError {
        OpenAIError::ApiError(ApiError {
            message: message.to_string(),
            r#type: kind.map(str::to_string),
            param: None,
            code: None,
        })
    }

    #[test]
    fn test_invalid_request_error_maps_to_fatal() {
        let err = map_openai_error(api_error(
            Some("invalid_request_error"),
            "This model's maximum context length is 8192 tokens",
        ));
        assert!(matches!(err, CompletionError::InvalidRequest(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_other_api_errors_are_retryable() {
        let err = map_openai_error(api_error(Some("server_error"), "overloaded"));
        assert!(matches!(err, CompletionError::Sdk(_)));
        assert!(!err.is_fatal());

        let err = map_openai_error(api_error(None, "unknown"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_invalid_argument_is_retryable() {
        let err = map_openai_error(OpenAIError::InvalidArgument("bad arg".to_string()));
        assert!(matches!(err, CompletionError::Sdk(_)));
    }

    #[test]
    fn test_default_base_url() {
        assert_eq!(OpenAiProvider::new().base_url(), "https://api.openai.com/v1");
        assert_eq!(
            OpenAiProvider::with_base_url("http://localhost:1234/v1/").base_url(),
            "http://localhost:1234/v1"
        );
    }
}
