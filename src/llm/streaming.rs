//! Streamed completions and shared `async-openai` request building.
//!
//! Both backends speak the OpenAI chat completions protocol, so streaming
//! goes through the SDK client for either one; only the base URL and the
//! credential differ.

use std::time::Duration;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use backoff::ExponentialBackoff;
use futures_util::StreamExt;
use tracing::{debug, error};

use crate::config;
use crate::error::CompletionError;

use super::message::{Message, Role, SamplingParams, last_turn_preview};
use super::provider::CompletionStream;

/// Where and how to reach an OpenAI-compatible API.
#[derive(Debug, Clone)]
pub(crate) struct OpenAiEndpoint {
    pub base_url: String,
    pub credential_var: &'static str,
}

/// SDK backoff that gives up after the first failure.
///
/// Retries belong to `retry_with_backoff`; the SDK must send exactly one
/// request per attempt.
pub(crate) fn no_sdk_retries() -> ExponentialBackoff {
    ExponentialBackoff {
        max_elapsed_time: Some(Duration::ZERO),
        ..Default::default()
    }
}

/// Build an SDK client for one call.
pub(crate) fn openai_client(api_key: &str, base_url: &str) -> Client<OpenAIConfig> {
    let openai_config = OpenAIConfig::new()
        .with_api_key(api_key)
        .with_api_base(base_url);
    Client::with_config(openai_config).with_backoff(no_sdk_retries())
}

/// Convert a conversation turn into the SDK's message type.
fn to_openai_message(msg: &Message) -> ChatCompletionRequestMessage {
    match msg.role {
        Role::System => ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
            content: ChatCompletionRequestSystemMessageContent::Text(msg.content.clone()),
            name: None,
        }),
        Role::User => ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Text(msg.content.clone()),
            name: None,
        }),
        Role::Assistant => {
            #[allow(deprecated)]
            ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                    msg.content.clone(),
                )),
                refusal: None,
                name: None,
                audio: None,
                tool_calls: None,
                function_call: None,
            })
        }
    }
}

/// Build the SDK request carrying model, messages, max tokens and temperature.
pub(crate) fn build_request(
    model: &str,
    messages: &[Message],
    params: &SamplingParams,
    stream: bool,
) -> CreateChatCompletionRequest {
    CreateChatCompletionRequest {
        model: model.to_string(),
        messages: messages.iter().map(to_openai_message).collect(),
        max_completion_tokens: Some(params.max_tokens),
        temperature: Some(params.effective_temperature()),
        stream: stream.then_some(true),
        ..Default::default()
    }
}

/// Start a streamed completion against `endpoint`.
///
/// The returned stream yields non-empty text deltas in arrival order. A
/// missing credential, a failed connection or a broken stream arrive as a
/// single `Err` item, after which the stream ends.
pub(crate) fn stream_completion(
    endpoint: OpenAiEndpoint,
    model: &str,
    messages: &[Message],
    params: &SamplingParams,
) -> CompletionStream {
    let Some(api_key) = config::credential(endpoint.credential_var) else {
        error!("{} is not set", endpoint.credential_var);
        let err = CompletionError::MissingCredential {
            var: endpoint.credential_var,
        };
        return Box::pin(futures_util::stream::once(async move { Err(err) }));
    };

    if config::debug_enabled() {
        debug!(
            "Streaming messages ({}) (last message: `{}...`) from `{}`.",
            messages.len(),
            last_turn_preview(messages),
            model
        );
    }

    let request = build_request(model, messages, params, true);
    let client = openai_client(&api_key, &endpoint.base_url);

    Box::pin(async_stream::try_stream! {
        let mut inner = client
            .chat()
            .create_stream(request)
            .await
            .map_err(CompletionError::Sdk)?;

        while let Some(result) = inner.next().await {
            let chunk = result.map_err(|e| CompletionError::Stream(e.to_string()))?;

            for choice in chunk.choices {
                if let Some(text) = choice.delta.content
                    && !text.is_empty()
                {
                    yield text;
                }
            }
        }
    })
}

/// Drain a completion stream into one string.
pub async fn collect_stream(mut stream: CompletionStream) -> Result<String, CompletionError> {
    let mut output = String::new();
    while let Some(fragment) = stream.next().await {
        output.push_str(&fragment?);
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdk_backoff_never_retries() {
        use backoff::backoff::Backoff;

        let mut backoff = no_sdk_retries();
        std::thread::sleep(Duration::from_millis(1));
        assert!(backoff.next_backoff().is_none());
    }

    #[test]
    fn test_build_request_fields() {
        let messages = vec![
            Message::system("Be helpful"),
            Message::user("Hello"),
            Message::assistant("Hi there!"),
        ];
        let req = build_request("gpt-4o", &messages, &SamplingParams::new(1024, 0.7), false);
        assert_eq!(req.model, "gpt-4o");
        assert_eq!(req.messages.len(), 3);
        assert_eq!(req.max_completion_tokens, Some(1024));
        assert_eq!(req.temperature, Some(0.7));
        assert!(req.stream.is_none());
    }

    #[test]
    fn test_build_request_streaming_and_zero_temperature() {
        let req = build_request(
            "llama3-8b-8192",
            &[Message::user("Hello")],
            &SamplingParams::new(64, 0.0),
            true,
        );
        assert_eq!(req.stream, Some(true));
        assert_eq!(req.temperature, Some(0.0));
    }

    #[test]
    fn test_message_roles_map_to_sdk_variants() {
        assert!(matches!(
            to_openai_message(&Message::system("s")),
            ChatCompletionRequestMessage::System(_)
        ));
        assert!(matches!(
            to_openai_message(&Message::user("u")),
            ChatCompletionRequestMessage::User(_)
        ));
        assert!(matches!(
            to_openai_message(&Message::assistant("a")),
            ChatCompletionRequestMessage::Assistant(_)
        ));
    }

    #[test]
    fn test_missing_credential_yields_single_error() {
        temp_env::with_var_unset("MOA_TEST_STREAM_KEY", || {
            tokio_test::block_on(async {
                let endpoint = OpenAiEndpoint {
                    base_url: "http://127.0.0.1:9".to_string(),
                    credential_var: "MOA_TEST_STREAM_KEY",
                };
                let mut stream = stream_completion(
                    endpoint,
                    "m",
                    &[Message::user("hi")],
                    &SamplingParams::default(),
                );
                let first = stream.next().await;
                assert!(matches!(
                    first,
                    Some(Err(CompletionError::MissingCredential { var: "MOA_TEST_STREAM_KEY" }))
                ));
                assert!(stream.next().await.is_none());
            });
        });
    }

    #[test]
    fn test_collect_stream_concatenates_fragments() {
        tokio_test::block_on(async {
            let stream: CompletionStream = Box::pin(futures_util::stream::iter(vec![
                Ok("Hel".to_string()),
                Ok("lo".to_string()),
            ]));
            assert_eq!(collect_stream(stream).await.unwrap(), "Hello");
        });
    }

    #[test]
    fn test_collect_stream_stops_at_error() {
        tokio_test::block_on(async {
            let stream: CompletionStream = Box::pin(futures_util::stream::iter(vec![
                Ok("partial".to_string()),
                Err(CompletionError::Stream("connection reset".to_string())),
                Ok("never".to_string()),
            ]));
            let err = collect_stream(stream).await.unwrap_err();
            assert!(matches!(err, CompletionError::Stream(_)));
        });
    }
}
