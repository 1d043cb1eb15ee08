//! The completion provider capability and provider selection.

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;
use tracing::error;

use crate::error::CompletionError;

use super::groq::GroqProvider;
use super::message::{Message, SamplingParams};
use super::openai::OpenAiProvider;

/// Incremental text fragments of a streamed completion.
///
/// Ends when the provider signals completion. An `Err` item ends the stream.
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<String, CompletionError>> + Send>>;

/// Supported completion backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProviderKind {
    /// Groq's OpenAI-compatible endpoint, called with plain HTTP.
    Groq,
    /// OpenAI, called through the SDK client.
    #[value(name = "openai")]
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Groq => "groq",
            ProviderKind::OpenAi => "openai",
        }
    }

    /// Environment variable holding this provider's credential.
    pub fn credential_var(&self) -> &'static str {
        match self {
            ProviderKind::Groq => crate::config::GROQ_API_KEY_VAR,
            ProviderKind::OpenAi => crate::config::OPENAI_API_KEY_VAR,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A chat-completion backend.
///
/// This abstraction lets the ensemble generator route through any provider,
/// and allows mocking providers in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Run one completion under the retry policy and return the trimmed text.
    async fn try_complete(
        &self,
        model: &str,
        messages: &[Message],
        params: &SamplingParams,
    ) -> Result<String, CompletionError>;

    /// Like [`try_complete`](Self::try_complete), with failures logged and
    /// collapsed into `None`.
    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
        params: &SamplingParams,
    ) -> Option<String> {
        match self.try_complete(model, messages, params).await {
            Ok(output) => Some(output),
            Err(e) => {
                error!(provider = %self.kind(), model, "Completion failed: {}", e);
                None
            }
        }
    }

    /// Start a streamed completion. Not retried.
    fn stream(&self, model: &str, messages: &[Message], params: &SamplingParams)
    -> CompletionStream;
}

/// Build the provider selected by `kind` with its default endpoint.
pub fn build_provider(kind: ProviderKind) -> Box<dyn CompletionProvider> {
    match kind {
        ProviderKind::Groq => Box::new(GroqProvider::new()),
        ProviderKind::OpenAi => Box::new(OpenAiProvider::new()),
    }
}
