//! Error types for moa modules using thiserror.

use thiserror::Error;

/// Errors from chat-completion calls.
///
/// Only the completion paths use this type. Callers of
/// [`CompletionProvider::complete`](crate::llm::CompletionProvider::complete)
/// never see it: it is logged and collapsed into `None`.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("{var} is not set")]
    MissingCredential { var: &'static str },

    #[error("Input + output is longer than the model context: {0}")]
    InvalidRequest(String),

    #[error("Provider returned a choice without content")]
    NoContent,

    #[error("Provider returned an error ({kind}): {message}")]
    Provider { kind: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Failed to parse completion response: {0}")]
    InvalidResponse(String),

    #[error("OpenAI client error: {0}")]
    Sdk(#[source] async_openai::error::OpenAIError),

    #[error("Stream failed: {0}")]
    Stream(String),

    #[error("All retry attempts failed: {0}")]
    RetriesExhausted(#[source] Box<CompletionError>),
}

impl CompletionError {
    /// Whether retrying the same request cannot help.
    ///
    /// The oversized-input rejection is the only provider error treated this
    /// way; a choice with no content at all is not retried either.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CompletionError::MissingCredential { .. }
                | CompletionError::InvalidRequest(_)
                | CompletionError::NoContent
        )
    }
}

/// Errors from the web search client.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Google API key or Custom Search Engine ID is missing. Set GOOGLE_API_KEY and GOOGLE_CSE_ID")]
    MissingCredentials,

    #[error("Search request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Search API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request_is_fatal() {
        assert!(CompletionError::InvalidRequest("too long".to_string()).is_fatal());
        assert!(CompletionError::MissingCredential { var: "GROQ_API_KEY" }.is_fatal());
    }

    #[test]
    fn test_transient_errors_are_not_fatal() {
        let provider = CompletionError::Provider {
            kind: "rate_limit_error".to_string(),
            message: "slow down".to_string(),
        };
        assert!(!provider.is_fatal());
        assert!(!CompletionError::InvalidResponse("eof".to_string()).is_fatal());
        assert!(!CompletionError::Stream("reset".to_string()).is_fatal());
    }

    #[test]
    fn test_retries_exhausted_displays_last_error() {
        let err = CompletionError::RetriesExhausted(Box::new(CompletionError::InvalidResponse(
            "missing choices".to_string(),
        )));
        assert_eq!(
            err.to_string(),
            "All retry attempts failed: Failed to parse completion response: missing choices"
        );
    }

    #[test]
    fn test_missing_credential_names_variable() {
        let err = CompletionError::MissingCredential { var: "OPENAI_API_KEY" };
        assert_eq!(err.to_string(), "OPENAI_API_KEY is not set");
    }
}
