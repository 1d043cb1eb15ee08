//! moa - glue for mixture-of-agents style generation.
//!
//! # Overview
//!
//! moa calls chat-completion APIs (Groq over plain HTTP, OpenAI through its
//! SDK) under a shared retry policy, folds the outputs of several reference
//! models into one aggregation prompt, and queries Google Custom Search for
//! context snippets.

pub mod config;
pub mod error;
pub mod llm;
pub mod search;

// Re-export commonly used types
pub use error::{CompletionError, SearchError};
pub use llm::{
    CompletionProvider, CompletionStream, GroqProvider, Message, OpenAiProvider, ProviderKind,
    Role, SamplingParams,
};
pub use search::{GoogleSearchClient, extract_full_texts, extract_snippets, google_search};
