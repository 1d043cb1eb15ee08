//! Chat-completion providers, retry policy and prompt composition.

pub mod groq;
pub mod message;
pub mod openai;
pub mod provider;
pub mod references;
pub mod retry;
pub mod streaming;
pub mod translate;

pub use groq::GroqProvider;
pub use message::{Message, Role, SamplingParams};
pub use openai::OpenAiProvider;
pub use provider::{CompletionProvider, CompletionStream, ProviderKind, build_provider};
pub use references::{
    generate_with_references, inject_references, stream_with_references,
};
pub use streaming::collect_stream;
pub use translate::{translate_text, translate_with};
