//! Reference injection and the ensemble generator.
//!
//! Outputs of several reference models are folded into a system instruction
//! asking the aggregator model to synthesize one answer from them.

use std::borrow::Cow;

use super::message::{Message, Role, SamplingParams};
use super::provider::{CompletionProvider, CompletionStream};

/// Instruction that precedes the numbered reference responses.
pub const AGGREGATION_INSTRUCTION: &str = "Your task is to synthesize the responses from \
several reference models into a single, complete, high-quality answer. Critically evaluate the \
accuracy and relevance of each response. Your answer must be coherent, clear and fully \
informative. Reply in complete paragraphs, with detailed explanations and concrete examples.

Responses from models:";

/// Build the aggregation instruction with each reference numbered from 1.
pub fn compose_reference_instruction(references: &[String]) -> String {
    let mut system = AGGREGATION_INSTRUCTION.to_string();
    for (i, reference) in references.iter().enumerate() {
        system.push_str(&format!("\n{}. {}", i + 1, reference));
    }
    system
}

/// Return a copy of `messages` carrying the references in its system turn.
///
/// A leading system turn gets the composed instruction appended after a
/// blank line; otherwise a new system turn is inserted at the front.
pub fn inject_references(messages: &[Message], references: &[String]) -> Vec<Message> {
    let system = compose_reference_instruction(references);
    let mut injected = messages.to_vec();

    match injected.first_mut() {
        Some(first) if first.role == Role::System => {
            first.content.push_str("\n\n");
            first.content.push_str(&system);
        }
        _ => injected.insert(0, Message::system(system)),
    }

    injected
}

fn with_references<'a>(messages: &'a [Message], references: &[String]) -> Cow<'a, [Message]> {
    if references.is_empty() {
        Cow::Borrowed(messages)
    } else {
        Cow::Owned(inject_references(messages, references))
    }
}

/// Generate with context from other models' outputs.
///
/// With no references this is exactly `provider.complete(model, messages, params)`.
pub async fn generate_with_references<P>(
    provider: &P,
    model: &str,
    messages: &[Message],
    references: &[String],
    params: &SamplingParams,
) -> Option<String>
where
    P: CompletionProvider + ?Sized,
{
    let messages = with_references(messages, references);
    provider.complete(model, &messages, params).await
}

/// Streaming counterpart of [`generate_with_references`].
pub fn stream_with_references<P>(
    provider: &P,
    model: &str,
    messages: &[Message],
    references: &[String],
    params: &SamplingParams,
) -> CompletionStream
where
    P: CompletionProvider + ?Sized,
{
    let messages = with_references(messages, references);
    provider.stream(model, &messages, params)
}
