//! Translation of model output into the user's language.

use super::groq::GroqProvider;
use super::message::{Message, SamplingParams};
use super::provider::CompletionProvider;

/// System instruction for translation requests.
pub const TRANSLATION_INSTRUCTION: &str = "Translate the following response accurately into the \
user's language, keeping technical terminology unchanged and making sure the original meaning \
and context are preserved. Make the translation clear and easy to understand. Answer in \
complete, detailed and specific paragraphs.";

/// Two-turn conversation: the fixed instruction, then the text to translate.
pub fn translation_messages(text: &str) -> Vec<Message> {
    vec![Message::system(TRANSLATION_INSTRUCTION), Message::user(text)]
}

/// Translate `text` with `model` on the given provider.
///
/// Uses the default sampling parameters. Returns `None` under the same
/// conditions as [`CompletionProvider::complete`].
pub async fn translate_with<P>(provider: &P, text: &str, model: &str) -> Option<String>
where
    P: CompletionProvider + ?Sized,
{
    provider
        .complete(model, &translation_messages(text), &SamplingParams::default())
        .await
}

/// Translate `text` with `model` on Groq.
pub async fn translate_text(text: &str, model: &str) -> Option<String> {
    translate_with(&GroqProvider::new(), text, model).await
}
