//! Conversation turns and sampling parameters.

use serde::{Deserialize, Serialize};

/// Temperatures at or below this are sent as exactly zero.
pub const TEMPERATURE_EPSILON: f32 = 1e-4;

pub const DEFAULT_MAX_TOKENS: u32 = 2048;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Number of characters shown when logging message or output previews.
const PREVIEW_CHARS: usize = 20;

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Output length and sampling temperature for a completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl SamplingParams {
    pub fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }

    /// Temperature as sent on the wire: near-zero values become deterministic sampling.
    pub fn effective_temperature(&self) -> f32 {
        if self.temperature > TEMPERATURE_EPSILON {
            self.temperature
        } else {
            0.0
        }
    }
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE)
    }
}

/// First characters of `text`, for log lines.
pub(crate) fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}

/// Preview of the last turn of a conversation, or an empty string.
pub(crate) fn last_turn_preview(messages: &[Message]) -> String {
    messages
        .last()
        .map(|m| preview(&m.content))
        .unwrap_or_default()
}
