//! Environment-backed configuration.
//!
//! Nothing here is cached: credentials and the debug flag are read from the
//! process environment every time a call needs them.

use std::env;

use tracing::warn;

/// Credential for the Groq OpenAI-compatible endpoint.
pub const GROQ_API_KEY_VAR: &str = "GROQ_API_KEY";

/// Credential for the OpenAI API.
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Google Custom Search API key.
pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";

/// Google Custom Search engine identifier.
pub const GOOGLE_CSE_ID_VAR: &str = "GOOGLE_CSE_ID";

/// Integer verbosity flag; any nonzero value enables request/response previews.
pub const DEBUG_VAR: &str = "DEBUG";

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const GOOGLE_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Read a credential from the environment.
///
/// Unset, empty and non-unicode values all count as missing.
pub fn credential(var: &str) -> Option<String> {
    match env::var(var) {
        Ok(v) if !v.is_empty() => Some(v),
        _ => None,
    }
}

/// Whether verbose diagnostics are enabled.
///
/// Reads `DEBUG` as an integer. Logs a warning and returns false if the
/// variable is set but is not a number.
pub fn debug_enabled() -> bool {
    match env::var(DEBUG_VAR) {
        Ok(v) if !v.trim().is_empty() => match v.trim().parse::<i64>() {
            Ok(level) => level != 0,
            Err(_) => {
                warn!("Invalid {} value '{}', treating as 0", DEBUG_VAR, v);
                false
            }
        },
        _ => false,
    }
}
