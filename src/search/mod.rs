//! Web search and result extraction.

pub mod client;
pub mod extract;

pub use client::{DEFAULT_NUM_RESULTS, GoogleSearchClient, google_search};
pub use extract::{extract_full_texts, extract_snippets};
