//! Google Custom Search client.
//!
//! Unlike the completion paths, failures here are returned as errors for the
//! caller to propagate: there is no retry and no "no result" sentinel.

use serde_json::Value;
use tracing::debug;

use crate::config::{self, GOOGLE_API_KEY_VAR, GOOGLE_CSE_ID_VAR, GOOGLE_SEARCH_URL};
use crate::error::SearchError;

/// Number of results requested when the caller does not say.
pub const DEFAULT_NUM_RESULTS: u32 = 10;

#[derive(Debug, Clone)]
pub struct GoogleSearchClient {
    http: reqwest::Client,
    endpoint: String,
}

impl GoogleSearchClient {
    pub fn new() -> Self {
        Self::with_endpoint(GOOGLE_SEARCH_URL)
    }

    /// Use another search endpoint (full URL, not a base).
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Run one search and return the raw JSON result.
    ///
    /// # Errors
    ///
    /// - `SearchError::MissingCredentials` if `GOOGLE_API_KEY` or
    ///   `GOOGLE_CSE_ID` is unset or empty (no request is sent)
    /// - `SearchError::Status` for a non-success HTTP status
    /// - `SearchError::Request` for transport or JSON decoding failures
    pub async fn search(&self, query: &str, num_results: u32) -> Result<Value, SearchError> {
        let (Some(api_key), Some(cse_id)) = (
            config::credential(GOOGLE_API_KEY_VAR),
            config::credential(GOOGLE_CSE_ID_VAR),
        ) else {
            return Err(SearchError::MissingCredentials);
        };

        debug!(query, num_results, "Searching");

        let num = num_results.to_string();
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("key", api_key.as_str()),
                ("cx", cse_id.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(SearchError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(SearchError::Request)
    }
}

impl Default for GoogleSearchClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Search with the default Google endpoint.
pub async fn google_search(query: &str, num_results: u32) -> Result<Value, SearchError> {
    GoogleSearchClient::new().search(query, num_results).await
}
