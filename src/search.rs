//! Google Custom Search adapter.
//!
//! One network call per invocation. Transport faults, decode faults, and
//! missing credentials all collapse to an empty candidate list with a log
//! line; the attempt loop treats every empty list the same way, so no
//! failure here can abort a run.

use crate::models::SearchCandidate;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

const CSE_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Collaborator seam the run controller searches through.
///
/// Implementations must not error: a failed search is an empty list.
pub trait SearchProvider {
    async fn search(&self, query: &str, result_count: u8) -> Vec<SearchCandidate>;
}

#[derive(Debug, Deserialize)]
struct CseResponse {
    items: Option<Vec<CseItem>>,
}

#[derive(Debug, Deserialize)]
struct CseItem {
    title: String,
    link: String,
    #[serde(default)]
    snippet: String,
    #[serde(rename = "displayLink", default)]
    display_link: String,
}

/// Client for the Custom Search JSON API.
///
/// Credentials are optional by design: a run without them still completes
/// its attempt budget and exits cleanly with zero successes.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    api_key: Option<String>,
    cse_id: Option<String>,
    endpoint: String,
}

impl SearchClient {
    pub fn new(http: reqwest::Client, api_key: Option<String>, cse_id: Option<String>) -> Self {
        if api_key.is_none() || cse_id.is_none() {
            error!("GOOGLE_API_KEY or GOOGLE_CSE_ID not set; all searches will return empty");
        }
        Self {
            http,
            api_key,
            cse_id,
            endpoint: CSE_ENDPOINT.to_string(),
        }
    }

    /// Override the API endpoint. Test hook.
    #[cfg(test)]
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }
}

impl SearchProvider for SearchClient {
    /// Issue one search, returning at most `result_count` candidates.
    ///
    /// Never errors: every failure path logs and returns an empty list.
    #[instrument(level = "info", skip_all, fields(query_len = query.len()))]
    async fn search(&self, query: &str, result_count: u8) -> Vec<SearchCandidate> {
        let (Some(key), Some(cx)) = (self.api_key.as_deref(), self.cse_id.as_deref()) else {
            warn!("Search skipped: credentials not configured");
            return Vec::new();
        };

        debug!(query, "Querying Custom Search");
        let t0 = Instant::now();
        let num = result_count.to_string();
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("key", key), ("cx", cx), ("q", query), ("num", num.as_str())])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, "Search request failed");
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            error!(status = %response.status(), "Search returned non-success status");
            return Vec::new();
        }

        let parsed: CseResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, "Failed to decode search response");
                return Vec::new();
            }
        };

        let candidates: Vec<SearchCandidate> = parsed
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| SearchCandidate {
                source_domain: item.display_link.trim_start_matches("www.").to_string(),
                title: item.title,
                link: item.link,
                snippet: item.snippet,
            })
            .collect();

        info!(
            count = candidates.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Search completed"
        );
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cse_response_decoding() {
        let body = r#"{
            "items": [
                {
                    "title": "Expert Systems in 1990",
                    "link": "https://aaai.org/papers/expert-1990",
                    "snippet": "A survey of expert system deployments...",
                    "displayLink": "www.aaai.org"
                },
                {
                    "title": "Untitled",
                    "link": "https://mit.edu/x"
                }
            ]
        }"#;

        let parsed: CseResponse = serde_json::from_str(body).unwrap();
        let items = parsed.items.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].display_link, "www.aaai.org");
        // Missing snippet/displayLink default to empty rather than failing.
        assert_eq!(items[1].snippet, "");
        assert_eq!(items[1].display_link, "");
    }

    #[test]
    fn test_cse_response_without_items() {
        let parsed: CseResponse = serde_json::from_str(r#"{"kind": "customsearch#search"}"#).unwrap();
        assert!(parsed.items.is_none());
    }

    #[tokio::test]
    async fn test_search_without_credentials_is_empty() {
        let client = SearchClient::new(reqwest::Client::new(), None, None);
        let results = client.search("anything", 10).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_unreachable_endpoint_is_empty() {
        let client = SearchClient::new(
            reqwest::Client::new(),
            Some("key".to_string()),
            Some("cx".to_string()),
        )
        .with_endpoint("http://127.0.0.1:1/customsearch");
        let results = client.search("anything", 10).await;
        assert!(results.is_empty());
    }
}
