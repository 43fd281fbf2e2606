//! Web search suggestions used to pre-fill the url of an unmatched mention.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{BRAVE_SEARCH_ENDPOINT, SUGGESTION_COUNT};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    pub url: String,
}

/// Source of url candidates for a free-text query.
///
/// Implementations never fail: any error degrades to an empty list.
#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    async fn suggest(&self, query: &str) -> Vec<Suggestion>;
}

/// Provider used when no search backend is configured.
pub struct NoSuggestions;

#[async_trait]
impl SuggestionProvider for NoSuggestions {
    async fn suggest(&self, _query: &str) -> Vec<Suggestion> {
        Vec::new()
    }
}

/// Brave web search.
pub struct BraveSearch {
    client: Client,
    endpoint: Url,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    web: Option<WebResults>,
}

#[derive(Debug, Deserialize)]
struct WebResults {
    #[serde(default)]
    results: Vec<Suggestion>,
}

impl BraveSearch {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {e}"))?;

        Ok(Self {
            client,
            endpoint: Url::parse(BRAVE_SEARCH_ENDPOINT)?,
            api_key,
        })
    }

    async fn search(&self, query: &str) -> Result<Vec<Suggestion>, reqwest::Error> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("count", &SUGGESTION_COUNT.to_string());

        let response: SearchResponse = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", &self.api_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.web.map(|web| web.results).unwrap_or_default())
    }
}

#[async_trait]
impl SuggestionProvider for BraveSearch {
    async fn suggest(&self, query: &str) -> Vec<Suggestion> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        match self.search(query).await {
            Ok(suggestions) => {
                debug!("{} suggestions for \"{query}\"", suggestions.len());
                suggestions
            }
            Err(error) => {
                warn!("Search suggestions for \"{query}\" failed: {error}");
                Vec::new()
            }
        }
    }
}
