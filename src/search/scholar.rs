//! Scholar search provider.
//!
//! Queries a SerpAPI-style Google Scholar JSON endpoint and reduces the
//! `organic_results` payload to papers (title, snippet as summary, link).

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{SearchError, SearchProvider, SearchResults};
use crate::models::Paper;

/// SerpAPI search endpoint.
const SCHOLAR_API_URL: &str = "https://serpapi.com/search.json";

/// Scholar-style JSON API provider.
pub struct ScholarProvider {
    api_key: String,
    client: reqwest::Client,
}

impl ScholarProvider {
    /// Create a provider.
    ///
    /// # Errors
    /// Returns `SearchError::ConfigError` if the API key is empty.
    pub fn new(api_key: String) -> SearchResults<Self> {
        if api_key.trim().is_empty() {
            return Err(SearchError::ConfigError(
                "Scholar API key must not be empty".to_string(),
            ));
        }
        Ok(Self {
            api_key,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl SearchProvider for ScholarProvider {
    async fn search(&self, topic: &str) -> SearchResults<Vec<Paper>> {
        let response = self
            .client
            .get(SCHOLAR_API_URL)
            .query(&[
                ("engine", "google_scholar"),
                ("q", topic),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::ServiceError(format!(
                "Scholar API returned {status}"
            )));
        }

        let body: ScholarResponse = response
            .json()
            .await
            .map_err(|e| SearchError::ParseError(e.to_string()))?;

        let papers = extract_papers(body);
        debug!(topic, count = papers.len(), "scholar search complete");
        Ok(papers)
    }

    fn name(&self) -> &str {
        "scholar"
    }
}

fn extract_papers(response: ScholarResponse) -> Vec<Paper> {
    response
        .organic_results
        .into_iter()
        .enumerate()
        .map(|(idx, result)| Paper {
            id: Some(idx as i64 + 1),
            title: result.title,
            summary: result.snippet.unwrap_or_default(),
            link: result.link,
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct ScholarResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    title: String,
    #[serde(default)]
    snippet: Option<String>,
    #[serde(default)]
    link: Option<String>,
}
