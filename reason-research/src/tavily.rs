use async_trait::async_trait;
use reason_core::ResearchError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::providers::{WebHit, WebSearchOptions, WebSearchProvider};

const TAVILY_API_BASE: &str = "https://api.tavily.com";

#[derive(Debug, Clone)]
pub struct TavilyClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
pub struct TavilySearchRequest {
    pub query: String,
    pub search_depth: String, // "basic", "advanced"
    pub max_results: u32,
    pub include_answer: bool,
}

#[derive(Debug, Deserialize)]
pub struct TavilySearchResponse {
    #[serde(default)]
    pub answer: Option<String>,
    pub results: Vec<TavilySearchResult>,
    #[serde(default)]
    pub response_time: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TavilySearchResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: Option<f64>,
}

impl TavilyClient {
    pub fn new() -> Result<Self, ResearchError> {
        let api_key = std::env::var("TAVILY_API_KEY")
            .map_err(|_| ResearchError::config("TAVILY_API_KEY environment variable not set"))?;
        Self::with_api_key(api_key)
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self, ResearchError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| ResearchError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: TAVILY_API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[instrument(skip(self))]
    pub async fn search_raw(
        &self,
        request: TavilySearchRequest,
    ) -> Result<TavilySearchResponse, ResearchError> {
        let url = format!("{}/search", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ResearchError::network(format!("Tavily API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ResearchError::api(format!(
                "Tavily API error ({}): {}",
                status, body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ResearchError::parse(format!("Failed to parse Tavily response: {}", e)))
    }
}

#[async_trait]
impl WebSearchProvider for TavilyClient {
    fn name(&self) -> &'static str {
        "tavily"
    }

    async fn search(
        &self,
        query: &str,
        options: WebSearchOptions,
    ) -> Result<Vec<WebHit>, ResearchError> {
        let request = TavilySearchRequest {
            query: query.to_string(),
            search_depth: options.depth.as_str().to_string(),
            max_results: options.max_results,
            include_answer: true,
        };

        let response = self.search_raw(request).await?;

        Ok(response
            .results
            .into_iter()
            .map(|r| WebHit {
                title: r.title,
                url: r.url,
                content: r.content,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = TavilySearchRequest {
            query: "perovskite stability".to_string(),
            search_depth: "advanced".to_string(),
            max_results: 4,
            include_answer: true,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["search_depth"], "advanced");
        assert_eq!(value["max_results"], 4);
        assert_eq!(value["include_answer"], true);
    }

    #[test]
    fn test_response_parsing_tolerates_missing_fields() {
        let json = r#"{
            "query": "perovskite stability",
            "results": [
                {"title": "A", "url": "https://a.example", "content": "alpha", "score": 0.9},
                {"title": "B", "url": "https://b.example"}
            ]
        }"#;
        let response: TavilySearchResponse = serde_json::from_str(json).unwrap();
        assert!(response.answer.is_none());
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[1].content, "");
    }
}
