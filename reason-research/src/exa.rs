use async_trait::async_trait;
use reason_core::ResearchError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::providers::{AcademicHit, AcademicSearchOptions, AcademicSearchProvider};

const EXA_API_BASE: &str = "https://api.exa.ai";

#[derive(Debug, Clone)]
pub struct ExaClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExaSearchRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_results: Option<u32>,
    #[serde(rename = "type")]
    pub search_type: String, // "auto", "neural", "fast"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>, // "research paper", "news", etc.
    pub contents: ExaContentsOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExaContentsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExaSearchResponse {
    pub results: Vec<ExaSearchResult>,
    #[serde(default)]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExaSearchResult {
    pub url: Option<String>,
    pub title: Option<String>,
    pub id: Option<String>,
    pub published_date: Option<String>,
    pub author: Option<String>,
    pub summary: Option<String>,
}

impl ExaClient {
    pub fn new() -> Result<Self, ResearchError> {
        let api_key = std::env::var("EXA_API_KEY")
            .map_err(|_| ResearchError::config("EXA_API_KEY environment variable not set"))?;
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
            base_url: EXA_API_BASE.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[instrument(skip(self))]
    pub async fn search_raw(
        &self,
        request: ExaSearchRequest,
    ) -> Result<ExaSearchResponse, ResearchError> {
        let url = format!("{}/search", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ResearchError::network(format!("Exa API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ResearchError::api(format!("Exa API error ({}): {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| ResearchError::parse(format!("Failed to parse Exa response: {}", e)))
    }

    /// Build a summary-only search request, as used for paper lookups
    pub fn summary_request(query: &str, num_results: u32, category: &str) -> ExaSearchRequest {
        ExaSearchRequest {
            query: query.to_string(),
            num_results: Some(num_results),
            search_type: "auto".to_string(),
            category: Some(category.to_string()),
            contents: ExaContentsOptions {
                text: None,
                summary: Some(true),
            },
        }
    }
}

#[async_trait]
impl AcademicSearchProvider for ExaClient {
    fn name(&self) -> &'static str {
        "exa"
    }

    async fn search(
        &self,
        query: &str,
        options: AcademicSearchOptions,
    ) -> Result<Vec<AcademicHit>, ResearchError> {
        let request = Self::summary_request(query, options.num_results, &options.category);
        let response = self.search_raw(request).await?;

        Ok(response
            .results
            .into_iter()
            .map(|r| AcademicHit {
                title: r.title,
                url: r.url,
                summary: r.summary,
            })
            .collect())
    }
}
