//! Interfaces of the external services a research run depends on
//!
//! The orchestrator only talks to these traits; [`crate::TavilyClient`],
//! [`crate::ExaClient`] and [`crate::OpenAIClient`] are the production
//! implementations.

use async_trait::async_trait;
use reason_core::{Depth, ResearchError};
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebSearchOptions {
    pub depth: Depth,
    pub max_results: u32,
}

/// A raw web hit before normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebHit {
    pub title: String,
    pub url: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcademicSearchOptions {
    pub num_results: u32,
    pub category: String,
}

/// A raw academic hit; the provider may omit any field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcademicHit {
    pub title: Option<String>,
    pub url: Option<String>,
    pub summary: Option<String>,
}

#[async_trait]
pub trait WebSearchProvider: Send + Sync {
    /// Short provider name used in logs and errors
    fn name(&self) -> &'static str;

    async fn search(
        &self,
        query: &str,
        options: WebSearchOptions,
    ) -> Result<Vec<WebHit>, ResearchError>;
}

#[async_trait]
pub trait AcademicSearchProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(
        &self,
        query: &str,
        options: AcademicSearchOptions,
    ) -> Result<Vec<AcademicHit>, ResearchError>;
}

/// One structured generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Name of the expected output object, e.g. `research_plan`
    pub schema_name: &'static str,
    /// JSON Schema the output must conform to
    pub schema: serde_json::Value,
    pub prompt: String,
    pub temperature: f32,
}

#[async_trait]
pub trait StructuredGenerator: Send + Sync {
    /// Produce a JSON object for the request. Implementations return the raw
    /// object; conformance to the schema is checked by [`generate_object`].
    async fn generate(&self, request: GenerationRequest)
        -> Result<serde_json::Value, ResearchError>;
}

/// Run a generation call and decode its output into `T`
///
/// A decode failure is reported as a parse error (the output violated the schema).
pub async fn generate_object<T: DeserializeOwned>(
    generator: &dyn StructuredGenerator,
    request: GenerationRequest,
) -> Result<T, ResearchError> {
    let schema_name = request.schema_name;
    let value = generator.generate(request).await?;
    serde_json::from_value(value).map_err(|e| {
        ResearchError::parse(format!("Output does not match {} schema: {}", schema_name, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    struct FixedGenerator(serde_json::Value);

    #[async_trait]
    impl StructuredGenerator for FixedGenerator {
        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> Result<serde_json::Value, ResearchError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Debug, Deserialize)]
    struct Answer {
        value: u32,
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            schema_name: "answer",
            schema: serde_json::json!({"type": "object"}),
            prompt: "answer".to_string(),
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn test_generate_object_decodes() {
        let generator = FixedGenerator(serde_json::json!({"value": 42}));
        let answer: Answer = generate_object(&generator, request()).await.unwrap();
        assert_eq!(answer.value, 42);
    }

    #[tokio::test]
    async fn test_generate_object_schema_violation() {
        let generator = FixedGenerator(serde_json::json!({"value": "many"}));
        let err = generate_object::<Answer>(&generator, request())
            .await
            .unwrap_err();
        assert!(matches!(err, ResearchError::Parse(msg) if msg.contains("answer schema")));
    }
}
