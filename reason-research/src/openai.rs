use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use reason_core::ResearchError;
use tracing::{debug, instrument};

use crate::providers::{GenerationRequest, StructuredGenerator};

const DEFAULT_MODEL: &str = "gpt-4o";

#[derive(Debug, Clone)]
pub struct OpenAIClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAIClient {
    pub fn new() -> Result<Self, ResearchError> {
        if std::env::var("OPENAI_API_KEY").is_err() {
            return Err(ResearchError::config(
                "OPENAI_API_KEY environment variable not set",
            ));
        }

        // async-openai reads OPENAI_API_KEY from env automatically
        let config = OpenAIConfig::default();
        let client = Client::with_config(config);

        let model = std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self { client, model })
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl StructuredGenerator for OpenAIClient {
    #[instrument(skip(self, request), fields(schema = request.schema_name, model = %self.model))]
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<serde_json::Value, ResearchError> {
        let system_prompt = system_prompt_for(&request);

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system_prompt)
                    .build()
                    .map_err(|e| ResearchError::internal(e.to_string()))?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(request.prompt)
                    .build()
                    .map_err(|e| ResearchError::internal(e.to_string()))?
                    .into(),
            ])
            .temperature(request.temperature)
            .build()
            .map_err(|e| ResearchError::internal(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(chat_request)
            .await
            .map_err(|e| ResearchError::api(format!("OpenAI API error: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| ResearchError::parse("No response from OpenAI"))?;

        debug!("Received {} chars of structured output", content.len());

        // Extract JSON from response (handle markdown code blocks)
        let json_str = extract_json(content)?;

        serde_json::from_str(&json_str)
            .map_err(|e| ResearchError::parse(format!("Invalid JSON from OpenAI: {}", e)))
    }
}

fn system_prompt_for(request: &GenerationRequest) -> String {
    let schema = serde_json::to_string_pretty(&request.schema)
        .unwrap_or_else(|_| request.schema.to_string());

    format!(
        r#"You are a meticulous research assistant that answers only with data.

Respond with a single valid JSON object named "{}" that conforms to this JSON Schema:
{}

Do not include any text outside the JSON object."#,
        request.schema_name, schema
    )
}

fn extract_json(content: &str) -> Result<String, ResearchError> {
    // Try to find JSON in code blocks first
    if let Some(start) = content.find("```json") {
        let start = start + 7;
        if let Some(end) = content[start..].find("```") {
            return Ok(content[start..start + end].trim().to_string());
        }
    }

    // Try to find raw JSON
    if let Some(start) = content.find('{') {
        if let Some(end) = content.rfind('}') {
            if end > start {
                return Ok(content[start..=end].to_string());
            }
        }
    }

    Err(ResearchError::parse("No JSON found in response"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_code_block() {
        let content = "Here you go:\n```json\n{\"a\": 1}\n```\nDone";
        assert_eq!(extract_json(content).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_raw_json() {
        let content = "Sure! {\"findings\": [{\"insight\": \"x\"}]} hope that helps";
        assert_eq!(
            extract_json(content).unwrap(),
            "{\"findings\": [{\"insight\": \"x\"}]}"
        );
    }

    #[test]
    fn test_extract_json_missing() {
        assert!(extract_json("no braces here").is_err());
        assert!(extract_json("} backwards {").is_err());
    }

    #[test]
    fn test_system_prompt_embeds_schema() {
        let request = GenerationRequest {
            schema_name: "research_plan",
            schema: serde_json::json!({"type": "object", "required": ["search_queries"]}),
            prompt: String::new(),
            temperature: 0.0,
        };
        let prompt = system_prompt_for(&request);
        assert!(prompt.contains("\"research_plan\""));
        assert!(prompt.contains("search_queries"));
    }
}
