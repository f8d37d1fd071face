//! Prompt text and output schemas for every structured generation call

use chrono::NaiveDate;
use reason_core::{GapAnalysis, RequiredAnalysis, SearchQuery, SearchResultSet};
use serde_json::{json, Value};

use crate::providers::GenerationRequest;

pub const PLAN_TEMPERATURE: f32 = 0.0;
pub const ANALYSIS_TEMPERATURE: f32 = 0.5;
pub const GAP_ANALYSIS_TEMPERATURE: f32 = 0.0;
pub const SYNTHESIS_TEMPERATURE: f32 = 0.0;

pub fn plan_request(topic: &str, today: NaiveDate) -> GenerationRequest {
    let prompt = format!(
        r#"Create a focused research plan for the topic: "{topic}".

Today's date and day of the week: {date}

Keep the plan concise but comprehensive, with:
- 4-12 targeted search queries (each can use web, academic, or both sources)
- 2-8 key analyses to perform
- Prioritize the most important aspects to investigate

Consider different angles and potential controversies, but maintain focus on the core aspects.
Ensure the total number of steps (searches + analyses) does not exceed 20."#,
        topic = topic,
        date = today.format("%A, %B %-d, %Y"),
    );

    GenerationRequest {
        schema_name: "research_plan",
        schema: plan_schema(),
        prompt,
        temperature: PLAN_TEMPERATURE,
    }
}

pub fn analysis_request(analysis: &RequiredAnalysis, results: &SearchResultSet) -> GenerationRequest {
    let prompt = format!(
        r#"Perform a {kind} analysis on the search results. {description}
Consider all sources and their reliability.
Search results: {results}"#,
        kind = analysis.analysis_type,
        description = analysis.description,
        results = results.to_prompt_json(),
    );

    GenerationRequest {
        schema_name: "analysis",
        schema: analysis_schema(),
        prompt,
        temperature: ANALYSIS_TEMPERATURE,
    }
}

pub fn gap_analysis_request(
    results: &SearchResultSet,
    analyses: &[RequiredAnalysis],
) -> GenerationRequest {
    let analyses_json = serde_json::to_string(analyses).unwrap_or_else(|_| "[]".to_string());
    let prompt = format!(
        r#"Analyze the research results and identify limitations, knowledge gaps, and recommended follow-up actions.
Consider:
- Quality and reliability of sources
- Missing perspectives or data
- Areas needing deeper investigation
- Potential biases or conflicts
- Severity should be between 2 and 10
- Follow-up priority should be between 2 and 10

Research results: {results}
Analysis findings: {analyses}"#,
        results = results.to_prompt_json(),
        analyses = analyses_json,
    );

    GenerationRequest {
        schema_name: "gap_analysis",
        schema: gap_analysis_schema(),
        prompt,
        temperature: GAP_ANALYSIS_TEMPERATURE,
    }
}

pub fn synthesis_request(
    results: &SearchResultSet,
    gaps: &GapAnalysis,
    additional_queries: &[SearchQuery],
) -> GenerationRequest {
    let gaps_json = serde_json::to_string(gaps).unwrap_or_else(|_| "{}".to_string());
    let additional_json =
        serde_json::to_string(additional_queries).unwrap_or_else(|_| "[]".to_string());
    let prompt = format!(
        r#"Synthesize all research findings, including gap analysis and follow-up research.
Highlight key conclusions and remaining uncertainties.

Original results: {results}
Gap analysis: {gaps}
Additional findings: {additional}"#,
        results = results.to_prompt_json(),
        gaps = gaps_json,
        additional = additional_json,
    );

    GenerationRequest {
        schema_name: "synthesis",
        schema: synthesis_schema(),
        prompt,
        temperature: SYNTHESIS_TEMPERATURE,
    }
}

fn string_array() -> Value {
    json!({"type": "array", "items": {"type": "string"}})
}

fn finding_items(text_field: &str, evidence_field: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            text_field: {"type": "string"},
            evidence_field: string_array(),
            "confidence": {"type": "number", "minimum": 0, "maximum": 1}
        },
        "required": [text_field, evidence_field, "confidence"]
    })
}

pub fn plan_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "search_queries": {
                "type": "array",
                "minItems": 4,
                "maxItems": 12,
                "items": {
                    "type": "object",
                    "properties": {
                        "query": {"type": "string"},
                        "rationale": {"type": "string"},
                        "source": {"type": "string", "enum": ["web", "academic", "both"]},
                        "priority": {"type": "integer", "minimum": 1, "maximum": 5}
                    },
                    "required": ["query", "rationale", "source", "priority"]
                }
            },
            "required_analyses": {
                "type": "array",
                "minItems": 2,
                "maxItems": 8,
                "items": {
                    "type": "object",
                    "properties": {
                        "type": {"type": "string"},
                        "description": {"type": "string"},
                        "importance": {"type": "integer", "minimum": 1, "maximum": 5}
                    },
                    "required": ["type", "description", "importance"]
                }
            }
        },
        "required": ["search_queries", "required_analyses"]
    })
}

pub fn analysis_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "findings": {"type": "array", "items": finding_items("insight", "evidence")},
            "implications": string_array(),
            "limitations": string_array()
        },
        "required": ["findings", "implications", "limitations"]
    })
}

pub fn gap_analysis_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "limitations": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "type": {"type": "string"},
                        "description": {"type": "string"},
                        "severity": {"type": "integer", "minimum": 2, "maximum": 10},
                        "potential_solutions": string_array()
                    },
                    "required": ["type", "description", "severity", "potential_solutions"]
                }
            },
            "knowledge_gaps": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "topic": {"type": "string"},
                        "reason": {"type": "string"},
                        "additional_queries": string_array()
                    },
                    "required": ["topic", "reason", "additional_queries"]
                }
            },
            "recommended_followup": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "action": {"type": "string"},
                        "rationale": {"type": "string"},
                        "priority": {"type": "integer", "minimum": 2, "maximum": 10}
                    },
                    "required": ["action", "rationale", "priority"]
                }
            }
        },
        "required": ["limitations", "knowledge_gaps", "recommended_followup"]
    })
}

pub fn synthesis_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "key_findings": {
                "type": "array",
                "minItems": 1,
                "items": finding_items("finding", "supporting_evidence")
            },
            "remaining_uncertainties": string_array()
        },
        "required": ["key_findings", "remaining_uncertainties"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_prompt_includes_topic_and_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let request = plan_request("fusion energy timelines", date);

        assert!(request.prompt.contains("\"fusion energy timelines\""));
        assert!(request.prompt.contains("Friday, October 16, 2026"));
        assert_eq!(request.temperature, PLAN_TEMPERATURE);
        assert_eq!(request.schema["properties"]["search_queries"]["maxItems"], 12);
    }

    #[test]
    fn test_analysis_prompt_embeds_results() {
        let analysis = RequiredAnalysis {
            analysis_type: "sentiment".to_string(),
            description: "Gauge expert sentiment.".to_string(),
            importance: 2,
        };
        let request = analysis_request(&analysis, &SearchResultSet::new());

        assert!(request.prompt.starts_with("Perform a sentiment analysis"));
        assert!(request.prompt.contains("Search results: []"));
        assert_eq!(request.temperature, ANALYSIS_TEMPERATURE);
    }

    #[test]
    fn test_finding_schema_fields() {
        let schema = synthesis_schema();
        let items = &schema["properties"]["key_findings"]["items"];
        assert_eq!(items["required"][0], "finding");
        assert_eq!(items["required"][1], "supporting_evidence");
        assert_eq!(items["properties"]["confidence"]["maximum"], 1);
    }
}
