//! Turns a topic into a bounded research plan

use chrono::NaiveDate;
use reason_core::{plan::MAX_PLANNED_STEPS, ResearchError, ResearchPlan};
use tracing::{info, instrument, warn};

use crate::prompts;
use crate::providers::{generate_object, StructuredGenerator};

/// Generate and validate a plan for `topic`
///
/// Any failure, including a plan outside the cardinality bounds, is
/// reported as [`ResearchError::PlanGeneration`]. No retry is attempted.
#[instrument(skip(generator))]
pub async fn generate_plan(
    generator: &dyn StructuredGenerator,
    topic: &str,
    today: NaiveDate,
) -> Result<ResearchPlan, ResearchError> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(ResearchError::plan_generation("topic must not be empty"));
    }

    let plan: ResearchPlan = generate_object(generator, prompts::plan_request(topic, today))
        .await
        .map_err(|e| ResearchError::plan_generation(e.to_string()))?;

    plan.validate().map_err(ResearchError::plan_generation)?;

    let steps = plan.derived_step_count();
    if steps > MAX_PLANNED_STEPS {
        warn!(
            "Plan for '{}' expands to {} steps (asked for at most {})",
            topic, steps, MAX_PLANNED_STEPS
        );
    }

    info!(
        "Generated plan with {} queries and {} analyses",
        plan.search_queries.len(),
        plan.required_analyses.len()
    );

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::providers::GenerationRequest;

    struct CannedPlanner(Result<serde_json::Value, &'static str>);

    #[async_trait]
    impl StructuredGenerator for CannedPlanner {
        async fn generate(
            &self,
            request: GenerationRequest,
        ) -> Result<serde_json::Value, ResearchError> {
            assert_eq!(request.schema_name, "research_plan");
            self.0.clone().map_err(ResearchError::api)
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn plan_json(queries: usize, analyses: usize) -> serde_json::Value {
        json!({
            "search_queries": (0..queries).map(|i| json!({
                "query": format!("q{}", i),
                "rationale": "why",
                "source": "web",
                "priority": 2
            })).collect::<Vec<_>>(),
            "required_analyses": (0..analyses).map(|i| json!({
                "type": format!("a{}", i),
                "description": "what",
                "importance": 3
            })).collect::<Vec<_>>()
        })
    }

    #[tokio::test]
    async fn test_generate_valid_plan() {
        let generator = CannedPlanner(Ok(plan_json(5, 3)));
        let plan = generate_plan(&generator, "quantum error correction", today())
            .await
            .unwrap();
        assert_eq!(plan.search_queries.len(), 5);
        assert_eq!(plan.required_analyses.len(), 3);
    }

    #[tokio::test]
    async fn test_out_of_bounds_plan_rejected() {
        let generator = CannedPlanner(Ok(plan_json(3, 3)));
        let err = generate_plan(&generator, "topic", today()).await.unwrap_err();
        assert!(matches!(err, ResearchError::PlanGeneration(_)));
    }

    #[tokio::test]
    async fn test_schema_violation_rejected() {
        let generator = CannedPlanner(Ok(json!({"search_queries": "none"})));
        let err = generate_plan(&generator, "topic", today()).await.unwrap_err();
        assert!(matches!(err, ResearchError::PlanGeneration(msg) if msg.contains("research_plan")));
    }

    #[tokio::test]
    async fn test_generator_failure_is_plan_error() {
        let generator = CannedPlanner(Err("rate limited"));
        let err = generate_plan(&generator, "topic", today()).await.unwrap_err();
        assert!(matches!(err, ResearchError::PlanGeneration(msg) if msg.contains("rate limited")));
    }

    #[tokio::test]
    async fn test_empty_topic_rejected() {
        let generator = CannedPlanner(Ok(plan_json(5, 3)));
        assert!(generate_plan(&generator, "   ", today()).await.is_err());
    }
}
