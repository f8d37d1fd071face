//! Reasoning calls over the accumulated search results
//!
//! Each function makes exactly one structured generation call. Failures are
//! mapped to [`ResearchError::AnalysisGeneration`] tagged with the stage.

use reason_core::{
    AnalysisResult, AnalysisStage, GapAnalysis, RequiredAnalysis, ResearchError, SearchQuery,
    SearchResultSet, Synthesis,
};
use tracing::{info, instrument};

use crate::prompts;
use crate::providers::{generate_object, StructuredGenerator};

/// Run one planned analysis against every result gathered so far
#[instrument(skip(generator, results), fields(kind = %analysis.analysis_type))]
pub async fn run_analysis(
    generator: &dyn StructuredGenerator,
    analysis: &RequiredAnalysis,
    results: &SearchResultSet,
) -> Result<AnalysisResult, ResearchError> {
    let stage = AnalysisStage::Analysis;
    let result: AnalysisResult =
        generate_object(generator, prompts::analysis_request(analysis, results))
            .await
            .map_err(|e| ResearchError::analysis_generation(stage, e.to_string()))?;

    result
        .validate()
        .map_err(|msg| ResearchError::analysis_generation(stage, msg))?;

    info!("Analysis produced {} findings", result.findings.len());
    Ok(result)
}

/// Identify limitations, knowledge gaps and follow-ups across the whole run
///
/// Severity and priority ranges are requested in the prompt but not checked.
#[instrument(skip_all)]
pub async fn analyze_gaps(
    generator: &dyn StructuredGenerator,
    results: &SearchResultSet,
    analyses: &[RequiredAnalysis],
) -> Result<GapAnalysis, ResearchError> {
    let stage = AnalysisStage::GapAnalysis;
    let gaps: GapAnalysis =
        generate_object(generator, prompts::gap_analysis_request(results, analyses))
            .await
            .map_err(|e| ResearchError::analysis_generation(stage, e.to_string()))?;

    info!(
        "Gap analysis: {} limitations, {} knowledge gaps, {} follow-ups",
        gaps.limitations.len(),
        gaps.knowledge_gaps.len(),
        gaps.recommended_followup.len()
    );
    Ok(gaps)
}

/// Combine everything into key findings and residual uncertainties
#[instrument(skip_all)]
pub async fn synthesize(
    generator: &dyn StructuredGenerator,
    results: &SearchResultSet,
    gaps: &GapAnalysis,
    additional_queries: &[SearchQuery],
) -> Result<Synthesis, ResearchError> {
    let stage = AnalysisStage::Synthesis;
    let synthesis: Synthesis = generate_object(
        generator,
        prompts::synthesis_request(results, gaps, additional_queries),
    )
    .await
    .map_err(|e| ResearchError::analysis_generation(stage, e.to_string()))?;

    synthesis
        .validate()
        .map_err(|msg| ResearchError::analysis_generation(stage, msg))?;

    info!("Synthesized {} key findings", synthesis.key_findings.len());
    Ok(synthesis)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::providers::GenerationRequest;

    struct Canned(serde_json::Value);

    #[async_trait]
    impl StructuredGenerator for Canned {
        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> Result<serde_json::Value, ResearchError> {
            Ok(self.0.clone())
        }
    }

    fn analysis() -> RequiredAnalysis {
        RequiredAnalysis {
            analysis_type: "risk".to_string(),
            description: "Assess deployment risks.".to_string(),
            importance: 4,
        }
    }

    #[tokio::test]
    async fn test_analysis_out_of_range_confidence() {
        let generator = Canned(json!({
            "findings": [{"insight": "x", "evidence": [], "confidence": 2.0}],
            "implications": [],
            "limitations": []
        }));
        let err = run_analysis(&generator, &analysis(), &SearchResultSet::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ResearchError::AnalysisGeneration { stage: AnalysisStage::Analysis, .. }
        ));
    }

    #[tokio::test]
    async fn test_gap_analysis_accepts_unvalidated_severity() {
        let generator = Canned(json!({
            "limitations": [{"type": "t", "description": "d", "severity": 42, "potential_solutions": []}],
            "knowledge_gaps": [],
            "recommended_followup": [{"action": "a", "rationale": "r", "priority": 0}]
        }));
        let gaps = analyze_gaps(&generator, &SearchResultSet::new(), &[analysis()])
            .await
            .unwrap();
        assert_eq!(gaps.limitations[0].severity, 42);
        assert!(!gaps.has_gaps());
    }

    #[tokio::test]
    async fn test_synthesis_requires_findings() {
        let generator = Canned(json!({"key_findings": [], "remaining_uncertainties": ["?"]}));
        let err = synthesize(&generator, &SearchResultSet::new(), &GapAnalysis::default(), &[])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ResearchError::AnalysisGeneration { stage: AnalysisStage::Synthesis, .. }
        ));
    }
}
