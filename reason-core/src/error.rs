//! Error types for the research orchestrator

use thiserror::Error;

/// Which reasoning stage an [`ResearchError::AnalysisGeneration`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    Analysis,
    GapAnalysis,
    Synthesis,
}

impl std::fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AnalysisStage::Analysis => "analysis",
            AnalysisStage::GapAnalysis => "gap-analysis",
            AnalysisStage::Synthesis => "synthesis",
        };
        f.write_str(name)
    }
}

/// Research-wide error type
#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Research run cancelled")]
    Cancelled,

    #[error("Plan generation failed: {0}")]
    PlanGeneration(String),

    #[error("Search provider error ({provider}): {message}")]
    SearchProvider { provider: String, message: String },

    #[error("{stage} generation failed: {message}")]
    AnalysisGeneration {
        stage: AnalysisStage,
        message: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResearchError {
    pub fn api(msg: impl Into<String>) -> Self {
        ResearchError::Api(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        ResearchError::Network(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        ResearchError::Parse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        ResearchError::Config(msg.into())
    }

    pub fn plan_generation(msg: impl Into<String>) -> Self {
        ResearchError::PlanGeneration(msg.into())
    }

    pub fn search_provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ResearchError::SearchProvider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn analysis_generation(stage: AnalysisStage, message: impl Into<String>) -> Self {
        ResearchError::AnalysisGeneration {
            stage,
            message: message.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ResearchError::Internal(msg.into())
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, ResearchError::Cancelled)
    }
}

/// Result type alias for research operations
pub type ResearchResult<T> = Result<T, ResearchError>;
