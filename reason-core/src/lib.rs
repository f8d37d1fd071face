//! Core types for the reasoned research orchestrator
//!
//! This crate defines the data shared across the research pipeline:
//! plans, step identifiers, normalized search results, reasoning outputs,
//! progress events and the final run result.

pub mod analysis;
pub mod error;
mod number;
pub mod plan;
pub mod progress;
pub mod run;
pub mod search;
pub mod step;

pub use analysis::{
    AnalysisFinding, AnalysisResult, FollowUp, GapAnalysis, KeyFinding, KnowledgeGap, Limitation,
    Synthesis,
};
pub use error::{AnalysisStage, ResearchError, ResearchResult};
pub use plan::{Depth, QuerySource, RequiredAnalysis, ResearchPlan, ResultSource, SearchQuery};
pub use progress::{EventKind, ProgressEvent, StepOutcome, Transition};
pub use run::RunResult;
pub use search::{SearchResultGroup, SearchResultRecord, SearchResultSet};
pub use step::{FailedStep, Step, StepId, StepKind, StepPhase};
