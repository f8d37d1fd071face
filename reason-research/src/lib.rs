//! Planning, search and reasoning steps of a research run
//!
//! This crate wraps the external services (Tavily web search, Exa academic
//! search, OpenAI structured generation) behind small traits and provides the
//! leaf components the orchestrator sequences: plan generation, step
//! sequencing, search execution, analysis, gap analysis and synthesis.

pub mod deepening;
pub mod exa;
pub mod executors;
pub mod openai;
pub mod planner;
pub mod prompts;
pub mod providers;
pub mod reasoning;
pub mod sequencer;
pub mod tavily;

pub use deepening::{gap_queries, should_deepen};
pub use exa::{ExaClient, ExaSearchRequest, ExaSearchResponse, ExaSearchResult};
pub use executors::{academic_search, results_for_priority, web_search, ACADEMIC_CATEGORY};
pub use openai::OpenAIClient;
pub use planner::generate_plan;
pub use providers::{
    generate_object, AcademicHit, AcademicSearchOptions, AcademicSearchProvider,
    GenerationRequest, StructuredGenerator, WebHit, WebSearchOptions, WebSearchProvider,
};
pub use reasoning::{analyze_gaps, run_analysis, synthesize};
pub use sequencer::{sequence_plan, StepSequence};
pub use tavily::{TavilyClient, TavilySearchRequest, TavilySearchResponse, TavilySearchResult};
