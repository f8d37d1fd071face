//! Orchestration service for the reasoned research pipeline
//!
//! This crate sequences the planning, search and reasoning steps from
//! `reason-research` into a single run and reports every step transition
//! as a progress event.

pub mod config;
pub mod progress;
pub mod research_service;
pub mod run_state;

pub use config::{ResearchConfig, StepAccounting};
pub use progress::{BroadcastSink, CollectingSink, ProgressEmitter, ProgressSink, StepUpdate};
pub use research_service::ResearchService;
pub use run_state::RunState;
