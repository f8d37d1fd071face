//! Terminal output of one research run

use serde::{Deserialize, Serialize};

use crate::analysis::Synthesis;
use crate::plan::ResearchPlan;
use crate::search::SearchResultSet;
use crate::step::{FailedStep, StepId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub plan: ResearchPlan,
    pub results: SearchResultSet,
    /// Present only for advanced runs that found knowledge gaps
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthesis: Option<Synthesis>,
    /// Steps that were skipped after a recoverable failure
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_steps: Vec<FailedStep>,
}

impl RunResult {
    /// A run is partial when at least one step failed but the run still finished
    pub fn is_partial(&self) -> bool {
        !self.failed_steps.is_empty()
    }

    pub fn failed_step_ids(&self) -> impl Iterator<Item = StepId> + '_ {
        self.failed_steps.iter().map(|f| f.id)
    }
}
