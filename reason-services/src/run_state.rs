//! Mutable state of one research run

use reason_core::{Depth, FailedStep, ResultSource, SearchResultGroup, SearchResultSet, StepId};

use crate::config::StepAccounting;

/// Counters and accumulated results threaded through every phase
///
/// A step counts as completed once it has been processed, whether or not it
/// succeeded: a failed search still advances `completed_steps` and is listed
/// in `failed_steps`. A finished run therefore reports `completed == total`
/// even when it is partial; `failed_steps` tells the two apart.
#[derive(Debug)]
pub struct RunState {
    depth: Depth,
    accounting: StepAccounting,
    /// Search + analysis steps from the sequencer
    planned_steps: u32,
    /// Steps added after planning (gap queries and synthesis), dynamic accounting only
    discovered_steps: u32,
    completed_steps: u32,
    /// Next number handed to a search id; gap searches continue from the planned searches
    search_index: usize,
    results: SearchResultSet,
    failed_steps: Vec<FailedStep>,
}

impl RunState {
    pub fn new(depth: Depth, accounting: StepAccounting) -> Self {
        Self {
            depth,
            accounting,
            planned_steps: 0,
            discovered_steps: 0,
            completed_steps: 0,
            search_index: 0,
            results: SearchResultSet::new(),
            failed_steps: Vec::new(),
        }
    }

    pub fn depth(&self) -> Depth {
        self.depth
    }

    pub fn set_planned_steps(&mut self, planned: usize) {
        self.planned_steps = planned as u32;
    }

    pub fn planned_steps(&self) -> u32 {
        self.planned_steps
    }

    pub fn completed_steps(&self) -> u32 {
        self.completed_steps
    }

    /// Mark one step processed, successful or failed
    pub fn complete_step(&mut self) {
        self.completed_steps += 1;
    }

    /// Record steps found after planning
    pub fn discover_steps(&mut self, count: usize) {
        self.discovered_steps += count as u32;
    }

    /// Called once per planned search step, in order
    pub fn advance_search_index(&mut self) {
        self.search_index += 1;
    }

    /// Mint the id for the next gap-driven search
    pub fn next_gap_search_id(&mut self, source: ResultSource) -> StepId {
        let id = StepId::gap_search(source, self.search_index);
        self.search_index += 1;
        id
    }

    pub fn push_results(&mut self, group: SearchResultGroup) {
        self.results.push(group);
    }

    pub fn results(&self) -> &SearchResultSet {
        &self.results
    }

    pub fn record_failure(&mut self, id: StepId, reason: impl Into<String>) {
        self.failed_steps.push(FailedStep {
            id,
            reason: reason.into(),
        });
    }

    pub fn failed_steps(&self) -> &[FailedStep] {
        &self.failed_steps
    }

    /// Total reported on progress events
    pub fn reported_total(&self) -> u32 {
        match self.accounting {
            StepAccounting::Fixed => {
                let extra = if self.depth.is_advanced() { 2 } else { 1 };
                self.planned_steps + extra
            }
            // +1 for gap analysis; synthesis arrives through `discover_steps`
            StepAccounting::Dynamic => self.planned_steps + 1 + self.discovered_steps,
        }
    }

    /// Counts for the gap-analysis completion event. The gap analysis step must
    /// already be marked complete.
    pub fn gap_analysis_counts(&self) -> (u32, u32) {
        (self.completed_steps, self.reported_total())
    }

    /// Counts for the synthesis completion event
    pub fn synthesis_counts(&self) -> (u32, u32) {
        let total = self.reported_total();
        match self.accounting {
            StepAccounting::Fixed => (total.saturating_sub(1), total),
            StepAccounting::Dynamic => (self.completed_steps, total),
        }
    }

    /// Counts for the terminal `research-progress` event
    pub fn final_counts(&self) -> (u32, u32) {
        let total = self.reported_total();
        match self.accounting {
            StepAccounting::Fixed => (total, total),
            StepAccounting::Dynamic => (self.completed_steps, total),
        }
    }

    /// Move the accumulated results and failures out, leaving both empty
    pub fn take_parts(&mut self) -> (SearchResultSet, Vec<FailedStep>) {
        (
            std::mem::take(&mut self.results),
            std::mem::take(&mut self.failed_steps),
        )
    }
}
