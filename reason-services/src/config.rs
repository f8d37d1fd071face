//! Research run configuration

use std::{str::FromStr, time::Duration};

use reason_core::ResearchError;
use serde::{Deserialize, Serialize};

/// How `totalSteps` is reported on progress events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepAccounting {
    /// Planned steps plus one for gap analysis and one more for synthesis on
    /// advanced runs. Deepening-loop steps are not counted.
    #[default]
    Fixed,
    /// Totals grow as deepening-loop steps are discovered, so completed
    /// never exceeds total and ends equal to it.
    Dynamic,
}

impl FromStr for StepAccounting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(StepAccounting::Fixed),
            "dynamic" => Ok(StepAccounting::Dynamic),
            other => Err(format!("expected fixed or dynamic, got '{}'", other)),
        }
    }
}

/// Configuration for the research orchestrator
#[derive(Debug, Clone, PartialEq)]
pub struct ResearchConfig {
    /// Per search call; expiry skips the step with zero results
    pub search_timeout: Duration,
    /// Per reasoning call; expiry aborts the run
    pub generation_timeout: Duration,
    pub step_accounting: StepAccounting,
    /// Upper bound on web results for a planned query
    pub web_result_cap: u32,
    /// Upper bound on academic results for a planned query
    pub academic_result_cap: u32,
    /// Web results requested for each gap query
    pub gap_web_results: u32,
    /// Academic results requested for each gap query
    pub gap_academic_results: u32,
    /// Priority assigned to gap queries
    pub gap_query_priority: u8,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            search_timeout: Duration::from_secs(30),
            generation_timeout: Duration::from_secs(120),
            step_accounting: StepAccounting::Fixed,
            web_result_cap: 10,
            academic_result_cap: 5,
            gap_web_results: 5,
            gap_academic_results: 3,
            gap_query_priority: 3,
        }
    }
}

impl ResearchConfig {
    /// Load configuration from `RESEARCH_*` environment variables
    ///
    /// Unset variables keep their defaults:
    /// - RESEARCH_SEARCH_TIMEOUT_SECS
    /// - RESEARCH_GENERATION_TIMEOUT_SECS
    /// - RESEARCH_STEP_ACCOUNTING (`fixed` | `dynamic`)
    /// - RESEARCH_WEB_RESULT_CAP, RESEARCH_ACADEMIC_RESULT_CAP
    /// - RESEARCH_GAP_WEB_RESULTS, RESEARCH_GAP_ACADEMIC_RESULTS
    /// - RESEARCH_GAP_QUERY_PRIORITY
    pub fn from_env() -> Result<Self, ResearchError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ResearchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(secs) = parse_var::<u64, _>(&lookup, "RESEARCH_SEARCH_TIMEOUT_SECS")? {
            config.search_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "RESEARCH_GENERATION_TIMEOUT_SECS")? {
            config.generation_timeout = Duration::from_secs(secs);
        }
        if let Some(accounting) = parse_var(&lookup, "RESEARCH_STEP_ACCOUNTING")? {
            config.step_accounting = accounting;
        }
        if let Some(cap) = parse_var(&lookup, "RESEARCH_WEB_RESULT_CAP")? {
            config.web_result_cap = cap;
        }
        if let Some(cap) = parse_var(&lookup, "RESEARCH_ACADEMIC_RESULT_CAP")? {
            config.academic_result_cap = cap;
        }
        if let Some(n) = parse_var(&lookup, "RESEARCH_GAP_WEB_RESULTS")? {
            config.gap_web_results = n;
        }
        if let Some(n) = parse_var(&lookup, "RESEARCH_GAP_ACADEMIC_RESULTS")? {
            config.gap_academic_results = n;
        }
        if let Some(priority) = parse_var(&lookup, "RESEARCH_GAP_QUERY_PRIORITY")? {
            config.gap_query_priority = priority;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ResearchError> {
        if self.search_timeout.is_zero() || self.generation_timeout.is_zero() {
            return Err(ResearchError::config("timeouts must be greater than zero"));
        }
        if !(1..=5).contains(&self.gap_query_priority) {
            return Err(ResearchError::config(format!(
                "gap query priority must be 1-5, got {}",
                self.gap_query_priority
            )));
        }
        if self.web_result_cap == 0 || self.academic_result_cap == 0 {
            return Err(ResearchError::config("result caps must be at least 1"));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ResearchError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ResearchError::config(format!("Invalid {}: {}", key, e))),
    }
}
