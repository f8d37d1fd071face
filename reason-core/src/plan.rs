//! Research plan types

use serde::{Deserialize, Serialize};

/// How far a research run goes
///
/// `Advanced` additionally runs the deepening loop and the final synthesis
/// when the gap analysis reports knowledge gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    #[default]
    Basic,
    Advanced,
}

impl Depth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Depth::Basic => "basic",
            Depth::Advanced => "advanced",
        }
    }

    pub fn is_advanced(&self) -> bool {
        matches!(self, Depth::Advanced)
    }
}

impl std::fmt::Display for Depth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Depth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Depth::Basic),
            "advanced" => Ok(Depth::Advanced),
            other => Err(format!("unknown depth '{}', expected basic or advanced", other)),
        }
    }
}

/// Which providers a planned query should be sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuerySource {
    Web,
    Academic,
    Both,
}

/// A single provider a search step actually runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    Web,
    Academic,
}

impl ResultSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultSource::Web => "web",
            ResultSource::Academic => "academic",
        }
    }
}

impl QuerySource {
    /// Providers this query expands into, in execution order
    pub fn providers(&self) -> &'static [ResultSource] {
        match self {
            QuerySource::Web => &[ResultSource::Web],
            QuerySource::Academic => &[ResultSource::Academic],
            QuerySource::Both => &[ResultSource::Web, ResultSource::Academic],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub rationale: String,
    pub source: QuerySource,
    /// 1 (highest) to 5
    #[serde(deserialize_with = "crate::number::integral")]
    pub priority: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredAnalysis {
    #[serde(rename = "type")]
    pub analysis_type: String,
    pub description: String,
    /// 1 to 5
    #[serde(deserialize_with = "crate::number::integral")]
    pub importance: u8,
}

/// The generated plan seeding one run. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchPlan {
    pub search_queries: Vec<SearchQuery>,
    pub required_analyses: Vec<RequiredAnalysis>,
}

/// Cardinality bounds a generated plan must satisfy
pub const MIN_SEARCH_QUERIES: usize = 4;
pub const MAX_SEARCH_QUERIES: usize = 12;
pub const MIN_REQUIRED_ANALYSES: usize = 2;
pub const MAX_REQUIRED_ANALYSES: usize = 8;
/// Advisory only; the planner is asked to stay under it
pub const MAX_PLANNED_STEPS: usize = 20;

impl ResearchPlan {
    /// Check the structural bounds of a generated plan
    pub fn validate(&self) -> Result<(), String> {
        let queries = self.search_queries.len();
        if !(MIN_SEARCH_QUERIES..=MAX_SEARCH_QUERIES).contains(&queries) {
            return Err(format!(
                "expected {}-{} search queries, got {}",
                MIN_SEARCH_QUERIES, MAX_SEARCH_QUERIES, queries
            ));
        }

        let analyses = self.required_analyses.len();
        if !(MIN_REQUIRED_ANALYSES..=MAX_REQUIRED_ANALYSES).contains(&analyses) {
            return Err(format!(
                "expected {}-{} required analyses, got {}",
                MIN_REQUIRED_ANALYSES, MAX_REQUIRED_ANALYSES, analyses
            ));
        }

        if let Some(q) = self
            .search_queries
            .iter()
            .find(|q| !(1..=5).contains(&q.priority))
        {
            return Err(format!(
                "query '{}' has priority {} outside 1-5",
                q.query, q.priority
            ));
        }

        if let Some(a) = self
            .required_analyses
            .iter()
            .find(|a| !(1..=5).contains(&a.importance))
        {
            return Err(format!(
                "analysis '{}' has importance {} outside 1-5",
                a.analysis_type, a.importance
            ));
        }

        if let Some(q) = self.search_queries.iter().find(|q| q.query.trim().is_empty()) {
            return Err(format!("empty search query (rationale: {})", q.rationale));
        }

        Ok(())
    }

    /// Number of steps the plan expands into (a `both` query counts twice)
    pub fn derived_step_count(&self) -> usize {
        let searches: usize = self
            .search_queries
            .iter()
            .map(|q| q.source.providers().len())
            .sum();
        searches + self.required_analyses.len()
    }
}
