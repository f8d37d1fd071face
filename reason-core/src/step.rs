//! Step identifiers and addressable units of work

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::plan::{RequiredAnalysis, ResultSource, SearchQuery};

/// Which phase of a run a step belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepPhase {
    Plan,
    Search,
    Analysis,
    GapAnalysis,
    GapSearch,
    Synthesis,
    /// The run-wide progress counter
    Progress,
}

/// Stable identifier of one step within a run
///
/// The wire form (`search-web-3`, `gap-search-academic-7`, ...) is derived
/// through `Display` and is what progress consumers key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StepId {
    pub phase: StepPhase,
    pub index: Option<usize>,
    pub source: Option<ResultSource>,
}

impl StepId {
    const fn fixed(phase: StepPhase) -> Self {
        Self {
            phase,
            index: None,
            source: None,
        }
    }

    pub const PLAN: StepId = StepId::fixed(StepPhase::Plan);
    pub const GAP_ANALYSIS: StepId = StepId::fixed(StepPhase::GapAnalysis);
    pub const SYNTHESIS: StepId = StepId::fixed(StepPhase::Synthesis);
    pub const PROGRESS: StepId = StepId::fixed(StepPhase::Progress);

    pub fn search(source: ResultSource, index: usize) -> Self {
        Self {
            phase: StepPhase::Search,
            index: Some(index),
            source: Some(source),
        }
    }

    pub fn analysis(index: usize) -> Self {
        Self {
            phase: StepPhase::Analysis,
            index: Some(index),
            source: None,
        }
    }

    pub fn gap_search(source: ResultSource, index: usize) -> Self {
        Self {
            phase: StepPhase::GapSearch,
            index: Some(index),
            source: Some(source),
        }
    }

    /// Parse a wire id back into its typed form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "research-plan" => return Some(Self::PLAN),
            "gap-analysis" => return Some(Self::GAP_ANALYSIS),
            "final-synthesis" => return Some(Self::SYNTHESIS),
            "research-progress" => return Some(Self::PROGRESS),
            _ => {}
        }

        let (prefix, index) = s.rsplit_once('-')?;
        let index: usize = index.parse().ok()?;
        match prefix {
            "search-web" => Some(Self::search(ResultSource::Web, index)),
            "search-academic" => Some(Self::search(ResultSource::Academic, index)),
            "analysis" => Some(Self::analysis(index)),
            "gap-search" => Some(Self::gap_search(ResultSource::Web, index)),
            "gap-search-academic" => Some(Self::gap_search(ResultSource::Academic, index)),
            _ => None,
        }
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let index = self.index.unwrap_or_default();
        match (self.phase, self.source) {
            (StepPhase::Plan, _) => f.write_str("research-plan"),
            (StepPhase::GapAnalysis, _) => f.write_str("gap-analysis"),
            (StepPhase::Synthesis, _) => f.write_str("final-synthesis"),
            (StepPhase::Progress, _) => f.write_str("research-progress"),
            (StepPhase::Analysis, _) => write!(f, "analysis-{}", index),
            (StepPhase::Search, Some(ResultSource::Academic)) => {
                write!(f, "search-academic-{}", index)
            }
            (StepPhase::Search, _) => write!(f, "search-web-{}", index),
            (StepPhase::GapSearch, Some(ResultSource::Academic)) => {
                write!(f, "gap-search-academic-{}", index)
            }
            (StepPhase::GapSearch, _) => write!(f, "gap-search-{}", index),
        }
    }
}

impl Serialize for StepId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StepId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        StepId::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid step id: {}", raw)))
    }
}

/// What a step does
#[derive(Debug, Clone, PartialEq)]
pub enum StepKind {
    Search {
        source: ResultSource,
        query: SearchQuery,
    },
    Analysis(RequiredAnalysis),
}

/// One addressable unit of work produced by the step sequencer
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub id: StepId,
    pub kind: StepKind,
}

/// A step that did not complete, kept on the run result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedStep {
    pub id: StepId,
    pub reason: String,
}
