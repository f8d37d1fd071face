//! Progress events streamed to the caller during a run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisFinding, FollowUp, GapAnalysis, KnowledgeGap, Synthesis};
use crate::plan::{ResearchPlan, ResultSource};
use crate::search::SearchResultRecord;
use crate::step::StepId;

/// Category of the step an event describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Plan,
    Web,
    Academic,
    Analysis,
    Progress,
}

impl From<ResultSource> for EventKind {
    fn from(source: ResultSource) -> Self {
        match source {
            ResultSource::Web => EventKind::Web,
            ResultSource::Academic => EventKind::Academic,
        }
    }
}

/// Payload attached to a completed step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Plan {
        plan: ResearchPlan,
        total_steps: u32,
    },
    Results(Vec<SearchResultRecord>),
    Findings(Vec<AnalysisFinding>),
    Gaps {
        findings: Vec<AnalysisFinding>,
        gaps: Vec<KnowledgeGap>,
        recommendations: Vec<FollowUp>,
    },
    Synthesis {
        findings: Vec<AnalysisFinding>,
        uncertainties: Vec<String>,
    },
}

impl StepOutcome {
    pub fn gaps(analysis: &GapAnalysis) -> Self {
        StepOutcome::Gaps {
            findings: analysis.limitation_findings(),
            gaps: analysis.knowledge_gaps.clone(),
            recommendations: analysis.recommended_followup.clone(),
        }
    }

    pub fn synthesis(synthesis: &Synthesis) -> Self {
        StepOutcome::Synthesis {
            findings: synthesis.as_findings(),
            uncertainties: synthesis.remaining_uncertainties.clone(),
        }
    }
}

/// State transition a progress event reports
///
/// Consumers merge events by `(id, status)`: a `completed` or `error` event
/// replaces the earlier `running` event with the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Transition {
    Running,
    Completed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        outcome: Option<StepOutcome>,
    },
    Error {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub id: StepId,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(flatten)]
    pub transition: Transition,
    /// Replaces an earlier event with the same id; false only for `running`
    #[serde(default)]
    pub overwrite: bool,
    /// Set on the terminal `research-progress` event of a finished run
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_complete: bool,
    pub title: String,
    pub message: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Emission order within the run, starting at 0
    pub sequence: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_steps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_steps: Option<u32>,
}

impl Transition {
    /// Whether an event with this transition replaces the step's earlier event
    pub fn overwrites(&self) -> bool {
        !matches!(self, Transition::Running)
    }
}

impl ProgressEvent {
    pub fn is_running(&self) -> bool {
        matches!(self.transition, Transition::Running)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.transition, Transition::Completed { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self.transition, Transition::Error { .. })
    }

    pub fn outcome(&self) -> Option<&StepOutcome> {
        match &self.transition {
            Transition::Completed { outcome } => outcome.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(transition: Transition) -> ProgressEvent {
        ProgressEvent {
            id: StepId::search(ResultSource::Web, 0),
            kind: EventKind::Web,
            overwrite: transition.overwrites(),
            is_complete: false,
            transition,
            title: "Searched the web for \"graphene\"".to_string(),
            message: "Found 0 results".to_string(),
            timestamp: Utc::now(),
            sequence: 4,
            query: Some("graphene".to_string()),
            analysis_type: None,
            completed_steps: None,
            total_steps: None,
        }
    }

    #[test]
    fn test_wire_format() {
        let value = serde_json::to_value(event(Transition::Completed {
            outcome: Some(StepOutcome::Results(vec![])),
        }))
        .unwrap();

        assert_eq!(value["id"], "search-web-0");
        assert_eq!(value["type"], "web");
        assert_eq!(value["status"], "completed");
        assert_eq!(value["query"], "graphene");
        assert!(value["outcome"]["results"].is_array());
        assert_eq!(value["overwrite"], true);
        assert!(value.get("completedSteps").is_none());
        assert!(value.get("isComplete").is_none());

        let running = serde_json::to_value(event(Transition::Running)).unwrap();
        assert_eq!(running["status"], "running");
        assert_eq!(running["overwrite"], false);
    }

    #[test]
    fn test_terminal_progress_event_wire_format() {
        let mut finished = event(Transition::Completed { outcome: None });
        finished.id = StepId::PROGRESS;
        finished.kind = EventKind::Progress;
        finished.is_complete = true;
        finished.completed_steps = Some(9);
        finished.total_steps = Some(9);

        let value = serde_json::to_value(&finished).unwrap();
        assert_eq!(value["id"], "research-progress");
        assert_eq!(value["isComplete"], true);
        assert_eq!(value["overwrite"], true);
        assert_eq!(value["completedSteps"], 9);
        assert!(value.get("outcome").is_none());
    }

    #[test]
    fn test_error_event_round_trip() {
        let original = event(Transition::Error {
            reason: "Search provider error (tavily): 503".to_string(),
        });
        let json = serde_json::to_string(&original).unwrap();
        let back: ProgressEvent = serde_json::from_str(&json).unwrap();

        assert!(back.is_error());
        assert!(back.overwrite);
        assert_eq!(back.id, original.id);
    }

    #[test]
    fn test_running_is_additive() {
        let running = event(Transition::Running);
        assert!(!running.overwrite);
        assert!(running.outcome().is_none());
    }
}
