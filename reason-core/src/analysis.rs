//! Outputs of the reasoning calls: analyses, gap analysis and synthesis

use serde::{Deserialize, Serialize};

/// A single model-produced insight
///
/// `confidence` is the model's own reliability estimate in `0..=1`,
/// not a measured statistic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFinding {
    pub insight: String,
    #[serde(default)]
    pub evidence: Vec<String>,
    pub confidence: f64,
}

/// Result of one planned analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub findings: Vec<AnalysisFinding>,
    #[serde(default)]
    pub implications: Vec<String>,
    #[serde(default)]
    pub limitations: Vec<String>,
}

impl AnalysisResult {
    pub fn validate(&self) -> Result<(), String> {
        validate_confidences(self.findings.iter().map(|f| (f.insight.as_str(), f.confidence)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limitation {
    #[serde(rename = "type")]
    pub limitation_type: String,
    pub description: String,
    /// Requested in `2..=10`, not enforced
    #[serde(deserialize_with = "crate::number::integral")]
    pub severity: i64,
    #[serde(default)]
    pub potential_solutions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGap {
    pub topic: String,
    pub reason: String,
    #[serde(default)]
    pub additional_queries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUp {
    pub action: String,
    pub rationale: String,
    /// Requested in `2..=10`, not enforced
    #[serde(deserialize_with = "crate::number::integral")]
    pub priority: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    #[serde(default)]
    pub limitations: Vec<Limitation>,
    #[serde(default)]
    pub knowledge_gaps: Vec<KnowledgeGap>,
    #[serde(default)]
    pub recommended_followup: Vec<FollowUp>,
}

impl GapAnalysis {
    pub fn has_gaps(&self) -> bool {
        !self.knowledge_gaps.is_empty()
    }

    /// Number of follow-up queries the deepening loop would issue
    pub fn additional_query_count(&self) -> usize {
        self.knowledge_gaps
            .iter()
            .map(|g| g.additional_queries.len())
            .sum()
    }

    /// Limitations projected onto findings for progress consumers.
    /// Severity 1 maps to confidence 1.0, 6 and above to 0.0.
    pub fn limitation_findings(&self) -> Vec<AnalysisFinding> {
        self.limitations
            .iter()
            .map(|l| AnalysisFinding {
                insight: l.description.clone(),
                evidence: l.potential_solutions.clone(),
                confidence: (6i64.saturating_sub(l.severity) as f64 / 5.0).clamp(0.0, 1.0),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyFinding {
    pub finding: String,
    pub confidence: f64,
    #[serde(default)]
    pub supporting_evidence: Vec<String>,
}

/// Final cross-cutting summary, only produced for advanced runs with gaps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synthesis {
    pub key_findings: Vec<KeyFinding>,
    #[serde(default)]
    pub remaining_uncertainties: Vec<String>,
}

impl Synthesis {
    pub fn validate(&self) -> Result<(), String> {
        if self.key_findings.is_empty() {
            return Err("synthesis has no key findings".to_string());
        }
        validate_confidences(
            self.key_findings
                .iter()
                .map(|f| (f.finding.as_str(), f.confidence)),
        )
    }

    pub fn as_findings(&self) -> Vec<AnalysisFinding> {
        self.key_findings
            .iter()
            .map(|f| AnalysisFinding {
                insight: f.finding.clone(),
                evidence: f.supporting_evidence.clone(),
                confidence: f.confidence,
            })
            .collect()
    }
}

fn validate_confidences<'a>(items: impl Iterator<Item = (&'a str, f64)>) -> Result<(), String> {
    for (label, confidence) in items {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(format!(
                "confidence {} for '{}' outside 0-1",
                confidence, label
            ));
        }
    }
    Ok(())
}
