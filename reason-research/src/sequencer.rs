//! Expands a research plan into ordered, addressable steps

use reason_core::{ResearchPlan, Step, StepId, StepKind};

/// Ordered steps derived from one plan
#[derive(Debug, Clone, PartialEq)]
pub struct StepSequence {
    pub search_steps: Vec<Step>,
    pub analysis_steps: Vec<Step>,
}

impl StepSequence {
    pub fn total_steps(&self) -> usize {
        self.search_steps.len() + self.analysis_steps.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = StepId> + '_ {
        self.search_steps
            .iter()
            .chain(self.analysis_steps.iter())
            .map(|s| s.id)
    }
}

/// Derive the step list for a plan
///
/// Search step ids use the query's position in the plan, so a `both` query
/// yields a web and an academic step sharing one index. Analysis steps are
/// numbered by their own position.
pub fn sequence_plan(plan: &ResearchPlan) -> StepSequence {
    let search_steps = plan
        .search_queries
        .iter()
        .enumerate()
        .flat_map(|(index, query)| {
            query.source.providers().iter().map(move |&source| Step {
                id: StepId::search(source, index),
                kind: StepKind::Search {
                    source,
                    query: query.clone(),
                },
            })
        })
        .collect();

    let analysis_steps = plan
        .required_analyses
        .iter()
        .enumerate()
        .map(|(index, analysis)| Step {
            id: StepId::analysis(index),
            kind: StepKind::Analysis(analysis.clone()),
        })
        .collect();

    StepSequence {
        search_steps,
        analysis_steps,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use reason_core::{QuerySource, RequiredAnalysis, ResultSource, SearchQuery};

    use super::*;

    fn plan(sources: &[QuerySource], analyses: usize) -> ResearchPlan {
        ResearchPlan {
            search_queries: sources
                .iter()
                .enumerate()
                .map(|(i, &source)| SearchQuery {
                    query: format!("query {}", i),
                    rationale: "coverage".to_string(),
                    source,
                    priority: 1 + (i % 5) as u8,
                })
                .collect(),
            required_analyses: (0..analyses)
                .map(|i| RequiredAnalysis {
                    analysis_type: format!("kind-{}", i),
                    description: "describe".to_string(),
                    importance: 3,
                })
                .collect(),
        }
    }

    #[test]
    fn test_both_expands_to_two_steps_sharing_index() {
        let sequence = sequence_plan(&plan(
            &[
                QuerySource::Web,
                QuerySource::Both,
                QuerySource::Academic,
                QuerySource::Web,
            ],
            2,
        ));

        let ids: Vec<String> = sequence.ids().map(|id| id.to_string()).collect();
        assert_eq!(
            ids,
            vec![
                "search-web-0",
                "search-web-1",
                "search-academic-1",
                "search-academic-2",
                "search-web-3",
                "analysis-0",
                "analysis-1",
            ]
        );

        let both: Vec<&Step> = sequence
            .search_steps
            .iter()
            .filter(|s| s.id.index == Some(1))
            .collect();
        assert_eq!(both.len(), 2);
        assert_eq!(both[0].id.source, Some(ResultSource::Web));
        assert_eq!(both[1].id.source, Some(ResultSource::Academic));
    }

    #[test]
    fn test_ids_unique_and_total_matches_for_any_mix() {
        let sources = [QuerySource::Web, QuerySource::Academic, QuerySource::Both];
        for queries in 4..=12 {
            for analyses in 2..=8 {
                for rotation in 0..3 {
                    let mix: Vec<QuerySource> = (0..queries)
                        .map(|i| sources[(i + rotation) % 3])
                        .collect();
                    let plan = plan(&mix, analyses);
                    let sequence = sequence_plan(&plan);

                    let ids: HashSet<StepId> = sequence.ids().collect();
                    assert_eq!(ids.len(), sequence.total_steps());
                    assert_eq!(
                        sequence.total_steps(),
                        sequence.search_steps.len() + sequence.analysis_steps.len()
                    );
                    assert_eq!(sequence.total_steps(), plan.derived_step_count());

                    let both_count = mix.iter().filter(|s| **s == QuerySource::Both).count();
                    assert_eq!(sequence.search_steps.len(), queries + both_count);
                }
            }
        }
    }

    #[test]
    fn test_sequencing_is_deterministic() {
        let plan = plan(&[QuerySource::Both; 5], 3);
        assert_eq!(sequence_plan(&plan), sequence_plan(&plan));
    }
}
