//! Follow-up queries derived from knowledge gaps

use reason_core::{Depth, GapAnalysis, QuerySource, SearchQuery};

/// Whether the deepening loop (and therefore the synthesis) runs
pub fn should_deepen(depth: Depth, gaps: &GapAnalysis) -> bool {
    depth.is_advanced() && gaps.has_gaps()
}

/// One query per `additional_query` of every gap, in gap order
///
/// The rationale is the gap's reason and the source is always `both`, so each
/// follow-up runs a web search and then an academic search.
pub fn gap_queries(gaps: &GapAnalysis, priority: u8) -> Vec<SearchQuery> {
    gaps.knowledge_gaps
        .iter()
        .flat_map(|gap| {
            gap.additional_queries.iter().map(move |query| SearchQuery {
                query: query.clone(),
                rationale: gap.reason.clone(),
                source: QuerySource::Both,
                priority,
            })
        })
        .collect()
}
