//! Normalized search results shared by every later phase

use serde::{Deserialize, Serialize};

use crate::plan::{ResultSource, SearchQuery};

/// One normalized hit from a search provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultRecord {
    pub source: ResultSource,
    pub title: String,
    pub url: String,
    pub content: String,
}

/// Results of a single search step, tagged with the query that produced them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultGroup {
    #[serde(rename = "type")]
    pub source: ResultSource,
    pub query: SearchQuery,
    pub results: Vec<SearchResultRecord>,
}

/// Append-only, step-ordered collection of search results
///
/// Groups are only ever pushed; nothing is removed or reordered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchResultSet {
    groups: Vec<SearchResultGroup>,
}

impl SearchResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, group: SearchResultGroup) {
        self.groups.push(group);
    }

    pub fn groups(&self) -> &[SearchResultGroup] {
        &self.groups
    }

    pub fn last(&self) -> Option<&SearchResultGroup> {
        self.groups.last()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total hits across all groups
    pub fn record_count(&self) -> usize {
        self.groups.iter().map(|g| g.results.len()).sum()
    }

    /// JSON rendering used when feeding the set into a reasoning prompt
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string(&self.groups).unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::QuerySource;

    fn group(source: ResultSource, hits: usize) -> SearchResultGroup {
        SearchResultGroup {
            source,
            query: SearchQuery {
                query: "solid state batteries".to_string(),
                rationale: "state of the art".to_string(),
                source: QuerySource::Both,
                priority: 2,
            },
            results: (0..hits)
                .map(|i| SearchResultRecord {
                    source,
                    title: format!("Result {}", i),
                    url: format!("https://example.com/{}", i),
                    content: "content".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_append_keeps_order() {
        let mut set = SearchResultSet::new();
        set.push(group(ResultSource::Web, 2));
        set.push(group(ResultSource::Academic, 0));
        set.push(group(ResultSource::Web, 3));

        assert_eq!(set.len(), 3);
        assert_eq!(set.record_count(), 5);
        assert_eq!(set.groups()[1].source, ResultSource::Academic);
        assert_eq!(set.last().map(|g| g.results.len()), Some(3));
    }

    #[test]
    fn test_prompt_json_shape() {
        let mut set = SearchResultSet::new();
        set.push(group(ResultSource::Academic, 1));

        let value: serde_json::Value = serde_json::from_str(&set.to_prompt_json()).unwrap();
        assert_eq!(value[0]["type"], "academic");
        assert_eq!(value[0]["query"]["query"], "solid state batteries");
        assert_eq!(value[0]["results"][0]["source"], "academic");
    }
}
