//! Run one query against one search provider and normalize the hits

use reason_core::{Depth, ResearchError, ResultSource, SearchResultRecord};
use tracing::{debug, instrument};

use crate::providers::{
    AcademicSearchOptions, AcademicSearchProvider, WebSearchOptions, WebSearchProvider,
};

/// Category sent with every academic search
pub const ACADEMIC_CATEGORY: &str = "research paper";

/// Higher-priority queries (lower number) get more results
pub fn results_for_priority(priority: u8, cap: u32) -> u32 {
    let wanted = 6u32.saturating_sub(u32::from(priority)).max(1);
    wanted.min(cap)
}

/// Search the web and normalize hits into records
#[instrument(skip(provider), fields(provider_name = provider.name()))]
pub async fn web_search(
    provider: &dyn WebSearchProvider,
    query: &str,
    depth: Depth,
    max_results: u32,
) -> Result<Vec<SearchResultRecord>, ResearchError> {
    let hits = provider
        .search(query, WebSearchOptions { depth, max_results })
        .await
        .map_err(|e| ResearchError::search_provider(provider.name(), e.to_string()))?;

    debug!("Web search returned {} hits", hits.len());

    Ok(hits
        .into_iter()
        .map(|hit| SearchResultRecord {
            source: ResultSource::Web,
            title: hit.title,
            url: hit.url,
            content: hit.content,
        })
        .collect())
}

/// Search academic sources; content comes from the provider's summary
#[instrument(skip(provider), fields(provider_name = provider.name()))]
pub async fn academic_search(
    provider: &dyn AcademicSearchProvider,
    query: &str,
    num_results: u32,
) -> Result<Vec<SearchResultRecord>, ResearchError> {
    let options = AcademicSearchOptions {
        num_results,
        category: ACADEMIC_CATEGORY.to_string(),
    };
    let hits = provider
        .search(query, options)
        .await
        .map_err(|e| ResearchError::search_provider(provider.name(), e.to_string()))?;

    debug!("Academic search returned {} hits", hits.len());

    Ok(hits
        .into_iter()
        .map(|hit| SearchResultRecord {
            source: ResultSource::Academic,
            title: hit.title.unwrap_or_default(),
            url: hit.url.unwrap_or_default(),
            content: hit.summary.unwrap_or_default(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::providers::{AcademicHit, WebHit};

    #[derive(Default)]
    struct RecordingWeb {
        calls: Mutex<Vec<(String, WebSearchOptions)>>,
        fail: bool,
    }

    #[async_trait]
    impl WebSearchProvider for RecordingWeb {
        fn name(&self) -> &'static str {
            "recording-web"
        }

        async fn search(
            &self,
            query: &str,
            options: WebSearchOptions,
        ) -> Result<Vec<WebHit>, ResearchError> {
            self.calls
                .lock()
                .unwrap()
                .push((query.to_string(), options));
            if self.fail {
                return Err(ResearchError::api("HTTP 429"));
            }
            Ok(vec![WebHit {
                title: "Hit".to_string(),
                url: "https://example.com".to_string(),
                content: "body".to_string(),
            }])
        }
    }

    struct SparseAcademic;

    #[async_trait]
    impl AcademicSearchProvider for SparseAcademic {
        fn name(&self) -> &'static str {
            "sparse-academic"
        }

        async fn search(
            &self,
            _query: &str,
            options: AcademicSearchOptions,
        ) -> Result<Vec<AcademicHit>, ResearchError> {
            assert_eq!(options.category, ACADEMIC_CATEGORY);
            Ok(vec![
                AcademicHit {
                    title: Some("Paper".to_string()),
                    url: Some("https://arxiv.org/abs/1".to_string()),
                    summary: Some("Abstract".to_string()),
                },
                AcademicHit::default(),
            ])
        }
    }

    #[test]
    fn test_results_for_priority() {
        assert_eq!(results_for_priority(1, 10), 5);
        assert_eq!(results_for_priority(5, 10), 1);
        assert_eq!(results_for_priority(1, 3), 3);
        // Out-of-range priorities still request at least one result
        assert_eq!(results_for_priority(9, 10), 1);
    }

    #[tokio::test]
    async fn test_web_search_normalizes_and_forwards_options() {
        let provider = RecordingWeb::default();
        let records = web_search(&provider, "grid storage", Depth::Advanced, 4)
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, ResultSource::Web);
        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls[0].0, "grid storage");
        assert_eq!(calls[0].1.depth, Depth::Advanced);
        assert_eq!(calls[0].1.max_results, 4);
    }

    #[tokio::test]
    async fn test_web_search_failure_is_provider_error() {
        let provider = RecordingWeb {
            fail: true,
            ..Default::default()
        };
        let err = web_search(&provider, "q", Depth::Basic, 1).await.unwrap_err();
        assert!(matches!(
            err,
            ResearchError::SearchProvider { ref provider, .. } if provider == "recording-web"
        ));
    }

    #[tokio::test]
    async fn test_academic_search_fills_missing_fields() {
        let records = academic_search(&SparseAcademic, "q", 3).await.unwrap();
        assert_eq!(records[0].content, "Abstract");
        assert_eq!(records[1].title, "");
        assert_eq!(records[1].url, "");
        assert!(records.iter().all(|r| r.source == ResultSource::Academic));
    }
}
