use crate::models::SearchClient;
use tracing::{debug, warn};

const FIRST_PAGE: u32 = 1;

/// Run every query against the search engine and concatenate the result
/// regions. A failed query is logged and skipped.
pub async fn gather_search_context(search: &dyn SearchClient, queries: &[String]) -> String {
    let mut context = String::new();

    for query in queries {
        let query = query.trim();
        if query.is_empty() {
            continue;
        }

        match search.search(query, FIRST_PAGE).await {
            Ok(results) => {
                debug!(query, "Collected {} characters of results", results.len());
                context.push_str(&format!("Original query: {}\n\nResults: {}\n\n", query, results));
            }
            Err(e) => warn!(query, "Search failed, skipping: {}", e),
        }
    }

    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, ScoutError};
    use async_trait::async_trait;

    struct FlakySearch;

    #[async_trait]
    impl SearchClient for FlakySearch {
        async fn search(&self, query: &str, _page: u32) -> Result<String> {
            if query.contains("broken") {
                Err(ScoutError::fetch("http://searx.local/search", "status 500"))
            } else {
                Ok(format!("results for {}", query))
            }
        }
    }

    #[tokio::test]
    async fn test_failed_query_is_skipped() {
        let queries = vec![
            "first query".to_string(),
            "broken query".to_string(),
            "  ".to_string(),
            "last query".to_string(),
        ];
        let context = gather_search_context(&FlakySearch, &queries).await;

        assert!(context.contains("results for first query"));
        assert!(context.contains("results for last query"));
        assert!(!context.contains("broken"));
        assert!(context.find("first query").unwrap() < context.find("last query").unwrap());
    }
}
