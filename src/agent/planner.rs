use crate::agent::core::ModelCall;
use crate::agent::prompts::{self, DateHint};
use crate::models::QueryList;
use tracing::{debug, warn};

/// Count and shape limits applied to planned queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanRules {
    pub min_count: usize,
    pub max_count: usize,
    /// Queries with fewer words than this are dropped.
    pub min_words: usize,
}

impl PlanRules {
    /// Broad lookup: up to ten queries of any length.
    pub const SEARCH: PlanRules = PlanRules {
        min_count: 1,
        max_count: 10,
        min_words: 1,
    };

    /// Focused research and code lookups: one to three multi-word queries.
    pub const FOCUSED: PlanRules = PlanRules {
        min_count: 1,
        max_count: 3,
        min_words: 2,
    };
}

pub struct QueryPlanner {
    model: ModelCall,
}

impl QueryPlanner {
    pub fn new(model: ModelCall) -> Self {
        Self { model }
    }

    /// Turn a question into search queries. An empty result means "nothing
    /// to search for", including when the provider call fails.
    pub async fn generate(
        &self,
        question: &str,
        history: &str,
        attachment: Option<&str>,
        rules: PlanRules,
    ) -> Vec<String> {
        let system = prompts::planner_system(&DateHint::now(), rules.min_count, rules.max_count, rules.min_words);
        let prompt = prompts::build_prompt("", attachment, history, question);

        match self.model.structured::<QueryList>(&system, &prompt).await {
            Ok(list) => {
                let queries = normalize_queries(list.queries, rules);
                debug!("Planned {} queries: {:?}", queries.len(), queries);
                queries
            }
            Err(e) => {
                warn!("Query planning failed, continuing without search: {}", e);
                Vec::new()
            }
        }
    }
}

/// Split multi-line entries, trim, drop blanks and too-short queries, and cap
/// the count.
pub fn normalize_queries(raw: Vec<String>, rules: PlanRules) -> Vec<String> {
    raw.iter()
        .flat_map(|entry| entry.lines())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| line.split_whitespace().count() >= rules.min_words)
        .take(rules.max_count)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_focused_rules_drop_single_words() {
        let raw = owned(&["  rust async traits  ", "tokio", "", "serde derive enum tagging"]);
        assert_eq!(
            normalize_queries(raw, PlanRules::FOCUSED),
            owned(&["rust async traits", "serde derive enum tagging"])
        );
    }

    #[test]
    fn test_search_rules_keep_single_words_and_cap_at_ten() {
        let raw: Vec<String> = (0..14).map(|i| format!("q{}", i)).collect();
        let planned = normalize_queries(raw, PlanRules::SEARCH);
        assert_eq!(planned.len(), 10);
        assert_eq!(planned[0], "q0");
    }

    #[test]
    fn test_multiline_entry_is_split() {
        let raw = owned(&["paris weather\n\nparis forecast tomorrow"]);
        assert_eq!(
            normalize_queries(raw, PlanRules::SEARCH),
            owned(&["paris weather", "paris forecast tomorrow"])
        );
    }

    #[test]
    fn test_focused_cap_is_three() {
        let raw = owned(&["a b", "c d", "e f", "g h"]);
        assert_eq!(normalize_queries(raw, PlanRules::FOCUSED).len(), 3);
    }
}
