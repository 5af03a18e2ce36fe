use crate::agent::core::ModelCall;
use crate::agent::prompts::{self, DateHint};
use crate::models::{LinkList, WebFetch};
use indexmap::IndexSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Most links taken from any single selection round.
pub const MAX_LINKS: usize = 3;

/// Two-phase link discovery: pick links from search results, then pick links
/// again from each of those pages. Only the second round is returned.
pub struct LinkSelector {
    model: ModelCall,
    fetch: Arc<dyn WebFetch>,
}

impl LinkSelector {
    pub fn new(model: ModelCall, fetch: Arc<dyn WebFetch>) -> Self {
        Self { model, fetch }
    }

    pub async fn select(
        &self,
        question: &str,
        search_context: &str,
        history: &str,
        attachment: Option<&str>,
    ) -> Vec<String> {
        let date = DateHint::now();
        let system = prompts::link_selection_system(&date);

        let seeds = self
            .ask(&system, &prompts::build_prompt(search_context, attachment, history, question))
            .await;
        debug!("First round selected {} links", seeds.len());

        let mut expanded = Vec::new();
        for seed in &seeds {
            let seed = seed.trim();
            if seed.is_empty() {
                continue;
            }
            let page = self.fetch.fetch(seed).await;
            let prompt = prompts::build_prompt(&page, attachment, history, question);
            expanded.push(self.ask(&system, &prompt).await);
        }

        let links = dedup_links(expanded);
        debug!("Expansion produced {} distinct links", links.len());
        links
    }

    async fn ask(&self, system: &str, prompt: &str) -> Vec<String> {
        match self.model.structured::<LinkList>(system, prompt).await {
            Ok(list) => first_links(list.links),
            Err(e) => {
                warn!("Link selection failed, treating as no links: {}", e);
                Vec::new()
            }
        }
    }
}

/// The first `MAX_LINKS` non-blank entries of one selection round.
pub fn first_links(links: Vec<String>) -> Vec<String> {
    links
        .into_iter()
        .filter(|link| !link.trim().is_empty())
        .take(MAX_LINKS)
        .collect()
}

/// Union of link lists keyed by the exact string, in first-seen order.
/// Entries that are blank are dropped; nothing else is normalized.
pub fn dedup_links<I>(rounds: I) -> Vec<String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut seen: IndexSet<String> = IndexSet::new();
    for link in rounds.into_iter().flatten() {
        if link.trim().is_empty() {
            continue;
        }
        seen.insert(link);
    }
    seen.into_iter().collect()
}
