use crate::agent::core::ModelCall;
use crate::agent::prompts;
use crate::models::WebFetch;
use std::sync::Arc;
use tracing::{debug, warn};

/// How each fetched page is condensed before synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condense {
    /// Narrative summary of the question-relevant material.
    Narrative,
    /// Code excerpts only.
    CodeOnly,
    /// No model call; the page text is used as is.
    Raw,
}

pub struct ContentSummarizer {
    model: ModelCall,
    fetch: Arc<dyn WebFetch>,
}

impl ContentSummarizer {
    pub fn new(model: ModelCall, fetch: Arc<dyn WebFetch>) -> Self {
        Self { model, fetch }
    }

    /// Fetch every link and condense it. Each excerpt is headed by its
    /// source link so the synthesizer can cite it. Pages that fail to load or
    /// to condense are skipped.
    pub async fn condense(&self, question: &str, links: &[String], style: Condense) -> String {
        let mut context = String::new();

        for link in links {
            let page = self.fetch.fetch(link).await;
            if page.is_empty() {
                warn!(url = %link, "No content fetched, skipping");
                continue;
            }

            let excerpt = match style {
                Condense::Raw => page,
                Condense::Narrative => {
                    self.ask(link, &prompts::research_summary_system(), &page, question,
                        "Get the information relevant to the question from this web page")
                        .await
                }
                Condense::CodeOnly => {
                    self.ask(link, &prompts::code_extract_system(), &page, question,
                        "Get the code examples relevant to the question from this web page")
                        .await
                }
            };

            if excerpt.trim().is_empty() {
                continue;
            }
            debug!(url = %link, "Condensed page to {} characters", excerpt.len());
            context.push_str(&format!("# Source: {}\n{}\n\n", link, excerpt));
        }

        context
    }

    async fn ask(&self, link: &str, system: &str, page: &str, question: &str, instruction: &str) -> String {
        match self.model.text(system, &prompts::page_prompt(page, question, instruction)).await {
            Ok(response) => response.response,
            Err(e) => {
                warn!(url = %link, "Failed to condense page: {}", e);
                String::new()
            }
        }
    }
}
