//! Mode controller: composes planner, search, link selection, condensation
//! and synthesis differently for each [`Mode`].

use crate::agent::core::{Collaborators, ModelCall};
use crate::agent::links::{dedup_links, LinkSelector};
use crate::agent::planner::{PlanRules, QueryPlanner};
use crate::agent::prompts::{self, DateHint};
use crate::agent::retrieval::gather_search_context;
use crate::agent::session::{Mode, SessionState};
use crate::agent::summarizer::{Condense, ContentSummarizer};
use crate::agent::synthesizer::{SynthesisInput, Synthesizer};
use crate::config::Limits;
use crate::error::Result;
use crate::models::{Decision, Tier};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Result of one question.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub sources: Vec<String>,
    /// Prompt token count reported by the synthesis call.
    pub prompt_eval_count: u64,
    /// The mode that actually ran (`Auto` resolves to `Search` or `Normal`).
    pub mode: Mode,
}

/// Per-turn inputs shared by every stage.
struct Turn<'a> {
    question: &'a str,
    history: String,
    attachment: Option<String>,
    date: DateHint,
}

impl<'a> Turn<'a> {
    fn input<'b>(&'b self, context: &'b str) -> SynthesisInput<'b> {
        SynthesisInput {
            context,
            history: &self.history,
            attachment: self.attachment.as_deref(),
            question: self.question,
        }
    }
}

pub struct ModeController {
    collaborators: Collaborators,
    limits: Limits,
}

impl ModeController {
    pub fn new(collaborators: Collaborators, limits: Limits) -> Self {
        Self {
            collaborators,
            limits,
        }
    }

    /// Answer `question` with the session's current mode. Persistence is
    /// left to the caller.
    pub async fn execute(&self, question: &str, session: &SessionState) -> Result<Answer> {
        let turn = Turn {
            question,
            history: session.memory.history_for_model(),
            attachment: session.attachment(),
            date: DateHint::now(),
        };

        let mode = match session.mode {
            Mode::Auto => self.classify(session, question).await,
            other => other,
        };
        info!("Answering in {} mode", mode);

        match mode {
            Mode::Search | Mode::Auto => self.search(session, &turn).await,
            Mode::Normal => self.normal(session, &turn).await,
            Mode::Research => self.condensed(session, &turn, Mode::Research).await,
            Mode::Code => self.condensed(session, &turn, Mode::Code).await,
            Mode::FastCode => self.condensed(session, &turn, Mode::FastCode).await,
        }
    }

    fn quick(&self, session: &SessionState, tier: Tier) -> ModelCall {
        ModelCall::quick(&self.collaborators.inference, tier, &session.settings, &self.limits)
    }

    fn long(&self, session: &SessionState, tier: Tier) -> ModelCall {
        ModelCall::long(&self.collaborators.inference, tier, &session.settings, &self.limits)
    }

    /// Decide whether a question needs the web. Failure means search.
    async fn classify(&self, session: &SessionState, question: &str) -> Mode {
        let prompt = format!("Question: {}", question);
        match self
            .quick(session, Tier::Light)
            .try_structured::<Decision>(&prompts::classify_system(), &prompt)
            .await
        {
            Ok(Some(Decision { decision: true })) => Mode::Search,
            Ok(Some(Decision { decision: false })) => Mode::Normal,
            Ok(None) => {
                warn!("Search classification was unreadable, defaulting to search");
                Mode::Search
            }
            Err(e) => {
                warn!("Search classification failed, defaulting to search: {}", e);
                Mode::Search
            }
        }
    }

    async fn normal(&self, session: &SessionState, turn: &Turn<'_>) -> Result<Answer> {
        let response = Synthesizer::new(self.long(session, Tier::Heavy))
            .synthesize(&prompts::normal_system(&turn.date), &turn.input(""))
            .await?;

        Ok(Answer {
            text: response.response,
            sources: Vec::new(),
            prompt_eval_count: response.prompt_eval_count,
            mode: Mode::Normal,
        })
    }

    async fn search(&self, session: &SessionState, turn: &Turn<'_>) -> Result<Answer> {
        let queries = QueryPlanner::new(self.quick(session, Tier::Light))
            .generate(turn.question, &turn.history, turn.attachment.as_deref(), PlanRules::SEARCH)
            .await;

        let context = if queries.is_empty() {
            debug!("No queries planned, answering without search results");
            String::new()
        } else {
            gather_search_context(self.collaborators.search.as_ref(), &queries).await
        };

        let response = Synthesizer::new(self.long(session, Tier::Heavy))
            .synthesize(&prompts::search_system(&turn.date), &turn.input(&context))
            .await?;

        let sources = cited_links(&response.response, &context);
        Ok(Answer {
            text: response.response,
            sources,
            prompt_eval_count: response.prompt_eval_count,
            mode: Mode::Search,
        })
    }

    /// Research, Code and FastCode: plan, search, select links with one hop
    /// of expansion, condense each page, then synthesize.
    async fn condensed(&self, session: &SessionState, turn: &Turn<'_>, mode: Mode) -> Result<Answer> {
        let links = self.discover_links(session, turn).await;

        let (style, system, tier) = match mode {
            Mode::Research => (Condense::Narrative, prompts::research_system(&turn.date), Tier::Heavy),
            Mode::Code => (Condense::CodeOnly, prompts::code_system(&turn.date), Tier::Heavy),
            _ => (Condense::Raw, prompts::code_system(&turn.date), Tier::Light),
        };

        let context = ContentSummarizer::new(self.long(session, Tier::Light), self.collaborators.fetch.clone())
            .condense(turn.question, &links, style)
            .await;

        let response = Synthesizer::new(self.long(session, tier))
            .synthesize(&system, &turn.input(&context))
            .await?;

        Ok(Answer {
            text: response.response,
            sources: links,
            prompt_eval_count: response.prompt_eval_count,
            mode,
        })
    }

    async fn discover_links(&self, session: &SessionState, turn: &Turn<'_>) -> Vec<String> {
        let attachment = turn.attachment.as_deref();
        let queries = QueryPlanner::new(self.quick(session, Tier::Light))
            .generate(turn.question, &turn.history, attachment, PlanRules::FOCUSED)
            .await;

        let context = gather_search_context(self.collaborators.search.as_ref(), &queries).await;

        LinkSelector::new(self.quick(session, Tier::Light), self.collaborators.fetch.clone())
            .select(turn.question, &context, &turn.history, attachment)
            .await
    }
}

fn url_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r#"https?://[^\s<>()\[\]"'`|]+"#).ok())
        .as_ref()
}

fn urls_in(text: &str) -> Vec<String> {
    let Some(pattern) = url_pattern() else {
        return Vec::new();
    };
    pattern
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']).to_string())
        .collect()
}

/// Links the answer cites that also appear in the search context.
pub fn cited_links(answer: &str, context: &str) -> Vec<String> {
    let available = urls_in(context);
    let cited: Vec<String> = urls_in(answer)
        .into_iter()
        .filter(|url| available.contains(url))
        .collect();
    dedup_links([cited])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cited_links_only_from_context() {
        let context = "Original query: paris weather\n\nResults: [Forecast](https://weather.example/paris) sunny";
        let answer = "Sunny tomorrow ([source](https://weather.example/paris)). See also https://made-up.example.";
        assert_eq!(cited_links(answer, context), vec!["https://weather.example/paris".to_string()]);
    }

    #[test]
    fn test_trailing_punctuation_is_trimmed() {
        assert_eq!(urls_in("see https://a.example/x."), vec!["https://a.example/x".to_string()]);
    }
}
