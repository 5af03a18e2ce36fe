#![allow(dead_code)]

use async_trait::async_trait;
use scout::agent::Collaborators;
use scout::{InferenceProvider, InferenceRequest, InferenceResponse, Result, ScoutError, SearchClient, WebFetch};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Which pipeline stage a request belongs to, recognised from its system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Classify,
    Plan,
    SelectLinks,
    Summarize,
    ExtractCode,
    Synthesize,
}

impl Stage {
    fn of(request: &InferenceRequest) -> Stage {
        let system = request.system.as_str();
        if system.contains("decide whether") {
            Stage::Classify
        } else if system.contains("into web search queries") {
            Stage::Plan
        } else if system.contains("Respond with 1-3 links") {
            Stage::SelectLinks
        } else if system.contains("extract information relevant") {
            Stage::Summarize
        } else if system.contains("You get code examples") {
            Stage::ExtractCode
        } else {
            Stage::Synthesize
        }
    }
}

pub type Reply = Box<dyn Fn() -> Result<InferenceResponse> + Send + Sync>;

/// Inference fake answering each stage with a canned reply and recording
/// every request it receives.
///
/// Replies scoped to prompts whose `[context]` section contains a marker
/// win over the stage-wide reply; the latest matching scope wins.
#[derive(Default)]
pub struct ScriptedModel {
    replies: HashMap<Stage, Reply>,
    scoped: Vec<(Stage, String, Reply)>,
    pub requests: Mutex<Vec<(Stage, InferenceRequest)>>,
}

fn text_reply(text: &str) -> Reply {
    let text = text.to_string();
    Box::new(move || {
        Ok(InferenceResponse {
            response: text.clone(),
            prompt_eval_count: 128,
        })
    })
}

fn context_of(prompt: &str) -> &str {
    let body = prompt.strip_prefix("[context]\n").unwrap_or(prompt);
    let end = ["\n[file]\n", "\n[history]\n"]
        .iter()
        .filter_map(|marker| body.find(marker))
        .min()
        .unwrap_or(body.len());
    &body[..end]
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, stage: Stage, text: &str) -> Self {
        self.replies.insert(stage, text_reply(text));
        self
    }

    pub fn fail(mut self, stage: Stage, make: fn() -> ScoutError) -> Self {
        self.replies.insert(stage, Box::new(move || Err(make())));
        self
    }

    /// Reply with `text` when the prompt's context contains `marker`.
    pub fn reply_when(mut self, stage: Stage, marker: &str, text: &str) -> Self {
        self.scoped.push((stage, marker.to_string(), text_reply(text)));
        self
    }

    /// Fail when the prompt's context contains `marker`.
    pub fn fail_when(mut self, stage: Stage, marker: &str, make: fn() -> ScoutError) -> Self {
        self.scoped.push((stage, marker.to_string(), Box::new(move || Err(make()))));
        self
    }

    pub fn calls(&self, stage: Stage) -> Vec<InferenceRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| *s == stage)
            .map(|(_, r)| r.clone())
            .collect()
    }
}

#[async_trait]
impl InferenceProvider for ScriptedModel {
    async fn generate(&self, request: &InferenceRequest) -> Result<InferenceResponse> {
        let stage = Stage::of(request);
        self.requests.lock().unwrap().push((stage, request.clone()));
        let context = context_of(&request.prompt);
        let scoped = self
            .scoped
            .iter()
            .rev()
            .find(|(s, marker, _)| *s == stage && context.contains(marker.as_str()))
            .map(|(_, _, reply)| reply);
        match scoped.or_else(|| self.replies.get(&stage)) {
            Some(reply) => reply(),
            None => Err(ScoutError::Provider(format!("no scripted reply for {:?}", stage))),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Search fake returning the same results for every query.
pub struct RecordingSearch {
    results: String,
    pub queries: Mutex<Vec<String>>,
}

impl RecordingSearch {
    pub fn new(results: &str) -> Self {
        Self {
            results: results.to_string(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchClient for RecordingSearch {
    async fn search(&self, query: &str, _page: u32) -> Result<String> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.results.clone())
    }
}

/// Fetch fake serving fixed pages; unknown URLs come back empty.
#[derive(Default)]
pub struct StaticPages {
    pages: HashMap<String, String>,
    pub fetched: Mutex<Vec<String>>,
}

impl StaticPages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, text: &str) -> Self {
        self.pages.insert(url.to_string(), text.to_string());
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebFetch for StaticPages {
    async fn fetch(&self, url: &str) -> String {
        self.fetched.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned().unwrap_or_default()
    }
}

pub fn collaborators(
    model: &Arc<ScriptedModel>,
    search: &Arc<RecordingSearch>,
    pages: &Arc<StaticPages>,
) -> Collaborators {
    Collaborators {
        inference: model.clone(),
        search: search.clone(),
        fetch: pages.clone(),
    }
}
