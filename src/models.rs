use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::warn;

use crate::config::Settings;
use crate::error::{Result, ScoutError};

/// Capability level of the inference provider used for a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Classification, planning, link selection and per-page extraction.
    Light,
    /// Final answer synthesis.
    Heavy,
}

impl Tier {
    pub fn model<'a>(&self, settings: &'a Settings) -> &'a str {
        match self {
            Tier::Light => &settings.light_model,
            Tier::Heavy => &settings.heavy_model,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub model: String,
    pub prompt: String,
    pub system: String,
    pub temperature: f32,
    /// JSON schema the response must follow, for structured calls.
    pub format: Option<serde_json::Value>,
    pub timeout: Duration,
}

impl InferenceRequest {
    pub fn new(model: impl Into<String>, system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: system.into(),
            temperature: 0.2,
            format: None,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Ask for output shaped like `T`.
    pub fn structured<T: JsonSchema>(mut self) -> Self {
        let schema = schemars::schema_for!(T);
        self.format = serde_json::to_value(schema).ok();
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InferenceResponse {
    pub response: String,
    #[serde(default)]
    pub prompt_eval_count: u64,
}

impl fmt::Display for InferenceResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.response)
    }
}

impl InferenceResponse {
    /// Decode a structured response, falling back to `T::default()` when the
    /// model produced something that isn't valid JSON for `T`.
    pub fn parse_structured<T: DeserializeOwned + Default>(&self) -> T {
        self.try_structured().unwrap_or_default()
    }

    /// Decode a structured response, or `None` when it doesn't match `T`.
    pub fn try_structured<T: DeserializeOwned>(&self) -> Option<T> {
        match serde_json::from_str(&self.response) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding malformed structured response: {}", e);
                None
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct QueryList {
    pub queries: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct LinkList {
    pub links: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Decision {
    pub decision: bool,
}

#[async_trait]
pub trait InferenceProvider: Send + Sync {
    async fn generate(&self, request: &InferenceRequest) -> Result<InferenceResponse>;
    fn name(&self) -> &str;
}

#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Returns the results region of one page of results, as text.
    async fn search(&self, query: &str, page: u32) -> Result<String>;
}

#[async_trait]
pub trait WebFetch: Send + Sync {
    /// Returns the page text, or an empty string on any failure.
    async fn fetch(&self, url: &str) -> String;
}

/// Running totals for one inference backend, shown by `/stats`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProviderMetrics {
    pub successes: u64,
    pub failures: u64,
    /// Summed wall time of successful calls, retries included.
    pub busy: Duration,
    pub last_error: Option<String>,
}

impl ProviderMetrics {
    pub fn record_success(&mut self, elapsed: Duration) {
        self.successes += 1;
        self.busy += elapsed;
    }

    pub fn record_failure(&mut self, error: &ScoutError) {
        self.failures += 1;
        self.last_error = Some(error.to_string());
    }

    pub fn requests(&self) -> u64 {
        self.successes + self.failures
    }

    pub fn mean_latency(&self) -> Option<Duration> {
        u32::try_from(self.successes)
            .ok()
            .filter(|n| *n > 0)
            .map(|n| self.busy / n)
    }
}

impl fmt::Display for ProviderMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} model calls, {} failed", self.requests(), self.failures)?;
        if let Some(mean) = self.mean_latency() {
            write!(f, ", {:.1}s average", mean.as_secs_f64())?;
        }
        if let Some(error) = &self.last_error {
            write!(f, "\nlast error: {}", error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_request_carries_schema() {
        let request = InferenceRequest::new("gemma", "sys", "prompt").structured::<LinkList>();
        let schema = request.format.expect("schema");
        assert!(schema["properties"]["links"].is_object());
    }

    #[test]
    fn test_malformed_structured_response_is_empty() {
        let response = InferenceResponse {
            response: "here are some links: https://a.example".to_string(),
            prompt_eval_count: 12,
        };
        let links: LinkList = response.parse_structured();
        assert!(links.links.is_empty());

        let ok = InferenceResponse {
            response: r#"{"decision": true}"#.to_string(),
            prompt_eval_count: 3,
        };
        assert!(ok.parse_structured::<Decision>().decision);
    }

    #[test]
    fn test_malformed_decision_is_not_a_no() {
        let response = InferenceResponse {
            response: "yes, search the web".to_string(),
            prompt_eval_count: 5,
        };
        assert_eq!(response.try_structured::<Decision>(), None);
    }

    #[test]
    fn test_metrics_summary() {
        let mut metrics = ProviderMetrics::default();
        assert_eq!(metrics.to_string(), "0 model calls, 0 failed");

        metrics.record_success(Duration::from_millis(1000));
        metrics.record_success(Duration::from_millis(2000));
        metrics.record_failure(&ScoutError::Provider("status 503".to_string()));
        assert_eq!(metrics.requests(), 3);
        assert_eq!(metrics.mean_latency(), Some(Duration::from_millis(1500)));
        assert_eq!(
            metrics.to_string(),
            "3 model calls, 1 failed, 1.5s average\nlast error: inference provider error: status 503"
        );
    }
}
