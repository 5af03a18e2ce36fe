use crate::config::{Limits, Settings};
use crate::error::{Result, ScoutError};
use crate::models::{InferenceProvider, InferenceRequest, InferenceResponse, ProviderMetrics};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

/// Client for an Ollama-compatible `/api/generate` endpoint.
pub struct OllamaProvider {
    base_url: String,
    client: Client,
    retries: u32,
    backoff: Duration,
    metrics: Arc<Mutex<ProviderMetrics>>,
}

impl OllamaProvider {
    pub fn new(settings: &Settings, limits: &Limits) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| ScoutError::Provider(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: settings.inference_url.trim_end_matches('/').to_string(),
            client,
            retries: limits.provider_retries,
            backoff: Duration::from_millis(limits.retry_backoff_ms),
            metrics: Arc::new(Mutex::new(ProviderMetrics::default())),
        })
    }

    pub async fn metrics(&self) -> ProviderMetrics {
        self.metrics.lock().await.clone()
    }

    fn payload(request: &InferenceRequest) -> Value {
        let mut payload = json!({
            "model": request.model,
            "prompt": request.prompt,
            "system": request.system,
            "stream": false,
            "options": {
                "temperature": request.temperature
            }
        });
        if let Some(format) = &request.format {
            payload["format"] = format.clone();
        }
        payload
    }

    async fn send_once(&self, request: &InferenceRequest) -> std::result::Result<InferenceResponse, Attempt> {
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .header("Content-Type", "application/json")
            .json(&Self::payload(request))
            .send()
            .await
            .map_err(|e| {
                Attempt::Transient(ScoutError::Provider(format!("request to {} failed: {}", self.base_url, e)))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ScoutError::Provider(format!("status {}: {}", status, body));
            return Err(if status.is_server_error() {
                Attempt::Transient(err)
            } else {
                Attempt::Fatal(err)
            });
        }

        response
            .json::<InferenceResponse>()
            .await
            .map_err(|e| Attempt::Fatal(ScoutError::MalformedResponse(e.to_string())))
    }

    /// Retry connection failures and 5xx responses with exponential backoff.
    /// Client errors and decode failures are returned immediately.
    async fn send_with_retry(&self, request: &InferenceRequest) -> Result<InferenceResponse> {
        let mut delay = self.backoff;
        let mut attempt = 0;
        loop {
            match self.send_once(request).await {
                Ok(response) => return Ok(response),
                Err(Attempt::Transient(e)) if attempt < self.retries => {
                    attempt += 1;
                    warn!(
                        model = %request.model,
                        "Inference attempt {} failed: {}. Retrying in {}ms...",
                        attempt,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(Attempt::Transient(e) | Attempt::Fatal(e)) => return Err(e),
            }
        }
    }
}

/// Outcome of a failed single request.
enum Attempt {
    Transient(ScoutError),
    Fatal(ScoutError),
}

#[async_trait]
impl InferenceProvider for OllamaProvider {
    async fn generate(&self, request: &InferenceRequest) -> Result<InferenceResponse> {
        let start = Instant::now();
        debug!(model = %request.model, structured = request.format.is_some(), "Sending inference request");

        let result = match tokio::time::timeout(request.timeout, self.send_with_retry(request)).await {
            Ok(result) => result,
            Err(_) => Err(ScoutError::ProviderTimeout {
                model: request.model.clone(),
                seconds: request.timeout.as_secs(),
            }),
        };

        let mut metrics = self.metrics.lock().await;
        match result {
            Ok(mut response) => {
                metrics.record_success(start.elapsed());
                response.response = response.response.trim().to_string();
                Ok(response)
            }
            Err(e) => {
                error!(model = %request.model, "Inference failed: {}", e);
                metrics.record_failure(&e);
                Err(e)
            }
        }
    }

    fn name(&self) -> &str {
        "Ollama"
    }
}
