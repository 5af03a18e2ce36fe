use crate::config::{Limits, Settings};
use crate::error::Result;
use crate::models::{
    InferenceProvider, InferenceRequest, InferenceResponse, SearchClient, Tier, WebFetch,
};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// The external capabilities a pipeline is composed from.
#[derive(Clone)]
pub struct Collaborators {
    pub inference: Arc<dyn InferenceProvider>,
    pub search: Arc<dyn SearchClient>,
    pub fetch: Arc<dyn WebFetch>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("inference", &self.inference.name())
            .finish()
    }
}

/// A model, deadline and temperature bound to one provider.
#[derive(Clone)]
pub struct ModelCall {
    provider: Arc<dyn InferenceProvider>,
    model: String,
    timeout: Duration,
    temperature: f32,
}

impl ModelCall {
    pub fn new(provider: Arc<dyn InferenceProvider>, model: impl Into<String>, timeout: Duration, temperature: f32) -> Self {
        Self {
            provider,
            model: model.into(),
            timeout,
            temperature,
        }
    }

    /// Light or heavy tier with the quick deadline.
    pub fn quick(provider: &Arc<dyn InferenceProvider>, tier: Tier, settings: &Settings, limits: &Limits) -> Self {
        Self::new(provider.clone(), tier.model(settings), limits.quick_timeout(), limits.temperature)
    }

    /// Light or heavy tier with the long synthesis deadline.
    pub fn long(provider: &Arc<dyn InferenceProvider>, tier: Tier, settings: &Settings, limits: &Limits) -> Self {
        Self::new(provider.clone(), tier.model(settings), limits.synthesis_timeout(), limits.temperature)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request(&self, system: &str, prompt: &str) -> InferenceRequest {
        InferenceRequest::new(self.model.as_str(), system, prompt)
            .with_temperature(self.temperature)
            .with_timeout(self.timeout)
    }

    pub async fn text(&self, system: &str, prompt: &str) -> Result<InferenceResponse> {
        self.provider.generate(&self.request(system, prompt)).await
    }

    /// Structured call; malformed output decodes to `T::default()`.
    pub async fn structured<T>(&self, system: &str, prompt: &str) -> Result<T>
    where
        T: JsonSchema + DeserializeOwned + Default,
    {
        Ok(self.try_structured::<T>(system, prompt).await?.unwrap_or_default())
    }

    /// Structured call that reports malformed output as `None`.
    pub async fn try_structured<T>(&self, system: &str, prompt: &str) -> Result<Option<T>>
    where
        T: JsonSchema + DeserializeOwned,
    {
        let request = self.request(system, prompt).structured::<T>();
        let response = self.provider.generate(&request).await?;
        Ok(response.try_structured())
    }
}
