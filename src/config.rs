use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub settings: Settings,
    pub limits: Limits,
    pub data_dir: Option<PathBuf>,
}

/// Model and endpoint selection, fixed for the lifetime of the process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub heavy_model: String,
    pub light_model: String,
    pub inference_url: String,
    pub search_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            heavy_model: "qwen-32k".to_string(),
            light_model: "gemma-128k".to_string(),
            inference_url: "http://localhost:11434".to_string(),
            search_url: "http://localhost:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Deadline for classification, planning and link selection calls.
    pub quick_timeout_seconds: u64,
    /// Deadline for summarization and final synthesis calls.
    pub synthesis_timeout_seconds: u64,
    pub fetch_timeout_seconds: u64,
    pub provider_retries: u32,
    pub retry_backoff_ms: u64,
    pub progress_interval_ms: u64,
    pub temperature: f32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            quick_timeout_seconds: 60,
            synthesis_timeout_seconds: 300,
            fetch_timeout_seconds: 30,
            provider_retries: 2,
            retry_backoff_ms: 500,
            progress_interval_ms: 1000,
            temperature: 0.2,
        }
    }
}

impl Limits {
    pub fn quick_timeout(&self) -> Duration {
        Duration::from_secs(self.quick_timeout_seconds)
    }

    pub fn synthesis_timeout(&self) -> Duration {
        Duration::from_secs(self.synthesis_timeout_seconds)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }
}

impl Config {
    /// Load `config.toml` from the working directory or the data directory,
    /// then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut candidates = vec![std::env::current_dir()?.join("config.toml")];
        if let Ok(dir) = crate::utils::paths::get_scout_data_dir() {
            candidates.push(dir.join("config.toml"));
        }

        let mut config = match candidates.iter().find(|p| p.exists()) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Reading configuration from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("OLLAMA_URL") {
            self.settings.inference_url = url;
        }
        if let Ok(url) = std::env::var("SEARXNG_URL") {
            self.settings.search_url = url;
        }
        if let Ok(model) = std::env::var("HEAVY_MODEL") {
            self.settings.heavy_model = model;
        }
        if let Ok(model) = std::env::var("LIGHT_MODEL") {
            self.settings.light_model = model;
        }
        if let Ok(dir) = std::env::var("SCOUT_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                Ok(dir.clone())
            }
            None => crate::utils::paths::get_scout_data_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [settings]
            heavy_model = "llama3:70b"

            [limits]
            quick_timeout_seconds = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.settings.heavy_model, "llama3:70b");
        assert_eq!(config.settings.light_model, "gemma-128k");
        assert_eq!(config.limits.quick_timeout(), Duration::from_secs(5));
        assert_eq!(config.limits.synthesis_timeout_seconds, 300);
        assert!(config.data_dir.is_none());
    }
}
