//! # Scout
//!
//! A conversational research assistant backed by a local Ollama server and a
//! SearxNG instance.
//!
//! ## Features
//!
//! - Mode-driven answering: search, research, normal, code, fast-code and auto
//! - Query planning and two-phase link discovery with one hop of expansion
//! - Conversation memories persisted as JSON snapshots with a SQLite catalog
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use scout::agent::{Collaborators, ModeController, SessionState};
//! use scout::providers::OllamaProvider;
//! use scout::tools::{HttpFetcher, SearxngClient};
//! use scout::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let limits = config.limits.clone();
//!     let collaborators = Collaborators {
//!         inference: Arc::new(OllamaProvider::new(&config.settings, &limits)?),
//!         search: Arc::new(SearxngClient::new(&config.settings.search_url, limits.fetch_timeout())?),
//!         fetch: Arc::new(HttpFetcher::new(limits.fetch_timeout())?),
//!     };
//!
//!     let controller = ModeController::new(collaborators, limits);
//!     let session = SessionState::new(config.settings);
//!     let answer = controller.execute("What is the weather in Paris?", &session).await?;
//!     println!("{}", answer.text);
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod providers;
pub mod tools;
pub mod utils;

pub use agent::{Answer, Mode, ModeController, SessionState};
pub use config::{Config, Limits, Settings};
pub use error::{ErrorKind, Result, ScoutError};
pub use models::{InferenceProvider, InferenceRequest, InferenceResponse, SearchClient, WebFetch};
