use super::html;
use crate::error::{Result, ScoutError};
use crate::models::{SearchClient, WebFetch};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, PRAGMA};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info, warn};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:147.0) Gecko/20100101 Firefox/147.0";

fn browser_client(timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));

    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .build()
        .map_err(|e| ScoutError::Provider(format!("failed to build HTTP client: {}", e)))
}

fn is_valid_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Page fetcher that presents itself as a desktop browser.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: browser_client(timeout)?,
        })
    }

    /// Fetch and convert a page, reporting why it failed.
    pub async fn try_fetch(&self, url: &str) -> Result<String> {
        if !is_valid_url(url) {
            return Err(ScoutError::fetch(url, "not an http(s) URL"));
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScoutError::fetch(url, e))?;

        if response.status() != StatusCode::OK {
            return Err(ScoutError::fetch(url, format!("status {}", response.status())));
        }

        let body = response.text().await.map_err(|e| ScoutError::fetch(url, e))?;
        Ok(html::to_text(&body))
    }
}

#[async_trait]
impl WebFetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> String {
        info!(url, "Fetching page");
        match self.try_fetch(url).await {
            Ok(text) => text,
            Err(e) => {
                warn!(url, "Skipping page: {}", e);
                String::new()
            }
        }
    }
}

/// Client for a SearxNG instance's HTML search endpoint.
pub struct SearxngClient {
    client: Client,
    base_url: String,
}

impl SearxngClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: browser_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn form(query: &str, page: u32) -> Vec<(&'static str, String)> {
        vec![
            ("q", query.to_string()),
            ("categories", "general".to_string()),
            ("language", "auto".to_string()),
            ("time_range", String::new()),
            ("safesearch", "0".to_string()),
            ("theme", "simple".to_string()),
            ("pageno", page.to_string()),
        ]
    }
}

#[async_trait]
impl SearchClient for SearxngClient {
    async fn search(&self, query: &str, page: u32) -> Result<String> {
        let url = format!("{}/search", self.base_url);
        debug!(query, page, "Submitting search");

        let response = self
            .client
            .post(&url)
            .form(&Self::form(query, page))
            .send()
            .await
            .map_err(|e| ScoutError::fetch(&url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ScoutError::fetch(&url, format!("searxng status {}: {}", status, body)));
        }

        let body = response.text().await.map_err(|e| ScoutError::fetch(&url, e))?;
        Ok(html::region_to_text(&body, "#urls").unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_form_fields() {
        let form = SearxngClient::form("Paris weather tomorrow", 1);
        assert!(form.contains(&("q", "Paris weather tomorrow".to_string())));
        assert!(form.contains(&("categories", "general".to_string())));
        assert!(form.contains(&("language", "auto".to_string())));
        assert!(form.contains(&("safesearch", "0".to_string())));
        assert!(form.contains(&("pageno", "1".to_string())));
    }

    #[tokio::test]
    async fn test_invalid_url_is_empty_page() {
        let fetcher = HttpFetcher::new(Duration::from_secs(2)).unwrap();
        assert_eq!(fetcher.fetch("ftp://files.example/readme").await, "");
        let err = fetcher.try_fetch("not a url").await.unwrap_err();
        assert!(matches!(err, ScoutError::FetchFailure { .. }));
    }
}
