//! HTTP access to the remote sheet service.
//!
//! The sheet service exposes the league's results as a JSON endpoint; a
//! secondary sheet (the hand-maintained matchup matrix) is selected with a
//! `?sheet=` query parameter. Everything downstream consumes the
//! [`RowSource`] trait, so handlers and tests inject fixture data instead
//! of holding a live client.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// Errors that can occur while fetching sheet data.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Rate limited by {host}, retry after {retry_after_secs}s")]
    RateLimited { host: String, retry_after_secs: u64 },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Provider of raw sheet rows.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Fetch the main results rows.
    async fn fetch_rows(&self) -> Result<Value, FetchError>;

    /// Fetch a named secondary sheet.
    async fn fetch_sheet(&self, sheet: &str) -> Result<Value, FetchError>;
}

/// Configuration for the HTTP sheet client.
#[derive(Debug, Clone)]
pub struct SheetClientConfig {
    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Default for SheetClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("quartermaster/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client for one sheet endpoint.
#[derive(Debug)]
pub struct SheetClient {
    client: Client,
    base_url: Url,
}

impl SheetClient {
    /// Create a new client for the given endpoint.
    pub fn new(base_url: &str, config: SheetClientConfig) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| FetchError::InvalidUrl(format!("{base_url}: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("quartermaster/0.1.0")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Create a client with default configuration.
    pub fn with_defaults(base_url: &str) -> Result<Self, FetchError> {
        Self::new(base_url, SheetClientConfig::default())
    }

    /// Endpoint URL, optionally selecting a named sheet.
    fn sheet_url(&self, sheet: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Some(sheet) = sheet {
            url.query_pairs_mut().append_pair("sheet", sheet);
        }
        url
    }

    async fn get_json(&self, url: Url) -> Result<Value, FetchError> {
        info!("Fetching {}", url);

        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);

            return Err(FetchError::RateLimited {
                host: url.host_str().unwrap_or("unknown").to_string(),
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let value: Value = response.json().await?;
        debug!("Fetched {} bytes of JSON", value.to_string().len());
        Ok(value)
    }
}

#[async_trait]
impl RowSource for SheetClient {
    async fn fetch_rows(&self) -> Result<Value, FetchError> {
        self.get_json(self.sheet_url(None)).await
    }

    async fn fetch_sheet(&self, sheet: &str) -> Result<Value, FetchError> {
        self.get_json(self.sheet_url(Some(sheet))).await
    }
}

/// Fixed in-memory source for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    rows: Value,
    sheets: HashMap<String, Value>,
}

impl StaticSource {
    pub fn new(rows: Value) -> Self {
        Self {
            rows,
            sheets: HashMap::new(),
        }
    }

    pub fn with_sheet(mut self, name: impl Into<String>, rows: Value) -> Self {
        self.sheets.insert(name.into(), rows);
        self
    }
}

#[async_trait]
impl RowSource for StaticSource {
    async fn fetch_rows(&self) -> Result<Value, FetchError> {
        Ok(self.rows.clone())
    }

    async fn fetch_sheet(&self, sheet: &str) -> Result<Value, FetchError> {
        self.sheets
            .get(sheet)
            .cloned()
            .ok_or_else(|| FetchError::HttpStatus {
                status: 404,
                message: format!("no sheet named {sheet}"),
            })
    }
}
