//! Recipe search client.
//!
//! Wraps the `/api/recipes/v2` endpoint and maps every hit into the
//! persisted `Recipe` shape (per-serving calories, formatted cook time).

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client};
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{Recipe, SearchFilters, SearchResponse};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL of the recipe search API on RapidAPI
pub const DEFAULT_API_BASE_URL: &str = "https://edamam-recipe-search.p.rapidapi.com";

/// Value of the `X-RapidAPI-Host` header
pub const DEFAULT_API_HOST: &str = "edamam-recipe-search.p.rapidapi.com";

const SEARCH_PATH: &str = "/api/recipes/v2";

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Client for the recipe search API.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct RecipeSearchClient {
    client: Client,
    base_url: String,
    api_host: String,
    api_key: Option<String>,
    max_retries: u32,
}

impl RecipeSearchClient {
    /// Create a client against the public RapidAPI endpoint
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_API_BASE_URL, DEFAULT_API_HOST)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: &str, api_host: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_host: api_host.to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            max_retries: MAX_RATE_LIMIT_RETRIES,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_base_url(
            config.api_key.clone(),
            &config.api_base_url,
            &config.api_host,
        )
    }

    /// Limit how often a rate-limited request is retried
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn headers(&self) -> Result<header::HeaderMap> {
        let key = self.api_key.as_deref().ok_or(ApiError::MissingApiKey)?;

        let mut headers = header::HeaderMap::new();
        headers.insert("X-RapidAPI-Key", header::HeaderValue::from_str(key)?);
        headers.insert(
            "X-RapidAPI-Host",
            header::HeaderValue::from_str(&self.api_host)?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Search for recipes matching `query`, narrowed by `filters`.
    pub async fn search(&self, query: &str, filters: &SearchFilters) -> Result<Vec<Recipe>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ApiError::EmptyQuery.into());
        }

        let url = format!("{}{}", self.base_url, SEARCH_PATH);
        let mut params: Vec<(&str, String)> =
            vec![("type", "public".to_string()), ("q", query.to_string())];
        params.extend(filters.query_pairs());

        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        let response = loop {
            let response = self
                .client
                .get(&url)
                .headers(self.headers()?)
                .query(&params)
                .send()
                .await
                .map_err(ApiError::from)
                .with_context(|| format!("Failed to send search request to {}", url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => break response,
                None => {
                    retries += 1;
                    if retries > self.max_retries {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(retry = retries, backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        };

        let text = response
            .text()
            .await
            .context("Failed to read search response body")?;
        let parsed: SearchResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
            .context("Failed to parse search response")?;

        let recipes: Vec<Recipe> = parsed
            .hits
            .iter()
            .map(|hit| Recipe::from_api(&hit.recipe))
            .collect();

        debug!(query, filters = ?filters, count = recipes.len(), "Search complete");
        Ok(recipes)
    }
}
