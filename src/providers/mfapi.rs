use super::util::with_retry;
use crate::core::cache::Cache;
use crate::core::config::MfApiProviderConfig;
use crate::core::nav::{NavError, NavProvider};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const API_DATE_FORMAT: &str = "%d-%m-%Y";

/// Longest slice of an unparseable body quoted in an error.
const MAX_BODY_EXCERPT: usize = 200;

/// One entry of a scheme's history, kept exactly as the API returned it.
///
/// Entries are only interpreted when a lookup reaches them, so a malformed
/// entry after the requested date never fails that lookup.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct NavRecord(Value);

impl NavRecord {
    /// Record date, published as `DD-MM-YYYY`.
    pub fn date(&self) -> Result<NaiveDate, String> {
        let text = self
            .0
            .get("date")
            .and_then(Value::as_str)
            .ok_or_else(|| format!("missing or non-string date in record {}", self.0))?;
        NaiveDate::parse_from_str(text, API_DATE_FORMAT)
            .map_err(|e| format!("invalid date '{text}': {e}"))
    }

    /// mfapi.in returns NAVs as strings, but numbers are accepted as well.
    pub fn nav(&self) -> Result<f64, String> {
        match self.0.get("nav") {
            Some(Value::String(text)) => text
                .trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid NAV '{text}': {e}")),
            Some(Value::Number(number)) => number
                .as_f64()
                .ok_or_else(|| format!("invalid NAV {number}")),
            Some(other) => Err(format!("invalid NAV {other}")),
            None => Err("missing NAV".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MfApiResponse {
    data: Option<Vec<NavRecord>>,
}

/// NAV lookups against the mfapi.in scheme history endpoint.
///
/// Every lookup downloads the full history of the scheme and scans it for the
/// requested date, unless a history cache is configured.
pub struct MfApiProvider {
    base_url: String,
    client: reqwest::Client,
    retries: usize,
    retry_delay: Duration,
    cache: Option<Cache<String, Arc<Vec<NavRecord>>>>,
}

impl MfApiProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("navprofit/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(MfApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retries: 0,
            retry_delay: Duration::ZERO,
            cache: None,
        })
    }

    pub fn from_config(config: &MfApiProviderConfig) -> Result<Self> {
        let provider = Self::new(&config.base_url, config.timeout())?
            .with_retries(config.retries, Duration::from_millis(config.retry_delay_ms));
        Ok(match config.cache_ttl() {
            Some(ttl) => provider.with_cache(ttl),
            None => provider,
        })
    }

    pub fn with_retries(mut self, retries: usize, delay: Duration) -> Self {
        self.retries = retries;
        self.retry_delay = delay;
        self
    }

    pub fn with_cache(mut self, ttl: Duration) -> Self {
        self.cache = Some(Cache::new(ttl));
        self
    }

    /// Raw NAV history of a scheme, in the order the API returns it.
    pub async fn fetch_history(&self, scheme_code: &str) -> Result<Arc<Vec<NavRecord>>, NavError> {
        if let Some(cache) = &self.cache
            && let Some(cached) = cache.get(&scheme_code.to_string()).await
        {
            return Ok(cached);
        }

        let url = format!("{}/{}", self.base_url, scheme_code);
        debug!("Requesting NAV history from {}", url);

        let network_error = |source| NavError::Network {
            scheme_code: scheme_code.to_string(),
            source,
        };

        let response = with_retry(
            || async { self.client.get(&url).send().await?.error_for_status() },
            self.retries,
            self.retry_delay,
        )
        .await
        .map_err(network_error)?;

        let response_text = response.text().await.map_err(network_error)?;

        let history = Arc::new(parse_history(scheme_code, &response_text)?);
        debug!(
            "Fetched {} NAV records for scheme {}",
            history.len(),
            scheme_code
        );

        if let Some(cache) = &self.cache {
            cache.put(scheme_code.to_string(), Arc::clone(&history)).await;
        }
        Ok(history)
    }
}

fn body_excerpt(body: &str) -> String {
    match body.char_indices().nth(MAX_BODY_EXCERPT) {
        Some((end, _)) => format!("{}...", &body[..end]),
        None => body.to_string(),
    }
}

fn parse_history(scheme_code: &str, body: &str) -> Result<Vec<NavRecord>, NavError> {
    let parse_error = |reason: String| NavError::Parse {
        scheme_code: scheme_code.to_string(),
        reason,
    };

    let response: MfApiResponse = serde_json::from_str(body)
        .map_err(|e| parse_error(format!("{e}. Response: '{}'", body_excerpt(body))))?;
    response
        .data
        .ok_or_else(|| parse_error("missing 'data' field".to_string()))
}

/// Scans `records` in order and returns the NAV of the first one dated `date`.
///
/// A record that cannot be read fails the lookup only if the scan reaches it
/// before the match.
pub fn find_nav(scheme_code: &str, records: &[NavRecord], date: NaiveDate) -> Result<f64, NavError> {
    let parse_error = |reason: String| NavError::Parse {
        scheme_code: scheme_code.to_string(),
        reason,
    };

    for record in records {
        if record.date().map_err(parse_error)? == date {
            return record.nav().map_err(parse_error);
        }
    }

    Err(NavError::NotFound {
        scheme_code: scheme_code.to_string(),
        date,
    })
}

#[async_trait]
impl NavProvider for MfApiProvider {
    async fn fetch_nav(&self, scheme_code: &str, date: NaiveDate) -> Result<f64, NavError> {
        let history = self.fetch_history(scheme_code).await?;
        let nav = find_nav(scheme_code, &history, date)?;

        debug!("NAV for scheme {} on {}: {}", scheme_code, date, nav);
        Ok(nav)
    }
}
