//! National Bank of Poland (NBP) exchange-rate API
//!
//! `GET {endpoint}/{table}/{code}/last/{lookback}/?format=json` returns
//! `{table, currency, code, rates: [{no, effectiveDate, mid}, ...]}`.
//! No API key is required.

use super::{RateSource, RawRateResponse};
use crate::config::SourceConfig;
use crate::currency::CurrencyCode;
use crate::error::{RatesError, Result};
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::time::Duration;

/// Largest `last/{topCount}` window the API serves
pub const MAX_LOOKBACK_DAYS: u32 = 255;

/// HTTP client for NBP rate tables
pub struct NbpRateClient {
    client: Client,
    endpoint: String,
    table: String,
    format: String,
}

impl NbpRateClient {
    /// Create a client from source settings
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| RatesError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            table: config.table.clone(),
            format: config.format.clone(),
        })
    }

    /// Build the request URL, rejecting windows the API cannot serve
    pub fn url(&self, code: &CurrencyCode, lookback_days: u32) -> Result<String> {
        if lookback_days == 0 || lookback_days > MAX_LOOKBACK_DAYS {
            return Err(RatesError::Validation(format!(
                "lookback_days must be between 1 and {}, got {}",
                MAX_LOOKBACK_DAYS, lookback_days
            )));
        }

        Ok(format!(
            "{}/{}/{}/last/{}/?format={}",
            self.endpoint,
            self.table,
            code.lower(),
            lookback_days,
            self.format
        ))
    }

    /// Fetch the raw rates object for one currency
    pub async fn fetch_rates(
        &self,
        code: &CurrencyCode,
        lookback_days: u32,
    ) -> Result<RawRateResponse> {
        let url = self.url(code, lookback_days)?;
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            log::error!("CRITICAL: Request failed with status code: {} ({})", status, url);
            return Err(RatesError::HttpStatus {
                url,
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| transport_error(&url, e))?;

        match body {
            serde_json::Value::Object(map) => Ok(map),
            other => {
                log::error!("CRITICAL: Response from {} is not a JSON object", url);
                Err(RatesError::Transport {
                    url,
                    message: format!("expected a JSON object, got: {}", other),
                })
            }
        }
    }
}

/// Classify, log and wrap a reqwest failure
fn transport_error(url: &str, error: reqwest::Error) -> RatesError {
    let message = if error.is_connect() {
        format!("There was a connection error: {}", error)
    } else if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_decode() {
        format!("Failed to decode response body: {}", error)
    } else {
        format!("Something went wrong with request: {}", error)
    };

    log::error!("CRITICAL: {} ({})", message, url);
    RatesError::Transport {
        url: url.to_string(),
        message,
    }
}

impl RateSource for NbpRateClient {
    async fn fetch(&self, code: &CurrencyCode, lookback_days: u32) -> Result<RawRateResponse> {
        self.fetch_rates(code, lookback_days).await
    }

    fn name(&self) -> &str {
        "nbp"
    }
}
