//! CoinGecko simple-price client with bounded retries.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::PriceSource;

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

/// Why a price could not be produced. Transient failures are worth
/// retrying on a later run; the others are not.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PriceError {
    #[error("request failed after {attempts} attempts: {reason}")]
    Transient { attempts: u32, reason: String },
    #[error("no price available for '{0}'")]
    NotFound(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// HTTP client for the CoinGecko `/simple/price` endpoint.
///
/// Retry/backoff is owned here: transient failures (network errors,
/// non-2xx statuses including rate limiting) are retried up to the
/// configured attempt count with a linearly growing delay, so a lookup
/// never blocks the caller indefinitely.
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    backoff: Duration,
}

impl CoinGeckoClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at a different endpoint (used by tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff: DEFAULT_BACKOFF,
        })
    }

    pub fn with_retry_policy(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries.max(1);
        self.backoff = backoff;
        self
    }

    async fn fetch_price(&self, coin_id: &str) -> Result<f64, PriceError> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd",
            self.base_url, coin_id
        );

        let mut last_error = String::new();
        for attempt in 1..=self.max_retries {
            debug!(coin_id, attempt, "requesting price");
            match self.client.get(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    let body: Value = response
                        .json()
                        .await
                        .map_err(|e| PriceError::Malformed(e.to_string()))?;
                    return match body.get(coin_id).and_then(|v| v.get("usd")) {
                        Some(price) => price
                            .as_f64()
                            .ok_or_else(|| PriceError::Malformed(format!("non-numeric usd price: {}", price))),
                        // CoinGecko answers an empty object for ids it
                        // does not know.
                        None => Err(PriceError::NotFound(coin_id.to_string())),
                    };
                }
                Ok(response) => {
                    let status = response.status();
                    last_error = format!("HTTP {}", status);
                    warn!(coin_id, %status, attempt, "price request rejected");
                }
                Err(e) => {
                    last_error = e.to_string();
                    warn!(coin_id, error = %last_error, attempt, "price request failed");
                }
            }

            if attempt < self.max_retries {
                tokio::time::sleep(self.backoff * attempt).await;
            }
        }

        Err(PriceError::Transient {
            attempts: self.max_retries,
            reason: last_error,
        })
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn price_usd(&self, coin_id: &str) -> Result<f64, PriceError> {
        self.fetch_price(coin_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> CoinGeckoClient {
        CoinGeckoClient::with_base_url(server.uri())
            .unwrap()
            .with_retry_policy(3, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_successful_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .and(query_param("ids", "bitcoin"))
            .and(query_param("vs_currencies", "usd"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "bitcoin": { "usd": 45000.5 }
            })))
            .mount(&server)
            .await;

        let price = test_client(&server).price_usd("bitcoin").await.unwrap();
        assert_eq!(price, 45000.5);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let err = test_client(&server).price_usd("notacoin").await.unwrap_err();
        assert!(matches!(err, PriceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_retries_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ethereum": { "usd": 2500.0 }
            })))
            .mount(&server)
            .await;

        let price = test_client(&server).price_usd("ethereum").await.unwrap();
        assert_eq!(price, 2500.0);
    }

    #[tokio::test]
    async fn test_exhausted_retries_are_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = test_client(&server).price_usd("bitcoin").await.unwrap_err();
        match err {
            PriceError::Transient { attempts, reason } => {
                assert_eq!(attempts, 3);
                assert!(reason.contains("500"));
            }
            other => panic!("expected transient error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_numeric_price_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "bitcoin": { "usd": "lots" }
            })))
            .mount(&server)
            .await;

        let err = test_client(&server).price_usd("bitcoin").await.unwrap_err();
        assert!(matches!(err, PriceError::Malformed(_)));
    }
}
