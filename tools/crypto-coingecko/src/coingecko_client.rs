//! CoinGecko API client implementation
//!
//! This module provides a small client issuing one GET request per call
//! against the CoinGecko public API.

use {
    crate::{
        error::{CoinGeckoErrorKind, CoinGeckoErrorResponse},
        market::COINGECKO_API_BASE,
    },
    log::{debug, warn},
    reqwest::{header::ACCEPT, Client},
    serde_json::Value,
    std::time::Duration,
};

/// Request timeout applied when none is configured.
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// CoinGecko API client for making requests
#[derive(Clone, Debug)]
pub struct CoinGeckoClient {
    /// Base URL for CoinGecko API
    base_url: String,
    /// Timeout for a whole request, body included
    timeout: Duration,
}

impl CoinGeckoClient {
    /// Creates a new CoinGecko client instance
    pub fn new(base_url: Option<&str>) -> Self {
        let base_url = base_url
            .unwrap_or(COINGECKO_API_BASE)
            .trim_end_matches('/')
            .to_string();

        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Overrides the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Makes a GET request to the specified endpoint and parses the body as
    /// JSON.
    ///
    /// The underlying connection pool is built for this call only and dropped
    /// when it returns, whichever way it returns.
    pub async fn get(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, CoinGeckoErrorResponse> {
        let url = format!("{}/{}", self.base_url, endpoint);

        debug!("GET {url} {query:?}");

        let result = self.fetch(&url, query).await;

        if let Err(e) = &result {
            warn!(
                "CoinGecko request to {url} failed (status {:?}): {e}",
                e.status_code
            );
        }

        result
    }

    async fn fetch(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, CoinGeckoErrorResponse> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(CoinGeckoErrorResponse::network)?;

        let response = client
            .get(url)
            .query(query)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(CoinGeckoErrorResponse::network)?;

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) if e.is_timeout() => return Err(CoinGeckoErrorResponse::network(e)),
            Err(e) => {
                return Err(CoinGeckoErrorResponse {
                    reason: format!("Failed to read response: {}", e),
                    kind: CoinGeckoErrorKind::Parse,
                    status_code: Some(status.as_u16()),
                })
            }
        };

        if !status.is_success() {
            return Err(CoinGeckoErrorResponse {
                reason: format!("API error ({}): {}", status, text),
                kind: CoinGeckoErrorKind::from_status_code(status.as_u16()),
                status_code: Some(status.as_u16()),
            });
        }

        serde_json::from_str::<Value>(&text).map_err(|e| CoinGeckoErrorResponse {
            reason: format!("Failed to parse JSON: {}", e),
            kind: CoinGeckoErrorKind::Parse,
            status_code: Some(status.as_u16()),
        })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::test_utils::{refused_base_url, unresponsive_base_url},
        ::{
            mockito::{Matcher, Server},
            serde_json::json,
        },
    };

    #[test]
    fn test_default_configuration() {
        let client = CoinGeckoClient::new(None);

        assert_eq!(client.base_url, "https://api.coingecko.com/api/v3");
        assert_eq!(client.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = CoinGeckoClient::new(Some("http://localhost:1234/api/"));

        assert_eq!(client.base_url, "http://localhost:1234/api");
    }

    #[tokio::test]
    async fn test_successful_get() {
        let mut server = Server::new_async().await;
        let client = CoinGeckoClient::new(Some(&server.url()));

        let mock = server
            .mock("GET", "/simple/price")
            .match_query(Matcher::UrlEncoded("ids".into(), "bitcoin".into()))
            .match_header("accept", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "bitcoin": { "usd": 1 } }).to_string())
            .create_async()
            .await;

        let value = client
            .get("simple/price", &[("ids", "bitcoin")])
            .await
            .expect("request should succeed");

        assert_eq!(value, json!({ "bitcoin": { "usd": 1 } }));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let mut server = Server::new_async().await;
        let client = CoinGeckoClient::new(Some(&server.url()));

        let mock = server
            .mock("GET", "/search/trending")
            .with_status(429)
            .with_body("Throttled")
            .create_async()
            .await;

        let error = client.get("search/trending", &[]).await.unwrap_err();

        assert_eq!(error.kind, CoinGeckoErrorKind::RateLimitExceeded);
        assert_eq!(error.status_code, Some(429));
        assert!(error.reason.contains("Throttled"));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let mut server = Server::new_async().await;
        let client = CoinGeckoClient::new(Some(&server.url()));

        let mock = server
            .mock("GET", "/search/trending")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let error = client.get("search/trending", &[]).await.unwrap_err();

        assert_eq!(error.kind, CoinGeckoErrorKind::Parse);
        assert!(error.reason.starts_with("Failed to parse JSON"));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_timeout() {
        let client = CoinGeckoClient::new(Some(&unresponsive_base_url().await))
            .with_timeout(Duration::from_millis(200));

        let error = client.get("search/trending", &[]).await.unwrap_err();

        assert_eq!(error.kind, CoinGeckoErrorKind::NetworkTimeout);
        assert_eq!(error.status_code, None);
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let client = CoinGeckoClient::new(Some(&refused_base_url().await));

        let error = client.get("search/trending", &[]).await.unwrap_err();

        assert_eq!(error.kind, CoinGeckoErrorKind::NetworkConnectionFailed);
    }
}
