//! HTTP transport to the NetMirror backend

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{Client as HttpClient, Url};

use super::{FetchResponse, ResponseKind, Transport};
use crate::error::{ApiError, Result};

/// Default backend base URL
pub const DEFAULT_API_HOST: &str = "http://localhost:8080";

/// Default request rate against the backend; zero means unlimited
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 0;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// reqwest-backed transport bound to a single backend origin
pub struct HttpTransport {
    http: HttpClient,
    base_url: Url,
    rate_limiter: Option<Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>>,
    offline: bool,
}

impl HttpTransport {
    /// Create a transport for `api_host`.
    ///
    /// A `requests_per_second` of zero disables rate limiting, so a whole
    /// batch of ASN lookups goes out at once.
    pub fn new(api_host: &str, timeout: Duration, requests_per_second: u32) -> Result<Self> {
        let base_url = Url::parse(api_host)
            .map_err(|e| ApiError::Network(format!("Invalid API host '{}': {}", api_host, e)))?;

        let http = HttpClient::builder()
            .timeout(timeout)
            .user_agent(concat!("netmirror/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let rate_limiter = NonZeroU32::new(requests_per_second).map(|per_second| {
            log::debug!("Limiting backend requests to {}/s", per_second);
            Arc::new(RateLimiter::direct(Quota::per_second(per_second)))
        });

        Ok(Self {
            http,
            base_url,
            rate_limiter,
            offline: false,
        })
    }

    /// Refuse every request, forcing callers onto cached data
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Resolve a root-relative path against the backend origin
    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<FetchResponse> {
        if self.offline {
            return Err(ApiError::Offline(path.to_string()).into());
        }

        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let url = self.url_for(path);
        log::debug!("GET {}", url);

        let response = self.http.get(&url).send().await.map_err(ApiError::from)?;

        let status = response.status().as_u16();
        let kind = if response.url().origin() == self.base_url.origin() {
            ResponseKind::Basic
        } else {
            ResponseKind::CrossOrigin
        };

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(format!("Failed to read response body: {}", e)))?;

        log::debug!("GET {} -> {} ({} bytes)", path, status, body.len());
        Ok(FetchResponse::new(status, kind, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Router, fetch_all};
    use std::time::Instant;

    fn transport(host: &str) -> HttpTransport {
        HttpTransport::new(host, Duration::from_secs(5), 100).unwrap()
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        let result = HttpTransport::new("not a url", Duration::from_secs(5), 10);
        assert!(result.is_err());
    }

    #[test]
    fn test_url_for_joins_slashes() {
        let t = transport("http://example.test/");
        assert_eq!(
            t.url_for("/api/asn/1.json"),
            "http://example.test/api/asn/1.json"
        );

        let t = transport("http://example.test/mirror");
        assert_eq!(t.url_for("index.html"), "http://example.test/mirror/index.html");
    }

    #[tokio::test]
    async fn test_offline_refuses_requests() {
        let t = transport("http://example.test").offline(true);
        let err = t.get("/api/asn/1.json").await.unwrap_err();
        assert!(err.to_string().contains("Offline"));
    }

    #[tokio::test]
    async fn test_get_returns_non_success_status_as_response() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/asn/404.json")
            .with_status(404)
            .with_body("missing")
            .create_async()
            .await;

        let t = transport(&server.url());
        let response = t.get("/api/asn/404.json").await.unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.kind, ResponseKind::Basic);
        assert_eq!(response.body, b"missing");
    }

    async fn asn_backend() -> mockito::ServerGuard {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Regex(r"^/api/asn/\d+\.json$".to_string()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        server
    }

    fn asns(count: usize) -> Vec<String> {
        (1..=count).map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn test_default_transport_sends_whole_batch_at_once() {
        let server = asn_backend().await;
        let t = HttpTransport::new(
            &server.url(),
            Duration::from_secs(5),
            DEFAULT_REQUESTS_PER_SECOND,
        )
        .unwrap();
        let router = Router::new(t, None);

        let started = Instant::now();
        let results = fetch_all(&router, &asns(60)).await;

        assert_eq!(results.len(), 60);
        assert!(results.iter().all(|r| !r.error));
        assert!(
            started.elapsed() < Duration::from_secs(1),
            "60 lookups took {:?}",
            started.elapsed()
        );
    }

    #[tokio::test]
    async fn test_configured_rate_limit_is_applied() {
        let server = asn_backend().await;
        let t = HttpTransport::new(&server.url(), Duration::from_secs(5), 5).unwrap();
        let router = Router::new(t, None);

        let started = Instant::now();
        let results = fetch_all(&router, &asns(10)).await;

        assert!(results.iter().all(|r| !r.error));
        // burst of 5, then one every 200ms
        assert!(started.elapsed() >= Duration::from_millis(800));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let t = transport("http://127.0.0.1:59998");
        let err = t.get("/index.html").await.unwrap_err();
        assert!(err.to_string().contains("Network error"));
    }
}
