//! Backend client: transport, retrieval strategies and per-ASN fetching

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

#[cfg(test)]
pub mod mock;
pub mod http;
pub mod models;
pub mod parallel;
pub mod router;

#[cfg(test)]
pub use mock::MockTransport;
pub use http::HttpTransport;
pub use parallel::{asn_path, fetch_all};
pub use router::{Router, Strategy, classify};

/// How a response relates to the backend origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// Served by the configured backend origin
    Basic,
    /// Ended up on another origin (e.g. after a redirect)
    CrossOrigin,
}

impl ResponseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseKind::Basic => "basic",
            ResponseKind::CrossOrigin => "cross-origin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "basic" => Some(ResponseKind::Basic),
            "cross-origin" => Some(ResponseKind::CrossOrigin),
            _ => None,
        }
    }
}

/// A fully buffered response, as delivered by the network or the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,

    /// Origin classification
    pub kind: ResponseKind,

    /// Response body
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn new(status: u16, kind: ResponseKind, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            kind,
            body: body.into(),
        }
    }

    /// 200 OK from the backend origin
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, ResponseKind::Basic, body)
    }

    /// True for any 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network side of a retrieval.
///
/// Implementations return `Ok` for every response the backend delivered,
/// whatever its status; `Err` means nothing came back at all.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET a root-relative path (e.g. `/api/asn/15169.json`)
    async fn get(&self, path: &str) -> Result<FetchResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn get(&self, path: &str) -> Result<FetchResponse> {
        (**self).get(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_kind_round_trip_names() {
        for kind in [ResponseKind::Basic, ResponseKind::CrossOrigin] {
            assert_eq!(ResponseKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ResponseKind::parse("opaque"), None);
    }

    #[test]
    fn test_is_success() {
        assert!(FetchResponse::ok("[]").is_success());
        assert!(FetchResponse::new(204, ResponseKind::Basic, "").is_success());
        assert!(!FetchResponse::new(404, ResponseKind::Basic, "").is_success());
        assert!(!FetchResponse::new(301, ResponseKind::Basic, "").is_success());
    }
}
