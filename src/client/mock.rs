//! Mock transport for testing
//!
//! Serves canned responses per path and can be switched offline to
//! exercise cache fallbacks without a real backend.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::{FetchResponse, Transport};
use crate::error::{ApiError, Result};

/// Mock transport for testing.
///
/// # Example
/// ```ignore
/// let mock = MockTransport::new().with_json("/api/asn/1.json", "[]");
/// let response = mock.get("/api/asn/1.json").await?;
/// assert_eq!(response.status, 200);
/// ```
pub struct MockTransport {
    routes: Mutex<HashMap<String, FetchResponse>>,
    delays: Mutex<HashMap<String, Duration>>,
    online: AtomicBool,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            online: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Serve `response` for `path`
    pub fn with_response(self, path: &str, response: FetchResponse) -> Self {
        self.set_response(path, response);
        self
    }

    /// Serve a 200 JSON body for `path`
    pub fn with_json(self, path: &str, body: &str) -> Self {
        self.with_response(path, FetchResponse::ok(body))
    }

    /// Delay the response for `path`
    pub fn with_delay(self, path: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(path.to_string(), delay);
        self
    }

    /// Replace the response for `path`
    pub fn set_response(&self, path: &str, response: FetchResponse) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), response);
    }

    /// Simulate losing or regaining connectivity
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Number of `get` calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously pending requests observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str) -> Result<FetchResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.online.load(Ordering::SeqCst) {
            return Err(ApiError::Network("mock transport offline".to_string()).into());
        }

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = self.delays.lock().unwrap().get(path).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let response = self.routes.lock().unwrap().get(path).cloned();
        Ok(response.unwrap_or_else(|| FetchResponse::new(404, super::ResponseKind::Basic, "")))
    }
}
