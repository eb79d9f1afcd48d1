//! Retrieval strategy routing
//!
//! Every outbound request is classified by path. Per-ASN data goes network
//! first and falls back to the cache when the backend is unreachable;
//! everything else is served from the cache when present and fetched (and
//! cached) only on a miss.

use std::sync::Mutex;

use tokio::task::JoinHandle;

use super::{FetchResponse, ResponseKind, Transport};
use crate::cache::VersionedCache;
use crate::error::Result;

/// Path fragment that marks per-ASN dynamic data
pub const DYNAMIC_DATA_PREFIX: &str = "/api/asn/";

/// Retrieval strategy for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Try the network, fall back to the cache on failure
    NetworkFirst,
    /// Serve from the cache, fetch and fill on a miss
    CacheFirst,
}

/// Pick the strategy for a request path
pub fn classify(path: &str) -> Strategy {
    if path.contains(DYNAMIC_DATA_PREFIX) {
        Strategy::NetworkFirst
    } else {
        Strategy::CacheFirst
    }
}

/// Arbitrates between the transport and the versioned cache.
///
/// Cache reads and writes run on the blocking pool so a held storage lock
/// never stalls other in-flight requests. Writes never block or fail a
/// response: they are detached and their errors are only logged. `flush`
/// waits for the outstanding writes and is meant for process shutdown.
pub struct Router<T: Transport> {
    transport: T,
    cache: Option<VersionedCache>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl<T: Transport> Router<T> {
    /// Create a router; `None` disables caching entirely (`--no-cache`)
    pub fn new(transport: T, cache: Option<VersionedCache>) -> Self {
        Self {
            transport,
            cache,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn cache(&self) -> Option<&VersionedCache> {
        self.cache.as_ref()
    }

    /// Retrieve `path` using the strategy its class calls for
    pub async fn fetch(&self, path: &str) -> Result<FetchResponse> {
        match classify(path) {
            Strategy::NetworkFirst => self.network_first(path).await,
            Strategy::CacheFirst => self.cache_first(path).await,
        }
    }

    async fn network_first(&self, path: &str) -> Result<FetchResponse> {
        match self.transport.get(path).await {
            Ok(response) => {
                self.store_in_background(path, &response);
                Ok(response)
            }
            Err(err) => match self.lookup(path).await {
                Some(cached) => {
                    log::info!("Network failed for {} ({}), serving cached copy", path, err);
                    Ok(cached)
                }
                None => Err(err),
            },
        }
    }

    async fn cache_first(&self, path: &str) -> Result<FetchResponse> {
        if let Some(cached) = self.lookup(path).await {
            log::debug!("Cache hit: {}", path);
            return Ok(cached);
        }

        let response = self.transport.get(path).await?;
        if response.status == 200 && response.kind == ResponseKind::Basic {
            self.store_in_background(path, &response);
        } else {
            log::debug!(
                "Not caching {} (status {}, {})",
                path,
                response.status,
                response.kind.as_str()
            );
        }
        Ok(response)
    }

    /// Cache lookup on the blocking pool; storage errors count as a miss
    async fn lookup(&self, path: &str) -> Option<FetchResponse> {
        let cache = self.cache.clone()?;
        let key_path = path.to_string();

        match tokio::task::spawn_blocking(move || cache.lookup(&key_path)).await {
            Ok(Ok(hit)) => hit,
            Ok(Err(e)) => {
                log::warn!("Cache lookup for {} failed: {}", path, e);
                None
            }
            Err(e) => {
                log::warn!("Cache lookup for {} did not complete: {}", path, e);
                None
            }
        }
    }

    fn store_in_background(&self, path: &str, response: &FetchResponse) {
        let Some(cache) = self.cache.clone() else {
            return;
        };
        let path = path.to_string();
        let response = response.clone();

        let handle = tokio::task::spawn_blocking(move || {
            if let Err(e) = cache.put(&path, &response) {
                log::warn!("Failed to cache {}: {}", path, e);
            }
        });

        if let Ok(mut pending) = self.pending.lock() {
            pending.retain(|h| !h.is_finished());
            pending.push(handle);
        }
    }

    /// Wait for every background cache write issued so far
    pub async fn flush(&self) {
        let handles = match self.pending.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(_) => return,
        };

        for handle in handles {
            if let Err(e) = handle.await {
                log::warn!("Background cache write did not complete: {}", e);
            }
        }
    }
}
