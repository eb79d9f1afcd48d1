//! Generation-scoped view over the cache storage
//!
//! `VersionedCache` is the handle the retrieval strategies talk to. It reads
//! and writes only the current generation; the current generation is shared
//! between clones, so switching it (claiming) redirects every open handle.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use futures::future::join_all;

use super::key::request_key;
use super::storage::{CacheStorage, NewEntry};
use crate::client::{FetchResponse, Transport};
use crate::error::CacheError;

type Result<T> = std::result::Result<T, CacheError>;

/// Identifier of one cache epoch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Generation(String);

impl Generation {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CacheError::NoGeneration);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shared, generation-aware cache handle
#[derive(Clone)]
pub struct VersionedCache {
    storage: Arc<Mutex<CacheStorage>>,
    current: Arc<RwLock<Option<Generation>>>,
}

impl VersionedCache {
    /// Wrap storage, starting on whatever generation it records as active
    pub fn new(storage: CacheStorage) -> Result<Self> {
        let active = storage
            .active_generation()?
            .map(Generation::new)
            .transpose()?;

        Ok(Self {
            storage: Arc::new(Mutex::new(storage)),
            current: Arc::new(RwLock::new(active)),
        })
    }

    fn storage(&self) -> Result<MutexGuard<'_, CacheStorage>> {
        self.storage.lock().map_err(|_| CacheError::Poisoned)
    }

    /// Generation reads and writes currently go to
    pub fn current_generation(&self) -> Option<Generation> {
        self.current.read().ok().and_then(|g| (*g).clone())
    }

    /// Store a response under the current generation.
    ///
    /// Without an active generation there is nowhere to write and the call
    /// is a no-op.
    pub fn put(&self, path: &str, response: &FetchResponse) -> Result<()> {
        let Some(generation) = self.current_generation() else {
            log::debug!("No active generation, not caching {}", path);
            return Ok(());
        };

        let entry = NewEntry {
            key: request_key("GET", path),
            path: path.to_string(),
            response: response.clone(),
        };
        self.storage()?.put(generation.as_str(), &entry)
    }

    /// Look up a response in the current generation
    pub fn lookup(&self, path: &str) -> Result<Option<FetchResponse>> {
        let Some(generation) = self.current_generation() else {
            return Ok(None);
        };
        self.storage()?
            .get(generation.as_str(), &request_key("GET", path))
    }

    /// Fetch every path and store the batch under `generation`.
    ///
    /// All-or-nothing: if any path fails to fetch or answers with a
    /// non-2xx status, nothing is written.
    pub async fn prewarm<T: Transport + ?Sized>(
        &self,
        transport: &T,
        generation: &Generation,
        paths: &[String],
    ) -> Result<usize> {
        let fetches = paths.iter().map(|path| async move {
            let outcome = transport.get(path).await;
            (path, outcome)
        });

        let mut entries = Vec::with_capacity(paths.len());
        for (path, outcome) in join_all(fetches).await {
            let response = outcome.map_err(|e| CacheError::Prewarm {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            if !response.is_success() {
                return Err(CacheError::Prewarm {
                    path: path.clone(),
                    reason: format!("status {}", response.status),
                });
            }
            entries.push(NewEntry {
                key: request_key("GET", path),
                path: path.clone(),
                response,
            });
        }

        self.storage()?.put_batch(generation.as_str(), &entries)?;
        Ok(entries.len())
    }

    /// Delete every generation other than the current one
    pub fn purge_other_generations(&self) -> Result<usize> {
        let generation = self.current_generation().ok_or(CacheError::NoGeneration)?;
        self.purge_except(&generation)
    }

    /// Delete every generation other than `generation`
    pub fn purge_except(&self, generation: &Generation) -> Result<usize> {
        self.storage()?.purge_except(generation.as_str())
    }

    /// Make `generation` current for every clone of this handle and
    /// record it as active in storage
    pub fn claim(&self, generation: &Generation) -> Result<()> {
        self.storage()?.set_active_generation(generation.as_str())?;
        let mut current = self.current.write().map_err(|_| CacheError::Poisoned)?;
        *current = Some(generation.clone());
        Ok(())
    }

    /// Run `f` against the underlying storage
    pub fn with_storage<R>(&self, f: impl FnOnce(&CacheStorage) -> Result<R>) -> Result<R> {
        let guard = self.storage()?;
        f(&guard)
    }
}
