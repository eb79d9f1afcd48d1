//! Cache generation lifecycle
//!
//! Installing pre-caches the asset list into the new generation; activating
//! purges every other generation and then claims open handles. A failed install
//! leaves the previously active generation untouched.

use super::versioned::{Generation, VersionedCache};
use crate::client::Transport;
use crate::error::CacheError;

/// Lifecycle states of one generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Installing,
    Activating,
    Active,
    /// Install failed; this generation will never become active
    Failed,
}

/// Drives one generation from install to active
pub struct LifecycleController {
    generation: Generation,
    state: LifecycleState,
    cache: VersionedCache,
}

/// What a completed lifecycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationReport {
    pub generation: Generation,
    pub assets_cached: usize,
    pub entries_purged: usize,
}

impl LifecycleController {
    pub fn new(cache: VersionedCache, generation: Generation) -> Self {
        Self {
            generation,
            state: LifecycleState::Installing,
            cache,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn generation(&self) -> &Generation {
        &self.generation
    }

    /// True when storage already runs on this controller's generation
    pub fn is_current(&self) -> bool {
        self.cache.current_generation().as_ref() == Some(&self.generation)
    }

    /// Pre-cache `assets` into the new generation.
    ///
    /// On success the controller moves straight to `Activating` without
    /// waiting for the previous generation to go idle.
    pub async fn install<T: Transport + ?Sized>(
        &mut self,
        transport: &T,
        assets: &[String],
    ) -> Result<usize, CacheError> {
        if self.state != LifecycleState::Installing {
            return Err(CacheError::Lifecycle(format!(
                "cannot install generation {} from state {:?}",
                self.generation, self.state
            )));
        }

        log::info!(
            "Installing cache generation {} ({} assets)",
            self.generation,
            assets.len()
        );

        match self.cache.prewarm(transport, &self.generation, assets).await {
            Ok(cached) => {
                self.state = LifecycleState::Activating;
                Ok(cached)
            }
            Err(e) => {
                log::warn!("Install of cache generation {} failed: {}", self.generation, e);
                self.state = LifecycleState::Failed;
                Err(e)
            }
        }
    }

    /// Drop every other generation, then claim all open handles
    pub fn activate(&mut self) -> Result<usize, CacheError> {
        if self.state != LifecycleState::Activating {
            return Err(CacheError::Lifecycle(format!(
                "cannot activate generation {} from state {:?}",
                self.generation, self.state
            )));
        }

        let purged = self.cache.purge_except(&self.generation)?;
        self.cache.claim(&self.generation)?;
        self.state = LifecycleState::Active;

        log::info!(
            "Cache generation {} active ({} stale entries purged)",
            self.generation,
            purged
        );
        Ok(purged)
    }

    /// Install then activate
    pub async fn run<T: Transport + ?Sized>(
        mut self,
        transport: &T,
        assets: &[String],
    ) -> Result<ActivationReport, CacheError> {
        let assets_cached = self.install(transport, assets).await?;
        let entries_purged = self.activate()?;
        Ok(ActivationReport {
            generation: self.generation,
            assets_cached,
            entries_purged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStorage;
    use crate::client::{FetchResponse, MockTransport};
    use tempfile::TempDir;

    fn test_cache() -> (VersionedCache, TempDir) {
        let dir = TempDir::new().unwrap();
        let storage = CacheStorage::open_at(dir.path()).unwrap();
        (VersionedCache::new(storage).unwrap(), dir)
    }

    fn assets() -> Vec<String> {
        vec!["/".to_string(), "/index.html".to_string()]
    }

    fn transport() -> MockTransport {
        MockTransport::new()
            .with_json("/", "root")
            .with_json("/index.html", "index")
    }

    #[tokio::test]
    async fn test_state_machine_happy_path() {
        let (cache, _dir) = test_cache();
        let transport = transport();
        let mut controller = LifecycleController::new(cache.clone(), Generation::new("v1").unwrap());

        assert_eq!(controller.state(), LifecycleState::Installing);
        assert!(!controller.is_current());

        controller.install(&transport, &assets()).await.unwrap();
        assert_eq!(controller.state(), LifecycleState::Activating);

        controller.activate().unwrap();
        assert_eq!(controller.state(), LifecycleState::Active);
        assert!(controller.is_current());
        assert_eq!(cache.lookup("/index.html").unwrap().unwrap().body, b"index");
    }

    #[tokio::test]
    async fn test_activate_requires_install() {
        let (cache, _dir) = test_cache();
        let mut controller = LifecycleController::new(cache, Generation::new("v1").unwrap());

        assert!(controller.activate().is_err());
        assert_eq!(controller.state(), LifecycleState::Installing);
    }

    #[tokio::test]
    async fn test_failed_install_keeps_previous_generation() {
        let (cache, _dir) = test_cache();
        let transport = transport();

        LifecycleController::new(cache.clone(), Generation::new("v1").unwrap())
            .run(&transport, &assets())
            .await
            .unwrap();
        cache.put("/api/asn/1.json", &FetchResponse::ok("[]")).unwrap();

        transport.set_online(false);
        let mut next = LifecycleController::new(cache.clone(), Generation::new("v2").unwrap());
        assert!(next.install(&transport, &assets()).await.is_err());
        assert_eq!(next.state(), LifecycleState::Failed);
        assert!(next.activate().is_err());

        assert_eq!(cache.current_generation(), Generation::new("v1").ok());
        assert!(cache.lookup("/api/asn/1.json").unwrap().is_some());
    }

    #[tokio::test]
    async fn test_new_generation_replaces_old() {
        let (cache, _dir) = test_cache();
        let transport = transport();

        LifecycleController::new(cache.clone(), Generation::new("v1").unwrap())
            .run(&transport, &assets())
            .await
            .unwrap();
        cache.put("/api/asn/1.json", &FetchResponse::ok("[]")).unwrap();

        transport.set_response("/index.html", FetchResponse::ok("index v2"));
        let report = LifecycleController::new(cache.clone(), Generation::new("v2").unwrap())
            .run(&transport, &assets())
            .await
            .unwrap();

        assert_eq!(report.assets_cached, 2);
        assert_eq!(report.entries_purged, 3);
        assert_eq!(cache.lookup("/index.html").unwrap().unwrap().body, b"index v2");
        assert!(cache.lookup("/api/asn/1.json").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_asset_list_installs() {
        let (cache, _dir) = test_cache();
        let report = LifecycleController::new(cache.clone(), Generation::new("v1").unwrap())
            .run(&MockTransport::new(), &[])
            .await
            .unwrap();

        assert_eq!(report.assets_cached, 0);
        assert_eq!(cache.current_generation(), Generation::new("v1").ok());
    }
}
