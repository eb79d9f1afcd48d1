//! Command execution context
//!
//! Resolves configuration (flag > env > file > default), opens the offline
//! cache, brings the configured cache generation live and wires the router.

use std::path::PathBuf;

use crate::cache::{
    ActivationReport, CacheStorage, Generation, LifecycleController, VersionedCache,
};
use crate::cli::{GlobalOptions, OutputFormat};
use crate::client::{HttpTransport, Router};
use crate::config::Config;
use crate::error::Result;

/// Configuration with CLI/env overrides applied, before any I/O on the cache
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: Config,
    pub config_path: PathBuf,
    pub cache_dir: PathBuf,
}

impl ResolvedConfig {
    pub fn load(opts: &GlobalOptions) -> Result<Self> {
        let config_path = match opts.config_ref() {
            Some(path) => path.to_path_buf(),
            None => Config::default_path()?,
        };

        let mut config = Config::load_or_default(&config_path)?;
        if let Some(host) = opts.api_host_ref() {
            config.api_host = host.to_string();
        }
        config.validate()?;

        let cache_dir = config.resolve_cache_dir(opts.cache_dir_ref())?;

        Ok(Self {
            config,
            config_path,
            cache_dir,
        })
    }

    /// Open cache storage at the resolved directory
    pub fn open_storage(&self) -> Result<CacheStorage> {
        Ok(CacheStorage::open_at(&self.cache_dir)?)
    }

    pub fn generation(&self) -> Result<Generation> {
        Ok(Generation::new(self.config.cache.generation.clone())?)
    }
}

/// Context for command execution containing config, router and runtime options.
pub struct CommandContext {
    pub resolved: ResolvedConfig,
    pub router: Router<HttpTransport>,
    pub format: OutputFormat,
}

impl CommandContext {
    /// Build the context and activate the configured cache generation if needed.
    ///
    /// Cache problems never stop the command: an unusable store disables
    /// caching, and a failed install keeps the previous generation serving.
    pub async fn new(opts: &GlobalOptions) -> Result<Self> {
        let resolved = ResolvedConfig::load(opts)?;
        let transport = build_transport(&resolved.config, opts.offline)?;

        let cache = if opts.no_cache {
            log::debug!("Cache disabled");
            None
        } else {
            match open_cache(&resolved) {
                Ok(cache) => {
                    if let Err(e) = ensure_generation(&resolved, &cache, &transport).await {
                        log::warn!("Cache generation not activated: {}", e);
                    }
                    Some(cache)
                }
                Err(e) => {
                    log::warn!("Cache unavailable, continuing without it: {}", e);
                    None
                }
            }
        };

        Ok(Self {
            resolved,
            router: Router::new(transport, cache),
            format: opts.format,
        })
    }

    pub fn config(&self) -> &Config {
        &self.resolved.config
    }
}

/// Explicitly install and activate the configured generation
pub async fn install_generation(opts: &GlobalOptions) -> Result<ActivationReport> {
    let resolved = ResolvedConfig::load(opts)?;
    let transport = build_transport(&resolved.config, opts.offline)?;
    let cache = open_cache(&resolved)?;

    let controller = LifecycleController::new(cache, resolved.generation()?);
    Ok(controller
        .run(&transport, &resolved.config.cache.assets)
        .await?)
}

fn build_transport(config: &Config, offline: bool) -> Result<HttpTransport> {
    Ok(HttpTransport::new(
        &config.api_host,
        config.timeout(),
        config.http.requests_per_second,
    )?
    .offline(offline))
}

fn open_cache(resolved: &ResolvedConfig) -> Result<VersionedCache> {
    Ok(VersionedCache::new(resolved.open_storage()?)?)
}

async fn ensure_generation(
    resolved: &ResolvedConfig,
    cache: &VersionedCache,
    transport: &HttpTransport,
) -> Result<()> {
    let generation = resolved.generation()?;
    let controller = LifecycleController::new(cache.clone(), generation);
    if controller.is_current() {
        return Ok(());
    }

    let report = controller
        .run(transport, &resolved.config.cache.assets)
        .await?;
    log::info!(
        "Activated cache generation {} ({} assets, {} stale entries purged)",
        report.generation,
        report.assets_cached,
        report.entries_purged
    );
    Ok(())
}
