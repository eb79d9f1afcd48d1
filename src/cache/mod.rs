//! Local, generation-versioned cache for backend responses
//!
//! Provides SQLite-backed storage with file blob storage for large bodies,
//! namespaced by cache generation. Keeps ASN lookups and static assets
//! available when the backend cannot be reached.

pub mod key;
pub mod lifecycle;
pub mod storage;
pub mod versioned;

/// Generation used when the config does not name one
pub const DEFAULT_GENERATION: &str = "netmirror-v1";

// Re-export main types
pub use key::request_key;
pub use lifecycle::{ActivationReport, LifecycleController, LifecycleState};
pub use storage::CacheStorage;
pub use versioned::{Generation, VersionedCache};
