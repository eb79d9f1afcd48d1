//! SQLite-based cache storage with file blob support
//!
//! Every entry belongs to a generation namespace. Small bodies are stored
//! inline in SQLite, large bodies (>10KB) as files under a per-generation
//! blob directory.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};

use super::key::generation_dir;
use crate::client::{FetchResponse, ResponseKind};
use crate::error::CacheError;

/// Schema version - increment to trigger nuke-and-rebuild
const SCHEMA_VERSION: i32 = 1;

/// Responses larger than this are stored as external blobs
const INLINE_THRESHOLD: usize = 10 * 1024; // 10KB

/// Meta key holding the active generation
const ACTIVE_GENERATION: &str = "active_generation";

type Result<T> = std::result::Result<T, CacheError>;

/// One response to be written into a generation
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub key: String,
    pub path: String,
    pub response: FetchResponse,
}

/// SQLite-backed cache storage with file blob support
pub struct CacheStorage {
    conn: Connection,
    root: PathBuf,
    blobs_dir: PathBuf,
}

impl CacheStorage {
    /// Open or create cache storage at the default XDG cache location
    pub fn open() -> Result<Self> {
        let cache_dir = Self::cache_dir()?;
        Self::open_at(&cache_dir)
    }

    /// Get the default cache directory path (~/.cache/netmirror on Linux)
    pub fn cache_dir() -> Result<PathBuf> {
        let cache_base = dirs::cache_dir().ok_or(CacheError::NoHome)?;
        Ok(cache_base.join("netmirror"))
    }

    /// Open cache storage at a specific directory
    pub fn open_at(cache_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(cache_dir)
            .map_err(|e| CacheError::Io(format!("Failed to create cache dir: {}", e)))?;

        let db_path = cache_dir.join("cache.db");
        let blobs_dir = cache_dir.join("blobs");
        std::fs::create_dir_all(&blobs_dir)
            .map_err(|e| CacheError::Io(format!("Failed to create blobs dir: {}", e)))?;

        let conn = Connection::open(&db_path)?;

        // Check schema version - nuke if mismatched
        let version: i32 = conn
            .pragma_query_value(None, "user_version", |r| r.get(0))
            .unwrap_or(0);

        if version != 0 && version != SCHEMA_VERSION {
            log::info!(
                "Cache schema version mismatch ({} != {}), rebuilding",
                version,
                SCHEMA_VERSION
            );
            drop(conn);
            Self::nuke(&db_path, &blobs_dir)?;
            return Self::open_at(cache_dir);
        }

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS cache_entries (
                generation TEXT NOT NULL,
                cache_key TEXT NOT NULL,
                path TEXT NOT NULL,
                status INTEGER NOT NULL,
                kind TEXT NOT NULL,
                data BLOB,
                blob_path TEXT,
                created_at INTEGER NOT NULL,
                size_bytes INTEGER NOT NULL,
                PRIMARY KEY (generation, cache_key)
            );

            CREATE INDEX IF NOT EXISTS idx_generation ON cache_entries(generation);

            CREATE TABLE IF NOT EXISTS cache_meta (
                name TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            );
            "#,
        )?;

        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        Ok(Self {
            conn,
            root: cache_dir.to_path_buf(),
            blobs_dir,
        })
    }

    /// Directory this storage lives in
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Look up an entry within one generation
    pub fn get(&self, generation: &str, key: &str) -> Result<Option<FetchResponse>> {
        let row: Option<(u16, String, Option<Vec<u8>>, Option<String>)> = self
            .conn
            .query_row(
                "SELECT status, kind, data, blob_path FROM cache_entries
                 WHERE generation = ?1 AND cache_key = ?2",
                params![generation, key],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;

        let Some((status, kind, data, blob_path)) = row else {
            return Ok(None);
        };

        let kind = ResponseKind::parse(&kind).unwrap_or(ResponseKind::Basic);

        match (data, blob_path) {
            (Some(data), None) => Ok(Some(FetchResponse::new(status, kind, data))),
            (None, Some(blob_path)) => {
                let full_path = self.blobs_dir.join(&blob_path);
                match std::fs::read(&full_path) {
                    Ok(data) => Ok(Some(FetchResponse::new(status, kind, data))),
                    Err(e) => {
                        log::warn!("Failed to read blob {}: {}", blob_path, e);
                        // Delete stale entry
                        let _ = self.conn.execute(
                            "DELETE FROM cache_entries WHERE generation = ?1 AND cache_key = ?2",
                            params![generation, key],
                        );
                        Ok(None)
                    }
                }
            }
            _ => Ok(None),
        }
    }

    /// Store or overwrite one entry
    pub fn put(&self, generation: &str, entry: &NewEntry) -> Result<()> {
        Self::insert(&self.conn, &self.blobs_dir, generation, entry)
    }

    /// Store a batch of entries atomically
    pub fn put_batch(&mut self, generation: &str, entries: &[NewEntry]) -> Result<()> {
        let tx = self.conn.transaction()?;
        for entry in entries {
            Self::insert(&tx, &self.blobs_dir, generation, entry)?;
        }
        tx.commit()?;
        Ok(())
    }

    fn insert(conn: &Connection, blobs_dir: &Path, generation: &str, entry: &NewEntry) -> Result<()> {
        let now = Utc::now().timestamp();
        let body = &entry.response.body;

        let (data, blob_path) = if body.len() <= INLINE_THRESHOLD {
            (Some(body.as_slice()), None)
        } else {
            let rel = Self::write_blob(blobs_dir, generation, &entry.key, body)?;
            (None, Some(rel))
        };

        let previous: Option<String> = conn
            .query_row(
                "SELECT blob_path FROM cache_entries WHERE generation = ?1 AND cache_key = ?2",
                params![generation, entry.key],
                |r| r.get::<_, Option<String>>(0),
            )
            .optional()?
            .flatten();
        if let Some(stale) = previous.filter(|p| Some(p) != blob_path.as_ref()) {
            if let Err(e) = std::fs::remove_file(blobs_dir.join(&stale)) {
                log::warn!("Failed to remove stale blob {}: {}", stale, e);
            }
        }

        conn.execute(
            "INSERT OR REPLACE INTO cache_entries
             (generation, cache_key, path, status, kind, data, blob_path, created_at, size_bytes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                generation,
                entry.key,
                entry.path,
                entry.response.status,
                entry.response.kind.as_str(),
                data,
                blob_path,
                now,
                body.len()
            ],
        )?;
        Ok(())
    }

    /// Delete every entry and blob that does not belong to `generation`
    pub fn purge_except(&self, generation: &str) -> Result<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM cache_entries WHERE generation != ?1",
            params![generation],
        )?;

        let keep = generation_dir(generation);
        let dirs = std::fs::read_dir(&self.blobs_dir)
            .map_err(|e| CacheError::Io(format!("Failed to list blobs dir: {}", e)))?;
        for dir in dirs.flatten() {
            if dir.file_name().to_string_lossy() == keep {
                continue;
            }
            if let Err(e) = std::fs::remove_dir_all(dir.path()) {
                log::warn!("Failed to remove blob dir {}: {}", dir.path().display(), e);
            }
        }

        Ok(deleted)
    }

    /// Generation currently recorded as active, if any
    pub fn active_generation(&self) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM cache_meta WHERE name = ?1",
                [ACTIVE_GENERATION],
                |r| r.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Record `generation` as the active one
    pub fn set_active_generation(&self, generation: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO cache_meta (name, value) VALUES (?1, ?2)",
            params![ACTIVE_GENERATION, generation],
        )?;
        Ok(())
    }

    /// Clear all cache entries in every generation
    pub fn clear_all(&self) -> Result<ClearStats> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM cache_entries", [], |r| r.get(0))?;

        self.conn.execute("DELETE FROM cache_entries", [])?;

        if self.blobs_dir.exists() {
            if let Err(e) = std::fs::remove_dir_all(&self.blobs_dir) {
                log::warn!("Failed to clear blobs directory: {}", e);
            }
            std::fs::create_dir_all(&self.blobs_dir)
                .map_err(|e| CacheError::Io(format!("Failed to recreate blobs dir: {}", e)))?;
        }

        Ok(ClearStats {
            entries_removed: count as usize,
        })
    }

    /// Get cache statistics
    pub fn stats(&self) -> Result<CacheStats> {
        let mut stmt = self.conn.prepare(
            "SELECT generation, COUNT(*), COALESCE(SUM(size_bytes), 0)
             FROM cache_entries GROUP BY generation ORDER BY generation",
        )?;
        let generations = stmt
            .query_map([], |r| {
                Ok(GenerationStats {
                    generation: r.get(0)?,
                    entries: r.get::<_, i64>(1)? as usize,
                    size_bytes: r.get::<_, i64>(2)? as usize,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let (oldest, newest): (Option<i64>, Option<i64>) = self.conn.query_row(
            "SELECT MIN(created_at), MAX(created_at) FROM cache_entries",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )?;

        Ok(CacheStats {
            active_generation: self.active_generation()?,
            total_entries: generations.iter().map(|g| g.entries).sum(),
            total_size_bytes: generations.iter().map(|g| g.size_bytes).sum(),
            generations,
            oldest_entry: oldest,
            newest_entry: newest,
        })
    }

    /// Write a blob file, sharded by first 2 chars of key
    fn write_blob(blobs_dir: &Path, generation: &str, key: &str, data: &[u8]) -> Result<String> {
        let gen_dir = generation_dir(generation);
        let shard = &key[..2.min(key.len())];
        let shard_dir = blobs_dir.join(&gen_dir).join(shard);
        std::fs::create_dir_all(&shard_dir)
            .map_err(|e| CacheError::Io(format!("Failed to create shard dir: {}", e)))?;

        let filename = format!("{}.bin", key);
        let rel_path = format!("{}/{}/{}", gen_dir, shard, filename);

        std::fs::write(shard_dir.join(&filename), data)
            .map_err(|e| CacheError::Io(format!("Failed to write blob: {}", e)))?;

        Ok(rel_path)
    }

    /// Nuke the cache (delete DB and all blobs)
    fn nuke(db_path: &Path, blobs_dir: &Path) -> Result<()> {
        if db_path.exists() {
            std::fs::remove_file(db_path)
                .map_err(|e| CacheError::Io(format!("Failed to remove cache DB: {}", e)))?;
        }
        if blobs_dir.exists() {
            std::fs::remove_dir_all(blobs_dir)
                .map_err(|e| CacheError::Io(format!("Failed to remove blobs dir: {}", e)))?;
        }
        Ok(())
    }
}

/// Statistics about cache clear operation
#[derive(Debug)]
pub struct ClearStats {
    pub entries_removed: usize,
}

/// Entry count and size of one generation
#[derive(Debug, Clone)]
pub struct GenerationStats {
    pub generation: String,
    pub entries: usize,
    pub size_bytes: usize,
}

/// Statistics about cache state
#[derive(Debug)]
pub struct CacheStats {
    pub active_generation: Option<String>,
    pub generations: Vec<GenerationStats>,
    pub total_entries: usize,
    pub total_size_bytes: usize,
    pub oldest_entry: Option<i64>,
    pub newest_entry: Option<i64>,
}
