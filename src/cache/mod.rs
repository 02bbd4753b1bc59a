//! Persistent extraction cache
//!
//! This module handles durable storage of per-file extraction results:
//! - Content fingerprints for change detection
//! - Extracted entity chunks, serialized as JSON
//!
//! The store is a single SQLite database file, by default under a
//! user-scoped cache directory. It is an explicitly constructed handle
//! passed into the pipeline; nothing reaches it through global state.

mod fingerprint;
mod schema;

pub use fingerprint::fingerprint;
pub use schema::SCHEMA;

use crate::extract::EntityChunk;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// Database file name inside the cache directory
const DB_FILE: &str = "map.db";

/// A cached extraction result for one file
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Absolute file path the entry belongs to
    pub path: String,
    /// Fingerprint of the content the chunks were extracted from
    pub fingerprint: String,
    /// Extracted entity chunks, in extraction order
    pub chunks: Vec<EntityChunk>,
}

/// Cache store connection wrapper
pub struct CacheStore {
    conn: Connection,
}

impl CacheStore {
    /// Open or create the cache database at the given directory
    ///
    /// Failure here is fatal to the caller: the scanner does not fall back
    /// to an uncached mode.
    pub fn open<P: AsRef<Path>>(cache_dir: P) -> Result<Self> {
        let cache_dir = cache_dir.as_ref();
        std::fs::create_dir_all(cache_dir)
            .with_context(|| format!("Failed to create cache directory {:?}", cache_dir))?;

        let db_path = cache_dir.join(DB_FILE);
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open map cache at {:?}", db_path))?;

        let store = Self { conn };
        store.initialize()?;

        Ok(store)
    }

    /// Open the cache at the user-scoped default location
    pub fn open_default() -> Result<Self> {
        Self::open(default_cache_dir()?)
    }

    /// Open an in-memory cache (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory cache")?;

        let store = Self { conn };
        store.initialize()?;

        Ok(store)
    }

    /// Initialize the database schema
    fn initialize(&self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA)
            .context("Failed to initialize cache schema")?;
        Ok(())
    }

    /// Look up the entry for an absolute file path
    ///
    /// A row whose chunks column no longer deserializes is reported as
    /// absent; the caller re-extracts and overwrites it.
    pub fn get(&self, path: &Path) -> Result<Option<CacheEntry>> {
        let key = path.to_string_lossy();

        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT fingerprint, chunks FROM map_entries WHERE path = ?1",
                params![key.as_ref()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .context("Failed to look up cache entry")?;

        let Some((fingerprint, chunks_json)) = row else {
            return Ok(None);
        };

        match serde_json::from_str(&chunks_json) {
            Ok(chunks) => Ok(Some(CacheEntry {
                path: key.into_owned(),
                fingerprint,
                chunks,
            })),
            Err(e) => {
                tracing::debug!("Discarding undecodable cache entry for {}: {}", key, e);
                Ok(None)
            }
        }
    }

    /// Insert or overwrite the entry for an absolute file path
    ///
    /// The whole entry is replaced in one statement; last write wins.
    pub fn put(&self, path: &Path, fingerprint: &str, chunks: &[EntityChunk]) -> Result<()> {
        let key = path.to_string_lossy();
        let chunks_json =
            serde_json::to_string(chunks).context("Failed to encode entity chunks")?;

        self.conn
            .execute(
                r#"
                INSERT INTO map_entries (path, fingerprint, chunks, updated_at)
                VALUES (?1, ?2, ?3, datetime('now'))
                ON CONFLICT(path) DO UPDATE SET
                    fingerprint = excluded.fingerprint,
                    chunks = excluded.chunks,
                    updated_at = datetime('now')
                "#,
                params![key.as_ref(), fingerprint, chunks_json],
            )
            .context("Failed to write cache entry")?;

        Ok(())
    }

    /// Remove every entry; returns the number removed
    pub fn clear_all(&self) -> Result<usize> {
        let count = self
            .conn
            .execute("DELETE FROM map_entries", [])
            .context("Failed to clear cache")?;

        Ok(count)
    }

    /// Remove every entry under a directory; returns the number removed
    ///
    /// Membership is structural: a key matches iff it equals the prefix or
    /// continues with a path separator right after it, so `/repo/foo` never
    /// claims entries belonging to `/repo/foobar`.
    pub fn clear_subtree(&self, prefix: &Path) -> Result<usize> {
        let raw = prefix.to_string_lossy();
        let prefix: &str = if raw.len() > 1 {
            raw.trim_end_matches('/')
        } else {
            raw.as_ref()
        };

        let pattern = if prefix == "/" {
            "/%".to_string()
        } else {
            format!("{}/%", escape_like(prefix))
        };

        let count = self
            .conn
            .execute(
                r"DELETE FROM map_entries WHERE path = ?1 OR path LIKE ?2 ESCAPE '\'",
                params![prefix, pattern],
            )
            .context("Failed to clear cache subtree")?;

        Ok(count)
    }

    /// Number of entries currently cached
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM map_entries", [], |row| row.get(0))
            .context("Failed to count cache entries")?;

        Ok(count as usize)
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// The user-scoped default cache directory
pub fn default_cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("Could not determine a user cache directory")?;
    Ok(base.join(crate::APP_NAME))
}

/// Escape LIKE metacharacters so a prefix matches literally
fn escape_like(s: &str) -> String {
    s.replace('\\', r"\\").replace('%', r"\%").replace('_', r"\_")
}
