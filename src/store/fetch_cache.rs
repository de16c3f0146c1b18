/*!
 * Per-handle fetch cache.
 *
 * One JSON file per handle holding the last fetched post batch plus its
 * fetch timestamp. An entry older than the TTL is treated as absent, as is
 * any entry when the caller requests a forced refresh. Entries are only ever
 * overwritten whole by a successful fetch, never partially updated.
 */

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::file_utils;
use crate::models::Post;

/// On-disk cache entry format
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    /// Account handle the batch was fetched for
    handle: String,

    /// When the batch was fetched
    fetched_at: DateTime<Utc>,

    /// The fetched posts, in source order
    posts: Vec<Post>,
}

/// Fetch cache rooted at a state directory
#[derive(Debug, Clone)]
pub struct FetchCache {
    /// Directory holding the per-handle cache files
    dir: PathBuf,

    /// Entry time-to-live in minutes
    ttl_minutes: i64,
}

impl FetchCache {
    /// Create a cache rooted at `dir` with the given TTL
    pub fn new<P: AsRef<Path>>(dir: P, ttl_minutes: i64) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            ttl_minutes,
        }
    }

    /// Path of the cache file for a handle
    pub fn path_for(&self, handle: &str) -> PathBuf {
        self.dir.join(format!("cache_{}_posts.json", handle))
    }

    /// Return the cached batch for a handle, if present and fresh
    ///
    /// `force` bypasses the cache entirely; the caller must perform a live
    /// fetch in that case, same as on a miss.
    pub fn get(&self, handle: &str, now: DateTime<Utc>, force: bool) -> Option<Vec<Post>> {
        if force {
            debug!("Cache bypassed for @{} (forced refresh)", handle);
            return None;
        }

        let path = self.path_for(handle);
        if !path.exists() {
            return None;
        }

        let entry = match self.read_entry(&path) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Ignoring unreadable cache file {:?}: {}", path, e);
                return None;
            }
        };

        let age = now - entry.fetched_at;
        if age > Duration::minutes(self.ttl_minutes) {
            debug!(
                "Cache for @{} is stale ({} minutes old, TTL {})",
                handle,
                age.num_minutes(),
                self.ttl_minutes
            );
            return None;
        }

        info!(
            "Using cached batch of {} posts for @{}",
            entry.posts.len(),
            handle
        );
        Some(entry.posts)
    }

    /// Overwrite the cached batch for a handle
    ///
    /// The write is temp-then-rename so an interruption cannot leave a
    /// corrupt entry behind.
    pub fn put(&self, handle: &str, posts: &[Post], now: DateTime<Utc>) -> Result<()> {
        let entry = CacheEntry {
            handle: handle.to_string(),
            fetched_at: now,
            posts: posts.to_vec(),
        };

        file_utils::ensure_dir(&self.dir)?;
        file_utils::write_json_atomic(self.path_for(handle), &entry)?;

        debug!("Cached {} posts for @{}", posts.len(), handle);
        Ok(())
    }

    fn read_entry(&self, path: &Path) -> Result<CacheEntry> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read cache file: {:?}", path))?;
        let entry: CacheEntry = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse cache file: {:?}", path))?;
        Ok(entry)
    }
}
