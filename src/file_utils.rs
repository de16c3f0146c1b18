/*!
 * File utilities: atomic JSON writes, host path translation, and the
 * raw post mirror used by `--windows-path`.
 */

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Create a directory and its parents if needed
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {:?}", path))?;
    }
    Ok(())
}

/// Write a JSON value with write-temp-then-replace semantics
///
/// The temp file lives in the target directory so the final rename never
/// crosses filesystems.
pub fn write_json_atomic<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let dir = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Path has no parent directory: {:?}", path))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {:?}", dir))?;

    let content =
        serde_json::to_string_pretty(value).context("Failed to serialize value to JSON")?;
    tmp.write_all(content.as_bytes())
        .context("Failed to write temp file")?;

    tmp.persist(path)
        .with_context(|| format!("Failed to replace file: {:?}", path))?;

    Ok(())
}

/// Translate a Windows-style path to its host mount point
///
/// Under WSL a path like `C:/Users/me/Documents` maps to
/// `/mnt/c/Users/me/Documents`. Paths without a drive letter are returned
/// unchanged so native paths keep working.
pub fn translate_host_path(raw: &str) -> PathBuf {
    let normalized = raw.replace('\\', "/");

    let mut chars = normalized.chars();
    let drive = chars.next();
    let colon = chars.next();

    match (drive, colon) {
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic() => {
            let rest = normalized[2..].trim_start_matches('/');
            PathBuf::from(format!("/mnt/{}/{}", letter.to_ascii_lowercase(), rest))
        }
        _ => PathBuf::from(normalized),
    }
}

/// Filename for a mirrored batch, encoding handle, fetch time, and fetch mode
pub fn mirror_filename(handle: &str, fetched_at: DateTime<Utc>, mode: &str) -> String {
    format!(
        "{}_tweets_{}_{}.json",
        handle,
        fetched_at.format("%Y%m%d_%H%M%S"),
        mode
    )
}

/// Mirror a raw fetched batch to an external filesystem location
///
/// Used by `--windows-path` to keep a copy of the untranslated posts on the
/// host system. Returns the path written.
pub fn mirror_posts<T: Serialize>(
    raw_path: &str,
    handle: &str,
    fetched_at: DateTime<Utc>,
    mode: &str,
    posts: &T,
) -> Result<PathBuf> {
    let dir = translate_host_path(raw_path);
    ensure_dir(&dir)?;

    let full_path = dir.join(mirror_filename(handle, fetched_at, mode));
    write_json_atomic(&full_path, posts)?;

    info!("Mirrored raw posts for @{} to {:?}", handle, full_path);
    Ok(full_path)
}
