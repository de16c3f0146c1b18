/*!
 * Processed-post ledger.
 *
 * SQLite-backed, append-only record of every post identifier the pipeline
 * has seen, consulted before every publish attempt to guarantee at-most-once
 * publication per identifier. Rows are never deleted or updated: the first
 * recorded outcome wins.
 */

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::models::{Outcome, ProcessedRecord};

/// Default database filename
const DEFAULT_DB_FILENAME: &str = "tweetbridge.db";

/// Default database directory name under the user's data directory
const DEFAULT_DB_DIRNAME: &str = "tweetbridge";

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Ledger of processed posts with thread-safe connection access
#[derive(Clone)]
pub struct Ledger {
    /// Path to the database file
    db_path: PathBuf,
    /// Thread-safe connection wrapped in Arc<Mutex>
    connection: Arc<Mutex<Connection>>,
}

impl Ledger {
    /// Open the ledger at the default location
    pub fn open_default() -> Result<Self> {
        let db_path = Self::default_database_path()?;
        Self::open(&db_path)
    }

    /// Open the ledger at the specified path
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create ledger directory: {:?}", parent))?;
        }

        info!("Opening ledger at: {:?}", db_path);

        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open ledger database: {:?}", db_path))?;

        initialize_schema(&conn)?;

        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory ledger (for testing)
    pub fn open_in_memory() -> Result<Self> {
        debug!("Creating in-memory ledger");

        let conn = Connection::open_in_memory().context("Failed to create in-memory ledger")?;

        initialize_schema(&conn)?;

        Ok(Self {
            db_path: PathBuf::from(":memory:"),
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the default database path
    pub fn default_database_path() -> Result<PathBuf> {
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;

        Ok(base_dir.join(DEFAULT_DB_DIRNAME).join(DEFAULT_DB_FILENAME))
    }

    /// Get the ledger file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Whether a post identifier has already been processed
    pub fn is_processed(&self, post_id: &str) -> Result<bool> {
        self.execute(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM processed_posts WHERE post_id = ?1",
                [post_id],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    /// Record a processing outcome for a post identifier
    ///
    /// Idempotent: a second call for the same identifier is ignored, so the
    /// outcome recorded at first processing is preserved.
    pub fn mark_processed(&self, post_id: &str, outcome: Outcome, now: DateTime<Utc>) -> Result<()> {
        self.execute(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO processed_posts (post_id, processed_at, outcome) VALUES (?1, ?2, ?3)",
                params![post_id, now.to_rfc3339(), outcome.to_string()],
            )?;

            if inserted > 0 {
                debug!("Recorded post {} as {}", post_id, outcome);
            } else {
                debug!("Post {} already recorded, keeping first outcome", post_id);
            }
            Ok(())
        })
    }

    /// Fetch the stored record for a post identifier, if any
    pub fn get_record(&self, post_id: &str) -> Result<Option<ProcessedRecord>> {
        self.execute(|conn| {
            let record = conn
                .query_row(
                    "SELECT post_id, processed_at, outcome FROM processed_posts WHERE post_id = ?1",
                    [post_id],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                        ))
                    },
                )
                .optional()?;

            match record {
                Some((post_id, processed_at, outcome)) => Ok(Some(ProcessedRecord {
                    post_id,
                    processed_at: DateTime::parse_from_rfc3339(&processed_at)
                        .map(|t| t.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                    outcome: outcome.parse().unwrap_or(Outcome::Failed),
                })),
                None => Ok(None),
            }
        })
    }

    /// Number of records in the ledger
    pub fn count(&self) -> Result<i64> {
        self.execute(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM processed_posts", [], |row| row.get(0))?;
            Ok(count)
        })
    }

    /// Execute a database operation with the connection
    fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .connection
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to acquire ledger lock: {}", e))?;

        f(&conn)
    }
}

/// Initialize the ledger schema
fn initialize_schema(conn: &Connection) -> Result<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Initializing ledger schema v{}", SCHEMA_VERSION);
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_version (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                version INTEGER NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS processed_posts (
                post_id TEXT PRIMARY KEY,
                processed_at TEXT NOT NULL,
                outcome TEXT NOT NULL
            );
            "#,
        )
        .context("Failed to create ledger tables")?;

        conn.execute(
            "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
            [SCHEMA_VERSION],
        )?;
    } else {
        debug!("Ledger schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Get the current schema version from the database
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let table_exists: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |row| row.get(0),
        )
        .context("Failed to check schema_version table existence")?;

    if !table_exists {
        return Ok(0);
    }

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    Ok(version)
}
