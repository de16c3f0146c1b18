/*!
 * Persistent state for the pipeline.
 *
 * Two stores, both owned by the orchestrator:
 * - `ledger`: SQLite-backed processed-post ledger, append-only and
 *   queryable by post identifier.
 * - `fetch_cache`: per-handle JSON file holding the last fetched batch
 *   with a time-to-live.
 */

pub mod fetch_cache;
pub mod ledger;

// Re-export main types
pub use fetch_cache::FetchCache;
pub use ledger::Ledger;
