/*!
 * # tweetbridge
 *
 * A Rust service that polls an X (Twitter) account for new posts, translates
 * them to Simplified Chinese, and republishes them to a paired Weibo account.
 *
 * ## Features
 *
 * - Authenticated X API v2 reads with an automatic Nitter-scrape fallback
 *   after repeated rate-limit failures, and a cooldown-then-probe recovery
 *   back to the API
 * - Primary AI translation with a keyless free-tier fallback provider
 * - SQLite processed-post ledger guaranteeing at-most-once publication
 * - Per-handle fetch cache with a TTL to avoid hammering the source
 * - Dry-run publishing for testing message assembly without network calls
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `models`: Posts and processed-record types
 * - `mode`: Primary/fallback read-mode controller
 * - `store`: Processed-post ledger and fetch cache
 * - `sources`: Post sources (API client and scraping fallback)
 * - `translation`: Translation providers and routing
 * - `publisher`: Weibo publishing client
 * - `retry`: Reusable retry-with-backoff policy
 * - `file_utils`: Atomic writes and the host-path post mirror
 * - `app_controller`: Cycle orchestrator
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod mode;
pub mod models;
pub mod publisher;
pub mod retry;
pub mod sources;
pub mod store;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, CycleSummary, RunOptions};
pub use errors::{AppError, FetchError, PublishError, TranslationError};
pub use mode::{ModeController, ReadMode};
pub use models::{Outcome, Post, ProcessedRecord};
pub use translation::TranslationService;
