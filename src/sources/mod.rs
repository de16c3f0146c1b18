/*!
 * Post sources for the origin account.
 *
 * Two interchangeable implementations behind one trait:
 * - `api`: authenticated X API v2 channel (primary)
 * - `scraper`: unauthenticated Nitter scraping channel (fallback)
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::FetchError;
use crate::models::Post;

/// Common trait for post sources
///
/// The mode controller decides which implementation a cycle uses; calling
/// code never branches on the channel itself.
#[async_trait]
pub trait TweetSource: Send + Sync + Debug {
    /// Fetch the most recent original posts for a handle
    ///
    /// Reposts are detected and excluded before the sequence is returned;
    /// only original posts reach downstream stages.
    async fn fetch_recent(&self, handle: &str, count: usize) -> Result<Vec<Post>, FetchError>;
}

pub mod api;
pub mod scraper;

pub use api::ApiSource;
pub use scraper::ScraperSource;
