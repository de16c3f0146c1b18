/*!
 * Common test utilities for the tweetbridge test suite
 */


use chrono::{TimeZone, Utc};
use tweetbridge::models::Post;

/// Build a plain English post with the given identifier
pub fn make_post(id: &str) -> Post {
    Post {
        id: id.to_string(),
        author: "sasakirico".to_string(),
        text: format!("Test post number {}", id),
        created_at: Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap()),
        media_urls: Vec::new(),
        is_japanese: false,
        is_repost: false,
    }
}

/// Build a post flagged as a repost
pub fn make_repost(id: &str) -> Post {
    Post {
        is_repost: true,
        ..make_post(id)
    }
}
