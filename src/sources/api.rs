use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::app_config::SourceConfig;
use crate::errors::FetchError;
use crate::models::{looks_japanese, Post};
use crate::sources::TweetSource;

/// Authenticated X API v2 client
#[derive(Debug)]
pub struct ApiSource {
    /// HTTP client for API requests
    client: Client,
    /// Bearer token for authentication
    bearer_token: String,
    /// API endpoint base URL
    endpoint: String,
}

/// User lookup response
#[derive(Debug, Deserialize)]
struct UserResponse {
    data: Option<UserData>,
}

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
    username: String,
}

/// Timeline response
#[derive(Debug, Deserialize)]
struct TimelineResponse {
    #[serde(default)]
    data: Vec<TweetData>,
    includes: Option<TimelineIncludes>,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
    text: String,
    created_at: Option<String>,
    attachments: Option<TweetAttachments>,
    referenced_tweets: Option<Vec<ReferencedTweet>>,
}

#[derive(Debug, Deserialize)]
struct TweetAttachments {
    #[serde(default)]
    media_keys: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ReferencedTweet {
    #[serde(rename = "type")]
    ref_type: String,
}

#[derive(Debug, Deserialize)]
struct TimelineIncludes {
    #[serde(default)]
    media: Vec<MediaItem>,
}

#[derive(Debug, Deserialize)]
struct MediaItem {
    media_key: String,
    #[serde(rename = "type")]
    media_type: String,
    url: Option<String>,
}

impl ApiSource {
    /// Create a new API source from source configuration
    pub fn new(config: &SourceConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            bearer_token: config.bearer_token.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// Send an authenticated GET and map the failure classes
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.bearer_token)
            .query(query)
            .send()
            .await
            .map_err(|e| FetchError::Transient(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(FetchError::RateLimited(format!(
                "X API rate limit hit on {}",
                url
            )));
        }
        if status.as_u16() == 401 || status.as_u16() == 403 {
            let body = response.text().await.unwrap_or_default();
            error!("X API authentication failure ({}): {}", status, body);
            return Err(FetchError::Auth(format!(
                "X API rejected credentials ({})",
                status
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Transient(format!(
                "X API error ({}): {}",
                status, body
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Parse(format!("Failed to parse X API response: {}", e)))
    }

    /// Resolve a handle to its numeric user id
    async fn lookup_user(&self, handle: &str) -> Result<UserData, FetchError> {
        let url = format!("{}/2/users/by/username/{}", self.endpoint, handle);
        let response: UserResponse = self.get_json(&url, &[]).await?;

        response
            .data
            .ok_or_else(|| FetchError::Parse(format!("User @{} not found", handle)))
    }
}

#[async_trait]
impl TweetSource for ApiSource {
    async fn fetch_recent(&self, handle: &str, count: usize) -> Result<Vec<Post>, FetchError> {
        let user = self.lookup_user(handle).await?;
        debug!("Resolved @{} to user id {}", handle, user.id);

        // The v2 timeline endpoint requires max_results in 5..=100
        let max_results = count.clamp(5, 100).to_string();

        let url = format!("{}/2/users/{}/tweets", self.endpoint, user.id);
        let query = [
            ("max_results", max_results),
            ("tweet.fields", "created_at,referenced_tweets".to_string()),
            ("expansions", "attachments.media_keys".to_string()),
            ("media.fields", "url,type".to_string()),
        ];
        let timeline: TimelineResponse = self.get_json(&url, &query).await?;

        let media_pool = timeline
            .includes
            .map(|inc| inc.media)
            .unwrap_or_default();

        let mut posts = Vec::new();
        for tweet in timeline.data.into_iter().take(count) {
            let is_repost = tweet
                .referenced_tweets
                .as_ref()
                .map(|refs| refs.iter().any(|r| r.ref_type == "retweeted"))
                .unwrap_or(false)
                || tweet.text.starts_with("RT @");

            if is_repost {
                debug!("Skipping repost {}", tweet.id);
                continue;
            }

            let media_urls: Vec<String> = tweet
                .attachments
                .as_ref()
                .map(|a| {
                    a.media_keys
                        .iter()
                        .filter_map(|key| {
                            media_pool
                                .iter()
                                .find(|m| &m.media_key == key && m.media_type == "photo")
                                .and_then(|m| m.url.clone())
                        })
                        .collect()
                })
                .unwrap_or_default();

            let created_at = tweet
                .created_at
                .as_deref()
                .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
                .map(|t| t.with_timezone(&Utc));

            posts.push(Post {
                id: tweet.id,
                author: user.username.clone(),
                is_japanese: looks_japanese(&tweet.text),
                text: tweet.text,
                created_at,
                media_urls,
                is_repost: false,
            });
        }

        info!("Fetched {} original posts for @{} via the API", posts.len(), handle);
        Ok(posts)
    }
}
