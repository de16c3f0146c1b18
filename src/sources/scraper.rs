/*!
 * Fallback scraping source.
 *
 * Fetches a user's timeline from public Nitter instances without any
 * credentials, rotating instances and User-Agents between attempts. Parsing
 * is tolerant: a post with no recoverable timestamp or media still comes
 * through, a post with no identifier is dropped rather than failing the
 * whole fetch.
 */

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use rand::seq::{IndexedRandom, SliceRandom};
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::errors::FetchError;
use crate::models::{looks_japanese, Post};
use crate::sources::TweetSource;

/// Public Nitter instances tried in shuffled order
const NITTER_INSTANCES: &[&str] = &[
    "https://nitter.net",
    "https://nitter.cz",
    "https://nitter.unixfox.eu",
    "https://nitter.1d4.us",
    "https://nitter.kavin.rocks",
    "https://nitter.lacontrevoie.fr",
    "https://nitter.fdn.fr",
    "https://nitter.poast.org",
    "https://nitter.privacydev.net",
    "https://nitter.projectsegfau.lt",
    "https://nitter.pussthecat.org",
];

/// Rotated browser User-Agents
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.0 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.107 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:90.0) Gecko/20100101 Firefox/90.0",
];

static TWEET_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"class="tweet-link"\s+href="[^"]*/status/(\d+)"#).unwrap());

static TWEET_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<div class="tweet-content[^"]*"[^>]*>(.*?)</div>"#).unwrap()
});

static TWEET_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"class="tweet-date"><a[^>]*title="([^"]+)""#).unwrap()
});

static ATTACHMENT_IMAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"class="still-image"\s+href="([^"]+)""#).unwrap()
});

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Nitter scraping source
#[derive(Debug)]
pub struct ScraperSource {
    /// HTTP client for page fetches
    client: Client,
    /// Instances to rotate through; overridable for tests
    instances: Vec<String>,
}

impl ScraperSource {
    /// Create a scraper over the default public instance list
    pub fn new() -> Self {
        Self::with_instances(NITTER_INSTANCES.iter().map(|s| s.to_string()).collect())
    }

    /// Create a scraper over a specific instance list
    pub fn with_instances(instances: Vec<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
            instances,
        }
    }

    /// Fetch the timeline page for a handle from one instance
    async fn fetch_page(&self, instance: &str, handle: &str) -> Result<String, FetchError> {
        let url = format!("{}/{}", instance.trim_end_matches('/'), handle);
        debug!(target: "scrape", "Trying {}", url);

        let user_agent = USER_AGENTS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(USER_AGENTS[0]);

        let response = self
            .client
            .get(&url)
            .header("User-Agent", user_agent)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header("Accept-Language", "en-US,en;q=0.5")
            .send()
            .await
            .map_err(|e| FetchError::Transient(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transient(format!(
                "{} responded with {}",
                url, status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Transient(format!("Failed to read {} body: {}", url, e)))
    }

    /// Parse timeline items out of a Nitter page
    pub fn parse_timeline(
        &self,
        instance: &str,
        handle: &str,
        html: &str,
        count: usize,
    ) -> Vec<Post> {
        let mut posts = Vec::new();

        for chunk in html.split("class=\"timeline-item").skip(1) {
            if posts.len() >= count {
                break;
            }

            // Without an identifier the item is useless downstream
            let id = match TWEET_LINK.captures(chunk) {
                Some(caps) => caps[1].to_string(),
                None => continue,
            };

            if chunk.contains("retweet-header") {
                debug!(target: "scrape", "Skipping repost {}", id);
                continue;
            }

            let text = TWEET_CONTENT
                .captures(chunk)
                .map(|caps| strip_html(&caps[1]))
                .unwrap_or_default();

            let created_at = TWEET_DATE
                .captures(chunk)
                .and_then(|caps| parse_nitter_timestamp(&caps[1]));

            let media_urls = ATTACHMENT_IMAGE
                .captures_iter(chunk)
                .filter_map(|caps| absolutize(instance, &caps[1]))
                .collect();

            posts.push(Post {
                id,
                author: handle.to_string(),
                is_japanese: looks_japanese(&text),
                text,
                created_at,
                media_urls,
                is_repost: false,
            });
        }

        posts
    }
}

impl Default for ScraperSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TweetSource for ScraperSource {
    async fn fetch_recent(&self, handle: &str, count: usize) -> Result<Vec<Post>, FetchError> {
        let mut instances = self.instances.clone();
        instances.shuffle(&mut rand::rng());

        let mut last_error = None;
        for instance in &instances {
            let html = match self.fetch_page(instance, handle).await {
                Ok(html) => html,
                Err(e) => {
                    warn!(target: "scrape", "Instance failed: {}", e);
                    last_error = Some(e);
                    continue;
                }
            };

            let posts = self.parse_timeline(instance, handle, &html, count);
            if posts.is_empty() {
                warn!(target: "scrape", "No posts found on {}, trying another instance", instance);
                continue;
            }

            info!(
                target: "scrape",
                "Scraped {} original posts for @{} from {}",
                posts.len(),
                handle,
                instance
            );
            return Ok(posts);
        }

        Err(last_error.unwrap_or_else(|| {
            FetchError::Transient(format!(
                "No instance returned posts for @{} ({} tried)",
                handle,
                instances.len()
            ))
        }))
    }
}

/// Strip HTML tags and unescape the entities Nitter emits
fn strip_html(fragment: &str) -> String {
    let without_tags = HTML_TAG.replace_all(fragment, "");
    without_tags
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .trim()
        .to_string()
}

/// Parse the `title` timestamp on a Nitter tweet-date link
///
/// Nitter renders e.g. "May 1, 2024 · 10:30 AM UTC". Unparseable values are
/// treated as unknown rather than failing the fetch.
fn parse_nitter_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let cleaned = raw.replace(" · ", " ").replace(" UTC", "");
    NaiveDateTime::parse_from_str(&cleaned, "%b %d, %Y %I:%M %p")
        .ok()
        .map(|t| t.and_utc())
}

/// Resolve a possibly relative media URL against its instance
fn absolutize(instance: &str, href: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    let base = Url::parse(instance).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}
