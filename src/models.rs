/*!
 * Data model for posts moving through the pipeline and for
 * the records persisted in the processed-post ledger.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single post fetched from the origin account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    /// Unique post identifier
    pub id: String,

    /// Author handle (without the @)
    pub author: String,

    /// Raw post text
    pub text: String,

    /// Creation timestamp; the scraper may not be able to recover one
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    /// Attached media URLs, in display order
    #[serde(default)]
    pub media_urls: Vec<String>,

    /// Whether the source text looks Japanese; selects the translation prompt
    #[serde(default)]
    pub is_japanese: bool,

    /// Reposts are filtered out before a batch leaves a source
    #[serde(default)]
    pub is_repost: bool,
}

impl Post {
    /// Canonical URL of the post on the origin platform
    pub fn source_url(&self) -> String {
        format!("https://twitter.com/{}/status/{}", self.author, self.id)
    }
}

/// Outcome of processing a single post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Translated and republished successfully
    Published,
    /// Seen but intentionally not republished
    Skipped,
    /// Translation or publish failed after retries
    Failed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Published => write!(f, "published"),
            Outcome::Skipped => write!(f, "skipped"),
            Outcome::Failed => write!(f, "failed"),
        }
    }
}

impl std::str::FromStr for Outcome {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "published" => Ok(Outcome::Published),
            "skipped" => Ok(Outcome::Skipped),
            "failed" => Ok(Outcome::Failed),
            _ => Err(anyhow::anyhow!("Invalid outcome: {}", s)),
        }
    }
}

/// One row of the processed-post ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedRecord {
    /// Post identifier
    pub post_id: String,

    /// When the post was first processed
    pub processed_at: DateTime<Utc>,

    /// Outcome recorded at first processing
    pub outcome: Outcome,
}

/// Detect Japanese text by the presence of kana
///
/// Kanji alone is ambiguous with Chinese, so only hiragana and katakana
/// ranges count.
pub fn looks_japanese(text: &str) -> bool {
    text.chars().any(|c| {
        let cp = c as u32;
        (0x3040..=0x309F).contains(&cp) || (0x30A0..=0x30FF).contains(&cp)
    })
}
