/*!
 * Cycle orchestrator tying the read sources, translator, and publisher
 * together around the mode controller and the processed-post ledger.
 */

use anyhow::{Context, Result};
use chrono::Utc;
use log::{error, info, warn};
use std::time::Duration;

use crate::app_config::Config;
use crate::errors::{AppError, FetchError};
use crate::file_utils;
use crate::mode::{ModeController, ReadMode};
use crate::models::{Outcome, Post};
use crate::publisher::Publisher;
use crate::sources::{ApiSource, ScraperSource, TweetSource};
use crate::store::{FetchCache, Ledger};
use crate::translation::TranslationService;

/// Per-invocation options resolved from the command line
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Maximum posts to fetch per cycle
    pub count: usize,
    /// Bypass the fetch cache
    pub force: bool,
    /// Force the fallback read mode, skipping all mode tracking
    pub no_api: bool,
    /// Mirror raw fetched posts to this external path
    pub windows_path: Option<String>,
}

/// Summary of one pipeline pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    /// Posts in the fetched batch (cache or live)
    pub fetched: usize,
    /// Posts that passed the dedup filter
    pub new_posts: usize,
    /// Posts published this pass
    pub published: usize,
    /// Posts recorded as failed this pass
    pub failed: usize,
}

/// Main application controller owning the pipeline state
pub struct Controller {
    /// Application configuration
    config: Config,
    /// Per-invocation options
    options: RunOptions,
    /// Read-mode state machine
    mode: ModeController,
    /// Processed-post ledger
    ledger: Ledger,
    /// Per-handle fetch cache
    cache: FetchCache,
    /// Primary (authenticated) source
    primary_source: Box<dyn TweetSource>,
    /// Fallback (scraping) source
    fallback_source: Box<dyn TweetSource>,
    /// Translation routing service
    translator: TranslationService,
    /// Publish target client
    publisher: Publisher,
}

impl Controller {
    /// Build a controller with real sources and default state locations
    pub fn new(config: Config, options: RunOptions) -> Result<Self> {
        config.validate()?;

        let ledger = Ledger::open_default()?;
        let state_dir = Ledger::default_database_path()?
            .parent()
            .map(|p| p.to_path_buf())
            .context("Ledger path has no parent directory")?;
        let cache = FetchCache::new(state_dir, config.cache_ttl_minutes);

        let primary_source: Box<dyn TweetSource> = Box::new(ApiSource::new(&config.source));
        let fallback_source: Box<dyn TweetSource> = Box::new(ScraperSource::new());
        let translator = TranslationService::from_config(&config.translation);
        let publisher = Publisher::new(&config.weibo, config.test_mode);
        let mode = ModeController::new(config.api_switch.clone());

        Ok(Self {
            config,
            options,
            mode,
            ledger,
            cache,
            primary_source,
            fallback_source,
            translator,
            publisher,
        })
    }

    /// Build a controller over explicit collaborators (used by tests)
    #[allow(clippy::too_many_arguments)]
    pub fn with_parts(
        config: Config,
        options: RunOptions,
        mode: ModeController,
        ledger: Ledger,
        cache: FetchCache,
        primary_source: Box<dyn TweetSource>,
        fallback_source: Box<dyn TweetSource>,
        translator: TranslationService,
        publisher: Publisher,
    ) -> Self {
        Self {
            config,
            options,
            mode,
            ledger,
            cache,
            primary_source,
            fallback_source,
            translator,
            publisher,
        }
    }

    /// Current read-mode state, for logging and tests
    pub fn mode(&self) -> &ModeController {
        &self.mode
    }

    /// Run one pipeline pass: resolve mode, fetch, filter, translate,
    /// publish, record
    ///
    /// Per-post failures are recorded and skipped. A fetch failure abandons
    /// the pass without error; only auth/config failures propagate.
    pub async fn run_once(&mut self) -> Result<CycleSummary, AppError> {
        let now = Utc::now();
        let handle = self.config.artist_handle.clone();
        let mut summary = CycleSummary::default();

        let read_mode = self.mode.select_mode(self.options.no_api, now);
        info!(target: "cycle", "Starting pass for @{} in {} mode", handle, read_mode);

        let posts = match self.cache.get(&handle, now, self.options.force) {
            Some(cached) => cached,
            None => match self.fetch_live(&handle, read_mode, now).await? {
                Some(fetched) => fetched,
                None => {
                    // Fetch failed; logged already, wait for the next interval
                    return Ok(summary);
                }
            },
        };
        summary.fetched = posts.len();

        let new_posts = self.filter_new(&posts)?;
        summary.new_posts = new_posts.len();

        if new_posts.is_empty() {
            info!(target: "cycle", "No new posts for @{}", handle);
            return Ok(summary);
        }
        info!(target: "cycle", "Found {} new posts for @{}", new_posts.len(), handle);

        for post in new_posts {
            match self.process_post(&post).await {
                Ok(post_id) => {
                    self.ledger
                        .mark_processed(&post.id, Outcome::Published, Utc::now())?;
                    info!(target: "cycle", "Post {} republished as {}", post.id, post_id);
                    summary.published += 1;
                }
                Err(e) => {
                    error!(
                        target: "cycle",
                        "Post {} failed and was skipped: {}", post.id, e
                    );
                    self.ledger
                        .mark_processed(&post.id, Outcome::Failed, Utc::now())?;
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Run passes on a fixed interval until interrupted
    ///
    /// The stop signal is only checked between cycles, never mid-cycle.
    pub async fn run_loop(&mut self, interval_minutes: u64) -> Result<(), AppError> {
        loop {
            if let Err(e) = self.run_once().await {
                match e {
                    AppError::Fetch(FetchError::Auth(_)) | AppError::Config(_) => return Err(e),
                    other => {
                        // Cycle-level failure: log and wait for the next tick
                        error!(target: "cycle", "Pass failed: {}", other);
                    }
                }
            }

            let next_check = Utc::now() + chrono::Duration::minutes(interval_minutes as i64);
            info!(
                target: "cycle",
                "Next check at {} in {} mode",
                next_check.format("%Y-%m-%d %H:%M:%S"),
                self.mode.mode()
            );

            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(interval_minutes * 60)) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!(target: "cycle", "Interrupted, stopping after the current cycle");
                    return Ok(());
                }
            }
        }
    }

    /// Perform a live fetch on the selected channel and report the outcome
    /// to the mode controller
    ///
    /// Returns `Ok(None)` when the fetch failed non-fatally; the transition,
    /// if any, applies from the next cycle onward.
    async fn fetch_live(
        &mut self,
        handle: &str,
        read_mode: ReadMode,
        now: chrono::DateTime<Utc>,
    ) -> Result<Option<Vec<Post>>, AppError> {
        let result = match read_mode {
            ReadMode::Primary => self.primary_source.fetch_recent(handle, self.options.count).await,
            ReadMode::Fallback => {
                self.fallback_source
                    .fetch_recent(handle, self.options.count)
                    .await
            }
        };

        match result {
            Ok(posts) => {
                if read_mode == ReadMode::Primary && !self.options.no_api {
                    self.mode.record_primary_success();
                }

                self.cache.put(handle, &posts, now)?;
                self.mirror(handle, read_mode, now, &posts);
                Ok(Some(posts))
            }
            Err(e @ FetchError::Auth(_)) => {
                error!("Source credentials rejected, cannot continue: {}", e);
                Err(AppError::Fetch(e))
            }
            Err(e) => {
                if read_mode == ReadMode::Primary && !self.options.no_api && e.counts_toward_switch()
                {
                    self.mode.record_primary_failure(now);
                }
                warn!("Fetch failed in {} mode: {}", read_mode, e);
                Ok(None)
            }
        }
    }

    /// Mirror the raw fetched batch to the configured external path
    fn mirror(
        &self,
        handle: &str,
        read_mode: ReadMode,
        now: chrono::DateTime<Utc>,
        posts: &[Post],
    ) {
        if let Some(raw_path) = &self.options.windows_path {
            if let Err(e) =
                file_utils::mirror_posts(raw_path, handle, now, &read_mode.to_string(), &posts)
            {
                warn!("Failed to mirror posts to {}: {}", raw_path, e);
            }
        }
    }

    /// Keep only original posts the ledger has not seen
    fn filter_new(&self, posts: &[Post]) -> Result<Vec<Post>, AppError> {
        let mut new_posts = Vec::new();
        for post in posts {
            if post.is_repost {
                continue;
            }
            if self.ledger.is_processed(&post.id)? {
                continue;
            }
            new_posts.push(post.clone());
        }
        Ok(new_posts)
    }

    /// Translate and publish one post
    async fn process_post(&self, post: &Post) -> Result<String, AppError> {
        let translated = self.translator.translate(&post.text, post.is_japanese).await?;

        let status_text = format!("{}\n\n原文链接: {}", translated, post.source_url());

        let post_id = self.publisher.publish(&status_text, &post.media_urls).await?;
        Ok(post_id)
    }
}
