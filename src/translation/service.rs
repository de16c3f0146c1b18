/*!
 * Translation routing: primary provider with retries, secondary fallback.
 *
 * Transient primary failures are retried with exponential backoff; a quota
 * signal, or exhausting the retry budget, falls through to the keyless
 * secondary provider. A secondary failure is Fatal for the post: it gets
 * skipped and recorded, not retried again within the cycle.
 */

use log::{info, warn};

use crate::app_config::TranslationConfig;
use crate::errors::TranslationError;
use crate::retry::RetryPolicy;
use crate::translation::{MyMemory, OpenAi, TranslationProvider};

/// Translation service owning both providers and the routing policy
#[derive(Debug)]
pub struct TranslationService {
    /// Primary keyed provider
    primary: Box<dyn TranslationProvider>,
    /// Keyless free-tier fallback
    secondary: Box<dyn TranslationProvider>,
    /// Route everything through the secondary, skipping the primary
    use_backup_translator: bool,
    /// Retry budget for transient primary failures
    retry: RetryPolicy,
}

impl TranslationService {
    /// Build the service from configuration
    pub fn from_config(config: &TranslationConfig) -> Self {
        Self {
            primary: Box::new(OpenAi::new(config)),
            secondary: Box::new(MyMemory::new()),
            use_backup_translator: config.use_backup_translator,
            retry: RetryPolicy::new(config.retry_count.max(1), config.retry_backoff_ms),
        }
    }

    /// Build the service over explicit providers (used by tests)
    pub fn with_providers(
        primary: Box<dyn TranslationProvider>,
        secondary: Box<dyn TranslationProvider>,
        use_backup_translator: bool,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            primary,
            secondary,
            use_backup_translator,
            retry,
        }
    }

    /// Translate text to Simplified Chinese
    pub async fn translate(
        &self,
        text: &str,
        japanese_hint: bool,
    ) -> Result<String, TranslationError> {
        if self.use_backup_translator {
            info!("Backup translator enabled by configuration, skipping the primary provider");
            return self.translate_secondary(text, japanese_hint).await;
        }

        let primary_result = self
            .retry
            .run_if(
                "Primary translation",
                || self.primary.translate(text, japanese_hint),
                |e| matches!(e, TranslationError::Transient(_)),
            )
            .await;

        match primary_result {
            Ok(translated) => Ok(translated),
            Err(TranslationError::QuotaExceeded(msg)) => {
                warn!(
                    "{} quota exhausted ({}), falling back to {}",
                    self.primary.name(),
                    msg,
                    self.secondary.name()
                );
                self.translate_secondary(text, japanese_hint).await
            }
            Err(TranslationError::Transient(msg)) => {
                warn!(
                    "{} still failing after retries ({}), falling back to {}",
                    self.primary.name(),
                    msg,
                    self.secondary.name()
                );
                self.translate_secondary(text, japanese_hint).await
            }
            Err(e) => Err(e),
        }
    }

    /// Run the secondary provider; any failure is Fatal for the post
    async fn translate_secondary(
        &self,
        text: &str,
        japanese_hint: bool,
    ) -> Result<String, TranslationError> {
        self.secondary
            .translate(text, japanese_hint)
            .await
            .map_err(|e| {
                TranslationError::Fatal(format!(
                    "Secondary translator {} failed: {}",
                    self.secondary.name(),
                    e
                ))
            })
    }
}
