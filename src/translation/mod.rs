/*!
 * Translation providers and routing.
 *
 * A primary keyed provider (OpenAI) and a keyless free-tier secondary
 * (MyMemory) behind one trait, selected by `TranslationService` which owns
 * the retry budget and the fallback decision.
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::TranslationError;

/// Common trait for translation providers
#[async_trait]
pub trait TranslationProvider: Send + Sync + Debug {
    /// Translate text to Simplified Chinese
    ///
    /// The `japanese_hint` selects the Japanese-specialized strategy; without
    /// it the source is treated as English-like.
    async fn translate(&self, text: &str, japanese_hint: bool)
        -> Result<String, TranslationError>;

    /// Human-readable provider name for logging
    fn name(&self) -> &'static str;
}

pub mod mymemory;
pub mod openai;
pub mod service;

pub use mymemory::MyMemory;
pub use openai::OpenAi;
pub use service::TranslationService;
