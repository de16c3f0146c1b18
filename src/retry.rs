/*!
 * Reusable retry-with-backoff policy for network calls.
 *
 * Every outward call in the pipeline (fetch, translate, publish) runs under
 * a small fixed retry budget with exponential backoff instead of duplicating
 * the loop at each call site.
 */

use log::warn;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Retry policy with a bounded attempt count and exponential backoff
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,

    /// Base delay in milliseconds, doubled after each failed attempt
    pub base_delay_ms: u64,
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms,
        }
    }

    /// Delay before the retry following the given 1-based attempt number
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 1u64 << (attempt.saturating_sub(1)).min(16);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }

    /// Run an operation, retrying every failure up to the attempt budget
    pub async fn run<T, E, F, Fut>(&self, what: &str, op: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.run_if(what, op, |_| true).await
    }

    /// Run an operation, retrying only failures the predicate accepts
    ///
    /// Non-retryable errors are returned immediately so that auth failures
    /// and quota signals can be classified by the caller without burning
    /// the backoff budget.
    pub async fn run_if<T, E, F, Fut, P>(&self, what: &str, mut op: F, retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 1u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.max_attempts && retryable(&e) => {
                    let delay = self.delay_for_attempt(attempt);
                    warn!(
                        "{} failed (attempt {}/{}): {}. Retrying in {}ms",
                        what,
                        attempt,
                        self.max_attempts,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 1000)
    }
}
