/*!
 * Read-mode controller for the primary/fallback fetch channels.
 *
 * A two-state machine (PRIMARY, FALLBACK) with a consecutive-failure counter
 * and a cooldown timer. The controller owns the state explicitly so the
 * orchestrator can hold a single instance for the process lifetime and tests
 * can drive it with injected timestamps instead of sleeping.
 *
 * Transitions are evaluated once per cycle, never mid-cycle: the orchestrator
 * asks for a mode at the start of a pass and reports the primary outcome
 * afterwards.
 */

use chrono::{DateTime, Duration, Utc};
use log::{info, warn};

use crate::app_config::ApiSwitchConfig;

/// Which channel to read from this cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// Authenticated API channel
    Primary,
    /// Unauthenticated scraping channel
    Fallback,
}

impl std::fmt::Display for ReadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadMode::Primary => write!(f, "api"),
            ReadMode::Fallback => write!(f, "no-api"),
        }
    }
}

/// Tracks consecutive primary failures and manages the cooldown-then-retry
/// timer for returning to the primary channel
#[derive(Debug, Clone)]
pub struct ModeController {
    /// Switching policy (threshold, cooldown, enable flag)
    policy: ApiSwitchConfig,

    /// Current read mode
    mode: ReadMode,

    /// Consecutive primary-channel failures while in PRIMARY mode
    consecutive_failures: u32,

    /// When the controller last switched into FALLBACK
    switched_at: Option<DateTime<Utc>>,

    /// Earliest time a primary probe is allowed while in FALLBACK
    next_primary_retry: Option<DateTime<Utc>>,
}

impl ModeController {
    /// Create a controller starting in PRIMARY mode
    pub fn new(policy: ApiSwitchConfig) -> Self {
        Self {
            policy,
            mode: ReadMode::Primary,
            consecutive_failures: 0,
            switched_at: None,
            next_primary_retry: None,
        }
    }

    /// Current mode without evaluating any transition
    pub fn mode(&self) -> ReadMode {
        self.mode
    }

    /// Consecutive primary failures recorded so far
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Earliest allowed primary probe, if in FALLBACK
    pub fn next_primary_retry(&self) -> Option<DateTime<Utc>> {
        self.next_primary_retry
    }

    /// Decide which channel to use for this cycle
    ///
    /// With `force_no_api` set the answer is always FALLBACK and no state is
    /// touched. In FALLBACK mode, once the cooldown since the switch has
    /// elapsed the controller returns PRIMARY so the orchestrator performs a
    /// single probe read; the probe outcome must be reported back through
    /// `record_primary_success` or `record_primary_failure`.
    pub fn select_mode(&mut self, force_no_api: bool, now: DateTime<Utc>) -> ReadMode {
        if force_no_api {
            return ReadMode::Fallback;
        }

        match self.mode {
            ReadMode::Primary => ReadMode::Primary,
            ReadMode::Fallback => {
                if self.probe_due(now) {
                    info!(
                        "Cooldown of {} minutes elapsed since switch to no-api mode, probing the API channel",
                        self.policy.api_recovery_minutes
                    );
                    ReadMode::Primary
                } else {
                    ReadMode::Fallback
                }
            }
        }
    }

    /// Whether a primary probe is allowed at `now` while in FALLBACK
    pub fn probe_due(&self, now: DateTime<Utc>) -> bool {
        match (self.mode, self.next_primary_retry) {
            (ReadMode::Fallback, Some(retry_at)) => now >= retry_at,
            // Fallback without a timer happens only when auto switch created
            // no schedule; never probe in that case
            (ReadMode::Fallback, None) => false,
            (ReadMode::Primary, _) => false,
        }
    }

    /// Record a successful primary read: reset to PRIMARY with zero failures
    pub fn record_primary_success(&mut self) {
        if self.mode == ReadMode::Fallback {
            info!("API probe succeeded, switching back to api mode");
        }
        self.mode = ReadMode::Primary;
        self.consecutive_failures = 0;
        self.switched_at = None;
        self.next_primary_retry = None;
    }

    /// Record a primary read failure that counts toward a switch
    ///
    /// While in PRIMARY, increments the failure counter and switches to
    /// FALLBACK at the threshold. While in FALLBACK (a failed probe), stays
    /// put and reschedules the next probe one cooldown later, regardless of
    /// intervening fallback successes.
    pub fn record_primary_failure(&mut self, now: DateTime<Utc>) {
        let cooldown = Duration::minutes(self.policy.api_recovery_minutes);

        match self.mode {
            ReadMode::Primary => {
                self.consecutive_failures += 1;
                warn!(
                    "API fetch failed ({}/{})",
                    self.consecutive_failures, self.policy.max_api_failures
                );

                if !self.policy.enable_auto_switch {
                    return;
                }

                if self.consecutive_failures >= self.policy.max_api_failures {
                    warn!(
                        "{} consecutive API failures, switching to no-api mode for {} minutes",
                        self.consecutive_failures, self.policy.api_recovery_minutes
                    );
                    self.mode = ReadMode::Fallback;
                    self.switched_at = Some(now);
                    self.next_primary_retry = Some(now + cooldown);
                }
            }
            ReadMode::Fallback => {
                warn!(
                    "API probe failed, staying in no-api mode for another {} minutes",
                    self.policy.api_recovery_minutes
                );
                self.next_primary_retry = Some(now + cooldown);
            }
        }
    }
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new(ApiSwitchConfig::default())
    }
}
