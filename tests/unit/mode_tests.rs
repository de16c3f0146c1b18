/*!
 * Tests for the read-mode controller state machine
 */

use chrono::{Duration, TimeZone, Utc};
use tweetbridge::app_config::ApiSwitchConfig;
use tweetbridge::mode::{ModeController, ReadMode};

fn policy() -> ApiSwitchConfig {
    ApiSwitchConfig {
        enable_auto_switch: true,
        max_api_failures: 3,
        api_recovery_minutes: 60,
    }
}

fn t0() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

#[test]
fn test_select_mode_withFreshController_shouldReturnPrimary() {
    let mut controller = ModeController::new(policy());
    assert_eq!(controller.select_mode(false, t0()), ReadMode::Primary);
}

#[test]
fn test_select_mode_withForceNoApi_shouldAlwaysReturnFallback() {
    let mut controller = ModeController::new(policy());
    assert_eq!(controller.select_mode(true, t0()), ReadMode::Fallback);
    // Forced mode touches no state
    assert_eq!(controller.consecutive_failures(), 0);
    assert_eq!(controller.mode(), ReadMode::Primary);
}

#[test]
fn test_record_primary_failure_withThreeFailures_shouldSwitchToFallback() {
    let mut controller = ModeController::new(policy());

    controller.record_primary_failure(t0());
    assert_eq!(controller.mode(), ReadMode::Primary);
    controller.record_primary_failure(t0());
    assert_eq!(controller.mode(), ReadMode::Primary);
    controller.record_primary_failure(t0());

    assert_eq!(controller.mode(), ReadMode::Fallback);
    assert_eq!(
        controller.next_primary_retry(),
        Some(t0() + Duration::minutes(60))
    );
}

#[test]
fn test_record_primary_success_withPriorFailures_shouldResetCounter() {
    let mut controller = ModeController::new(policy());

    controller.record_primary_failure(t0());
    controller.record_primary_failure(t0());
    controller.record_primary_success();

    assert_eq!(controller.consecutive_failures(), 0);
    assert_eq!(controller.mode(), ReadMode::Primary);

    // The counter starts over: two more failures are not enough to switch
    controller.record_primary_failure(t0());
    controller.record_primary_failure(t0());
    assert_eq!(controller.mode(), ReadMode::Primary);
}

#[test]
fn test_select_mode_withinCooldown_shouldStayInFallback() {
    let mut controller = ModeController::new(policy());
    for _ in 0..3 {
        controller.record_primary_failure(t0());
    }

    let before_cooldown = t0() + Duration::minutes(59);
    assert_eq!(controller.select_mode(false, before_cooldown), ReadMode::Fallback);
}

#[test]
fn test_select_mode_afterCooldown_shouldProbePrimary() {
    let mut controller = ModeController::new(policy());
    for _ in 0..3 {
        controller.record_primary_failure(t0());
    }

    let after_cooldown = t0() + Duration::minutes(61);
    assert_eq!(controller.select_mode(false, after_cooldown), ReadMode::Primary);

    // A successful probe restores primary with a clean counter
    controller.record_primary_success();
    assert_eq!(controller.mode(), ReadMode::Primary);
    assert_eq!(controller.consecutive_failures(), 0);
    assert_eq!(controller.next_primary_retry(), None);
}

#[test]
fn test_record_primary_failure_onFailedProbe_shouldRescheduleOneCooldownLater() {
    let mut controller = ModeController::new(policy());
    for _ in 0..3 {
        controller.record_primary_failure(t0());
    }

    let probe_time = t0() + Duration::minutes(61);
    assert_eq!(controller.select_mode(false, probe_time), ReadMode::Primary);

    // Probe fails: stay in fallback, next retry one cooldown from now
    controller.record_primary_failure(probe_time);
    assert_eq!(controller.mode(), ReadMode::Fallback);
    assert_eq!(
        controller.next_primary_retry(),
        Some(probe_time + Duration::minutes(60))
    );

    // Immediately after, no new probe is due
    assert_eq!(
        controller.select_mode(false, probe_time + Duration::minutes(1)),
        ReadMode::Fallback
    );
}

#[test]
fn test_record_primary_failure_withAutoSwitchDisabled_shouldNeverSwitch() {
    let mut controller = ModeController::new(ApiSwitchConfig {
        enable_auto_switch: false,
        ..policy()
    });

    for _ in 0..5 {
        controller.record_primary_failure(t0());
    }

    assert_eq!(controller.mode(), ReadMode::Primary);
    assert_eq!(controller.consecutive_failures(), 5);
}
