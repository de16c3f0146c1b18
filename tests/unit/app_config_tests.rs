/*!
 * Tests for configuration defaults, validation, and file round-trips
 */

use tempfile::TempDir;
use tweetbridge::app_config::{Config, LogLevel};

fn valid_config() -> Config {
    let mut config = Config {
        artist_handle: "sasakirico".to_string(),
        ..Default::default()
    };
    config.translation.openai_api_key = "sk-test".to_string();
    config.weibo.app_key = "key".to_string();
    config.weibo.access_token = "token".to_string();
    config
}

#[test]
fn test_default_withNoOverrides_shouldUseDocumentedDefaults() {
    let config = Config::default();

    assert_eq!(config.cache_ttl_minutes, 15);
    assert_eq!(config.api_switch.max_api_failures, 3);
    assert_eq!(config.api_switch.api_recovery_minutes, 60);
    assert!(config.api_switch.enable_auto_switch);
    assert_eq!(config.translation.model, "gpt-3.5-turbo");
    assert_eq!(config.translation.retry_count, 3);
    assert_eq!(config.translation.retry_backoff_ms, 1000);
    assert!(!config.translation.use_backup_translator);
    assert!(!config.test_mode);
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_validate_withCompleteConfig_shouldSucceed() {
    assert!(valid_config().validate().is_ok());
}

#[test]
fn test_validate_withEmptyHandle_shouldFail() {
    let mut config = valid_config();
    config.artist_handle = String::new();

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withNegativeCacheTtl_shouldFail() {
    let mut config = valid_config();
    config.cache_ttl_minutes = -1;

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withZeroFailureThreshold_shouldFail() {
    let mut config = valid_config();
    config.api_switch.max_api_failures = 0;

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withMissingTranslationKey_shouldFail() {
    let mut config = valid_config();
    config.translation.openai_api_key = String::new();

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withBackupTranslator_shouldNotRequireTranslationKey() {
    let mut config = valid_config();
    config.translation.openai_api_key = String::new();
    config.translation.use_backup_translator = true;

    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withMissingWeiboCredentials_shouldFail() {
    let mut config = valid_config();
    config.weibo.access_token = String::new();

    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withTestMode_shouldSkipCredentialChecks() {
    let config = Config {
        artist_handle: "sasakirico".to_string(),
        test_mode: true,
        ..Default::default()
    };

    assert!(config.validate().is_ok());
}

#[test]
fn test_from_file_withSavedConfig_shouldRoundTrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conf.json");
    let config = valid_config();

    config.save(&path).unwrap();
    let loaded = Config::from_file(&path).unwrap();

    assert_eq!(loaded.artist_handle, config.artist_handle);
    assert_eq!(loaded.translation.openai_api_key, "sk-test");
    assert_eq!(loaded.weibo.app_key, "key");
    assert_eq!(loaded.cache_ttl_minutes, 15);
}

#[test]
fn test_from_file_withPartialJson_shouldFillDefaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(&path, r#"{"artist_handle": "sasakirico"}"#).unwrap();

    let loaded = Config::from_file(&path).unwrap();

    assert_eq!(loaded.artist_handle, "sasakirico");
    assert_eq!(loaded.cache_ttl_minutes, 15);
    assert_eq!(loaded.api_switch.max_api_failures, 3);
    assert_eq!(loaded.translation.endpoint, "https://api.openai.com/v1");
}

#[test]
fn test_from_file_withMissingFile_shouldFail() {
    let dir = TempDir::new().unwrap();

    assert!(Config::from_file(dir.path().join("absent.json")).is_err());
}
