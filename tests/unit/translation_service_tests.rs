/*!
 * Tests for translation routing: retries, provider fallback, and
 * language-hint handling
 */

use tweetbridge::errors::TranslationError;
use tweetbridge::retry::RetryPolicy;
use tweetbridge::translation::{OpenAi, TranslationService};

use crate::common::mock_sources::{MockTranslate, MockTranslator};

fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, 1)
}

fn service(
    primary: MockTranslate,
    secondary: MockTranslate,
    use_backup: bool,
) -> (TranslationService, MockHandles) {
    let primary = MockTranslator::new(primary);
    let secondary = MockTranslator::new(secondary);
    let handles = MockHandles {
        primary_calls: primary.call_count(),
        secondary_calls: secondary.call_count(),
        primary_hint: primary.last_hint(),
    };
    let service = TranslationService::with_providers(
        Box::new(primary),
        Box::new(secondary),
        use_backup,
        fast_retry(),
    );
    (service, handles)
}

struct MockHandles {
    primary_calls: std::sync::Arc<std::sync::Mutex<usize>>,
    secondary_calls: std::sync::Arc<std::sync::Mutex<usize>>,
    primary_hint: std::sync::Arc<std::sync::Mutex<Option<bool>>>,
}

#[tokio::test]
async fn test_translate_withHealthyPrimary_shouldNotTouchSecondary() {
    let (service, handles) = service(MockTranslate::Succeed, MockTranslate::Succeed, false);

    let result = service.translate("hello", false).await.unwrap();

    assert_eq!(result, "译文: hello");
    assert_eq!(*handles.primary_calls.lock().unwrap(), 1);
    assert_eq!(*handles.secondary_calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_translate_withJapaneseHint_shouldPassHintToProvider() {
    let (service, handles) = service(MockTranslate::Succeed, MockTranslate::Succeed, false);

    service.translate("こんにちは", true).await.unwrap();

    assert_eq!(*handles.primary_hint.lock().unwrap(), Some(true));
}

#[test]
fn test_system_prompt_withJapaneseHint_shouldDifferFromDefault() {
    let default_prompt = OpenAi::system_prompt(false);
    let japanese_prompt = OpenAi::system_prompt(true);

    assert_ne!(default_prompt, japanese_prompt);
    assert!(japanese_prompt.contains("日语"));
}

#[tokio::test]
async fn test_translate_withTransientPrimary_shouldRetryThenSucceed() {
    let (service, handles) = service(
        MockTranslate::TransientTimes(2),
        MockTranslate::Succeed,
        false,
    );

    let result = service.translate("hello", false).await.unwrap();

    assert_eq!(result, "译文: hello");
    assert_eq!(*handles.primary_calls.lock().unwrap(), 3);
    assert_eq!(*handles.secondary_calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn test_translate_withQuotaExhausted_shouldFallBackToSecondary() {
    let (service, handles) = service(MockTranslate::QuotaExceeded, MockTranslate::Succeed, false);

    let result = service.translate("hello", false).await.unwrap();

    assert_eq!(result, "译文: hello");
    assert_eq!(*handles.primary_calls.lock().unwrap(), 1);
    assert_eq!(*handles.secondary_calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_translate_withExhaustedRetries_shouldFallBackToSecondary() {
    let (service, handles) = service(MockTranslate::AlwaysTransient, MockTranslate::Succeed, false);

    let result = service.translate("hello", false).await.unwrap();

    assert_eq!(result, "译文: hello");
    // Full retry budget burned on the primary before falling back
    assert_eq!(*handles.primary_calls.lock().unwrap(), 3);
    assert_eq!(*handles.secondary_calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_translate_withBothProvidersFailing_shouldReturnFatal() {
    let (service, _handles) = service(
        MockTranslate::QuotaExceeded,
        MockTranslate::AlwaysTransient,
        false,
    );

    let result = service.translate("hello", false).await;

    assert!(matches!(result, Err(TranslationError::Fatal(_))));
}

#[tokio::test]
async fn test_translate_withBackupEnabled_shouldSkipPrimary() {
    let (service, handles) = service(MockTranslate::Succeed, MockTranslate::Succeed, true);

    let result = service.translate("hello", false).await.unwrap();

    assert_eq!(result, "译文: hello");
    assert_eq!(*handles.primary_calls.lock().unwrap(), 0);
    assert_eq!(*handles.secondary_calls.lock().unwrap(), 1);
}
