/*!
 * Tests for publish payload validation and dry-run behavior
 */

use tweetbridge::app_config::WeiboConfig;
use tweetbridge::errors::PublishError;
use tweetbridge::publisher::{Publisher, MAX_MEDIA_ITEMS, MAX_STATUS_CHARS};

fn dry_run_publisher() -> Publisher {
    Publisher::new(&WeiboConfig::default(), true)
}

fn media_urls(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("https://pbs.twimg.com/media/img{}.jpg", i))
        .collect()
}

#[test]
fn test_prepare_withEmptyText_shouldRejectPayload() {
    let publisher = dry_run_publisher();

    let result = publisher.prepare("   ", &[]);

    assert!(matches!(result, Err(PublishError::InvalidPayload(_))));
}

#[test]
fn test_prepare_withTwelveMediaItems_shouldClampToNine() {
    let publisher = dry_run_publisher();
    let urls = media_urls(12);

    let (_, media) = publisher.prepare("新作", &urls).unwrap();

    assert_eq!(media.len(), MAX_MEDIA_ITEMS);
    // The first nine survive in order
    assert_eq!(media, urls[..9].to_vec());
}

#[test]
fn test_prepare_withNineMediaItems_shouldKeepAll() {
    let publisher = dry_run_publisher();
    let urls = media_urls(9);

    let (_, media) = publisher.prepare("新作", &urls).unwrap();

    assert_eq!(media.len(), 9);
}

#[test]
fn test_prepare_withOverlongText_shouldTruncateByChars() {
    let publisher = dry_run_publisher();
    // Multi-byte chars make byte-based truncation visibly wrong
    let text: String = "微".repeat(MAX_STATUS_CHARS + 50);

    let (status_text, _) = publisher.prepare(&text, &[]).unwrap();

    assert_eq!(status_text.chars().count(), MAX_STATUS_CHARS);
}

#[test]
fn test_prepare_withShortText_shouldPassThroughUnchanged() {
    let publisher = dry_run_publisher();

    let (status_text, _) = publisher.prepare("新しいイラスト\n\n原文链接: x", &[]).unwrap();

    assert_eq!(status_text, "新しいイラスト\n\n原文链接: x");
}

#[tokio::test]
async fn test_publish_withDryRun_shouldReturnSyntheticIdWithoutNetwork() {
    let publisher = dry_run_publisher();

    let id = publisher.publish("新作発表です", &media_urls(2)).await.unwrap();

    assert!(id.starts_with("dry-run-"));
}

#[tokio::test]
async fn test_publish_withDryRunTwice_shouldReturnDistinctIds() {
    let publisher = dry_run_publisher();

    let first = publisher.publish("同一条", &[]).await.unwrap();
    let second = publisher.publish("同一条", &[]).await.unwrap();

    assert_ne!(first, second);
}

#[tokio::test]
async fn test_publish_withDryRunEmptyText_shouldStillValidate() {
    let publisher = dry_run_publisher();

    let result = publisher.publish("", &[]).await;

    assert!(matches!(result, Err(PublishError::InvalidPayload(_))));
}
