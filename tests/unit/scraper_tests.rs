/*!
 * Tests for Nitter timeline parsing
 */

use chrono::{TimeZone, Utc};
use tweetbridge::sources::ScraperSource;

const INSTANCE: &str = "https://nitter.net";

fn timeline_item(id: &str, text_html: &str, extra: &str) -> String {
    format!(
        concat!(
            r#"<div class="timeline-item">"#,
            "{extra}",
            r#"<a class="tweet-link" href="/sasakirico/status/{id}#m"></a>"#,
            r#"<span class="tweet-date"><a href="/sasakirico/status/{id}" title="May 1, 2024 · 10:30 AM UTC">May 1</a></span>"#,
            r#"<div class="tweet-content media-body" dir="auto">{text}</div>"#,
            r#"</div>"#
        ),
        id = id,
        text = text_html,
        extra = extra
    )
}

fn scraper() -> ScraperSource {
    ScraperSource::with_instances(vec![INSTANCE.to_string()])
}

#[test]
fn test_parse_timeline_withSimpleItem_shouldExtractIdTextAndDate() {
    let html = timeline_item("1786012345678901234", "新しいイラストができました", "");

    let posts = scraper().parse_timeline(INSTANCE, "sasakirico", &html, 5);

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, "1786012345678901234");
    assert_eq!(posts[0].author, "sasakirico");
    assert_eq!(posts[0].text, "新しいイラストができました");
    assert!(posts[0].is_japanese);
    assert_eq!(
        posts[0].created_at,
        Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap())
    );
}

#[test]
fn test_parse_timeline_withRetweetHeader_shouldSkipRepost() {
    let html = format!(
        "{}{}",
        timeline_item(
            "100",
            "RT content",
            r#"<div class="retweet-header">retweeted</div>"#
        ),
        timeline_item("200", "original content", "")
    );

    let posts = scraper().parse_timeline(INSTANCE, "sasakirico", &html, 5);

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, "200");
}

#[test]
fn test_parse_timeline_withMissingId_shouldDropItemOnly() {
    let html = format!(
        r#"<div class="timeline-item"><div class="tweet-content media-body">orphan</div></div>{}"#,
        timeline_item("300", "kept", "")
    );

    let posts = scraper().parse_timeline(INSTANCE, "sasakirico", &html, 5);

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, "300");
}

#[test]
fn test_parse_timeline_withRelativeMediaLinks_shouldAbsolutize() {
    let html = timeline_item(
        "400",
        "with media",
        r#"<a class="still-image" href="/pic/media%2Fimg1.jpg"></a><a class="still-image" href="https://cdn.example.com/img2.jpg"></a>"#,
    );

    let posts = scraper().parse_timeline(INSTANCE, "sasakirico", &html, 5);

    assert_eq!(posts.len(), 1);
    assert_eq!(
        posts[0].media_urls,
        vec![
            "https://nitter.net/pic/media%2Fimg1.jpg".to_string(),
            "https://cdn.example.com/img2.jpg".to_string(),
        ]
    );
}

#[test]
fn test_parse_timeline_withMarkupAndEntities_shouldStripToPlainText() {
    let html = timeline_item(
        "500",
        r#"new art &amp; <a href="/tags">more</a> &quot;prints&quot;"#,
        "",
    );

    let posts = scraper().parse_timeline(INSTANCE, "sasakirico", &html, 5);

    assert_eq!(posts[0].text, "new art & more \"prints\"");
    assert!(!posts[0].is_japanese);
}

#[test]
fn test_parse_timeline_withUnparseableDate_shouldLeaveTimestampEmpty() {
    let html = concat!(
        r#"<div class="timeline-item">"#,
        r#"<a class="tweet-link" href="/sasakirico/status/600#m"></a>"#,
        r#"<span class="tweet-date"><a href="/x" title="just now">x</a></span>"#,
        r#"<div class="tweet-content media-body">text</div>"#,
        r#"</div>"#
    );

    let posts = scraper().parse_timeline(INSTANCE, "sasakirico", html, 5);

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].created_at, None);
}

#[test]
fn test_parse_timeline_withMoreItemsThanCount_shouldStopAtCount() {
    let html: String = (0..8).map(|i| timeline_item(&i.to_string(), "text", "")).collect();

    let posts = scraper().parse_timeline(INSTANCE, "sasakirico", &html, 3);

    assert_eq!(posts.len(), 3);
}

#[test]
fn test_parse_timeline_withEmptyPage_shouldReturnNothing() {
    let posts = scraper().parse_timeline(INSTANCE, "sasakirico", "<html><body></body></html>", 5);

    assert!(posts.is_empty());
}
