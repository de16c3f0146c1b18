/*!
 * Weibo publisher.
 *
 * Publishes translated text plus up to nine attached images to the target
 * account. In dry-run mode no network call is made, but message assembly and
 * length/media validation still run so tests catch formatting errors.
 */

use log::{info, warn};
use reqwest::multipart;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

use crate::app_config::WeiboConfig;
use crate::errors::PublishError;
use crate::retry::RetryPolicy;

/// Weibo allows at most 9 attached images per status
pub const MAX_MEDIA_ITEMS: usize = 9;

/// Maximum status length in characters
pub const MAX_STATUS_CHARS: usize = 2000;

/// Weibo statuses client
#[derive(Debug)]
pub struct Publisher {
    /// HTTP client for API requests
    client: Client,
    /// OAuth access token
    access_token: String,
    /// API endpoint base URL
    endpoint: String,
    /// Dry-run mode: validate and assemble, never call the network
    dry_run: bool,
    /// Retry budget for failed publishes
    retry: RetryPolicy,
}

/// Status creation response
#[derive(Debug, Deserialize)]
struct StatusResponse {
    idstr: Option<String>,
    id: Option<u64>,
}

/// Picture upload response
#[derive(Debug, Deserialize)]
struct PicUploadResponse {
    pic_id: String,
}

impl Publisher {
    /// Create a publisher from target configuration
    pub fn new(config: &WeiboConfig, dry_run: bool) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            access_token: config.access_token.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            dry_run,
            retry: RetryPolicy::new(config.retry_count.max(1), config.retry_backoff_ms),
        }
    }

    /// Publish a status with optional media, returning the new status id
    pub async fn publish(
        &self,
        text: &str,
        media_urls: &[String],
    ) -> Result<String, PublishError> {
        let (status_text, media) = self.prepare(text, media_urls)?;

        if self.dry_run {
            info!(
                "Dry run: would publish {} chars with {} media items",
                status_text.chars().count(),
                media.len()
            );
            return Ok(format!("dry-run-{}", Uuid::new_v4()));
        }

        self.retry
            .run_if(
                "Publish",
                || self.attempt_publish(&status_text, &media),
                |e| !matches!(e, PublishError::InvalidPayload(_)),
            )
            .await
    }

    /// Validate and assemble the outgoing payload
    ///
    /// Media beyond the platform limit is clamped with a recorded warning;
    /// over-length text is truncated likewise.
    pub fn prepare(
        &self,
        text: &str,
        media_urls: &[String],
    ) -> Result<(String, Vec<String>), PublishError> {
        if text.trim().is_empty() {
            return Err(PublishError::InvalidPayload(
                "Refusing to publish an empty status".to_string(),
            ));
        }

        let mut media: Vec<String> = media_urls.to_vec();
        if media.len() > MAX_MEDIA_ITEMS {
            warn!(
                "Clamping {} media items to the platform limit of {}",
                media.len(),
                MAX_MEDIA_ITEMS
            );
            media.truncate(MAX_MEDIA_ITEMS);
        }

        let status_text = if text.chars().count() > MAX_STATUS_CHARS {
            warn!(
                "Truncating status from {} to {} chars",
                text.chars().count(),
                MAX_STATUS_CHARS
            );
            text.chars().take(MAX_STATUS_CHARS).collect()
        } else {
            text.to_string()
        };

        Ok((status_text, media))
    }

    /// One publish attempt: upload pictures, then create the status
    async fn attempt_publish(
        &self,
        status_text: &str,
        media: &[String],
    ) -> Result<String, PublishError> {
        let mut pic_ids = Vec::new();
        for url in media {
            match self.upload_picture(url).await {
                Ok(pic_id) => pic_ids.push(pic_id),
                // A broken image should not sink the whole status
                Err(e) => warn!("Skipping media {}: {}", url, e),
            }
        }

        let response = if pic_ids.is_empty() {
            self.client
                .post(format!("{}/2/statuses/update.json", self.endpoint))
                .form(&[
                    ("access_token", self.access_token.as_str()),
                    ("status", status_text),
                ])
                .send()
                .await
        } else {
            self.client
                .post(format!("{}/2/statuses/upload.json", self.endpoint))
                .form(&[
                    ("access_token", self.access_token.as_str()),
                    ("status", status_text),
                    ("pic_id", &pic_ids.join(",")),
                ])
                .send()
                .await
        }
        .map_err(|e| PublishError::RequestFailed(format!("Failed to reach Weibo API: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::ApiError {
                status_code: status.as_u16(),
                message: body,
            });
        }

        let parsed = response.json::<StatusResponse>().await.map_err(|e| {
            PublishError::RequestFailed(format!("Failed to parse Weibo response: {}", e))
        })?;

        let post_id = parsed
            .idstr
            .or_else(|| parsed.id.map(|id| id.to_string()))
            .ok_or_else(|| {
                PublishError::RequestFailed("Weibo response carried no status id".to_string())
            })?;

        info!("Published status {}", post_id);
        Ok(post_id)
    }

    /// Download one image and upload it to the target, returning its pic id
    async fn upload_picture(&self, url: &str) -> Result<String, PublishError> {
        let image = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PublishError::RequestFailed(format!("Failed to download {}: {}", url, e)))?;

        if !image.status().is_success() {
            return Err(PublishError::RequestFailed(format!(
                "Image download failed ({}): {}",
                image.status(),
                url
            )));
        }

        let bytes = image.bytes().await.map_err(|e| {
            PublishError::RequestFailed(format!("Failed to read image body: {}", e))
        })?;

        let part = multipart::Part::bytes(bytes.to_vec())
            .file_name("image.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| PublishError::RequestFailed(e.to_string()))?;

        let form = multipart::Form::new()
            .text("access_token", self.access_token.clone())
            .part("pic", part);

        let response = self
            .client
            .post(format!("{}/2/upload/pic.json", self.endpoint))
            .multipart(form)
            .send()
            .await
            .map_err(|e| PublishError::RequestFailed(format!("Picture upload failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::ApiError {
                status_code: status.as_u16(),
                message: body,
            });
        }

        let parsed = response.json::<PicUploadResponse>().await.map_err(|e| {
            PublishError::RequestFailed(format!("Failed to parse upload response: {}", e))
        })?;

        Ok(parsed.pic_id)
    }
}
