use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::TranslationError;
use crate::translation::TranslationProvider;

/// Default MyMemory endpoint (free tier, no key)
const DEFAULT_ENDPOINT: &str = "https://api.mymemory.translated.net";

/// Keyless free-tier translation provider used as the secondary fallback
#[derive(Debug)]
pub struct MyMemory {
    /// HTTP client for API requests
    client: Client,
    /// API endpoint base URL
    endpoint: String,
}

/// MyMemory translation response
#[derive(Debug, Deserialize)]
struct MyMemoryResponse {
    #[serde(rename = "responseData")]
    response_data: Option<MyMemoryData>,
    #[serde(rename = "responseStatus")]
    response_status: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct MyMemoryData {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl MyMemory {
    /// Create a new MyMemory client against the public endpoint
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Create a new MyMemory client against a specific endpoint
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Default for MyMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranslationProvider for MyMemory {
    async fn translate(
        &self,
        text: &str,
        japanese_hint: bool,
    ) -> Result<String, TranslationError> {
        let langpair = if japanese_hint { "ja|zh-CN" } else { "en|zh-CN" };

        let url = format!("{}/get", self.endpoint);
        let response = self
            .client
            .get(&url)
            .query(&[("q", text), ("langpair", langpair)])
            .send()
            .await
            .map_err(|e| {
                TranslationError::Transient(format!("Failed to reach MyMemory API: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::Transient(format!(
                "MyMemory API error ({}): {}",
                status, body
            )));
        }

        let parsed = response.json::<MyMemoryResponse>().await.map_err(|e| {
            TranslationError::Transient(format!("Failed to parse MyMemory response: {}", e))
        })?;

        // responseStatus can be a number or a string depending on the error
        let ok = parsed
            .response_status
            .as_i64()
            .map(|s| s == 200)
            .or_else(|| parsed.response_status.as_str().map(|s| s == "200"))
            .unwrap_or(false);

        let translated = parsed
            .response_data
            .map(|d| d.translated_text.trim().to_string())
            .unwrap_or_default();

        if !ok || translated.is_empty() {
            return Err(TranslationError::Transient(format!(
                "MyMemory returned status {} with no usable translation",
                parsed.response_status
            )));
        }

        Ok(translated)
    }

    fn name(&self) -> &'static str {
        "mymemory"
    }
}
