use async_trait::async_trait;
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::app_config::TranslationConfig;
use crate::errors::TranslationError;
use crate::translation::TranslationProvider;

/// System prompt for English-like source text
const SYSTEM_PROMPT_DEFAULT: &str = "你是一位优秀的翻译，能够将文本准确地翻译成简体中文，同时保持原文的风格和感情。";

/// System prompt for Japanese source text
const SYSTEM_PROMPT_JAPANESE: &str = "你是一位精通日语的翻译，能够将日语文本准确地翻译成简体中文，正确处理敬语、拟声词和日本文化相关的表达，同时保持原文的风格和感情。";

/// OpenAI client for chat-completion translation
#[derive(Debug)]
pub struct OpenAi {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL
    endpoint: String,
    /// Model to use
    model: String,
}

/// Chat completion request
#[derive(Debug, Serialize)]
struct ChatRequest {
    /// The model to use
    model: String,
    /// The messages for the conversation
    messages: Vec<ChatMessage>,
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Chat message format
#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    role: String,
    /// Content of the message
    content: String,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    /// Response choices
    choices: Vec<ChatChoice>,
}

/// Individual choice in a chat completion response
#[derive(Debug, Deserialize)]
struct ChatChoice {
    /// The generated message
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    /// Content of the message
    content: String,
}

impl OpenAi {
    /// Create a new OpenAI client from translation configuration
    pub fn new(config: &TranslationConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: config.openai_api_key.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    /// System prompt for the given source-language hint
    pub fn system_prompt(japanese_hint: bool) -> &'static str {
        if japanese_hint {
            SYSTEM_PROMPT_JAPANESE
        } else {
            SYSTEM_PROMPT_DEFAULT
        }
    }
}

#[async_trait]
impl TranslationProvider for OpenAi {
    async fn translate(
        &self,
        text: &str,
        japanese_hint: bool,
    ) -> Result<String, TranslationError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Self::system_prompt(japanese_hint).to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!("请将以下文本翻译成简体中文:\n\n{}", text),
                },
            ],
            temperature: Some(0.3),
        };

        let url = format!("{}/chat/completions", self.endpoint);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                TranslationError::Transient(format!("Failed to reach OpenAI API: {}", e))
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::QuotaExceeded(format!(
                "OpenAI quota exhausted: {}",
                body
            )));
        }
        if status.as_u16() == 401 || status.as_u16() == 403 {
            let body = response.text().await.unwrap_or_default();
            error!("OpenAI authentication failure ({}): {}", status, body);
            return Err(TranslationError::Fatal(format!(
                "OpenAI rejected credentials ({})",
                status
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::Transient(format!(
                "OpenAI API error ({}): {}",
                status, body
            )));
        }

        let chat_response = response.json::<ChatResponse>().await.map_err(|e| {
            TranslationError::Transient(format!("Failed to parse OpenAI response: {}", e))
        })?;

        let translated = chat_response
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default();

        if translated.is_empty() {
            return Err(TranslationError::Transient(
                "OpenAI returned an empty translation".to_string(),
            ));
        }

        Ok(translated)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
