use crate::core::categorizer::categorizer_models::{ChatMessage, ModelConfig};
use crate::core::categorizer::{ModelClient, ModelError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

pub const OPENAI_CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

impl From<reqwest::Error> for ModelError {
    fn from(e: reqwest::Error) -> Self {
        ModelError::Transport(e.to_string())
    }
}

/// Client for any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn chat_complete(
        &self,
        messages: &[ChatMessage],
        config: &ModelConfig,
    ) -> Result<String, ModelError> {
        let payload = json!({
            "model": config.model,
            "response_format": { "type": "json_object" },
            "messages": messages,
        });

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ModelError::Status { status, body });
        }

        Ok(response.text().await?)
    }
}
