//! OpenAI-compatible chat transport
//!
//! Sends one conversation to the chat completions endpoint with
//! `response_format: json_object` and returns the assistant reply verbatim.
//! Retry and tier-fallback policy is NOT implemented here; see
//! [`super::gateway::ModelGateway`].

use super::{ChatTransport, GatewayError, Message};
use crate::config::LlmConfig;
use crate::error::ForgeError;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

/// Environment variable holding the API credential
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

pub struct OpenAiTransport {
    config: LlmConfig,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiTransport {
    /// Create a transport with an explicit credential.
    ///
    /// An empty credential is a configuration error: it is rejected here,
    /// before any network call can be attempted.
    pub fn new(config: LlmConfig, api_key: impl Into<String>) -> Result<Self, ForgeError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ForgeError::Config(format!(
                "API credential is empty; export {} before starting the server",
                API_KEY_ENV
            )));
        }

        Ok(Self {
            config,
            api_key,
            client: reqwest::Client::new(),
        })
    }

    /// Create a transport reading the credential from `OPENAI_API_KEY`
    pub fn from_env(config: LlmConfig) -> Result<Self, ForgeError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            ForgeError::Config(format!(
                "{} is not set; export it before starting the server",
                API_KEY_ENV
            ))
        })?;
        Self::new(config, api_key)
    }
}

#[async_trait]
impl ChatTransport for OpenAiTransport {
    async fn complete(&self, model: &str, messages: &[Message]) -> super::Result<String> {
        let url = format!("{}/chat/completions", self.config.base_url);

        // The reply is deserialized directly, so free text is never accepted
        let payload = json!({
            "model": model,
            "messages": messages,
            "response_format": { "type": "json_object" },
        });

        let request = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send();

        // One bounded wait per attempt; generation latency can be large
        let response = tokio::time::timeout(
            Duration::from_secs(self.config.request_timeout_secs),
            request,
        )
        .await
        .map_err(|_| GatewayError::Timeout)?
        .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status { status, body });
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        let content = data
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .ok_or_else(|| GatewayError::Parse("no message content in response".to_string()))?;

        Ok(content.to_string())
    }
}
