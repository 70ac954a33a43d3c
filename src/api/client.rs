// src/api/client.rs

use super::errors::LlmError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// A text service that answers a system + user prompt with a JSON object.
///
/// Every pipeline stage receives one of these, so tests can swap in a fake.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Sends one chat request and returns the raw message content.
    async fn complete_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String, LlmError>;
}

/// API client for an OpenAI-compatible chat completions endpoint.
pub struct OpenAiApi {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiApi {
    /// Creates a new `OpenAiApi` with the given request timeout.
    pub fn new(
        api_key: String,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    /// Sends a request to the chat completions API.
    async fn send_request(
        &self,
        messages: Vec<Value>,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "messages": messages,
                "temperature": temperature,
                "response_format": { "type": "json_object" },
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(LlmError::ApiError(format!("{}: {}", status, error_text)));
        }

        let raw_response = response.text().await?;
        let json_response: Value = serde_json::from_str(&raw_response)?;

        if let Some(error) = json_response.get("error") {
            return Err(LlmError::ApiError(error.to_string()));
        }

        let content = json_response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| LlmError::ApiError("response contained no message content".into()))?
            .trim()
            .to_string();

        log::debug!("Model response: {}", content);
        Ok(content)
    }
}

#[async_trait]
impl LlmClient for OpenAiApi {
    async fn complete_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        log::debug!("Calling chat completions API (model {})", self.model);

        let messages = vec![
            json!({"role": "system", "content": system_prompt}),
            json!({"role": "user", "content": user_prompt}),
        ];

        self.send_request(messages, temperature).await
    }
}
