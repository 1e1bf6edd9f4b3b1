// src/api/client.rs

use super::config::{BackendConfig, BackendKind, MIN_API_KEY_LEN};
use super::errors::BackendError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// A chat-completion capability: one prompt in, the assistant's raw text out.
///
/// Implementations must not retry; failures go back to the caller as-is.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send(&self, prompt: &str, system_instruction: &str) -> Result<String, BackendError>;

    /// Short human-readable description, used in log lines and the shell header.
    fn describe(&self) -> String;
}

/// Builds the backend selected by `config`, validating it first.
pub fn backend_from_config(config: &BackendConfig) -> Result<Box<dyn ChatBackend>, BackendError> {
    if config.model().trim().is_empty() {
        return Err(BackendError::InvalidConfig(
            "model name cannot be empty".to_string(),
        ));
    }

    match config.kind {
        BackendKind::Remote => {
            let api_key = config
                .api_key
                .as_deref()
                .map(str::trim)
                .unwrap_or_default();
            if api_key.is_empty() {
                return Err(BackendError::InvalidCredential(
                    "no API key configured".to_string(),
                ));
            }
            if api_key.len() < MIN_API_KEY_LEN {
                return Err(BackendError::InvalidCredential(format!(
                    "key is shorter than {} characters",
                    MIN_API_KEY_LEN
                )));
            }
            Ok(Box::new(RemoteChatApi::new(
                api_key.to_string(),
                config.remote_model.clone(),
                &config.remote_base_url,
                config.request_timeout_secs,
            )?))
        }
        BackendKind::Local => Ok(Box::new(LocalChatApi::new(
            config.local_model.clone(),
            &config.local_base_url,
            config.request_timeout_secs,
        )?)),
    }
}

fn http_client(timeout_secs: u64) -> Result<Client, BackendError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// API client for a hosted, OpenAI-compatible chat completions endpoint.
pub struct RemoteChatApi {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl RemoteChatApi {
    /// Creates a new `RemoteChatApi` instance.
    pub fn new(
        api_key: String,
        model: String,
        base_url: &str,
        timeout_secs: u64,
    ) -> Result<Self, BackendError> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ChatBackend for RemoteChatApi {
    async fn send(&self, prompt: &str, system_instruction: &str) -> Result<String, BackendError> {
        log::debug!("Sending query to remote model: {}", self.model);

        let response = self
            .client
            .post(&format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": system_instruction},
                    {"role": "user", "content": prompt},
                ],
            }))
            .send()
            .await?;

        let status = response.status();
        let raw_response = response.text().await?;
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: raw_response,
            });
        }

        let content = parse_chat_completions_response(&raw_response)?;
        log::info!("Remote response: {}", content);
        Ok(content)
    }

    fn describe(&self) -> String {
        format!("remote model '{}'", self.model)
    }
}

/// API client for a locally hosted Ollama server.
pub struct LocalChatApi {
    client: Client,
    model: String,
    base_url: String,
}

impl LocalChatApi {
    pub fn new(model: String, base_url: &str, timeout_secs: u64) -> Result<Self, BackendError> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ChatBackend for LocalChatApi {
    async fn send(&self, prompt: &str, system_instruction: &str) -> Result<String, BackendError> {
        log::debug!("Sending query to local model: {}", self.model);

        let response = self
            .client
            .post(&format!("{}/api/chat", self.base_url))
            .json(&json!({
                "model": self.model,
                "stream": false,
                "messages": [
                    {"role": "system", "content": system_instruction},
                    {"role": "user", "content": prompt},
                ],
            }))
            .send()
            .await?;

        let status = response.status();
        let raw_response = response.text().await?;
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: raw_response,
            });
        }

        let content = parse_local_chat_response(&raw_response)?;
        log::info!("Local response: {}", content);
        Ok(content)
    }

    fn describe(&self) -> String {
        format!("local model '{}'", self.model)
    }
}

/// Extracts the assistant text from an OpenAI-style chat completions body.
pub fn parse_chat_completions_response(raw: &str) -> Result<String, BackendError> {
    let json_response: Value = serde_json::from_str(raw)?;

    if let Some(error) = json_response.get("error") {
        return Err(BackendError::ApiError(error_message(error)));
    }

    json_response["choices"][0]["message"]["content"]
        .as_str()
        .filter(|content| !content.is_empty())
        .map(str::to_string)
        .ok_or(BackendError::EmptyResponse)
}

/// Extracts the assistant text from an Ollama `/api/chat` body.
pub fn parse_local_chat_response(raw: &str) -> Result<String, BackendError> {
    let json_response: Value = serde_json::from_str(raw)?;

    if let Some(error) = json_response.get("error") {
        return Err(BackendError::ApiError(error_message(error)));
    }

    json_response["message"]["content"]
        .as_str()
        .filter(|content| !content.is_empty())
        .map(str::to_string)
        .ok_or(BackendError::EmptyResponse)
}

fn error_message(error: &Value) -> String {
    error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| error.to_string())
}
