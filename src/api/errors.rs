// src/api/errors.rs

use reqwest;
use serde_json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("JSON parsing failed: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("API returned an error: {0}")]
    ApiError(String),
    #[error("API returned no message content")]
    EmptyResponse,
    #[error("Invalid API key: {0}")]
    InvalidCredential(String),
    #[error("Invalid backend configuration: {0}")]
    InvalidConfig(String),
    #[error("Chat worker stopped before responding: {0}")]
    WorkerFailed(String),
}
