//! Unified error handling module
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad URL: {0}")]
    BadUrl(String),
    #[error("Bad server response: {0}")]
    BadServerResponse(StatusCode),
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("Operation cancelled")]
    Cancelled,
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Short machine-readable code, used as a structured logging field
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadUrl(_) => "BAD_URL",
            ApiError::BadServerResponse(status) => match status.as_u16() {
                403 => "UPSTREAM_403",
                404 => "UPSTREAM_404",
                429 => "UPSTREAM_429",
                500..=599 => "UPSTREAM_5XX",
                _ => "UPSTREAM_ERROR",
            },
            ApiError::Decode(_) => "DECODE_ERROR",
            ApiError::Transport(e) if e.is_timeout() => "TIMEOUT",
            ApiError::Transport(_) => "TRANSPORT_ERROR",
            ApiError::Image(_) => "IMAGE_ERROR",
            ApiError::Task(_) => "TASK_ERROR",
            ApiError::Cancelled => "CANCELLED",
            ApiError::Config(_) => "CONFIG_ERROR",
        }
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
