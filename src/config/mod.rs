//! Application configuration module
use crate::errors::{ApiError, ApiResult};
use crate::utils::ensure_trailing_slash;
use reqwest::Url;
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://junior.balinasoft.com/";
pub const DEFAULT_DISPLAY_NAME: &str = "Anonymous";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub base_url: String,
    pub http_timeout: Duration,
    pub upload_display_name: String,
}

impl AppConfig {
    /// Configuration pointing at `base_url` with default timeouts
    pub fn new(base_url: impl AsRef<str>) -> ApiResult<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url.as_ref())?,
            http_timeout: Duration::from_secs(30),
            upload_display_name: DEFAULT_DISPLAY_NAME.to_string(),
        })
    }

    /// Load configuration from environment variables
    pub fn from_env() -> ApiResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> ApiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("CATALOG_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = match lookup("HTTP_TIMEOUT_SECONDS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                ApiError::Config(format!("HTTP_TIMEOUT_SECONDS must be an integer, got {:?}", raw))
            })?,
            None => 30,
        };

        let upload_display_name = lookup("UPLOAD_DISPLAY_NAME")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());

        Ok(Self {
            base_url: parse_base_url(&base_url)?,
            http_timeout: Duration::from_secs(timeout_secs),
            upload_display_name,
        })
    }
}

fn parse_base_url(raw: &str) -> ApiResult<String> {
    let normalized = ensure_trailing_slash(raw.trim());
    Url::parse(&normalized).map_err(|e| ApiError::BadUrl(format!("{}: {}", raw, e)))?;
    Ok(normalized)
}
