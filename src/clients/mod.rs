//! HTTP client for the photo catalog API
use crate::config::AppConfig;
use crate::domain::{PhotoType, PhotoTypePage, PhotoUploadRequest};
use crate::errors::{ApiError, ApiResult};
use reqwest::header::CONTENT_LENGTH;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use std::time::Duration;
use tracing::debug;

const PHOTO_TYPE_PATH: &str = "api/v2/photo/type";
const PHOTO_PATH: &str = "api/v2/photo";
const PHOTO_FILE_NAME: &str = "photo.jpg";
const PHOTO_MIME: &str = "image/jpeg";

/// HTTP client wrapper with common configuration
pub struct HttpClient {
    client: Client,
    upload_client: Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> ApiResult<Self> {
        let client = base_builder(timeout).build()?;
        // Decompression strips Content-Length, which upload progress reads.
        let upload_client = base_builder(timeout)
            .no_gzip()
            .no_brotli()
            .no_deflate()
            .build()?;
        Ok(Self {
            client,
            upload_client,
        })
    }

    pub fn get_client(&self) -> &Client {
        &self.client
    }

    /// Client that leaves response bodies and their headers undecoded
    pub fn get_upload_client(&self) -> &Client {
        &self.upload_client
    }
}

fn base_builder(timeout: Duration) -> reqwest::ClientBuilder {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("photo-catalog/", env!("CARGO_PKG_VERSION")))
}

/// Client for the `api/v2/photo*` endpoints
pub struct CatalogClient {
    http_client: HttpClient,
    base_url: Url,
}

impl CatalogClient {
    pub fn new(config: &AppConfig) -> ApiResult<Self> {
        let base_url =
            Url::parse(&config.base_url).map_err(|e| ApiError::BadUrl(e.to_string()))?;
        Ok(Self {
            http_client: HttpClient::new(config.http_timeout)?,
            base_url,
        })
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn endpoint(&self, path: &str) -> ApiResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::BadUrl(format!("{}{}: {}", self.base_url, path, e)))
    }

    /// Fetch one page of photo types
    pub async fn fetch_page(&self, page: u32) -> ApiResult<PhotoTypePage> {
        let url = self.endpoint(PHOTO_TYPE_PATH)?;
        debug!(%url, page, "GET photo types");

        let resp = self
            .http_client
            .get_client()
            .get(url)
            .query(&[("page", page)])
            .send()
            .await?;
        let resp = ensure_success(resp)?;

        let body = resp.bytes().await?;
        let decoded = serde_json::from_slice(&body)?;
        Ok(decoded)
    }

    /// Post a photo type record as JSON
    pub async fn send_photo_type(&self, photo_type: &PhotoType) -> ApiResult<()> {
        let url = self.endpoint(PHOTO_TYPE_PATH)?;
        debug!(%url, id = photo_type.id, "POST photo type");

        let resp = self
            .http_client
            .get_client()
            .post(url)
            .json(photo_type)
            .send()
            .await?;
        ensure_success(resp)?;
        Ok(())
    }

    /// Upload a photo as `multipart/form-data`.
    ///
    /// Returns the content-length the server declared for its response.
    pub async fn upload_photo(&self, request: &PhotoUploadRequest) -> ApiResult<Option<u64>> {
        let url = self.endpoint(PHOTO_PATH)?;
        debug!(
            %url,
            type_id = request.category_id,
            bytes = request.image_bytes.len(),
            "POST photo"
        );

        let photo = Part::bytes(request.image_bytes.clone())
            .file_name(PHOTO_FILE_NAME)
            .mime_str(PHOTO_MIME)?;
        let form = Form::new()
            .text("name", request.display_name.clone())
            .text("typeId", request.category_id.to_string())
            .part("photo", photo);

        let resp = self
            .http_client
            .get_upload_client()
            .post(url)
            .multipart(form)
            .send()
            .await?;
        let resp = ensure_success(resp)?;
        Ok(declared_content_length(&resp))
    }
}

fn ensure_success(resp: Response) -> ApiResult<Response> {
    let status = resp.status();
    if !status.is_success() {
        return Err(ApiError::BadServerResponse(status));
    }
    Ok(resp)
}

/// The `Content-Length` header as sent, not the decoded body size
fn declared_content_length(resp: &Response) -> Option<u64> {
    resp.headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}
