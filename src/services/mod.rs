//! Business logic services layer
use crate::clients::CatalogClient;
use crate::config::AppConfig;
use crate::domain::{PhotoType, PhotoTypePage, PhotoUploadRequest};
use crate::errors::{ApiError, ApiResult};
use crate::repo::PageCache;
use crate::utils::{upload_progress, CancelToken};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Operations the controller needs from the remote catalog
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// Fetch a page, serving it from cache when present
    async fn fetch_page(&self, page: u32) -> ApiResult<PhotoTypePage>;

    /// Drop every cached page
    fn clear_cache(&self);

    /// Upload a photo, sending progress fractions on `progress` before
    /// returning. The sender is dropped when the upload finishes.
    async fn upload_photo(
        &self,
        request: PhotoUploadRequest,
        progress: mpsc::UnboundedSender<f64>,
        cancel: CancelToken,
    ) -> ApiResult<()>;

    async fn send_photo_type(&self, photo_type: &PhotoType) -> ApiResult<()>;
}

/// Remote catalog service with a per-instance page cache
pub struct CatalogService {
    cache: PageCache,
    client: CatalogClient,
}

impl CatalogService {
    pub fn new(cache: PageCache, client: CatalogClient) -> Self {
        Self { cache, client }
    }

    pub fn from_config(config: &AppConfig) -> ApiResult<Self> {
        Ok(Self::new(PageCache::new(), CatalogClient::new(config)?))
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }
}

#[async_trait]
impl CatalogApi for CatalogService {
    async fn fetch_page(&self, page: u32) -> ApiResult<PhotoTypePage> {
        if let Some(cached) = self.cache.get(page) {
            debug!(page, "Serving page from cache");
            return Ok(cached);
        }

        let fetched = self.client.fetch_page(page).await?;
        if !fetched.is_well_formed() {
            warn!(
                page,
                page_size = fetched.page_size,
                entries = fetched.content.len(),
                "Page holds more entries than its page size"
            );
        }
        info!(
            page,
            entries = fetched.content.len(),
            total_pages = fetched.total_pages,
            "Fetched page"
        );

        self.cache.insert(page, fetched.clone());
        Ok(fetched)
    }

    fn clear_cache(&self) {
        let dropped = self.cache.len();
        self.cache.clear();
        debug!(dropped, "Page cache cleared");
    }

    async fn upload_photo(
        &self,
        request: PhotoUploadRequest,
        progress: mpsc::UnboundedSender<f64>,
        cancel: CancelToken,
    ) -> ApiResult<()> {
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }

        let uploaded = request.image_bytes.len();
        let content_length = tokio::select! {
            _ = cancel.cancelled() => return Err(ApiError::Cancelled),
            res = self.client.upload_photo(&request) => res?,
        };

        match upload_progress(uploaded, content_length) {
            Some(fraction) => {
                // Receiver may already be gone; progress is best-effort.
                let _ = progress.send(fraction);
            }
            None => debug!(uploaded, "Response has no content-length, no progress emitted"),
        }

        info!(
            type_id = request.category_id,
            bytes = uploaded,
            "Photo uploaded"
        );
        Ok(())
    }

    async fn send_photo_type(&self, photo_type: &PhotoType) -> ApiResult<()> {
        self.client.send_photo_type(photo_type).await?;
        info!(id = photo_type.id, "Photo type sent");
        Ok(())
    }
}
