//! Pagination and upload controller
//!
//! Owns the page cursor, the accumulated entries, and the loading/upload
//! flags the presentation layer renders. State is published on a
//! [`watch`] channel; one-off outcomes go out on a [`broadcast`] channel.
use crate::domain::{PhotoType, PhotoUploadRequest};
use crate::errors::ApiResult;
use crate::permission::{AuthorizationStatus, CameraAccess};
use crate::services::CatalogApi;
use crate::utils::{clamp_progress, page_bounds, CancelToken, PHOTOS_PER_PAGE};
use image::DynamicImage;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, error, info, warn};

pub const EVENT_CAPACITY: usize = 64;
pub const UPLOAD_SUCCESS_MESSAGE: &str = "Photo uploaded successfully";

/// Snapshot of everything the presentation layer reads
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerState {
    pub entries: Vec<PhotoType>,
    /// Next page to fetch
    pub current_page: u32,
    pub is_loading_page: bool,
    pub is_last_page: bool,
    pub is_uploading: bool,
    /// Always within `[0, 1]`
    pub upload_progress: f64,
    pub upload_result_message: Option<String>,
    /// Outcome of the most recent finished upload
    pub last_upload_succeeded: Option<bool>,
    pub show_camera: bool,
    pub camera_access_denied: bool,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            current_page: 1,
            is_loading_page: false,
            is_last_page: false,
            is_uploading: false,
            upload_progress: 0.0,
            upload_result_message: None,
            last_upload_succeeded: None,
            show_camera: false,
            camera_access_denied: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    PageLoaded { page: u32, entries: usize },
    PageFailed { page: u32, error: String },
    UploadProgress(f64),
    UploadFinished { success: bool, message: String },
}

/// Clears the loading flag on every exit path of a page load,
/// including when the load future is dropped mid-flight.
struct LoadingGuard<'a>(&'a watch::Sender<ControllerState>);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.send_modify(|s| s.is_loading_page = false);
    }
}

/// JPEG encoding is CPU-bound; keep it off the async workers.
async fn encode_capture(
    image: DynamicImage,
    display_name: String,
    category_id: i64,
) -> ApiResult<PhotoUploadRequest> {
    tokio::task::spawn_blocking(move || {
        PhotoUploadRequest::from_image(display_name, &image, category_id)
    })
    .await?
}

pub struct CatalogController {
    api: Arc<dyn CatalogApi>,
    state: watch::Sender<ControllerState>,
    events: broadcast::Sender<ControllerEvent>,
    cancel: CancelToken,
}

impl CatalogController {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        let (state, _) = watch::channel(ControllerState::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api,
            state,
            events,
            cancel: CancelToken::new(),
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.state.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    /// Cancel any in-flight upload. Uploads started afterwards fail
    /// immediately; call this when the owner is torn down.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Fetch the page under the cursor and append it.
    ///
    /// No-op while a load is in flight or once the last page was seen.
    pub async fn load_next_page(&self) {
        let mut page = 0;
        let started = self.state.send_if_modified(|s| {
            if s.is_loading_page || s.is_last_page {
                return false;
            }
            s.is_loading_page = true;
            page = s.current_page;
            true
        });
        if !started {
            debug!("Page load skipped");
            return;
        }

        let _guard = LoadingGuard(&self.state);
        match self.api.fetch_page(page).await {
            Ok(fetched) => {
                let count = fetched.content.len();
                let is_last = fetched.is_last();
                self.state.send_modify(|s| {
                    s.entries.extend(fetched.content);
                    s.current_page += 1;
                    s.is_last_page = is_last;
                });
                info!(page, entries = count, is_last, "Page loaded");
                let _ = self.events.send(ControllerEvent::PageLoaded {
                    page,
                    entries: count,
                });
            }
            Err(e) => {
                error!(page, code = e.code(), error = %e, "Error fetching page");
                let _ = self.events.send(ControllerEvent::PageFailed {
                    page,
                    error: e.to_string(),
                });
            }
        }
    }

    /// Start over from page 1 with an empty cache
    pub async fn refresh(&self) {
        let reset = self.state.send_if_modified(|s| {
            if s.is_loading_page {
                return false;
            }
            s.entries.clear();
            s.current_page = 1;
            s.is_last_page = false;
            true
        });
        if !reset {
            debug!("Refresh skipped, page load in flight");
            return;
        }

        self.api.clear_cache();
        self.load_next_page().await;
    }

    /// Entries of a 20-item display page (1-based)
    pub fn photos_for_page(&self, page: i64) -> Vec<PhotoType> {
        let state = self.state.borrow();
        page_bounds(page, state.entries.len(), PHOTOS_PER_PAGE)
            .map(|range| state.entries[range].to_vec())
            .unwrap_or_default()
    }

    /// Encode and upload a captured photo.
    ///
    /// No-op without an image. A second upload while one is running is
    /// rejected. On success the next page is loaded.
    pub async fn submit_upload(
        &self,
        image: Option<DynamicImage>,
        display_name: &str,
        category_id: i64,
    ) {
        let Some(image) = image else {
            debug!(category_id, "No captured image, upload skipped");
            return;
        };

        let started = self.state.send_if_modified(|s| {
            if s.is_uploading {
                return false;
            }
            s.is_uploading = true;
            s.upload_progress = 0.0;
            s.upload_result_message = None;
            s.last_upload_succeeded = None;
            true
        });
        if !started {
            warn!(category_id, "Upload already in progress, request rejected");
            return;
        }

        let result = match encode_capture(image, display_name.to_string(), category_id).await {
            Ok(request) => self.run_upload(request).await,
            Err(e) => Err(e),
        };
        self.finish_upload(result).await;
    }

    async fn run_upload(&self, request: PhotoUploadRequest) -> ApiResult<()> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let upload = self.api.upload_photo(request, tx, self.cancel.clone());
        let track = async {
            while let Some(raw) = rx.recv().await {
                let progress = clamp_progress(raw);
                self.state.send_modify(|s| s.upload_progress = progress);
                let _ = self.events.send(ControllerEvent::UploadProgress(progress));
            }
        };

        let (result, ()) = tokio::join!(upload, track);
        result
    }

    async fn finish_upload(&self, result: ApiResult<()>) {
        let success = result.is_ok();
        let message = match &result {
            Ok(()) => UPLOAD_SUCCESS_MESSAGE.to_string(),
            Err(e) => {
                error!(code = e.code(), error = %e, "Photo upload failed");
                format!("Error uploading photo: {}", e)
            }
        };

        self.state.send_modify(|s| {
            s.is_uploading = false;
            s.upload_result_message = Some(message.clone());
            s.last_upload_succeeded = Some(success);
        });
        let _ = self
            .events
            .send(ControllerEvent::UploadFinished { success, message });

        if success {
            self.load_next_page().await;
        }
    }

    pub fn clear_upload_message(&self) {
        self.state.send_modify(|s| s.upload_result_message = None);
    }

    /// Decide whether the camera can be shown, prompting when undecided
    pub async fn check_camera_permission(&self, camera: &dyn CameraAccess) {
        let status = camera.authorization_status();
        let granted = match status {
            AuthorizationStatus::Authorized => true,
            AuthorizationStatus::NotDetermined => camera.request_access().await,
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted => false,
        };
        debug!(?status, granted, "Camera permission checked");

        self.state.send_modify(|s| {
            if granted {
                s.show_camera = true;
            } else {
                s.camera_access_denied = true;
            }
        });
    }

    pub fn dismiss_camera(&self) {
        self.state.send_modify(|s| s.show_camera = false);
    }

    pub fn dismiss_access_alert(&self) {
        self.state.send_modify(|s| s.camera_access_denied = false);
    }
}
