//! Utility functions
use std::ops::Range;
use std::sync::Arc;
use tokio::sync::watch;

/// Number of entries the presentation layer shows per page
pub const PHOTOS_PER_PAGE: usize = 20;

/// Progress reported after an upload completes.
///
/// Divides the uploaded payload size by the response's declared
/// content-length. That is not real transfer progress, and values above 1.0
/// are possible; callers clamp. `None` when the header is absent or zero.
pub fn upload_progress(uploaded_bytes: usize, content_length: Option<u64>) -> Option<f64> {
    match content_length {
        Some(len) if len > 0 => Some(uploaded_bytes as f64 / len as f64),
        _ => None,
    }
}

/// Clamp a progress value into `[0, 1]`
pub fn clamp_progress(progress: f64) -> f64 {
    if progress.is_nan() {
        return 0.0;
    }
    progress.clamp(0.0, 1.0)
}

/// Index range of `page` (1-based) in a list of `total` entries
pub fn page_bounds(page: i64, total: usize, per_page: usize) -> Option<Range<usize>> {
    if page <= 0 {
        return None;
    }
    let start = usize::try_from(page - 1).ok()?.checked_mul(per_page)?;
    if start >= total {
        return None;
    }
    let end = total.min(start.saturating_add(per_page));
    Some(start..end)
}

/// Endpoint paths are joined onto the base URL, which must end with `/`
pub fn ensure_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// Cooperative cancellation flag shared between a caller and an operation
#[derive(Clone, Debug)]
pub struct CancelToken {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once `cancel` has been called on any clone
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives as long as `self`, so this only returns on cancel.
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_upload_progress_ratio() {
        assert_eq!(upload_progress(250, Some(1000)), Some(0.25));
    }

    #[test]
    fn test_upload_progress_can_exceed_one() {
        assert_eq!(upload_progress(1000, Some(500)), Some(2.0));
    }

    #[test]
    fn test_upload_progress_without_content_length() {
        assert_eq!(upload_progress(1000, None), None);
        assert_eq!(upload_progress(1000, Some(0)), None);
    }

    #[test]
    fn test_clamp_progress() {
        assert_eq!(clamp_progress(2.0), 1.0);
        assert_eq!(clamp_progress(-0.5), 0.0);
        assert_eq!(clamp_progress(0.3), 0.3);
        assert_eq!(clamp_progress(f64::NAN), 0.0);
    }

    #[test]
    fn test_page_bounds_first_page() {
        assert_eq!(page_bounds(1, 45, 20), Some(0..20));
    }

    #[test]
    fn test_page_bounds_partial_last_page() {
        assert_eq!(page_bounds(3, 45, 20), Some(40..45));
    }

    #[test]
    fn test_page_bounds_out_of_range() {
        assert_eq!(page_bounds(0, 45, 20), None);
        assert_eq!(page_bounds(-2, 45, 20), None);
        assert_eq!(page_bounds(4, 45, 20), None);
        assert_eq!(page_bounds(1, 0, 20), None);
        assert_eq!(page_bounds(i64::MAX, 45, 20), None);
    }

    #[test]
    fn test_ensure_trailing_slash() {
        assert_eq!(
            ensure_trailing_slash("https://junior.balinasoft.com"),
            "https://junior.balinasoft.com/"
        );
        assert_eq!(
            ensure_trailing_slash("https://junior.balinasoft.com/"),
            "https://junior.balinasoft.com/"
        );
    }

    #[tokio::test]
    async fn test_cancel_token_wakes_waiter() {
        let token = CancelToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });

        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter should wake")
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_returns_immediately_when_already_cancelled() {
        let token = CancelToken::new();
        token.cancel();
        tokio::time::timeout(Duration::from_millis(100), token.cancelled())
            .await
            .expect("already cancelled");
    }
}
