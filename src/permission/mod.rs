//! Camera permission collaborator
use async_trait::async_trait;

/// Authorization state reported by the platform's permission subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    Authorized,
    Denied,
    NotDetermined,
    Restricted,
}

/// Platform hook for camera access. Implemented outside this crate.
#[async_trait]
pub trait CameraAccess: Send + Sync {
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Prompt the user; resolves to `true` when access is granted
    async fn request_access(&self) -> bool;
}
