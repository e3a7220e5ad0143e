//! Client for a paginated photo-type catalog: page fetching with a
//! per-service cache, an accumulating pagination controller, and multipart
//! photo upload.
pub mod clients;
pub mod config;
pub mod controller;
pub mod domain;
pub mod errors;
pub mod permission;
pub mod repo;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use controller::{CatalogController, ControllerEvent, ControllerState};
pub use domain::{PhotoType, PhotoTypePage, PhotoUploadRequest};
pub use errors::{ApiError, ApiResult};
pub use services::{CatalogApi, CatalogService};
