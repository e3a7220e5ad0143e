//! Domain models for the photo-type catalog
use crate::errors::ApiResult;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// JPEG quality used when encoding a captured image for upload
pub const JPEG_QUALITY: u8 = 80;

/// Catalog entry as served by `api/v2/photo/type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoType {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// One server-side page of catalog entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoTypePage {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_elements: u64,
    pub content: Vec<PhotoType>,
}

impl PhotoTypePage {
    /// True when no page follows this one
    pub fn is_last(&self) -> bool {
        self.page >= self.total_pages
    }

    /// `content` never holds more than `page_size` entries on a well-formed page
    pub fn is_well_formed(&self) -> bool {
        self.content.len() <= self.page_size as usize
    }
}

/// Photo plus metadata, built right before an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUploadRequest {
    pub display_name: String,
    pub image_bytes: Vec<u8>,
    pub category_id: i64,
}

impl PhotoUploadRequest {
    pub fn new(display_name: impl Into<String>, image_bytes: Vec<u8>, category_id: i64) -> Self {
        Self {
            display_name: display_name.into(),
            image_bytes,
            category_id,
        }
    }

    /// Encode a captured image as JPEG and wrap it in an upload request
    pub fn from_image(
        display_name: impl Into<String>,
        image: &DynamicImage,
        category_id: i64,
    ) -> ApiResult<Self> {
        let image_bytes = encode_jpeg(image)?;
        Ok(Self::new(display_name, image_bytes, category_id))
    }
}

/// JPEG has no alpha channel, so the image is flattened to RGB first.
pub fn encode_jpeg(image: &DynamicImage) -> ApiResult<Vec<u8>> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)?;
    Ok(buf)
}
