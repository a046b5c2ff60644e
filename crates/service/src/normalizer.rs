//! Avatar normalizer - turns arbitrary uploaded image bytes into a fixed-size JPEG.
//!
//! Both dimensions are forced, so non-square inputs are stretched rather than
//! cropped. Decoding and encoding are CPU-bound; async callers go through
//! `normalize_async`, which runs on the blocking pool.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, GenericImageView};
use tracing::debug;

pub const AVATAR_SIZE: u32 = 500;
pub const AVATAR_QUALITY: u8 = 90;
/// Content type of everything `ImageNormalizer` produces.
pub const AVATAR_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("image task failed: {0}")]
    Task(String),
}

#[derive(Clone, Debug)]
pub struct ImageNormalizer {
    width: u32,
    height: u32,
    quality: u8,
}

impl Default for ImageNormalizer {
    fn default() -> Self {
        Self {
            width: AVATAR_SIZE,
            height: AVATAR_SIZE,
            quality: AVATAR_QUALITY,
        }
    }
}

/// Re-encoded JPEG and its dimensions.
#[derive(Debug)]
pub struct NormalizedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ImageNormalizer {
    pub fn new(width: u32, height: u32, quality: u8) -> Self {
        Self { width, height, quality }
    }

    /// Blocking. Prefer `normalize_async` from async code.
    pub fn normalize(&self, original: &[u8]) -> Result<NormalizedImage, ImageError> {
        let img = image::load_from_memory(original).map_err(ImageError::Decode)?;

        let (orig_w, orig_h) = img.dimensions();
        debug!(
            original_width = orig_w,
            original_height = orig_h,
            "Normalizing avatar image"
        );

        // JPEG has no alpha; flatten to RGB before encoding
        let resized = img
            .resize_exact(self.width, self.height, FilterType::Lanczos3)
            .to_rgb8();

        let mut data = Vec::new();
        JpegEncoder::new_with_quality(&mut data, self.quality)
            .encode(resized.as_raw(), resized.width(), resized.height(), ColorType::Rgb8)
            .map_err(ImageError::Encode)?;

        debug!(
            width = resized.width(),
            height = resized.height(),
            size = data.len(),
            "Avatar image encoded"
        );

        Ok(NormalizedImage {
            data,
            width: resized.width(),
            height: resized.height(),
        })
    }

    pub async fn normalize_async(&self, original: Vec<u8>) -> Result<NormalizedImage, ImageError> {
        let normalizer = self.clone();

        tokio::task::spawn_blocking(move || normalizer.normalize(&original))
            .await
            .map_err(|e| ImageError::Task(e.to_string()))?
    }
}
