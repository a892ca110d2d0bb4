//! Upload optimization: oversized images are downscaled before they become
//! layer sources.

use std::io::Cursor;

use atelier_config::UploadConfig;
use image::{DynamicImage, ImageFormat, imageops::FilterType};
use tracing::info;

use crate::error::OptimizeError;

/// Dimensions that fit within `max` on both edges, preserving aspect ratio.
/// Images already inside the limit are returned unchanged.
pub fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width <= max && height <= max {
        return (width, height);
    }
    let aspect = width as f64 / height as f64;
    let (w, h) = if width > height {
        (max as f64, max as f64 / aspect)
    } else {
        (max as f64 * aspect, max as f64)
    };
    ((w.round() as u32).max(1), (h.round() as u32).max(1))
}

/// An upload after optimization, encoded as PNG
#[derive(Debug, Clone)]
pub struct OptimizedImage {
    pub width: u32,
    pub height: u32,
    pub original_width: u32,
    pub original_height: u32,
    pub original_bytes: usize,
    pub png: Vec<u8>,
}

impl OptimizedImage {
    pub fn was_resized(&self) -> bool {
        (self.width, self.height) != (self.original_width, self.original_height)
    }
}

/// Decode an uploaded image and downscale it to the configured limit.
///
/// The result is always PNG so transparency in logos survives.
pub fn optimize_upload(bytes: &[u8], config: &UploadConfig) -> Result<OptimizedImage, OptimizeError> {
    let image = image::load_from_memory(bytes).map_err(OptimizeError::Decode)?;
    let (original_width, original_height) = (image.width(), image.height());
    let (width, height) = fit_within(original_width, original_height, config.max_dimension);

    let image = if (width, height) == (original_width, original_height) {
        image
    } else {
        DynamicImage::ImageRgba8(image::imageops::resize(
            &image.to_rgba8(),
            width,
            height,
            FilterType::Lanczos3,
        ))
    };

    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(OptimizeError::Encode)?;

    info!(
        "Optimized upload {}x{} ({} bytes) -> {}x{} ({} bytes)",
        original_width,
        original_height,
        bytes.len(),
        width,
        height,
        png.len()
    );

    Ok(OptimizedImage {
        width,
        height,
        original_width,
        original_height,
        original_bytes: bytes.len(),
        png,
    })
}
