//! Geometric image transformations: shortest-side resize and center crop.

use crate::core::{ClassifyError, ClassifyResult};
use image::imageops::{self, FilterType};
use image::RgbImage;

/// Resizes an image so its shorter edge equals `target`, preserving aspect ratio.
///
/// The longer edge is scaled proportionally and rounded; both output edges are
/// at least `target` pixels.
pub fn resize_shortest_side(img: &RgbImage, target: u32, filter: FilterType) -> RgbImage {
    let (width, height) = img.dimensions();
    let shortest = width.min(height).max(1);
    let scale = target as f64 / shortest as f64;

    let new_width = ((width as f64 * scale).round() as u32).max(target);
    let new_height = ((height as f64 * scale).round() as u32).max(target);

    imageops::resize(img, new_width, new_height, filter)
}

/// Crops the spatial center of an image to exactly `crop_width` x `crop_height`.
///
/// Fails if the source image is smaller than the requested crop in either
/// dimension.
pub fn center_crop(img: &RgbImage, crop_width: u32, crop_height: u32) -> ClassifyResult<RgbImage> {
    let (width, height) = img.dimensions();
    if width < crop_width || height < crop_height {
        return Err(ClassifyError::invalid_input(format!(
            "cannot center-crop {}x{} to {}x{}: source is smaller than the crop",
            width, height, crop_width, crop_height
        )));
    }

    let x = (width - crop_width) / 2;
    let y = (height - crop_height) / 2;
    Ok(imageops::crop_imm(img, x, y, crop_width, crop_height).to_image())
}

/// Resizes an image to exact dimensions, ignoring aspect ratio.
///
/// Diagnostic helper; the classification hot path uses
/// [`resize_shortest_side`] + [`center_crop`] instead.
pub fn resize_exact(img: &RgbImage, width: u32, height: u32, filter: FilterType) -> RgbImage {
    imageops::resize(img, width, height, filter)
}
