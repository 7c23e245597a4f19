//! Image normalization for the classifier input distribution.
//!
//! Converts 8-bit RGB pixels to a float32 CHW tensor scaled to [0, 1] and
//! shifted per channel by the mean/std the classifier was trained with.

use crate::core::{ClassifyError, ClassifyResult, Tensor4D};
use image::RgbImage;

/// ImageNet channel means (RGB order).
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// ImageNet channel standard deviations (RGB order).
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Normalizes images for classification.
///
/// The scale, mean and std are folded into per-channel affine coefficients
/// (alpha = scale / std, beta = -mean / std) so each pixel costs one multiply
/// and one add.
#[derive(Debug)]
pub struct NormalizeImage {
    /// Scaling factors for each channel (alpha = scale / std).
    alpha: [f32; 3],
    /// Offset values for each channel (beta = -mean / std).
    beta: [f32; 3],
}

impl NormalizeImage {
    /// Creates a new NormalizeImage instance.
    ///
    /// # Arguments
    ///
    /// * `scale` - Optional scaling factor (defaults to 1.0/255.0)
    /// * `mean` - Optional mean values per channel (defaults to [`IMAGENET_MEAN`])
    /// * `std` - Optional standard deviations per channel (defaults to [`IMAGENET_STD`])
    ///
    /// # Errors
    ///
    /// Returns an error if the scale or any standard deviation is not
    /// strictly positive.
    pub fn new(
        scale: Option<f32>,
        mean: Option<[f32; 3]>,
        std: Option<[f32; 3]>,
    ) -> ClassifyResult<Self> {
        let scale = scale.unwrap_or(1.0 / 255.0);
        let mean = mean.unwrap_or(IMAGENET_MEAN);
        let std = std.unwrap_or(IMAGENET_STD);

        if scale <= 0.0 {
            return Err(ClassifyError::config_error(
                "scale must be greater than 0",
            ));
        }
        for (i, &s) in std.iter().enumerate() {
            if s <= 0.0 {
                return Err(ClassifyError::config_error(format!(
                    "standard deviation at index {i} must be greater than 0, got {s}"
                )));
            }
        }

        let mut alpha = [0.0f32; 3];
        let mut beta = [0.0f32; 3];
        for c in 0..3 {
            alpha[c] = scale / std[c];
            beta[c] = -mean[c] / std[c];
        }

        Ok(Self { alpha, beta })
    }

    /// Creates a normalizer with the ImageNet defaults.
    pub fn imagenet() -> Self {
        // Defaults are all positive, so this cannot fail.
        Self::new(None, None, None).expect("imagenet defaults are valid")
    }

    /// Normalizes a single RGB image into a (1, 3, H, W) float32 tensor.
    pub fn normalize_to(&self, img: &RgbImage) -> ClassifyResult<Tensor4D> {
        let (width, height) = img.dimensions();
        let channels = 3usize;
        let (width, height) = (width as usize, height as usize);

        let mut result = vec![0.0f32; channels * height * width];
        for (c, channel) in result.chunks_exact_mut(height * width).enumerate() {
            for y in 0..height {
                for x in 0..width {
                    let pixel = img.get_pixel(x as u32, y as u32);
                    channel[y * width + x] = pixel[c] as f32 * self.alpha[c] + self.beta[c];
                }
            }
        }

        ndarray::Array4::from_shape_vec((1, channels, height, width), result)
            .map_err(ClassifyError::Tensor)
    }
}

impl Default for NormalizeImage {
    fn default() -> Self {
        Self::imagenet()
    }
}

/// Scales raw [0, 255] pixel values to [0, 1] floats.
///
/// Standalone helper independent of the mean/std step; used by diagnostics
/// and tests.
pub fn scale_to_unit(pixels: &[u8]) -> Vec<f32> {
    pixels.iter().map(|&p| p as f32 / 255.0).collect()
}
