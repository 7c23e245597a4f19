//! The Image Normalizer stage: bytes in, `(1, 3, 224, 224)` float32 tensor out.

use crate::core::{ClassifyError, ClassifyResult, Tensor4D};
use crate::processors::{center_crop, resize_shortest_side, NormalizeImage};
use image::imageops::FilterType;
use image::{ImageReader, RgbImage};
use std::io::Cursor;
use std::path::Path;

/// Configuration for the normalizer stage.
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// Shorter-edge target of the aspect-preserving resize.
    pub resize_target: u32,
    /// Final spatial size (width, height) after the center crop.
    pub crop_size: (u32, u32),
    /// Resizing filter to use.
    pub resize_filter: FilterType,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            resize_target: 256,
            crop_size: (224, 224),
            resize_filter: FilterType::Lanczos3,
        }
    }
}

/// Decodes arbitrary image bytes into the canonical classifier input tensor.
///
/// The transformation is pure: identical input bytes always produce a
/// bit-identical output tensor.
#[derive(Debug)]
pub struct ImageNormalizer {
    config: NormalizerConfig,
    normalize: NormalizeImage,
}

impl ImageNormalizer {
    /// Creates a normalizer with the given geometry and ImageNet mean/std.
    pub fn new(config: NormalizerConfig) -> Self {
        Self {
            config,
            normalize: NormalizeImage::imagenet(),
        }
    }

    /// Creates a normalizer with custom pixel normalization coefficients.
    pub fn with_normalization(config: NormalizerConfig, normalize: NormalizeImage) -> Self {
        Self { config, normalize }
    }

    /// The spatial size of the tensors this normalizer produces.
    pub fn output_size(&self) -> (u32, u32) {
        self.config.crop_size
    }

    /// Decodes an encoded image from memory, flattening any color mode to RGB.
    ///
    /// Format is detected from the byte content, not from a file extension.
    pub fn decode_bytes(&self, bytes: &[u8]) -> ClassifyResult<RgbImage> {
        let decoded = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(ClassifyError::Io)?
            .decode()
            .map_err(|e| ClassifyError::decode("byte stream is not a decodable image", e))?;
        Ok(decoded.to_rgb8())
    }

    /// Decodes an image file from disk, flattening any color mode to RGB.
    ///
    /// A missing file is reported as `FileNotFound`; unreadable content as
    /// `Decode`.
    pub fn decode_path(&self, path: &Path) -> ClassifyResult<RgbImage> {
        if !path.exists() {
            return Err(ClassifyError::file_not_found(path));
        }
        let decoded = image::open(path)
            .map_err(|e| ClassifyError::decode(format!("cannot open '{}'", path.display()), e))?;
        Ok(decoded.to_rgb8())
    }

    /// Runs the geometric and statistical transforms on a decoded image.
    ///
    /// Shortest-side resize, center crop, [0, 1] scaling, per-channel mean/std,
    /// batch dimension of 1.
    pub fn normalize_image(&self, img: &RgbImage) -> ClassifyResult<Tensor4D> {
        let resized = resize_shortest_side(img, self.config.resize_target, self.config.resize_filter);
        let (crop_w, crop_h) = self.config.crop_size;
        let cropped = center_crop(&resized, crop_w, crop_h)?;
        self.normalize.normalize_to(&cropped)
    }

    /// Full pipeline for in-memory bytes: decode, then normalize.
    pub fn normalize_bytes(&self, bytes: &[u8]) -> ClassifyResult<Tensor4D> {
        let img = self.decode_bytes(bytes)?;
        self.normalize_image(&img)
    }

    /// Full pipeline for a file on disk: decode, then normalize.
    pub fn normalize_path(&self, path: &Path) -> ClassifyResult<Tensor4D> {
        let img = self.decode_path(path)?;
        self.normalize_image(&img)
    }
}

impl Default for ImageNormalizer {
    fn default() -> Self {
        Self::new(NormalizerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgb, Rgba, RgbaImage};

    fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    #[test]
    fn normalize_bytes_produces_canonical_shape() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(640, 480, Rgb([200, 30, 90])));
        let bytes = encode(img, ImageFormat::Png);

        let tensor = ImageNormalizer::default().normalize_bytes(&bytes).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
        assert!(tensor.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn normalize_bytes_is_deterministic() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(300, 200, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        }));
        let bytes = encode(img, ImageFormat::Jpeg);

        let normalizer = ImageNormalizer::default();
        let a = normalizer.normalize_bytes(&bytes).unwrap();
        let b = normalizer.normalize_bytes(&bytes).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rgba_is_flattened_to_rgb() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(300, 300, Rgba([255, 0, 0, 128])));
        let bytes = encode(img, ImageFormat::Png);

        let tensor = ImageNormalizer::default().normalize_bytes(&bytes).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
    }

    #[test]
    fn grayscale_is_expanded_to_rgb() {
        let gray = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(260, 260, image::Luma([99])));
        let bytes = encode(gray, ImageFormat::Png);

        let tensor = ImageNormalizer::default().normalize_bytes(&bytes).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
    }

    #[test]
    fn garbage_bytes_fail_with_decode_error() {
        let err = ImageNormalizer::default()
            .normalize_bytes(b"definitely not an image")
            .unwrap_err();
        assert!(matches!(err, ClassifyError::Decode { .. }));
    }

    #[test]
    fn missing_path_fails_with_file_not_found() {
        let err = ImageNormalizer::default()
            .normalize_path(Path::new("/nonexistent/cat.jpg"))
            .unwrap_err();
        assert!(matches!(err, ClassifyError::FileNotFound { .. }));
    }
}
