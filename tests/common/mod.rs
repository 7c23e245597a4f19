//! Shared test fixtures: a deterministic stub model and image generators.
#![allow(dead_code)]

use ndarray::Array2;
use pix_classify::core::{ClassifyError, ClassifyResult, ScoreModel, Tensor2D, Tensor4D};
use pix_classify::domain::ClassCatalog;
use pix_classify::pipeline::{ClassifierAdapter, ImageClassifier, ImageNormalizer};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A model that returns a fixed score vector for every input.
pub struct StubModel {
    scores: Vec<f32>,
}

impl StubModel {
    pub fn new(scores: Vec<f32>) -> Self {
        Self { scores }
    }

    /// A 1000-class score vector with a unique maximum at class 42.
    pub fn imagenet_like() -> Self {
        let mut scores: Vec<f32> = (0..1000).map(|i| ((i * 37) % 500) as f32 / 100.0).collect();
        scores[42] = 10.0;
        Self::new(scores)
    }

    /// The fixed score vector this stub answers with.
    pub fn into_scores(self) -> Vec<f32> {
        self.scores
    }
}

impl ScoreModel for StubModel {
    fn expected_input(&self) -> [usize; 4] {
        [1, 3, 224, 224]
    }

    fn num_classes(&self) -> usize {
        self.scores.len()
    }

    fn infer(&self, _tensor: &Tensor4D) -> ClassifyResult<Tensor2D> {
        Ok(Array2::from_shape_vec((1, self.scores.len()), self.scores.clone())
            .expect("stub scores form a valid row"))
    }
}

/// A model whose output violates the two-dimensional score contract, the way
/// a mis-exported ONNX graph would.
pub struct MalformedOutputModel;

impl ScoreModel for MalformedOutputModel {
    fn expected_input(&self) -> [usize; 4] {
        [1, 3, 224, 224]
    }

    fn num_classes(&self) -> usize {
        1000
    }

    fn infer(&self, _tensor: &Tensor4D) -> ClassifyResult<Tensor2D> {
        Err(ClassifyError::model_output(
            "model 'stub': expected 2D output tensor, got 3D with shape [1, 1, 1000]",
        ))
    }
}

/// Builds an adapter backed by a stub, counting how many times the loader ran.
pub fn stub_adapter(scores: Vec<f32>) -> (ClassifierAdapter, Arc<AtomicUsize>) {
    let load_count = Arc::new(AtomicUsize::new(0));
    let counter = load_count.clone();
    let num_classes = scores.len();
    let catalog = Arc::new(ClassCatalog::from_labels(
        (0..num_classes).map(|i| format!("label {i}")).collect(),
    ));
    let adapter = ClassifierAdapter::with_loader(
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(StubModel::new(scores.clone())) as Arc<dyn ScoreModel>)
        }),
        catalog,
    );
    (adapter, load_count)
}

/// Builds a full pipeline over a 1000-class stub model.
pub fn stub_classifier() -> ImageClassifier {
    let (adapter, _) = stub_adapter(StubModel::imagenet_like().into_scores());
    ImageClassifier::new(ImageNormalizer::default(), adapter)
}

/// Builds a full pipeline whose model breaks the output contract on every call.
pub fn malformed_output_classifier() -> ImageClassifier {
    let catalog = Arc::new(ClassCatalog::from_labels(
        (0..1000).map(|i| format!("label {i}")).collect(),
    ));
    let adapter = ClassifierAdapter::with_loader(
        Box::new(|| Ok(Arc::new(MalformedOutputModel) as Arc<dyn ScoreModel>)),
        catalog,
    );
    ImageClassifier::new(ImageNormalizer::default(), adapter)
}

/// Encodes a solid-red RGB image as JPEG bytes.
pub fn red_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        width,
        height,
        image::Rgb([255, 0, 0]),
    ));
    encode(img, image::ImageFormat::Jpeg)
}

/// Encodes a semi-transparent RGBA image as PNG bytes.
pub fn translucent_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        width,
        height,
        image::Rgba([255, 0, 0, 128]),
    ));
    encode(img, image::ImageFormat::Png)
}

fn encode(img: image::DynamicImage, format: image::ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).expect("in-memory encode");
    buf.into_inner()
}
