//! The classification pipeline: normalizer stage, classifier stage, and the
//! composed front door.
//!
//! There is exactly one source of truth for the preprocessing constants and
//! the top-k logic; both the HTTP handlers and any embedding callers go
//! through [`ImageClassifier`].

pub mod classifier;
pub mod normalizer;

pub use classifier::ClassifierAdapter;
pub use normalizer::{ImageNormalizer, NormalizerConfig};

use crate::core::{ClassifyError, ClassifyResult};
use crate::domain::{ClassCatalog, ClassificationOutput};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// The full bytes-to-predictions pipeline: Image Normalizer followed by the
/// Classifier Adapter.
#[derive(Debug)]
pub struct ImageClassifier {
    normalizer: ImageNormalizer,
    adapter: ClassifierAdapter,
}

impl ImageClassifier {
    /// Composes a classifier from the two stages.
    pub fn new(normalizer: ImageNormalizer, adapter: ClassifierAdapter) -> Self {
        Self {
            normalizer,
            adapter,
        }
    }

    /// Builds the standard ImageNet pipeline: default 256/224 geometry, the
    /// ONNX model at `model_path`, labels from `labels_path`.
    pub fn from_onnx(model_path: &Path, labels_path: &Path) -> ClassifyResult<Self> {
        let catalog = Arc::new(ClassCatalog::from_file(labels_path)?);
        let normalizer = ImageNormalizer::default();
        let (crop_w, crop_h) = normalizer.output_size();
        let adapter = ClassifierAdapter::from_onnx(
            model_path,
            None,
            [1, 3, crop_h as usize, crop_w as usize],
            catalog,
        );
        Ok(Self::new(normalizer, adapter))
    }

    /// The normalizer stage.
    pub fn normalizer(&self) -> &ImageNormalizer {
        &self.normalizer
    }

    /// The classifier stage.
    pub fn adapter(&self) -> &ClassifierAdapter {
        &self.adapter
    }

    /// Eagerly loads the model. Idempotent.
    pub fn load(&self) -> ClassifyResult<()> {
        self.adapter.load()
    }

    /// Classifies in-memory encoded image bytes, returning the top prediction
    /// and the ranked top-k list.
    pub fn classify_bytes(&self, bytes: &[u8], k: usize) -> ClassifyResult<ClassificationOutput> {
        let tensor = self.normalizer.normalize_bytes(bytes)?;
        debug!(shape = ?tensor.shape(), "normalized upload");
        let top_k = self.adapter.predict_top_k(&tensor, k)?;
        let prediction = top_k
            .first()
            .cloned()
            .ok_or_else(|| ClassifyError::model_output("model produced no predictions"))?;
        Ok(ClassificationOutput { prediction, top_k })
    }

    /// Classifies an image file on disk.
    pub fn classify_path(&self, path: &Path, k: usize) -> ClassifyResult<ClassificationOutput> {
        let tensor = self.normalizer.normalize_path(path)?;
        let top_k = self.adapter.predict_top_k(&tensor, k)?;
        let prediction = top_k
            .first()
            .cloned()
            .ok_or_else(|| ClassifyError::model_output("model produced no predictions"))?;
        Ok(ClassificationOutput { prediction, top_k })
    }
}
