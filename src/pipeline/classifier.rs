//! The Classifier Adapter stage: tensor in, ranked predictions out.

use crate::core::{ClassifyError, ClassifyResult, OrtInfer, ScoreModel, Tensor4D};
use crate::domain::{ClassCatalog, Prediction};
use crate::processors::{softmax, Topk};
use once_cell::sync::OnceCell;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

type ModelLoader = Box<dyn Fn() -> ClassifyResult<Arc<dyn ScoreModel>> + Send + Sync>;

/// Wraps the opaque pretrained model and converts its raw output into ranked
/// `(label, confidence)` predictions.
///
/// The model handle is loaded lazily on first use and cached for the process
/// lifetime; concurrent first callers are serialized by the init cell, so the
/// underlying session is built exactly once no matter how many times `load`
/// runs.
pub struct ClassifierAdapter {
    model: OnceCell<Arc<dyn ScoreModel>>,
    loader: ModelLoader,
    catalog: Arc<ClassCatalog>,
    topk: Topk,
}

impl std::fmt::Debug for ClassifierAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierAdapter")
            .field("loaded", &self.model.get().is_some())
            .field("catalog_len", &self.catalog.len())
            .finish()
    }
}

impl ClassifierAdapter {
    /// Creates an adapter that lazily builds an ONNX session for the model at
    /// `model_path` with the given expected input shape.
    pub fn from_onnx(
        model_path: &Path,
        input_name: Option<&str>,
        expected_input: [usize; 4],
        catalog: Arc<ClassCatalog>,
    ) -> Self {
        let path = model_path.to_path_buf();
        let input_name = input_name.map(str::to_string);
        let num_classes = catalog.len();
        Self::with_loader(
            Box::new(move || {
                info!(model = %path.display(), "loading ONNX classification model");
                let engine = OrtInfer::new(
                    &path,
                    input_name.as_deref(),
                    expected_input,
                    num_classes,
                )?;
                Ok(Arc::new(engine) as Arc<dyn ScoreModel>)
            }),
            catalog,
        )
    }

    /// Creates an adapter with a custom model loader.
    ///
    /// This is the injection seam: production wires an ONNX session loader,
    /// tests wire a deterministic stub.
    pub fn with_loader(loader: ModelLoader, catalog: Arc<ClassCatalog>) -> Self {
        Self {
            model: OnceCell::new(),
            loader,
            catalog,
            topk: Topk::new(),
        }
    }

    /// Loads the model if it is not loaded yet. Idempotent: repeated or
    /// concurrent calls initialize the underlying model at most once.
    pub fn load(&self) -> ClassifyResult<()> {
        self.model()?;
        Ok(())
    }

    /// Whether the model has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    /// The class catalog this adapter resolves labels against.
    pub fn catalog(&self) -> &ClassCatalog {
        &self.catalog
    }

    fn model(&self) -> ClassifyResult<&Arc<dyn ScoreModel>> {
        self.model.get_or_try_init(|| (self.loader)())
    }

    /// Runs inference and returns the single highest-probability class.
    pub fn predict_top1(&self, tensor: &Tensor4D) -> ClassifyResult<Prediction> {
        let mut ranked = self.predict_top_k(tensor, 1)?;
        ranked
            .pop()
            .ok_or_else(|| ClassifyError::model_output("model produced no predictions"))
    }

    /// Runs inference and returns the `k` highest-probability classes,
    /// confidence descending, ties broken by class index ascending.
    ///
    /// `k == 0` is rejected; `k` larger than the number of classes is clamped.
    pub fn predict_top_k(&self, tensor: &Tensor4D, k: usize) -> ClassifyResult<Vec<Prediction>> {
        let model = self.model()?;

        // Validate the shape contract before the model sees the tensor.
        let expected = model.expected_input();
        if tensor.shape() != expected {
            return Err(ClassifyError::shape_mismatch(&expected, tensor.shape()));
        }

        let scores = model.infer(tensor)?;
        let row: Vec<f32> = scores.row(0).to_vec();
        let probabilities = softmax(&row);

        let ranked = self.topk.process(&probabilities, k)?;
        debug!(k, returned = ranked.len(), "ranked predictions");

        Ok(ranked
            .into_iter()
            .map(|(class_id, confidence)| Prediction {
                class_name: self.catalog.label_or_fallback(class_id),
                confidence,
            })
            .collect())
    }
}
