//! ONNX Runtime inference engine for classification models.

use crate::core::errors::{ClassifyError, ClassifyResult, SimpleError};
use crate::core::traits::ScoreModel;
use crate::core::{Tensor2D, Tensor4D};
use ndarray::ArrayView2;
use ort::logging::LogLevel;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Runs a classification ONNX model behind a pool of sessions.
///
/// Sessions are not reentrant, so each one is guarded by a mutex; calls are
/// distributed round-robin across the pool. The default pool size is 1, which
/// serializes the inference call only (not the surrounding request).
pub struct OrtInfer {
    sessions: Vec<Mutex<Session>>,
    next_idx: std::sync::atomic::AtomicUsize,
    input_name: String,
    output_name: String,
    expected_input: [usize; 4],
    num_classes: usize,
    model_path: PathBuf,
    model_name: String,
}

impl std::fmt::Debug for OrtInfer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtInfer")
            .field("sessions", &self.sessions.len())
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("expected_input", &self.expected_input)
            .field("num_classes", &self.num_classes)
            .field("model_path", &self.model_path)
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl OrtInfer {
    /// Creates a new engine with a single session and default settings.
    ///
    /// `expected_input` is the (batch, channels, height, width) shape the model
    /// was exported with; `num_classes` is the length of its score vector.
    pub fn new(
        model_path: impl AsRef<Path>,
        input_name: Option<&str>,
        expected_input: [usize; 4],
        num_classes: usize,
    ) -> ClassifyResult<Self> {
        Self::with_pool_size(model_path, input_name, expected_input, num_classes, 1)
    }

    /// Creates a new engine with a pool of `pool_size` sessions for concurrent
    /// inference.
    pub fn with_pool_size(
        model_path: impl AsRef<Path>,
        input_name: Option<&str>,
        expected_input: [usize; 4],
        num_classes: usize,
        pool_size: usize,
    ) -> ClassifyResult<Self> {
        let path = model_path.as_ref();
        if !path.exists() {
            return Err(ClassifyError::file_not_found(path));
        }

        let pool_size = pool_size.max(1);
        let mut sessions = Vec::with_capacity(pool_size);
        let mut output_name = None;
        for _ in 0..pool_size {
            let session = Session::builder()?
                .with_log_level(LogLevel::Error)?
                .commit_from_file(path)
                .map_err(|e| {
                    ClassifyError::model_unavailable(
                        format!("failed to create ONNX session for '{}'", path.display()),
                        e,
                    )
                })?;
            // All sessions share the model, so discover the output name once
            // from the first one.
            if output_name.is_none() {
                let name = session
                    .outputs
                    .first()
                    .map(|output| output.name.clone())
                    .ok_or_else(|| {
                        ClassifyError::model_unavailable(
                            format!("model '{}' declares no outputs", path.display()),
                            SimpleError::new("no outputs in session"),
                        )
                    })?;
                output_name = Some(name);
            }
            sessions.push(Mutex::new(session));
        }
        let output_name = output_name.unwrap_or_default();

        let model_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown_model")
            .to_string();

        Ok(OrtInfer {
            sessions,
            next_idx: std::sync::atomic::AtomicUsize::new(0),
            input_name: input_name.unwrap_or("input").to_string(),
            output_name,
            expected_input,
            num_classes,
            model_path: path.to_path_buf(),
            model_name,
        })
    }

    /// Returns the model path associated with this inference engine.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Returns the model name associated with this inference engine.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Runs the model and extracts the (batch_size x num_classes) score tensor.
    pub fn infer_2d(&self, x: &Tensor4D) -> ClassifyResult<Tensor2D> {
        let batch_size = x.shape()[0];
        let input_shape = x.shape().to_vec();

        let input_tensor = TensorRef::from_array_view(x.view()).map_err(|e| {
            ClassifyError::model_unavailable(
                format!(
                    "model '{}': failed to convert input tensor with shape {:?}",
                    self.model_name, input_shape
                ),
                e,
            )
        })?;

        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let idx = self
            .next_idx
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
            % self.sessions.len();
        let mut session_guard = self.sessions[idx].lock().map_err(|_| {
            ClassifyError::model_unavailable(
                format!(
                    "model '{}': failed to acquire session lock {}/{}",
                    self.model_name,
                    idx,
                    self.sessions.len()
                ),
                SimpleError::new("session lock acquisition failed"),
            )
        })?;

        let outputs = session_guard.run(inputs).map_err(|e| {
            ClassifyError::model_unavailable(
                format!(
                    "model '{}': inference failed with input '{}' -> output '{}'",
                    self.model_name, self.input_name, self.output_name
                ),
                e,
            )
        })?;

        let (output_shape, output_data) = outputs[self.output_name.as_str()]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                ClassifyError::model_unavailable(
                    format!(
                        "model '{}': failed to extract output tensor '{}' as f32",
                        self.model_name, self.output_name
                    ),
                    e,
                )
            })?;

        if output_shape.len() != 2 {
            return Err(ClassifyError::model_output(format!(
                "model '{}': expected 2D output tensor, got {}D with shape {:?}",
                self.model_name,
                output_shape.len(),
                output_shape
            )));
        }

        let num_classes = output_shape[1] as usize;
        let expected_len = batch_size * num_classes;
        if output_data.len() != expected_len {
            return Err(ClassifyError::model_output(format!(
                "model '{}': output data size mismatch, expected {} got {}",
                self.model_name,
                expected_len,
                output_data.len()
            )));
        }

        let array_view = ArrayView2::from_shape((batch_size, num_classes), output_data)
            .map_err(ClassifyError::Tensor)?;
        Ok(array_view.to_owned())
    }
}

impl ScoreModel for OrtInfer {
    fn expected_input(&self) -> [usize; 4] {
        self.expected_input
    }

    fn num_classes(&self) -> usize {
        self.num_classes
    }

    fn infer(&self, tensor: &Tensor4D) -> ClassifyResult<Tensor2D> {
        self.infer_2d(tensor)
    }
}
