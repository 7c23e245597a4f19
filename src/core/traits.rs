//! Core traits for the classification pipeline.

use crate::core::{ClassifyResult, Tensor2D, Tensor4D};

/// An opaque pretrained classifier: tensor in, raw per-class scores out.
///
/// The production implementation wraps an ONNX Runtime session
/// ([`crate::core::inference::OrtInfer`]); tests substitute deterministic
/// stubs. Implementations must be safe for concurrent read-only use once
/// constructed, serializing internally if the underlying runtime requires it.
pub trait ScoreModel: Send + Sync {
    /// The input shape this model expects, as (batch, channels, height, width).
    fn expected_input(&self) -> [usize; 4];

    /// The number of classes in the model's output layer.
    fn num_classes(&self) -> usize;

    /// Runs inference and returns raw scores (batch_size x num_classes).
    ///
    /// Callers are responsible for validating the input shape against
    /// [`expected_input`](Self::expected_input) beforehand.
    fn infer(&self, tensor: &Tensor4D) -> ClassifyResult<Tensor2D>;
}
