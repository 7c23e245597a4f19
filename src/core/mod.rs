//! Core infrastructure for the classification pipeline.
//!
//! This module provides the error taxonomy, tensor type aliases, the opaque
//! model trait, and the ONNX Runtime inference engine.

pub mod errors;
pub mod inference;
pub mod traits;

pub use errors::{ClassifyError, ClassifyResult};
pub use inference::OrtInfer;
pub use traits::ScoreModel;

/// A 2D tensor of f32 values (batch_size x num_classes).
pub type Tensor2D = ndarray::Array2<f32>;

/// A 4D tensor of f32 values (batch_size x channels x height x width).
pub type Tensor4D = ndarray::Array4<f32>;

/// Initializes the tracing subscriber for logging.
///
/// Respects the `RUST_LOG` environment variable for filtering.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
