//! # pix-classify
//!
//! A Rust image classification service that labels photos using a pretrained
//! ImageNet ONNX model.
//!
//! ## Features
//!
//! - Deterministic ImageNet preprocessing (shortest-side resize, center crop,
//!   mean/std normalization)
//! - ONNX Runtime integration for fast inference
//! - Softmax + top-k ranking with stable, reproducible ordering
//! - axum HTTP surface with multipart upload
//!
//! ## Components
//!
//! - **Image Normalizer**: decodes arbitrary image bytes into a `(1, 3, 224, 224)`
//!   float32 tensor matching the classifier's training distribution
//! - **Classifier Adapter**: wraps the opaque model call and turns raw scores into
//!   ranked `(label, confidence)` predictions
//!
//! ## Modules
//!
//! * [`core`] - Error handling, tensor aliases, and the ONNX inference engine
//! * [`domain`] - Domain types like [`domain::Prediction`] and [`domain::ClassCatalog`]
//! * [`processors`] - Pure image and score transformations
//! * [`pipeline`] - The normalizer and classifier stages, composed
//! * [`server`] - HTTP routes and error mapping
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pix_classify::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let classifier = ImageClassifier::from_onnx(
//!     Path::new("models/mobilenet_v2.onnx"),
//!     Path::new("models/imagenet_classes.txt"),
//! )?;
//!
//! let bytes = std::fs::read("photo.jpg")?;
//! let output = classifier.classify_bytes(&bytes, 5)?;
//! println!("{} ({:.4})", output.prediction.class_name, output.prediction.confidence);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod pipeline;
pub mod processors;
pub mod server;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use pix_classify::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{ClassifyError, ClassifyResult};
    pub use crate::domain::{ClassCatalog, ClassificationOutput, Prediction};
    pub use crate::pipeline::{ClassifierAdapter, ImageClassifier, ImageNormalizer};
    pub use crate::server::router;
}
