//! Error types for the classification pipeline.
//!
//! This module defines the errors that can occur while decoding images,
//! loading the model, and running inference, along with helper constructors
//! for creating them with appropriate context.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Enum representing the errors that can occur in the classification pipeline.
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// The uploaded file's extension is not in the supported set.
    #[error("unsupported file format: {extension}. supported formats: {supported}")]
    UnsupportedFormat {
        /// The rejected extension (lowercased, including the dot).
        extension: String,
        /// Comma-separated list of accepted extensions.
        supported: String,
    },

    /// The byte stream or file content is not a decodable image.
    #[error("image decode failed: {context}")]
    Decode {
        /// Additional context about what was being decoded.
        context: String,
        /// The underlying decoder error.
        #[source]
        source: image::ImageError,
    },

    /// A path-based load was attempted on a file that does not exist.
    #[error("file not found: {path}")]
    FileNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// The model weights could not be loaded or the session could not be built.
    #[error("model unavailable: {context}")]
    ModelUnavailable {
        /// Additional context about the load failure.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The input tensor's shape does not match the model's expected input shape.
    ///
    /// Raised before the underlying model is invoked; indicates a pipeline
    /// wiring bug rather than bad user input.
    #[error("input tensor shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// The shape the model expects.
        expected: Vec<usize>,
        /// The shape that was provided.
        actual: Vec<usize>,
    },

    /// The model produced output that violates the classification contract.
    ///
    /// A server-side fault (wrong output rank, size mismatch, empty score
    /// vector), never caused by the uploaded image.
    #[error("model output: {message}")]
    ModelOutput {
        /// A message describing the contract violation.
        message: String,
    },

    /// Inference did not complete within the configured wall-clock budget.
    #[error("classification timed out after {seconds}s")]
    Timeout {
        /// The budget that was exceeded.
        seconds: u64,
    },

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error from the ONNX Runtime session.
    #[error(transparent)]
    Session(#[from] ort::Error),

    /// Error from tensor operations.
    #[error("tensor operation")]
    Tensor(#[from] ndarray::ShapeError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

/// Convenient result alias for classification operations.
pub type ClassifyResult<T> = Result<T, ClassifyError>;

impl ClassifyError {
    /// Creates a decode error with context.
    pub fn decode(context: impl Into<String>, source: image::ImageError) -> Self {
        Self::Decode {
            context: context.into(),
            source,
        }
    }

    /// Creates an unsupported-format error naming the accepted extensions.
    pub fn unsupported_format(extension: impl Into<String>, supported: &[&str]) -> Self {
        Self::UnsupportedFormat {
            extension: extension.into(),
            supported: supported.join(", "),
        }
    }

    /// Creates a model-unavailable error with context.
    pub fn model_unavailable(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ModelUnavailable {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Creates a file-not-found error for the given path.
    pub fn file_not_found(path: impl AsRef<Path>) -> Self {
        Self::FileNotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Creates a shape-mismatch error.
    pub fn shape_mismatch(expected: &[usize], actual: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }

    /// Creates a model-output contract error.
    pub fn model_output(message: impl Into<String>) -> Self {
        Self::ModelOutput {
            message: message.into(),
        }
    }

    /// Creates an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }
}

/// Simple string-backed error for cases with no richer source available.
#[derive(Debug)]
pub struct SimpleError {
    message: String,
}

impl SimpleError {
    /// Creates a new simple error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SimpleError {}
