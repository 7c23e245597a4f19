//! Domain types: predictions and the class catalog.

use crate::core::{ClassifyError, ClassifyResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single ranked prediction: a human-readable label and its probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// The class label from the catalog.
    pub class_name: String,
    /// Softmax probability in [0, 1].
    pub confidence: f32,
}

/// The result of classifying one image: the top prediction plus the ranked
/// top-k list. The top prediction always equals the head of `top_k`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationOutput {
    /// The single most likely class.
    pub prediction: Prediction,
    /// The k most likely classes, confidence descending.
    pub top_k: Vec<Prediction>,
}

/// An ordered, immutable mapping from class index to label name.
///
/// Loaded once at process start and shared read-only for the process lifetime.
#[derive(Debug, Clone)]
pub struct ClassCatalog {
    labels: Vec<String>,
}

impl ClassCatalog {
    /// Creates a catalog from an ordered list of labels (index = class id).
    pub fn from_labels(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Loads a catalog from a text file with one label per line.
    ///
    /// Blank lines are skipped; surrounding whitespace is trimmed.
    pub fn from_file(path: impl AsRef<Path>) -> ClassifyResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ClassifyError::file_not_found(path));
        }
        let content = std::fs::read_to_string(path)?;
        let labels: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        if labels.is_empty() {
            return Err(ClassifyError::config_error(format!(
                "class catalog '{}' contains no labels",
                path.display()
            )));
        }
        Ok(Self { labels })
    }

    /// Returns the label for a class index, if present.
    pub fn get(&self, class_id: usize) -> Option<&str> {
        self.labels.get(class_id).map(String::as_str)
    }

    /// Returns the label for a class index, falling back to `class_{id}` for
    /// indices outside the catalog.
    pub fn label_or_fallback(&self, class_id: usize) -> String {
        self.labels
            .get(class_id)
            .cloned()
            .unwrap_or_else(|| format!("class_{}", class_id))
    }

    /// Number of classes in the catalog.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
