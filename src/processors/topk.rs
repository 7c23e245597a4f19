//! Softmax and top-k ranking over raw classifier scores.

use crate::core::{ClassifyError, ClassifyResult};

/// Converts raw scores into a probability distribution.
///
/// Numerically stabilized by subtracting the maximum score before
/// exponentiating; the result sums to 1 within floating-point tolerance.
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    if scores.is_empty() {
        return Vec::new();
    }

    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|&s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|&e| e / sum).collect()
}

/// Extracts the top-k entries from a probability vector.
///
/// Results are ordered by score descending; equal scores keep class-index
/// order (the sort is stable), which makes the output deterministic.
#[derive(Debug, Default)]
pub struct Topk;

impl Topk {
    /// Creates a new Topk processor.
    pub fn new() -> Self {
        Self
    }

    /// Returns the k highest-scoring `(class_index, score)` pairs.
    ///
    /// `k` larger than the number of classes is clamped; `k == 0` is an error.
    pub fn process(&self, scores: &[f32], k: usize) -> ClassifyResult<Vec<(usize, f32)>> {
        if k == 0 {
            return Err(ClassifyError::invalid_input("k must be greater than 0"));
        }
        if scores.is_empty() {
            return Err(ClassifyError::model_output("empty score vector"));
        }

        let effective_k = k.min(scores.len());

        let mut indexed: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
        // Stable sort keeps ascending class index on ties.
        indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        indexed.truncate(effective_k);

        Ok(indexed)
    }
}
