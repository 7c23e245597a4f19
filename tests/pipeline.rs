//! End-to-end pipeline tests over a stubbed model: preprocessing contracts,
//! ranking semantics, and load-once behavior.

mod common;

use common::{red_jpeg, stub_adapter, stub_classifier, translucent_png, StubModel};
use ndarray::Array4;
use pix_classify::core::ClassifyError;
use pix_classify::pipeline::ImageNormalizer;
use pix_classify::processors::softmax;
use std::sync::atomic::Ordering;
use std::sync::Arc;

#[test]
fn normalize_always_yields_canonical_tensor() {
    let normalizer = ImageNormalizer::default();
    for bytes in [
        red_jpeg(224, 224),
        red_jpeg(1920, 1080),
        red_jpeg(64, 300),
        translucent_png(300, 300),
    ] {
        let tensor = normalizer.normalize_bytes(&bytes).unwrap();
        assert_eq!(tensor.shape(), &[1, 3, 224, 224]);
        assert!(tensor.iter().all(|v| v.is_finite()));
    }
}

#[test]
fn normalize_repeated_calls_are_bit_identical() {
    let normalizer = ImageNormalizer::default();
    let bytes = red_jpeg(640, 480);
    let first = normalizer.normalize_bytes(&bytes).unwrap();
    for _ in 0..3 {
        assert_eq!(normalizer.normalize_bytes(&bytes).unwrap(), first);
    }
}

#[test]
fn predict_top_k_returns_k_ranked_entries() {
    let classifier = stub_classifier();
    let output = classifier.classify_bytes(&red_jpeg(224, 224), 5).unwrap();

    assert_eq!(output.top_k.len(), 5);
    for pair in output.top_k.windows(2) {
        assert!(pair[0].confidence >= pair[1].confidence);
    }
    for p in &output.top_k {
        assert!((0.0..=1.0).contains(&p.confidence));
    }
    // Stub puts its unique maximum at class 42.
    assert_eq!(output.prediction.class_name, "label 42");
    assert_eq!(output.prediction, output.top_k[0]);
}

#[test]
fn tied_scores_rank_by_class_index() {
    let (adapter, _) = stub_adapter(vec![1.0; 8]);
    let tensor = Array4::zeros((1, 3, 224, 224));
    let ranked = adapter.predict_top_k(&tensor, 8).unwrap();
    let names: Vec<&str> = ranked.iter().map(|p| p.class_name.as_str()).collect();
    assert_eq!(
        names,
        ["label 0", "label 1", "label 2", "label 3", "label 4", "label 5", "label 6", "label 7"]
    );
}

#[test]
fn probabilities_sum_to_one() {
    let (adapter, _) = stub_adapter(vec![0.3, 2.5, -1.0, 4.2]);
    let tensor = Array4::zeros((1, 3, 224, 224));
    let all = adapter.predict_top_k(&tensor, 4).unwrap();
    let sum: f32 = all.iter().map(|p| p.confidence).sum();
    assert!((sum - 1.0).abs() < 1e-5);
}

#[test]
fn softmax_matches_closed_form_two_classes() {
    let probs = softmax(&[0.0, 0.0]);
    assert!((probs[0] - 0.5).abs() < 1e-6);
    assert!((probs[1] - 0.5).abs() < 1e-6);
}

#[test]
fn k_zero_is_rejected_and_oversized_k_is_clamped() {
    let (adapter, _) = stub_adapter(vec![1.0, 2.0, 3.0]);
    let tensor = Array4::zeros((1, 3, 224, 224));

    assert!(matches!(
        adapter.predict_top_k(&tensor, 0),
        Err(ClassifyError::InvalidInput { .. })
    ));
    assert_eq!(adapter.predict_top_k(&tensor, 50).unwrap().len(), 3);
}

#[test]
fn wrong_shape_is_rejected_before_inference() {
    let (adapter, load_count) = stub_adapter(vec![1.0, 2.0, 3.0]);
    let tensor = Array4::zeros((1, 3, 128, 128));
    let err = adapter.predict_top_k(&tensor, 1).unwrap_err();
    assert!(matches!(err, ClassifyError::ShapeMismatch { .. }));
    // The model handle is still constructed (load precedes the shape check),
    // but only once.
    assert_eq!(load_count.load(Ordering::SeqCst), 1);
}

#[test]
fn load_is_idempotent() {
    let (adapter, load_count) = stub_adapter(vec![1.0, 2.0]);
    adapter.load().unwrap();
    adapter.load().unwrap();
    let tensor = Array4::zeros((1, 3, 224, 224));
    adapter.predict_top1(&tensor).unwrap();
    assert_eq!(load_count.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_first_callers_load_once() {
    let (adapter, load_count) = stub_adapter((0..100).map(|i| i as f32).collect());
    let adapter = Arc::new(adapter);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let adapter = adapter.clone();
            std::thread::spawn(move || {
                let tensor = Array4::zeros((1, 3, 224, 224));
                adapter.predict_top_k(&tensor, 3).unwrap()
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(load_count.load(Ordering::SeqCst), 1);
}

#[test]
fn predict_top1_matches_head_of_top_k() {
    let (adapter, _) = stub_adapter(StubModel::imagenet_like().into_scores());
    let tensor = Array4::zeros((1, 3, 224, 224));
    let top1 = adapter.predict_top1(&tensor).unwrap();
    let top5 = adapter.predict_top_k(&tensor, 5).unwrap();
    assert_eq!(top1, top5[0]);
}
