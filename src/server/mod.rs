//! HTTP boundary: axum routes, multipart handling, and error mapping.
//!
//! The web layer is deliberately thin; all classification semantics live in
//! [`crate::pipeline::ImageClassifier`]. Pipeline errors are translated into a
//! structured `{"detail": ...}` JSON body with a status code here, uniformly:
//! bad client input (unsupported extension, undecodable bytes) maps to 400,
//! model and internal failures map to 500.

use crate::core::ClassifyError;
use crate::domain::{ClassificationOutput, Prediction};
use crate::pipeline::ImageClassifier;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// Accepted upload extensions, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".bmp", ".gif", ".webp"];

/// Maximum accepted upload size in bytes.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Default wall-clock budget for one classification call.
const DEFAULT_INFERENCE_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared state for the request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The classification pipeline, shared read-only across requests.
    pub classifier: Arc<ImageClassifier>,
    /// How many ranked predictions to return per request.
    pub top_k: usize,
    /// Wall-clock budget for one classification call.
    pub inference_timeout: Duration,
}

impl AppState {
    /// Creates state serving `top_k` predictions per upload, with the default
    /// inference timeout.
    pub fn new(classifier: Arc<ImageClassifier>, top_k: usize) -> Self {
        Self {
            classifier,
            top_k,
            inference_timeout: DEFAULT_INFERENCE_TIMEOUT,
        }
    }

    /// Overrides the per-call inference timeout.
    pub fn with_inference_timeout(mut self, timeout: Duration) -> Self {
        self.inference_timeout = timeout;
        self
    }
}

/// One prediction as serialized in HTTP responses, confidence rounded to four
/// decimal places.
#[derive(Debug, Serialize)]
struct PredictionBody {
    class_name: String,
    confidence: f64,
}

impl From<&Prediction> for PredictionBody {
    fn from(p: &Prediction) -> Self {
        Self {
            class_name: p.class_name.clone(),
            confidence: round4(p.confidence),
        }
    }
}

/// Successful classification response body.
#[derive(Debug, Serialize)]
struct ClassifyBody {
    success: bool,
    filename: String,
    prediction: PredictionBody,
    top_k: Vec<PredictionBody>,
}

impl ClassifyBody {
    fn new(filename: String, output: &ClassificationOutput) -> Self {
        Self {
            success: true,
            filename,
            prediction: PredictionBody::from(&output.prediction),
            top_k: output.top_k.iter().map(PredictionBody::from).collect(),
        }
    }
}

fn round4(confidence: f32) -> f64 {
    (confidence as f64 * 10_000.0).round() / 10_000.0
}

/// Builds the service router: `POST /classify`, `GET /health`, `GET /`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/classify", post(classify))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Service banner.
async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "image classification API",
        "endpoints": {
            "health": "/health",
            "classify": "/classify"
        }
    }))
}

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

/// Classifies a multipart image upload.
async fn classify(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut upload: Option<(String, Vec<u8>)> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("file") {
                    continue;
                }
                let filename = field.file_name().unwrap_or("upload").to_string();
                match field.bytes().await {
                    Ok(bytes) => {
                        upload = Some((filename, bytes.to_vec()));
                        break;
                    }
                    Err(e) => {
                        return detail_response(
                            StatusCode::BAD_REQUEST,
                            format!("failed to read upload: {e}"),
                        );
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                return detail_response(
                    StatusCode::BAD_REQUEST,
                    format!("malformed multipart body: {e}"),
                );
            }
        }
    }

    let Some((filename, bytes)) = upload else {
        return detail_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "missing file field in multipart body".to_string(),
        );
    };

    if let Err(e) = validate_extension(&filename) {
        return error_response(e);
    }

    info!(filename = %filename, size = bytes.len(), "classifying upload");

    // The pipeline is synchronous CPU work; keep the async executor free and
    // bound it with a wall-clock budget.
    let classifier = state.classifier.clone();
    let top_k = state.top_k;
    let task = tokio::task::spawn_blocking(move || classifier.classify_bytes(&bytes, top_k));

    match tokio::time::timeout(state.inference_timeout, task).await {
        Ok(Ok(Ok(output))) => {
            (StatusCode::OK, Json(ClassifyBody::new(filename, &output))).into_response()
        }
        Ok(Ok(Err(e))) => error_response(e),
        Ok(Err(e)) => {
            error!("classification task panicked: {e}");
            detail_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error during classification".to_string(),
            )
        }
        Err(_) => error_response(ClassifyError::Timeout {
            seconds: state.inference_timeout.as_secs(),
        }),
    }
}

/// Checks the upload's extension against the allow-list.
fn validate_extension(filename: &str) -> Result<(), ClassifyError> {
    let lowered = filename.to_lowercase();
    if ALLOWED_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext)) {
        Ok(())
    } else {
        let extension = match lowered.rfind('.') {
            Some(idx) => lowered[idx..].to_string(),
            None => "(none)".to_string(),
        };
        Err(ClassifyError::unsupported_format(
            extension,
            &ALLOWED_EXTENSIONS,
        ))
    }
}

/// Maps a pipeline error to an HTTP status and a `{"detail": ...}` body.
fn error_response(err: ClassifyError) -> Response {
    let status = match &err {
        // Client errors: bad extension, undecodable content, zero-k requests.
        ClassifyError::UnsupportedFormat { .. }
        | ClassifyError::Decode { .. }
        | ClassifyError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        ClassifyError::FileNotFound { .. } => StatusCode::NOT_FOUND,
        ClassifyError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        // Model contract violations are server faults regardless of the upload.
        ClassifyError::ModelOutput { .. } | ClassifyError::ModelUnavailable { .. } => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        // Everything else is a server-side failure.
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("classification failed: {err}");
    }
    detail_response(status, err.to_string())
}

fn detail_response(status: StatusCode, detail: String) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}
