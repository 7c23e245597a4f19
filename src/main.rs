//! Service entry point: CLI parsing, tracing setup, and HTTP serving.

use clap::Parser;
use pix_classify::core::init_tracing;
use pix_classify::pipeline::ImageClassifier;
use pix_classify::server::{router, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Image classification service backed by a pretrained ONNX model.
#[derive(Parser)]
#[command(name = "pix-classify")]
#[command(about = "Serve image classification over HTTP using an ONNX model")]
struct Args {
    /// Path to the ONNX classification model.
    #[arg(short, long)]
    model_path: PathBuf,

    /// Path to the class labels file (one label per line, index = class id).
    #[arg(short, long)]
    labels_path: PathBuf,

    /// Bind address.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Bind port.
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Number of ranked predictions returned per request.
    #[arg(long, default_value_t = 5)]
    top_k: usize,

    /// Wall-clock timeout per classification call, in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Load the model before accepting requests instead of on first upload.
    #[arg(long)]
    eager_load: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let classifier = ImageClassifier::from_onnx(&args.model_path, &args.labels_path)?;
    info!(
        model = %args.model_path.display(),
        classes = classifier.adapter().catalog().len(),
        "pipeline ready"
    );

    if args.eager_load {
        if let Err(e) = classifier.load() {
            error!("eager model load failed: {e}");
            return Err(e.into());
        }
        info!("model loaded");
    }

    let state = AppState::new(Arc::new(classifier), args.top_k)
        .with_inference_timeout(std::time::Duration::from_secs(args.timeout_secs));
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
