//! docfmt Server
//!
//! Backend for the thesis formatting application. Provides REST endpoints
//! for:
//!
//! - Document upload and download
//! - Format checking and one-click formatting
//! - Preset templates and configuration export/import
//!
//! ## Architecture
//!
//! Uploaded documents live in an in-memory store with a time-to-live.
//! Configuration rules (defaults, merge, validation) are handled here;
//! reading and rewriting `.docx` files is delegated to an external
//! document engine reached over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use docfmt_types::MAX_UPLOAD_BYTES;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod engine;
mod error;
mod store;

use api::{
    handle_check, handle_download, handle_export_config, handle_format, handle_health,
    handle_import_config, handle_templates, handle_upload,
};
use engine::{DocumentEngine, HttpEngine, UnconfiguredEngine};
use store::FileStore;

/// Room for multipart framing around a maximum-size upload
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Command-line arguments for the docfmt server
#[derive(Parser, Debug)]
#[command(name = "docfmt-server")]
#[command(about = "Backend for document format checking and formatting")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Base URL of the document engine
    #[arg(long, env = "DOCFMT_ENGINE_URL")]
    engine_url: Option<String>,

    /// Document engine timeout in milliseconds
    #[arg(long, default_value = "60000")]
    engine_timeout_ms: u64,

    /// Seconds an uploaded or formatted file is kept
    #[arg(long, default_value = "3600")]
    file_ttl_secs: u64,

    /// Rate limit: requests per second per IP (0 disables)
    #[arg(long, default_value = "10")]
    rate_limit: u32,

    /// Directory with the web front end, served for non-API paths
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FileStore>,
    pub engine: Arc<dyn DocumentEngine>,
}

/// All routes and layers except rate limiting, which needs peer addresses
pub fn build_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        // Health check
        .route("/health", get(handle_health))
        // API endpoints
        .route("/api/upload", post(handle_upload))
        .route("/api/templates", get(handle_templates))
        .route("/api/check", post(handle_check))
        .route("/api/format", post(handle_format))
        .route("/api/download/:id", get(handle_download))
        .route("/api/export-config", post(handle_export_config))
        .route("/api/import-config", post(handle_import_config))
        .layer(DefaultBodyLimit::max(
            MAX_UPLOAD_BYTES as usize + MULTIPART_OVERHEAD,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    match static_dir {
        Some(dir) => {
            let index = ServeFile::new(dir.join("index.html"));
            router.fallback_service(ServeDir::new(dir).fallback(index))
        }
        None => router,
    }
}

/// Limit each peer IP to `per_second` requests per second, with a burst of
/// the same size. Zero leaves the router unlimited.
///
/// The router must be served with `SocketAddr` connect info.
pub fn apply_rate_limit(router: Router, per_second: u32) -> anyhow::Result<Router> {
    if per_second == 0 {
        return Ok(router);
    }

    // One token comes back every 1000 / n ms
    let replenish_ms = (1000 / u64::from(per_second)).max(1);
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(replenish_ms)
            .burst_size(per_second)
            .finish()
            .ok_or_else(|| anyhow!("invalid rate limit: {}", per_second))?,
    );

    Ok(router.layer(GovernorLayer {
        config: governor_conf,
    }))
}

fn document_engine(args: &Args) -> anyhow::Result<Arc<dyn DocumentEngine>> {
    match &args.engine_url {
        Some(url) => {
            let timeout = Duration::from_millis(args.engine_timeout_ms);
            info!("Document engine: {} (timeout {}ms)", url, args.engine_timeout_ms);
            Ok(Arc::new(HttpEngine::new(url, timeout)?))
        }
        None => {
            warn!("No document engine configured; check and format will answer 503");
            Ok(Arc::new(UnconfiguredEngine))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting docfmt server on {}:{}", args.host, args.port);

    let state = AppState {
        store: Arc::new(FileStore::new(Duration::from_secs(args.file_ttl_secs))),
        engine: document_engine(&args)?,
    };

    let app = apply_rate_limit(build_router(state, args.static_dir.clone()), args.rate_limit)?;

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    if args.rate_limit > 0 {
        info!("Rate limit: {} requests/second per IP", args.rate_limit);
    } else {
        info!("Rate limit: disabled");
    }
    info!("File TTL: {}s", args.file_ttl_secs);
    if let Some(dir) = &args.static_dir {
        info!("Serving front end from {}", dir.display());
    }

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
