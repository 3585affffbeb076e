mod config;
mod cors;
mod errors;
mod llm_client;
mod pdf;
mod roast;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::cors::cors_layer;
use crate::llm_client::GeminiClient;
use crate::roast::roaster::GeminiRoaster;
use crate::routes::{build_router, health::SERVICE_NAME};
use crate::state::AppState;

const DEFAULT_LOG_LEVEL: &str = "info";

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(&config)?;

    // Initialize LLM client
    let gemini = GeminiClient::new(config.gemini_api_key.clone(), &config.gemini_api_base)?;
    info!("Gemini API client initialized (model: {})", llm_client::MODEL);

    let state = AppState {
        roaster: Arc::new(GeminiRoaster::new(gemini)),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.allowed_origins));

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;

    info!("{}", "=".repeat(50));
    info!("{SERVICE_NAME} v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Allowed CORS origins: {:?}", config.allowed_origins);
    info!("Listening on {addr}");
    info!("{}", "=".repeat(50));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Structured logging to stdout plus an append-only log file.
/// `RUST_LOG` overrides the default `<crate>=info` filter.
fn init_logging(config: &Config) -> Result<WorkerGuard> {
    let file_appender = build_file_appender(&config.log_file)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={DEFAULT_LOG_LEVEL}", env!("CARGO_CRATE_NAME")))
        }))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    Ok(guard)
}

/// Opens `log_file` for appending without rotation, creating its directory.
fn build_file_appender(log_file: &str) -> Result<RollingFileAppender> {
    let log_path = Path::new(log_file);
    let directory = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("LOG_FILE '{log_file}' has no usable file name"))?;

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
        .with_context(|| format!("LOG_FILE '{log_file}' cannot be opened"))
}
