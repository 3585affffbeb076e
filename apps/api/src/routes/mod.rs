pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::pdf::MAX_PDF_BYTES;
use crate::roast::handlers;
use crate::state::AppState;

/// Transport cap on request bodies. Sits above the file limit to leave room
/// for multipart framing; the exact file check happens in `pdf::validate_upload`.
pub const MAX_BODY_BYTES: usize = MAX_PDF_BYTES + 2 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/roast", post(handlers::handle_roast))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
