use std::sync::Arc;

use crate::roast::roaster::Roaster;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable roast backend. Default: GeminiRoaster.
    pub roaster: Arc<dyn Roaster>,
}
