//! Roaster — pluggable, trait-based backend that turns a prompt into a roast.
//!
//! Default: `GeminiRoaster` (calls Gemini through `llm_client`).
//!
//! `AppState` holds an `Arc<dyn Roaster>`, so tests can swap in a stub.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::llm_client::GeminiClient;

/// Implement this to swap the generation backend without touching the
/// handler or the pipeline.
#[async_trait]
pub trait Roaster: Send + Sync {
    async fn roast(&self, prompt: &str) -> Result<String, AppError>;
}

pub struct GeminiRoaster {
    client: GeminiClient,
}

impl GeminiRoaster {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Roaster for GeminiRoaster {
    async fn roast(&self, prompt: &str) -> Result<String, AppError> {
        self.client
            .generate_text(prompt)
            .await
            .map_err(|e| AppError::Llm(format!("Roast generation failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_gemini_maps_to_llm_error() {
        // Port 9 (discard) on loopback refuses connections
        let client = GeminiClient::new("k".into(), "http://127.0.0.1:9/v1beta")
            .unwrap()
            .with_retry_base(std::time::Duration::from_millis(1));
        let roaster = GeminiRoaster::new(client);
        let err = roaster.roast("roast me").await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }
}
