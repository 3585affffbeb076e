/// LLM Client — the single point of entry for all Gemini API calls.
///
/// No other module may call the Gemini API directly.
///
/// Model: gemini-2.0-flash-exp (hardcoded, not configurable)
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// The model used for all LLM calls.
pub const MODEL: &str = "gemini-2.0-flash-exp";
const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_RETRY_BASE: Duration = Duration::from_millis(1000);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GeminiResponse {
    /// Concatenates the text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Wraps the Gemini `generateContent` endpoint with retry logic.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    retry_base: Duration,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry_base: DEFAULT_RETRY_BASE,
        })
    }

    /// Overrides the first backoff delay; later delays double from it.
    pub fn with_retry_base(mut self, retry_base: Duration) -> Self {
        self.retry_base = retry_base;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, MODEL)
    }

    /// Makes a raw call to the Gemini API, returning the full response object.
    /// Retries on transport errors, 429 and 5xx with exponential backoff.
    pub async fn call(&self, prompt: &str) -> Result<GeminiResponse, LlmError> {
        let request_body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };
        let url = self.endpoint();

        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let retryable = match self
                .client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&request_body)
                .send()
                .await
            {
                Err(e) => LlmError::Http(e),
                Ok(response) => {
                    let status = response.status();

                    if status.as_u16() == 429 || status.is_server_error() {
                        let body = response.text().await.unwrap_or_default();
                        warn!("LLM API returned {}: {}", status, body);
                        LlmError::Api {
                            status: status.as_u16(),
                            message: body,
                        }
                    } else if !status.is_success() {
                        let body = response.text().await.unwrap_or_default();
                        let message = serde_json::from_str::<GeminiError>(&body)
                            .map(|e| e.error.message)
                            .unwrap_or(body);
                        return Err(LlmError::Api {
                            status: status.as_u16(),
                            message,
                        });
                    } else {
                        let gemini_response: GeminiResponse = response.json().await?;

                        if let Some(usage) = &gemini_response.usage_metadata {
                            debug!(
                                "LLM call succeeded: prompt_tokens={}, output_tokens={}",
                                usage.prompt_token_count, usage.candidates_token_count
                            );
                        }

                        return Ok(gemini_response);
                    }
                }
            };

            if attempt >= MAX_RETRIES {
                return Err(retryable);
            }

            // Exponential backoff: 1s, 2s
            let delay = self.retry_base * (1 << (attempt - 1));
            warn!(
                "LLM call attempt {} failed ({}), retrying after {}ms...",
                attempt,
                retryable,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Calls the model and returns its text, failing on blank output.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self.call(prompt).await?;
        match response.text() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => {
                if let Some(reason) = response
                    .candidates
                    .first()
                    .and_then(|c| c.finish_reason.as_deref())
                {
                    warn!("LLM returned no text (finish_reason={reason})");
                }
                Err(LlmError::EmptyContent)
            }
        }
    }
}
