use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// The body keeps the `detail` key the mobile client already reads.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::PdfExtraction(_) => StatusCode::BAD_REQUEST,
            AppError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Llm(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match &self {
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::UnprocessableEntity(msg) => ("UNPROCESSABLE_ENTITY", msg.clone()),
            AppError::PdfExtraction(msg) => {
                tracing::error!("PDF extraction error: {msg}");
                (
                    "PDF_EXTRACTION_ERROR",
                    "Failed to read PDF file. Ensure it's a valid PDF.".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    "LLM_ERROR",
                    "AI service temporarily unavailable. Please try again.".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    "INTERNAL_ERROR",
                    "An unexpected error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "detail": message,
            "code": code
        }));

        (status, body).into_response()
    }
}
