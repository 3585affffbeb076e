//! Axum route handler for the Roast API.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn, Instrument};

use crate::errors::AppError;
use crate::roast::pipeline::{new_request_id, roast_resume, PdfUpload, RoastResponse};
use crate::state::AppState;

/// Name of the multipart field carrying the PDF.
const FILE_FIELD: &str = "file";

/// POST /roast
///
/// Accepts one PDF in the `file` field of a multipart body and returns the roast.
/// The response is built inside the request span so error logs carry the request id.
pub async fn handle_roast(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let request_id = new_request_id();
    let span = tracing::info_span!("roast", request_id = %request_id);

    let result = async move {
        let multipart = multipart.map_err(|rejection| {
            warn!("Rejected non-multipart request: {}", rejection.body_text());
            AppError::UnprocessableEntity(rejection.body_text())
        })?;
        let upload = read_upload(multipart).await?;
        info!(
            "Received roast request for file: {}",
            upload.filename.as_deref().unwrap_or("<none>")
        );
        let response = roast_resume(upload, state.roaster.as_ref()).await?;
        Ok::<_, AppError>(Json(response))
    }
    .instrument(span.clone())
    .await;

    span.in_scope(|| match result {
        Ok(json) => json.into_response(),
        Err(e) => e.into_response(),
    })
}

/// Pulls the `file` field out of the multipart body, skipping any other fields.
async fn read_upload(mut multipart: Multipart) -> Result<PdfUpload, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().map(String::from);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(PdfUpload { filename, bytes });
    }

    warn!("Multipart body has no '{FILE_FIELD}' field");
    Err(AppError::UnprocessableEntity(format!(
        "Field '{FILE_FIELD}' is required."
    )))
}

/// Body-limit overruns surface here; report them like an oversized file.
fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Upload exceeded the request body limit");
        return AppError::Validation("File size must be less than 10MB.".to_string());
    }
    warn!("Malformed multipart body: {}", e.body_text());
    AppError::UnprocessableEntity(format!("Invalid multipart body: {}", e.body_text()))
}
