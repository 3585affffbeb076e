//! Upload → validate → extract → prompt → roast.

use bytes::Bytes;
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::pdf::{ensure_text, extract_text, size_mb, validate_upload};
use crate::roast::prompts::build_roast_prompt;
use crate::roast::roaster::Roaster;

/// A file pulled out of the multipart body.
#[derive(Debug, Clone)]
pub struct PdfUpload {
    pub filename: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoastResponse {
    pub roast: String,
}

/// Timestamp id used to correlate log lines of one request.
pub fn new_request_id() -> String {
    Local::now().format("%Y%m%d_%H%M%S_%6f").to_string()
}

/// Runs the full pipeline for one uploaded file.
/// Expects to be called inside a span carrying the request id.
pub async fn roast_resume(
    upload: PdfUpload,
    roaster: &dyn Roaster,
) -> Result<RoastResponse, AppError> {
    if let Err(e) = validate_upload(upload.filename.as_deref(), &upload.bytes) {
        warn!(
            "Rejected upload {:?} ({:.2}MB): {e}",
            upload.filename,
            size_mb(upload.bytes.len())
        );
        return Err(e);
    }

    info!("Processing PDF ({:.2}MB)", size_mb(upload.bytes.len()));

    let text = extract_text(upload.bytes).await?;
    roast_text(&text, roaster).await
}

/// Roasts already-extracted resume text.
pub async fn roast_text(text: &str, roaster: &dyn Roaster) -> Result<RoastResponse, AppError> {
    if let Err(e) = ensure_text(text) {
        warn!("No text extracted from PDF");
        return Err(e);
    }
    info!("Extracted {} characters from PDF", text.chars().count());

    let prompt = build_roast_prompt(text);

    info!("Sending request to Gemini API");
    let roast = roaster.roast(&prompt).await?;
    info!("Successfully generated roast ({} chars)", roast.chars().count());

    Ok(RoastResponse { roast })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records the prompt it was given and answers with a fixed roast.
    struct RecordingRoaster {
        seen: Mutex<Vec<String>>,
        reply: Result<String, String>,
    }

    impl RecordingRoaster {
        fn ok(reply: &str) -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                reply: Ok(reply.to_string()),
            }
        }

        fn failing(msg: &str) -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
                reply: Err(msg.to_string()),
            }
        }
    }

    #[async_trait]
    impl Roaster for RecordingRoaster {
        async fn roast(&self, prompt: &str) -> Result<String, AppError> {
            self.seen.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(AppError::Llm)
        }
    }

    #[test]
    fn test_request_id_format() {
        let id = new_request_id();
        // YYYYMMDD_HHMMSS_micros
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3, "id was {id}");
        assert_eq!(parts[0].len(), 8);
        assert_eq!(parts[1].len(), 6);
        assert_eq!(parts[2].len(), 6);
        assert!(id.chars().all(|c| c.is_ascii_digit() || c == '_'));
    }

    #[tokio::test]
    async fn test_roast_text_sends_prompt_and_returns_roast() {
        let roaster = RecordingRoaster::ok("Your skills section is a cry for help.");
        let response = roast_text("Jane Doe\nProficient in Microsoft Word", &roaster)
            .await
            .unwrap();
        assert_eq!(response.roast, "Your skills section is a cry for help.");

        let seen = roaster.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("Resume:\nJane Doe\nProficient in Microsoft Word\n\nRoast:"));
    }

    #[tokio::test]
    async fn test_roast_text_rejects_blank_without_calling_model() {
        let roaster = RecordingRoaster::ok("unused");
        let err = roast_text(" \n\n ", &roaster).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Could not extract any text from the PDF."));
        assert!(roaster.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_roast_text_propagates_llm_error() {
        let roaster = RecordingRoaster::failing("quota exceeded");
        let err = roast_text("Some resume", &roaster).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[tokio::test]
    async fn test_roast_resume_rejects_wrong_extension_before_extraction() {
        let roaster = RecordingRoaster::ok("unused");
        let upload = PdfUpload {
            filename: Some("resume.txt".to_string()),
            bytes: Bytes::from_static(b"plain text resume"),
        };
        let err = roast_resume(upload, &roaster).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Only PDF files are accepted."));
        assert!(roaster.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_roast_resume_invalid_pdf_is_extraction_error() {
        let roaster = RecordingRoaster::ok("unused");
        let upload = PdfUpload {
            filename: Some("resume.pdf".to_string()),
            bytes: Bytes::from_static(b"definitely not a pdf"),
        };
        let err = roast_resume(upload, &roaster).await.unwrap_err();
        assert!(matches!(err, AppError::PdfExtraction(_)));
        assert!(roaster.seen.lock().unwrap().is_empty());
    }
}
