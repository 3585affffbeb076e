//! Upload validation and PDF text extraction.

use bytes::Bytes;

use crate::errors::AppError;

/// Uploads above this size are rejected. Exactly 10 MiB is still accepted.
pub const MAX_PDF_BYTES: usize = 10 * 1024 * 1024;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Checks the filename extension and the upload size.
pub fn validate_upload(filename: Option<&str>, bytes: &[u8]) -> Result<(), AppError> {
    let is_pdf = filename
        .map(|name| name.to_ascii_lowercase().ends_with(".pdf"))
        .unwrap_or(false);
    if !is_pdf {
        return Err(AppError::Validation(
            "Only PDF files are accepted.".to_string(),
        ));
    }

    if bytes.len() > MAX_PDF_BYTES {
        return Err(AppError::Validation(
            "File size must be less than 10MB.".to_string(),
        ));
    }

    Ok(())
}

/// Size in mebibytes, for logging.
pub fn size_mb(len: usize) -> f64 {
    len as f64 / (1024.0 * 1024.0)
}

/// Extracts the text of every page, in page order.
///
/// Parsing happens on the blocking pool; a panic inside the parser is
/// reported as an extraction failure instead of tearing down the request.
pub async fn extract_text(bytes: Bytes) -> Result<String, AppError> {
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(AppError::PdfExtraction(
            "missing %PDF- header".to_string(),
        ));
    }

    let joined = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await;

    match joined {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(AppError::PdfExtraction(e.to_string())),
        Err(e) if e.is_panic() => Err(AppError::PdfExtraction(
            "PDF parser panicked on malformed input".to_string(),
        )),
        Err(e) => Err(AppError::Internal(e.into())),
    }
}

/// Rejects documents with no extractable text (e.g. scanned images).
pub fn ensure_text(text: &str) -> Result<(), AppError> {
    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "Could not extract any text from the PDF.".to_string(),
        ));
    }
    Ok(())
}

/// Builds a one-page PDF showing `text` in Helvetica, with a correct xref table.
#[cfg(test)]
pub(crate) fn minimal_pdf(text: &str) -> Vec<u8> {
    let content = format!("BT /F1 12 Tf 72 712 Td ({text}) Tj ET");
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{content}\nendstream",
            content.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    let mut out = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }
    let xref_at = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
    out.extend_from_slice(b"0000000000 65535 f \n");
    for offset in offsets {
        out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    out
}
