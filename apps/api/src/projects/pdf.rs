//! PDF script extraction for uploaded VSL documents.

use crate::errors::AppError;

/// Extracts script text from uploaded PDF bytes.
///
/// Fails with a 400-class error when the bytes are not a readable PDF or the
/// document contains no extractable text (scanned image PDFs, for example).
pub fn extract_script_from_pdf(bytes: &[u8]) -> Result<String, AppError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| AppError::Validation(format!("Failed to extract text from PDF: {e}")))?;

    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation(
            "PDF contains no extractable text".to_string(),
        ));
    }

    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_rejected() {
        let result = extract_script_from_pdf(b"not a pdf at all");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(extract_script_from_pdf(&[]).is_err());
    }
}
