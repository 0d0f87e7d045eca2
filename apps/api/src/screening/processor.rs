//! Per-File Processor: turns one upload into exactly one `ResultRow`.
//!
//! Flow: validate → base64 encode → compose prompt → gateway call → parse.
//! Every failure is converted into a row-level error; nothing here returns
//! `Err` to the caller.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::llm_client::{ExtractionRequest, ModelGateway};
use crate::models::candidate::{ResultRow, RowError, MISSING_FILENAME};
use crate::models::upload::{Requirement, UploadedFile};
use crate::screening::parser::parse_candidate;
use crate::screening::prompts::build_extraction_prompt;

/// Processes one uploaded file against the shared requirement.
///
/// No model call is made unless the file passes validation. `call_timeout`
/// bounds the gateway call; `None` waits indefinitely.
pub async fn process_file(
    file: UploadedFile,
    requirement: &Requirement,
    gateway: &dyn ModelGateway,
    call_timeout: Option<Duration>,
) -> ResultRow {
    let (filename, content) = match validate(file) {
        Ok(valid) => valid,
        Err(row) => return row,
    };

    let pdf_base64 = BASE64.encode(&content);
    let prompt = build_extraction_prompt(&requirement.text);
    let request = ExtractionRequest {
        filename: &filename,
        pdf_base64: &pdf_base64,
        prompt: &prompt,
    };

    info!(filename = %filename, bytes = content.len(), "Sending resume to LLM");
    let call = gateway.extract(request);
    let result = match call_timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    filename = %filename,
                    timeout_secs = limit.as_secs(),
                    "LLM call timed out"
                );
                return ResultRow::failure(filename, RowError::LlmCallFailed);
            }
        },
        None => call.await,
    };

    let raw = match result {
        Ok(raw) => raw,
        Err(e) => {
            warn!(filename = %filename, error = %e, "LLM call failed");
            return ResultRow::failure(filename, RowError::LlmCallFailed);
        }
    };

    match parse_candidate(&raw) {
        Ok(record) => {
            info!(filename = %filename, candidate = %record.name, "Resume processed");
            ResultRow::success(filename, record)
        }
        Err(e) => {
            warn!(filename = %filename, error = %e, "Could not parse LLM response");
            debug!(filename = %filename, raw = %raw, "Raw LLM response");
            ResultRow::failure(filename, RowError::UnparseableResponse)
        }
    }
}

/// Checks, in order: media type, filename, readability, emptiness.
fn validate(file: UploadedFile) -> Result<(String, Bytes), ResultRow> {
    let display_name = if file.filename.is_empty() {
        MISSING_FILENAME.to_string()
    } else {
        file.filename.clone()
    };

    if !file.is_pdf() {
        warn!(
            filename = %display_name,
            media_type = %file.media_type,
            "Skipping non-PDF file"
        );
        return Err(ResultRow::failure(display_name, RowError::InvalidFileType));
    }
    if file.filename.is_empty() {
        warn!("Skipping file with no filename");
        return Err(ResultRow::failure(display_name, RowError::MissingFilename));
    }
    let Some(content) = file.content else {
        warn!(filename = %display_name, "Skipping unreadable file");
        return Err(ResultRow::failure(display_name, RowError::Unreadable));
    };
    if content.is_empty() {
        warn!(filename = %display_name, "Skipping empty file");
        return Err(ResultRow::failure(display_name, RowError::EmptyFile));
    }

    Ok((file.filename, content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::test_support::{pdf, MockGateway, JANE_DOE_RESPONSE};

    fn requirement() -> Requirement {
        Requirement::new("Senior data engineer with SQL.")
    }

    #[tokio::test]
    async fn test_non_pdf_is_rejected_without_model_call() {
        let gateway = MockGateway::new().reply("notes.txt", JANE_DOE_RESPONSE);
        let file = UploadedFile::new("notes.txt", "text/plain", Bytes::from_static(b"hello"));

        let row = process_file(file, &requirement(), &gateway, None).await;

        assert_eq!(row.filename, "notes.txt");
        assert_eq!(row.error(), Some(RowError::InvalidFileType));
        assert!(row.fields().is_none());
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_file_is_rejected_without_model_call() {
        let gateway = MockGateway::new().reply("empty.pdf", JANE_DOE_RESPONSE);
        let file = UploadedFile::new("empty.pdf", "application/pdf", Bytes::new());

        let row = process_file(file, &requirement(), &gateway, None).await;

        assert_eq!(row.error(), Some(RowError::EmptyFile));
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_filename_is_recorded_as_na() {
        let gateway = MockGateway::new();
        let file = UploadedFile::new("", "application/pdf", Bytes::from_static(b"%PDF-1.4"));

        let row = process_file(file, &requirement(), &gateway, None).await;

        assert_eq!(row.filename, MISSING_FILENAME);
        assert_eq!(row.error(), Some(RowError::MissingFilename));
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_unreadable_file_is_rejected_without_model_call() {
        let gateway = MockGateway::new();
        let file = UploadedFile::unreadable("broken.pdf", "application/pdf");

        let row = process_file(file, &requirement(), &gateway, None).await;

        assert_eq!(row.error(), Some(RowError::Unreadable));
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_well_formed_response_yields_success_row() {
        let gateway = MockGateway::new().reply("jane.pdf", JANE_DOE_RESPONSE);

        let row = process_file(pdf("jane.pdf"), &requirement(), &gateway, None).await;

        assert_eq!(row.error(), None);
        let fields = row.fields().unwrap();
        assert_eq!(fields.name, "Jane Doe");
        assert_eq!(fields.years_of_experience, "5");
        assert_eq!(fields.key_strengths, vec!["SQL", "Python"]);
        assert_eq!(fields.summary, "x");
        assert_eq!(fields.fit, "Y");
        assert_eq!(fields.overfit, "N");
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test]
    async fn test_gateway_receives_encoded_file_and_requirement() {
        let gateway = MockGateway::new().reply("jane.pdf", JANE_DOE_RESPONSE);

        process_file(pdf("jane.pdf"), &requirement(), &gateway, None).await;

        let seen = gateway.requests();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].filename, "jane.pdf");
        assert_eq!(seen[0].pdf_base64, BASE64.encode(b"%PDF-1.4 jane.pdf"));
        assert!(seen[0].prompt.starts_with("Senior data engineer with SQL."));
        assert!(seen[0].prompt.contains("'KEY STRENGTHS'"));
    }

    #[tokio::test]
    async fn test_malformed_response_yields_parse_error_row() {
        let gateway = MockGateway::new().reply("jane.pdf", "not a dict");

        let row = process_file(pdf("jane.pdf"), &requirement(), &gateway, None).await;

        assert_eq!(row.error(), Some(RowError::UnparseableResponse));
        assert!(row.fields().is_none());
    }

    #[tokio::test]
    async fn test_gateway_failure_yields_call_failed_row() {
        let gateway = MockGateway::new().fail("jane.pdf");

        let row = process_file(pdf("jane.pdf"), &requirement(), &gateway, None).await;

        assert_eq!(row.error(), Some(RowError::LlmCallFailed));
        assert_eq!(gateway.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_call_fails_row_after_timeout() {
        let gateway = MockGateway::new().hang("jane.pdf");

        let row = process_file(
            pdf("jane.pdf"),
            &requirement(),
            &gateway,
            Some(Duration::from_secs(30)),
        )
        .await;

        assert_eq!(row.error(), Some(RowError::LlmCallFailed));
    }
}
