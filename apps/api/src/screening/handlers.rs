//! Axum route handlers for the resume screening API.

use anyhow::anyhow;
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::upload::{Requirement, UploadedFile};
use crate::report::{render_report, REPORT_FILENAME, XLSX_CONTENT_TYPE};
use crate::screening::batch::process_batch;
use crate::state::AppState;

const FILES_FIELD: &str = "files";
const REQUIREMENT_FIELD: &str = "requirement_text";

/// Decoded multipart form.
#[derive(Debug, Default)]
struct UploadForm {
    files: Vec<UploadedFile>,
    requirement_text: Option<String>,
}

/// POST /process_resumes_to_excel/
///
/// Multipart fields: `files` (one or more PDFs) and `requirement_text`.
/// Responds with the `.xlsx` report as an attachment. Per-file failures are
/// rows in the report; only request-level problems produce an error status.
pub async fn handle_process_resumes(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_upload_form(&mut multipart).await?;

    let requirement_text = form.requirement_text.ok_or_else(|| {
        AppError::UnprocessableEntity(format!("Field '{REQUIREMENT_FIELD}' is required"))
    })?;
    if form.files.is_empty() {
        return Err(AppError::Validation("No files uploaded".to_string()));
    }
    if requirement_text.trim().is_empty() {
        return Err(AppError::Validation(format!(
            "{REQUIREMENT_FIELD} cannot be empty"
        )));
    }

    let gateway = state.gateway.clone().ok_or(AppError::GatewayNotConfigured)?;
    let requirement = Requirement::new(requirement_text);

    info!(files = form.files.len(), "Processing resume upload");
    let rows = process_batch(
        form.files,
        &requirement,
        gateway.as_ref(),
        state.batch_options(),
    )
    .await;

    let report = tokio::task::spawn_blocking(move || render_report(&rows))
        .await
        .map_err(|e| AppError::Internal(anyhow!("Report task failed: {e}")))??;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{REPORT_FILENAME}\""),
            ),
        ],
        report,
    )
        .into_response())
}

async fn read_upload_form(multipart: &mut Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(multipart_error("Malformed multipart body", e)),
        };
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            FILES_FIELD => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let media_type = field.content_type().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(content) => form
                        .files
                        .push(UploadedFile::new(filename, media_type, content)),
                    Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                        return Err(multipart_error("Upload too large", e));
                    }
                    Err(e) => {
                        warn!(filename = %filename, error = %e, "Failed to read uploaded file");
                        form.files.push(UploadedFile::unreadable(filename, media_type));
                        // The multipart stream cannot be resumed after a body error.
                        break;
                    }
                }
            }
            REQUIREMENT_FIELD => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error("Could not read requirement_text", e))?;
                form.requirement_text = Some(text);
            }
            other => {
                warn!(field = other, "Ignoring unexpected multipart field");
            }
        }
    }

    Ok(form)
}

/// Body-limit overruns are 413; every other multipart failure is a bad request.
fn multipart_error(context: &str, e: MultipartError) -> AppError {
    let message = format!("{context}: {}", e.body_text());
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(error = %e, "Upload exceeds the request body limit");
        AppError::PayloadTooLarge(message)
    } else {
        AppError::Validation(message)
    }
}
