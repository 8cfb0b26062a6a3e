use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::extraction::{extension_of, extract_text, SUPPORTED_EXTENSIONS};
use crate::models::Report;
use crate::pipeline::AnalysisRequest;
use crate::state::AppState;

pub const MAX_TOP_K: usize = 20;

pub(crate) fn validate_top_k(top_k: Option<usize>) -> Result<(), AppError> {
    match top_k {
        Some(k) if k == 0 || k > MAX_TOP_K => Err(AppError::Validation(format!(
            "top_k must be between 1 and {MAX_TOP_K}, got {k}"
        ))),
        _ => Ok(()),
    }
}

/// POST /api/v1/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalysisRequest>,
) -> Result<Json<Report>, AppError> {
    validate_top_k(req.top_k)?;
    Ok(Json(state.pipeline.analyze(req).await))
}

/// POST /api/v1/analyze/upload
///
/// Multipart fields: `file` (required), `target_role`, `job_description`.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Report>, AppError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut target_role = None;
    let mut job_description = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some((filename, data));
            }
            "target_role" => target_role = Some(field.text().await.map_err(multipart_error)?),
            "job_description" => {
                job_description = Some(field.text().await.map_err(multipart_error)?)
            }
            _ => {}
        }
    }

    let (filename, data) =
        file.ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;

    let extension = extension_of(&filename).unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(AppError::UnsupportedMediaType(format!(
            "'{filename}' is not supported; expected one of {}",
            SUPPORTED_EXTENSIONS.join(", ")
        )));
    }

    let limit = state.config.max_upload_bytes();
    if data.len() > limit {
        return Err(AppError::PayloadTooLarge(format!(
            "File is {} bytes, limit is {limit}",
            data.len()
        )));
    }

    info!("Extracting text from '{filename}' ({} bytes)", data.len());
    // PDF parsing is CPU-bound
    let resume_text = tokio::task::spawn_blocking(move || extract_text(&filename, &data))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in extraction: {e}"))
        })??;

    let report = state
        .pipeline
        .analyze(AnalysisRequest {
            resume_text,
            target_role,
            job_description,
            top_k: None,
        })
        .await;
    Ok(Json(report))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(e.body_text())
    }
}
