use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, State};
use serde::Serialize;

use pdfduck_extract::{ExtractError, Extraction};

use crate::error::ApiError;
use crate::state::AppState;
use crate::upload::{self, MAX_BATCH_FILES, UploadedFile};

#[derive(Serialize)]
pub struct ExtractResponse {
    /// Record list, fallback field mapping, or an empty list.
    pub rows: Extraction,
}

pub async fn extract(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ExtractResponse>, ApiError> {
    let file = upload::single_file(multipart).await?;
    upload::ensure_pdf(&file)?;

    tracing::info!(filename = %file.filename, bytes = file.data.len(), "extract request");

    let rows = run_extraction(&state, file.data).await?;
    Ok(Json(ExtractResponse { rows }))
}

#[derive(Serialize)]
pub struct BatchResponse {
    pub results: Vec<BatchEntry>,
}

#[derive(Serialize)]
pub struct BatchEntry {
    pub file: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Extraction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn extract_batch(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<BatchResponse>, ApiError> {
    let files = upload::batch_files(multipart).await?;
    if files.len() > MAX_BATCH_FILES {
        return Err(ApiError::BatchTooLarge(MAX_BATCH_FILES));
    }

    tracing::info!(files = files.len(), "batch extract request");

    let mut results = Vec::with_capacity(files.len());
    for file in files {
        let filename = file.filename.clone();
        // A bad file fails only its own slot, never the whole batch.
        results.push(match process_one(&state, file).await {
            Ok(rows) => BatchEntry {
                file: filename,
                success: true,
                rows: Some(rows),
                error: None,
            },
            Err(e) => BatchEntry {
                file: filename,
                success: false,
                rows: None,
                error: Some(e.to_string()),
            },
        });
    }

    Ok(Json(BatchResponse { results }))
}

async fn process_one(state: &AppState, file: UploadedFile) -> Result<Extraction, ApiError> {
    upload::ensure_pdf(&file)?;
    run_extraction(state, file.data).await
}

/// Run the pipeline on uploaded bytes.
///
/// PDF parsing is blocking native code, so it runs under `spawn_blocking`;
/// the upload is written to a temp dir scoped to this call and removed when
/// the closure returns.
async fn run_extraction(state: &AppState, data: Vec<u8>) -> Result<Extraction, ApiError> {
    let backend = Arc::clone(&state.backend);
    let extractor = state.extractor.clone();

    tokio::task::spawn_blocking(move || {
        let dir = tempfile::tempdir().map_err(ExtractError::Io)?;
        let path = dir.path().join("upload.pdf");
        std::fs::write(&path, &data).map_err(ExtractError::Io)?;
        extractor.extract(backend.as_ref(), &path)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("task join error: {e}")))?
    .map_err(ApiError::from)
}
