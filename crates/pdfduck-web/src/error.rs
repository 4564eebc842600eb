use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use pdfduck_extract::ExtractError;

/// Client-facing request errors. All variants resolve at the request
/// boundary; none are retried and none terminate the process.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing file field in multipart form")]
    MissingFile,
    #[error("empty file")]
    EmptyFile,
    #[error("file does not look like a PDF")]
    NotPdf,
    #[error("too many files in batch (max {0})")]
    BatchTooLarge(usize),
    #[error("invalid multipart form: {0}")]
    BadRequest(String),
    #[error("failed to parse PDF: {0}")]
    Parse(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFile
            | ApiError::EmptyFile
            | ApiError::NotPdf
            | ApiError::BatchTooLarge(_)
            | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Parse(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

impl From<ExtractError> for ApiError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::Parse(m) | ExtractError::Extraction(m) => ApiError::Parse(m),
            ExtractError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}
