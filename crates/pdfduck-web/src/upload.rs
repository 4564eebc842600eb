use axum::extract::Multipart;

use crate::error::ApiError;

pub const MAX_BATCH_FILES: usize = 50;

/// An uploaded file with its data and metadata.
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Parse a single-file multipart upload (field `file`).
pub async fn single_file(mut multipart: Multipart) -> Result<UploadedFile, ApiError> {
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = next_field(&mut multipart).await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => file = Some(read_file(field).await?),
            _ => {
                // Ignore unknown fields
                let _ = field.bytes().await;
            }
        }
    }

    file.ok_or(ApiError::MissingFile)
}

/// Parse a batch multipart upload (repeated `files` field; a stray `file`
/// field is accepted too).
pub async fn batch_files(mut multipart: Multipart) -> Result<Vec<UploadedFile>, ApiError> {
    let mut files = Vec::new();

    while let Some(field) = next_field(&mut multipart).await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "files" | "file" => files.push(read_file(field).await?),
            _ => {
                let _ = field.bytes().await;
            }
        }
    }

    if files.is_empty() {
        return Err(ApiError::MissingFile);
    }
    Ok(files)
}

/// Reject uploads that clearly are not PDFs before they reach the parser.
pub fn ensure_pdf(file: &UploadedFile) -> Result<(), ApiError> {
    if file.data.is_empty() {
        return Err(ApiError::EmptyFile);
    }
    if file.filename.to_lowercase().ends_with(".pdf") {
        // Verify PDF magic bytes
        if !file.data.starts_with(b"%PDF-") {
            return Err(ApiError::NotPdf);
        }
        return Ok(());
    }
    // No .pdf name: accept on magic bytes alone
    if file.data.starts_with(b"%PDF-") {
        return Ok(());
    }
    Err(ApiError::NotPdf)
}

async fn next_field(
    multipart: &mut Multipart,
) -> Result<Option<axum::extract::multipart::Field<'_>>, ApiError> {
    multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read form field: {e}")))
}

async fn read_file(field: axum::extract::multipart::Field<'_>) -> Result<UploadedFile, ApiError> {
    let filename = field.file_name().unwrap_or("upload.pdf").to_string();
    let data = field
        .bytes()
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read file data: {e}")))?
        .to_vec();
    Ok(UploadedFile { filename, data })
}
