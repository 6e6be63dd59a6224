//! services/api/src/web/upload_task.rs
//!
//! Reads an uploaded file out of a multipart request and extracts its text.

use crate::web::state::AppState;
use axum::extract::Multipart;
use doc_chat_core::{ExtractionError, LoadedDocument, UploadedDocument};
use std::time::Instant;
use tracing::{info, warn};

/// Takes the first part of the form as the uploaded document.
pub async fn read_upload(multipart: &mut Multipart) -> Result<UploadedDocument, String> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| format!("Failed to read multipart data: {}", e))?
        .ok_or_else(|| "Multipart form must include a file".to_string())?;

    let name = field
        .file_name()
        .or_else(|| field.name())
        .unwrap_or_default()
        .to_string();
    let data = field
        .bytes()
        .await
        .map_err(|e| format!("Failed to read file bytes: {}", e))?;

    Ok(UploadedDocument::new(name, data.to_vec()))
}

/// Runs extraction on the blocking pool; PDF and DOCX parsing is CPU bound.
///
/// `Ok(None)` means the file's format is not supported.
pub async fn extract_upload(
    app_state: &AppState,
    document: UploadedDocument,
) -> Result<Option<LoadedDocument>, ExtractionError> {
    let dispatcher = app_state.extractor.clone();
    let started = Instant::now();
    let name = document.name.clone();
    let extension = document.extension().to_string();
    let size = document.raw_bytes.len();

    let loaded = tokio::task::spawn_blocking(move || dispatcher.load(&document))
        .await
        .map_err(|e| ExtractionError::CorruptDocument(format!("extraction task failed: {}", e)))?;

    match &loaded {
        Ok(Some(loaded_document)) => info!(
            document = %name,
            format = %loaded_document.format,
            bytes = size,
            characters = loaded_document.text.char_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Document loaded successfully."
        ),
        Ok(None) => info!(document = %name, %extension, "Rejected unsupported file format"),
        Err(e) => warn!(document = %name, bytes = size, "Extraction failed: {}", e),
    }
    loaded
}
