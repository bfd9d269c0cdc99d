use std::path::PathBuf;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::api::upload::{self, UploadedFile};
use crate::models::{ErrorBody, UploadResponse};
use crate::rag::service::source_name;
use crate::state::AppState;

const NOT_PDF: &str = "Only PDF files are supported";

type UploadError = (StatusCode, Json<ErrorBody>);

/// POST /api/upload-pdfs: save papers to the uploads dir and index them.
pub async fn upload_pdfs(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, UploadError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::warn!("Rejected PDF upload: {}", e.body_text());
        no_files()
    })?;

    let files = upload::read_files(&mut multipart, "files")
        .await
        .map_err(|e| {
            tracing::error!("Error reading PDF upload: {e:#}");
            upload_failed()
        })?;
    if files.is_empty() {
        return Err(no_files());
    }
    if let Some(file) = files.iter().find(|f| !f.has_extension("pdf")) {
        tracing::warn!("Rejected non-PDF upload: {}", file.file_name);
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new(NOT_PDF)),
        ));
    }

    let uploads_dir = state.config.uploads_dir();
    let mut saved: Vec<PathBuf> = Vec::with_capacity(files.len());
    for file in &files {
        let path = uploads_dir.join(stored_name(file));
        if let Err(e) = tokio::fs::write(&path, &file.bytes).await {
            tracing::error!("Error saving {}: {e}", path.display());
            // A partial write may have left the file behind
            saved.push(path);
            discard(&state, &saved).await;
            return Err(upload_failed());
        }
        saved.push(path);
    }

    let report = match state.rag.index_pdfs(&saved).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Error uploading files: {e:#}");
            discard(&state, &saved).await;
            return Err(upload_failed());
        }
    };
    tracing::info!("Uploaded {} PDFs ({} chunks)", saved.len(), report.chunks);

    Ok(Json(UploadResponse {
        success: true,
        files_processed: saved.len(),
        message: "Files uploaded and indexed successfully".to_string(),
    }))
}

/// Undo a failed upload. Its file names end up neither on disk nor in the
/// index, including earlier copies it overwrote.
async fn discard(state: &AppState, paths: &[PathBuf]) {
    remove_all(paths).await;
    for path in paths {
        state.rag.forget(&source_name(path));
    }
}

async fn remove_all(paths: &[PathBuf]) {
    for path in paths {
        match tokio::fs::remove_file(path).await {
            Ok(()) => tracing::debug!("Removed {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Could not remove {}: {e}", path.display()),
        }
    }
}

/// Name on disk: the client's bare file name, or a generated one.
fn stored_name(file: &UploadedFile) -> String {
    file.safe_file_name()
        .unwrap_or_else(|| format!("upload-{}.pdf", Uuid::new_v4()))
}

fn no_files() -> UploadError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody::new("No files provided")),
    )
}

fn upload_failed() -> UploadError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new("Failed to upload files")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;

    fn file(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: Some("application/pdf".to_string()),
            bytes: Bytes::from_static(b"%PDF-1.4"),
        }
    }

    #[test]
    fn test_stored_name_uses_bare_name() {
        assert_eq!(stored_name(&file("../../kepler.pdf")), "kepler.pdf");
    }

    #[tokio::test]
    async fn test_remove_all_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let kept = dir.path().join("kepler.pdf");
        std::fs::write(&kept, b"%PDF-1.4").unwrap();

        remove_all(&[kept.clone(), dir.path().join("never-written.pdf")]).await;
        assert!(!kept.exists());
    }

    #[test]
    fn test_stored_name_generated_when_unusable() {
        let name = stored_name(&file(".."));
        assert!(name.starts_with("upload-"));
        assert!(name.ends_with(".pdf"));
    }
}
