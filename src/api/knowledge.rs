use std::path::Path;

use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::Json;

use crate::models::{ErrorBody, StatusMessage};
use crate::rag::pdf::is_pdf;
use crate::rag::KnowledgeStatus;
use crate::state::AppState;

type KnowledgeError = (StatusCode, Json<ErrorBody>);

/// GET /api/knowledge: readiness and chunk counts per paper.
pub async fn status(State(state): State<AppState>) -> Json<KnowledgeStatus> {
    Json(state.rag.status())
}

/// POST /api/knowledge/initialize: build the index if startup failed.
/// A no-op once the knowledge base is ready.
pub async fn initialize(
    State(state): State<AppState>,
) -> Result<Json<KnowledgeStatus>, KnowledgeError> {
    match state.rag.initialize().await {
        Ok(_) => Ok(Json(state.rag.status())),
        Err(e) => {
            tracing::error!("Knowledge base initialization failed: {e:#}");
            Err((
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody::with_details(
                    "Knowledge base initialization failed",
                    format!("{e:#}"),
                )),
            ))
        }
    }
}

/// DELETE /api/knowledge/documents/{name}: drop an uploaded paper from disk
/// and from the index. Bundled papers are not touched on disk.
pub async fn remove_document(
    State(state): State<AppState>,
    UrlPath(name): UrlPath<String>,
) -> Result<Json<StatusMessage>, KnowledgeError> {
    if !is_plain_pdf_name(&name) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Invalid document name")),
        ));
    }

    let path = state.config.uploads_dir().join(&name);
    let deleted = match tokio::fs::remove_file(&path).await {
        Ok(()) => true,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => {
            tracing::error!("Could not delete {}: {e}", path.display());
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Failed to delete document")),
            ));
        }
    };
    let chunks = state.rag.forget(&name);

    if !deleted && chunks == 0 {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorBody::new(format!("Document {name} not found"))),
        ));
    }

    Ok(Json(StatusMessage {
        status: "success".to_string(),
        message: format!("Removed {name} ({chunks} chunks)"),
    }))
}

/// A bare `*.pdf` file name with no directory parts.
fn is_plain_pdf_name(name: &str) -> bool {
    !name.starts_with('.')
        && !name.contains(&['/', '\\'][..])
        && Path::new(name).file_name().is_some_and(|n| n == name)
        && is_pdf(Path::new(name))
}
