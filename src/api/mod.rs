pub mod analysis;
pub mod catalog;
pub mod chat;
pub mod documents;
pub mod knowledge;
pub mod predict;
pub mod retrain;
pub mod upload;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::AppState;

/// Largest accepted request body (CSV or PDF batch).
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// All HTTP routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/predict", post(predict::predict).get(predict::post_only))
        .route("/api/retrain", post(retrain::retrain))
        .route("/api/chat", post(chat::chat))
        .route("/api/upload-pdfs", post(documents::upload_pdfs))
        .route("/api/knowledge", get(knowledge::status))
        .route("/api/knowledge/initialize", post(knowledge::initialize))
        .route(
            "/api/knowledge/documents/{name}",
            delete(knowledge::remove_document),
        )
        .route("/api/catalog", get(catalog::overview))
        .route("/api/catalog/systems/{name}", get(catalog::system_detail))
        .route("/api/catalog/reload", post(catalog::reload))
        .route("/api/analysis", get(analysis::report))
        .route("/api/analysis/export", get(analysis::export))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
