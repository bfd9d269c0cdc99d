use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;

use crate::api::predict::csv_upload;
use crate::api::upload;
use crate::models::RetrainResponse;
use crate::prediction::{backend_message, backend_reported_error};
use crate::state::AppState;

const RETRAINED: &str = "Model retrained successfully";
const RETRAIN_FAILED: &str = "Failed to retrain model. Please try again.";

/// POST /api/retrain: send a labelled CSV to the backend's retrain endpoint.
pub async fn retrain(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> (StatusCode, Json<RetrainResponse>) {
    let file = match csv_upload(multipart).await {
        Ok(file) => file,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(RetrainResponse::error(message)),
            )
        }
    };

    tracing::info!("Retraining with {}", file.file_name);

    let reply = upload::forward_file(
        &state.http_client,
        &state.config.backend.retrain_url,
        &file,
    )
    .await;

    match reply {
        Ok((status, body)) if status.is_success() && !backend_reported_error(&body) => {
            tracing::info!("Model retrained from {}", file.file_name);
            (
                StatusCode::OK,
                Json(RetrainResponse {
                    status: "success".to_string(),
                    message: backend_message(&body).unwrap_or_else(|| RETRAINED.to_string()),
                    timestamp: Some(Utc::now()),
                }),
            )
        }
        Ok((status, body)) => {
            let message = backend_message(&body).unwrap_or_else(|| RETRAIN_FAILED.to_string());
            tracing::error!("Retrain backend returned {status}: {message}");
            failed(message)
        }
        Err(e) => {
            tracing::error!("Retrain request failed: {e:#}");
            failed(RETRAIN_FAILED)
        }
    }
}

fn failed(message: impl Into<String>) -> (StatusCode, Json<RetrainResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(RetrainResponse::error(message)),
    )
}
