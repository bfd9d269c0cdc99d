use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::upload::{self, UploadedFile};
use crate::prediction::{backend_message, backend_reported_error, PredictionResponse};
use crate::state::AppState;

pub(crate) const NO_FILE: &str = "No file provided";
pub(crate) const NOT_CSV: &str = "Invalid file type. Please upload a CSV file.";
const UNREACHABLE: &str = "Failed to process file. Please ensure the backend is running.";
const POST_ONLY: &str = "This endpoint only accepts POST requests. Please upload a file.";

type PredictReply = (StatusCode, Json<PredictionResponse>);

/// POST /api/predict: relay a CSV to the model backend.
pub async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> PredictReply {
    let file = match csv_upload(multipart).await {
        Ok(file) => file,
        Err(message) => return reject(StatusCode::BAD_REQUEST, message),
    };

    tracing::info!("Forwarding {} ({} bytes) for prediction", file.file_name, file.bytes.len());

    let (status, body) = match upload::forward_file(
        &state.http_client,
        &state.config.backend.predict_url,
        &file,
    )
    .await
    {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!("Prediction request failed: {e:#}");
            return reject(StatusCode::INTERNAL_SERVER_ERROR, transport_message(&e));
        }
    };

    if !status.is_success() || backend_reported_error(&body) {
        let message =
            backend_message(&body).unwrap_or_else(|| format!("Backend error: {}", status.as_u16()));
        tracing::error!("Prediction backend returned {status}: {message}");
        return reject(status, message);
    }

    let result = PredictionResponse::from_backend(&body);
    tracing::info!(
        "Prediction complete: {} rows, {} exoplanets",
        result.total,
        result.exoplanets
    );
    state.remember_prediction(&file.file_name, result.clone());
    (StatusCode::OK, Json(result))
}

/// GET /api/predict
pub async fn post_only() -> PredictReply {
    reject(StatusCode::METHOD_NOT_ALLOWED, POST_ONLY)
}

/// Pull the `file` field and check it is a CSV. The error is the
/// user-facing message.
pub(crate) async fn csv_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<UploadedFile, String> {
    let mut multipart = multipart.map_err(|e| e.body_text())?;
    let file = upload::read_file(&mut multipart, "file")
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| NO_FILE.to_string())?;
    if !file.has_extension("csv") {
        return Err(NOT_CSV.to_string());
    }
    Ok(file)
}

/// User-facing text for a failed backend call. Connection failures and
/// timeouts mean the backend is down; anything else is reported as is.
fn transport_message(err: &anyhow::Error) -> String {
    let unreachable = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<reqwest::Error>())
        .any(|e| e.is_connect() || e.is_timeout());
    if unreachable {
        UNREACHABLE.to_string()
    } else {
        format!("{err:#}")
    }
}

fn reject(status: StatusCode, message: impl Into<String>) -> PredictReply {
    (status, Json(PredictionResponse::error(message)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[tokio::test]
    async fn test_post_only_is_405() {
        let (status, Json(body)) = post_only().await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body.status, "error");
        assert_eq!(body.message.as_deref(), Some(POST_ONLY));
        assert_eq!(body.total, 0);
    }

    #[test]
    fn test_transport_message_passes_other_errors_through() {
        let err = anyhow::anyhow!("invalid JSON")
            .context("Model backend returned 200 OK with an unreadable body");
        assert_eq!(
            transport_message(&err),
            "Model backend returned 200 OK with an unreadable body: invalid JSON"
        );
    }

    #[tokio::test]
    async fn test_transport_message_connection_refused() {
        // Bind then drop to get a port nothing listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = reqwest::Client::new()
            .get(format!("http://{addr}/predict"))
            .send()
            .await
            .context("Failed to reach model backend")
            .unwrap_err();
        assert_eq!(transport_message(&err), UNREACHABLE);
    }

    #[test]
    fn test_reject_keeps_upstream_status() {
        let (status, Json(body)) = reject(StatusCode::BAD_GATEWAY, "Backend error: 502");
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body.message.as_deref(), Some("Backend error: 502"));
        assert!(body.preview.is_empty());
    }
}
