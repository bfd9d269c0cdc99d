use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

use crate::analysis::{export_file_name, rows_to_csv, AnalysisReport};
use crate::models::{AnalysisResponse, StatusMessage};
use crate::state::AppState;

/// GET /api/analysis
pub async fn report(State(state): State<AppState>) -> Json<AnalysisResponse> {
    match state.latest_prediction() {
        Some(stored) => Json(AnalysisResponse {
            status: "success".to_string(),
            report: Some(AnalysisReport::from_stored(&stored)),
        }),
        None => Json(AnalysisResponse {
            status: "empty".to_string(),
            report: None,
        }),
    }
}

/// GET /api/analysis/export
pub async fn export(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, Json<StatusMessage>)> {
    let stored = state.latest_prediction().ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(StatusMessage::error("No prediction results to export")),
        )
    })?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(Utc::now())
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        rows_to_csv(&stored.result.preview),
    ))
}
