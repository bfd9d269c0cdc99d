use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::catalog::Catalog;
use crate::models::{CatalogOverview, CatalogQuery, StatusMessage, SystemDetail};
use crate::state::AppState;
use crate::viewer::SystemScene;

type CatalogError = (StatusCode, Json<StatusMessage>);

/// GET /api/catalog
pub async fn overview(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<CatalogOverview>, CatalogError> {
    let catalog = loaded(&state)?;
    let systems = match query.q.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => catalog.search(term).into_iter().cloned().collect(),
        _ => catalog.systems.clone(),
    };
    Ok(Json(CatalogOverview {
        stats: catalog.stats.clone(),
        systems,
    }))
}

/// GET /api/catalog/systems/{name}
pub async fn system_detail(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SystemDetail>, CatalogError> {
    let catalog = loaded(&state)?;
    let system = catalog.system(&name).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(StatusMessage::error(format!("System '{name}' not found"))),
        )
    })?;
    Ok(Json(SystemDetail {
        scene: SystemScene::from_system(system),
        system: system.clone(),
    }))
}

/// POST /api/catalog/reload
pub async fn reload(
    State(state): State<AppState>,
) -> Result<Json<CatalogOverview>, CatalogError> {
    let catalog = state.reload_catalog().await.map_err(|e| {
        tracing::error!("Catalog reload failed: {e:#}");
        (
            StatusCode::BAD_GATEWAY,
            Json(StatusMessage::error(format!("{e:#}"))),
        )
    })?;
    Ok(Json(CatalogOverview {
        stats: catalog.stats.clone(),
        systems: catalog.systems.clone(),
    }))
}

fn loaded(state: &AppState) -> Result<Arc<Catalog>, CatalogError> {
    state.catalog().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(StatusMessage::error("Planet catalog is not loaded")),
        )
    })
}
