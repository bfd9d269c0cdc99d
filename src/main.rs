use tracing_subscriber::EnvFilter;

use orbitify::api;
use orbitify::config::Config;
use orbitify::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("Data directory: {}", config.data_dir.display());
    tracing::info!("Model backend: {}", config.backend.predict_url);
    tracing::info!(
        "LLM provider: {} ({})",
        config.rag.llm.provider,
        config.rag.llm.base_url
    );

    let state = AppState::new(config.clone())?;

    // The server still starts without a catalog; reload it via the API.
    match state.reload_catalog().await {
        Ok(catalog) => tracing::info!(
            "Catalog ready: {} planets in {} systems",
            catalog.stats.total_planets,
            catalog.stats.total_systems
        ),
        Err(e) => tracing::warn!("Catalog unavailable ({}): {e:#}", config.catalog_source),
    }

    let app = api::router(state.clone());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    // Chat answers 503 until this finishes. Uploads and
    // POST /api/knowledge/initialize retry it after a failure.
    let rag = state.rag.clone();
    tokio::spawn(async move {
        if let Err(e) = rag.initialize().await {
            tracing::error!("Knowledge base initialization failed: {e:#}");
        }
    });

    axum::serve(listener, app).await?;
    Ok(())
}
