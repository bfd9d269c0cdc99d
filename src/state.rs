use parking_lot::RwLock;
use std::sync::Arc;

use chrono::Utc;

use crate::catalog::{self, Catalog};
use crate::config::Config;
use crate::prediction::{PredictionResponse, StoredPrediction};
use crate::rag::{RagService, VectorStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub http_client: reqwest::Client,
    /// Swapped whole on reload; readers clone the `Arc` and drop the lock.
    pub catalog: Arc<RwLock<Option<Arc<Catalog>>>>,
    pub latest_prediction: Arc<RwLock<Option<StoredPrediction>>>,
    pub rag: Arc<RagService>,
}

impl AppState {
    /// Build state without touching the network. Call
    /// [`RagService::initialize`] and [`AppState::reload_catalog`] afterwards.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        std::fs::create_dir_all(config.knowledge_dir())?;
        std::fs::create_dir_all(config.uploads_dir())?;

        let http_client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(config.backend.timeout_secs))
            .build()?;

        let rag = RagService::new(
            config.rag.clone(),
            http_client.clone(),
            Arc::new(VectorStore::new()),
            vec![config.knowledge_dir(), config.uploads_dir()],
        )?;

        Ok(Self {
            config,
            http_client,
            catalog: Arc::new(RwLock::new(None)),
            latest_prediction: Arc::new(RwLock::new(None)),
            rag: Arc::new(rag),
        })
    }

    pub fn catalog(&self) -> Option<Arc<Catalog>> {
        self.catalog.read().clone()
    }

    pub fn set_catalog(&self, catalog: Catalog) -> Arc<Catalog> {
        let catalog = Arc::new(catalog);
        *self.catalog.write() = Some(catalog.clone());
        catalog
    }

    /// Fetch the configured catalog source. On failure the previous catalog stays.
    pub async fn reload_catalog(&self) -> anyhow::Result<Arc<Catalog>> {
        let loaded = catalog::load(&self.http_client, &self.config.catalog_source).await?;
        Ok(self.set_catalog(loaded))
    }

    pub fn remember_prediction(&self, file_name: &str, result: PredictionResponse) {
        *self.latest_prediction.write() = Some(StoredPrediction {
            result,
            file_name: file_name.to_string(),
            received_at: Utc::now(),
        });
    }

    pub fn latest_prediction(&self) -> Option<StoredPrediction> {
        self.latest_prediction.read().clone()
    }
}
