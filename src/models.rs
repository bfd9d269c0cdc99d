use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisReport;
use crate::catalog::{CatalogStats, StarSystem};
use crate::viewer::SystemScene;

/// Chat request
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// Chat answer, raw and rendered
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub html: String,
    pub success: bool,
}

/// Error body shared by the chat and document endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// Retrain result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrainResponse {
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl RetrainResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            timestamp: None,
        }
    }
}

/// PDF upload result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(rename = "filesProcessed")]
    pub files_processed: usize,
    pub message: String,
}

/// `{status, message}` body for catalog and analysis errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMessage {
    pub status: String,
    pub message: String,
}

impl StatusMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

/// Catalog listing filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    /// Substring of the system name
    pub q: Option<String>,
}

/// Explorer landing data
#[derive(Debug, Clone, Serialize)]
pub struct CatalogOverview {
    pub stats: CatalogStats,
    pub systems: Vec<StarSystem>,
}

/// One system with its 3D scene
#[derive(Debug, Clone, Serialize)]
pub struct SystemDetail {
    pub system: StarSystem,
    pub scene: SystemScene,
}

/// Analysis view body; `report` is null until a prediction has been made
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse {
    pub status: String,
    pub report: Option<AnalysisReport>,
}
