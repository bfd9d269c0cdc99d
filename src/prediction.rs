//! Prediction results relayed from the model backend.
//!
//! The backend's JSON is treated as untrusted: every counter is read
//! field-by-field and anything missing, null or non-numeric becomes zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Rows kept from the backend preview for display.
pub const PREVIEW_LIMIT: usize = 10;

/// Label the backend gives to a positive detection.
pub const EXOPLANET_LABEL: &str = "Exoplanet";

/// One row-level prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    #[serde(rename = "Prediction")]
    pub prediction: String,
    /// 0..=1
    #[serde(rename = "Probability")]
    pub probability: f64,
    /// Any other columns the backend echoed back
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PredictionRow {
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let prediction = obj
            .get("Prediction")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let probability = number(obj.get("Probability"));
        let extra = obj
            .iter()
            .filter(|(k, _)| k.as_str() != "Prediction" && k.as_str() != "Probability")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Some(Self {
            prediction,
            probability,
            extra,
        })
    }

    pub fn is_exoplanet(&self) -> bool {
        self.prediction == EXOPLANET_LABEL
    }
}

/// Body returned by `/api/predict`, success or error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub total: u64,
    pub exoplanets: u64,
    pub confidence: f64,
    pub preview: Vec<PredictionRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
}

impl PredictionResponse {
    /// Error body with zeroed counters.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
            total: 0,
            exoplanets: 0,
            confidence: 0.0,
            preview: Vec::new(),
            info: None,
        }
    }

    /// Normalize a successful backend payload for display.
    pub fn from_backend(data: &Value) -> Self {
        let total = data
            .get("total")
            .filter(|v| !v.is_null())
            .or_else(|| data.get("total_predictions"));

        let preview = data
            .get("preview")
            .and_then(Value::as_array)
            .map(|rows| {
                rows.iter()
                    .filter_map(PredictionRow::from_value)
                    .take(PREVIEW_LIMIT)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            status: "success".to_string(),
            message: None,
            total: count(total),
            exoplanets: count(data.get("exoplanets")),
            confidence: number(data.get("confidence")),
            preview,
            info: data.get("info").filter(|v| !v.is_null()).cloned(),
        }
    }
}

/// Did the backend report a failure in the body?
pub fn backend_reported_error(data: &Value) -> bool {
    data.get("status").and_then(Value::as_str) == Some("error")
}

/// The backend's own error message, if it sent one.
pub fn backend_message(data: &Value) -> Option<String> {
    data.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

fn number(value: Option<&Value>) -> f64 {
    value
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn count(value: Option<&Value>) -> u64 {
    match value {
        Some(v) => v.as_u64().unwrap_or_else(|| {
            let f = number(Some(v));
            if f > 0.0 {
                f.round() as u64
            } else {
                0
            }
        }),
        None => 0,
    }
}

/// The most recent successful prediction, read by the analysis view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredPrediction {
    pub result: PredictionResponse,
    pub file_name: String,
    pub received_at: DateTime<Utc>,
}
