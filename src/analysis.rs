//! Dashboard figures and CSV export for the latest prediction.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::prediction::{PredictionRow, StoredPrediction};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub name: &'static str,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityBar {
    pub index: usize,
    pub prediction: String,
    /// Rounded percentage
    pub probability: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub file_name: String,
    pub total: u64,
    pub exoplanets: u64,
    pub non_exoplanets: u64,
    pub confidence: f64,
    pub distribution: Vec<Slice>,
    pub probabilities: Vec<ProbabilityBar>,
    pub rows: Vec<PredictionRow>,
    pub received_at: DateTime<Utc>,
}

impl AnalysisReport {
    pub fn from_stored(stored: &StoredPrediction) -> Self {
        let result = &stored.result;
        let non_exoplanets = result.total.saturating_sub(result.exoplanets);

        Self {
            file_name: stored.file_name.clone(),
            total: result.total,
            exoplanets: result.exoplanets,
            non_exoplanets,
            confidence: result.confidence,
            distribution: vec![
                Slice {
                    name: "Exoplanet",
                    value: result.exoplanets,
                },
                Slice {
                    name: "Non-Exoplanet",
                    value: non_exoplanets,
                },
            ],
            probabilities: result
                .preview
                .iter()
                .enumerate()
                .map(|(index, row)| ProbabilityBar {
                    index,
                    prediction: row.prediction.clone(),
                    probability: (row.probability.clamp(0.0, 1.0) * 100.0).round() as u32,
                })
                .collect(),
            rows: result.preview.clone(),
            received_at: stored.received_at,
        }
    }
}

/// Render preview rows as CSV. Columns are `Prediction`, `Probability`,
/// then the first row's extra columns in order.
pub fn rows_to_csv(rows: &[PredictionRow]) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };

    let mut headers: Vec<&str> = vec!["Prediction", "Probability"];
    headers.extend(first.extra.keys().map(String::as_str));

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(headers.iter().map(|h| csv_field(h)).collect::<Vec<_>>().join(","));

    for row in rows {
        let fields: Vec<String> = headers
            .iter()
            .map(|&h| match h {
                "Prediction" => csv_field(&row.prediction),
                "Probability" => row.probability.to_string(),
                other => match row.extra.get(other) {
                    Some(serde_json::Value::String(s)) => csv_field(s),
                    Some(serde_json::Value::Null) | None => String::new(),
                    Some(v) => csv_field(&v.to_string()),
                },
            })
            .collect();
        lines.push(fields.join(","));
    }

    lines.join("\n")
}

fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Download name for an export made on `date`.
pub fn export_file_name(date: DateTime<Utc>) -> String {
    format!("exoplanet_predictions_{}.csv", date.format("%Y-%m-%d"))
}
