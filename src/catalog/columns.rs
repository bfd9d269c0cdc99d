//! Header-name column lookup for catalog exports.

use std::collections::HashMap;

use anyhow::Result;

/// Columns read from a Kepler cumulative-table export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    KepId,
    KoiName,
    KeplerName,
    Disposition,
    OrbitalPeriod,
    PlanetRadius,
    EquilibriumTemp,
    TransitDuration,
    StellarRadius,
    InsolationFlux,
    StellarTemp,
}

impl Column {
    pub const ALL: [Column; 11] = [
        Column::KepId,
        Column::KoiName,
        Column::KeplerName,
        Column::Disposition,
        Column::OrbitalPeriod,
        Column::PlanetRadius,
        Column::EquilibriumTemp,
        Column::TransitDuration,
        Column::StellarRadius,
        Column::InsolationFlux,
        Column::StellarTemp,
    ];

    /// Without these every row would be filtered out, so their absence is
    /// reported instead of yielding an empty catalog.
    pub const REQUIRED: [Column; 3] = [
        Column::KeplerName,
        Column::Disposition,
        Column::OrbitalPeriod,
    ];

    /// Lower-case header name in the archive export.
    pub fn header(&self) -> &'static str {
        match self {
            Column::KepId => "kepid",
            Column::KoiName => "kepoi_name",
            Column::KeplerName => "kepler_name",
            Column::Disposition => "koi_disposition",
            Column::OrbitalPeriod => "koi_period",
            Column::PlanetRadius => "koi_prad",
            Column::EquilibriumTemp => "koi_teq",
            Column::TransitDuration => "koi_duration",
            Column::StellarRadius => "koi_srad",
            Column::InsolationFlux => "koi_insol",
            Column::StellarTemp => "koi_steff",
        }
    }
}

/// Maps each known column to its position in the header row.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    indices: HashMap<Column, usize>,
}

impl ColumnMap {
    /// Build the mapping from a header line and check required columns once.
    pub fn from_header(header: &str) -> Result<Self> {
        let mut positions: HashMap<String, usize> = HashMap::new();
        for (i, name) in header.split(super::DELIMITER).enumerate() {
            positions
                .entry(normalize_header(name))
                .or_insert(i);
        }

        let indices: HashMap<Column, usize> = Column::ALL
            .iter()
            .filter_map(|c| positions.get(c.header()).map(|&i| (*c, i)))
            .collect();

        let missing: Vec<&str> = Column::REQUIRED
            .iter()
            .filter(|c| !indices.contains_key(c))
            .map(|c| c.header())
            .collect();
        if !missing.is_empty() {
            anyhow::bail!(
                "Catalog header is missing required column(s): {}",
                missing.join(", ")
            );
        }

        Ok(Self { indices })
    }

    /// Trimmed text of `column` in `fields`; absent columns read as "".
    pub fn text<'a>(&self, fields: &[&'a str], column: Column) -> &'a str {
        self.indices
            .get(&column)
            .and_then(|&i| fields.get(i))
            .map(|f| f.trim())
            .unwrap_or("")
    }

    /// Numeric value of `column`, failing open to zero.
    pub fn number(&self, fields: &[&str], column: Column) -> f64 {
        coerce_number(self.text(fields, column))
    }
}

fn normalize_header(name: &str) -> String {
    name.trim().trim_matches('"').trim().to_lowercase()
}

/// Parse a catalog number. Blanks, garbage, NaN and infinities become 0.
pub fn coerce_number(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}
