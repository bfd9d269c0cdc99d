use serde::{Deserialize, Serialize};

use super::columns::{Column, ColumnMap};

/// Disposition label of archive rows that are confirmed planets.
pub const CONFIRMED: &str = "CONFIRMED";

/// A confirmed planet from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    pub kep_id: String,
    pub koi_name: String,
    pub kepler_name: String,
    pub disposition: String,
    /// Days
    pub orbital_period: f64,
    /// Earth radii
    pub planet_radius: f64,
    /// Kelvin
    pub equilibrium_temp: f64,
    /// Hours
    pub transit_duration: f64,
    /// Solar radii
    pub stellar_radius: f64,
    /// Earth units
    pub insolation_flux: f64,
    /// Kelvin
    pub stellar_temp: f64,
}

impl Planet {
    /// Read one tokenized row. No filtering happens here.
    pub fn from_fields(columns: &ColumnMap, fields: &[&str]) -> Self {
        Self {
            kep_id: columns.text(fields, Column::KepId).to_string(),
            koi_name: columns.text(fields, Column::KoiName).to_string(),
            kepler_name: columns.text(fields, Column::KeplerName).to_string(),
            disposition: columns.text(fields, Column::Disposition).to_string(),
            orbital_period: columns.number(fields, Column::OrbitalPeriod),
            planet_radius: columns.number(fields, Column::PlanetRadius),
            equilibrium_temp: columns.number(fields, Column::EquilibriumTemp),
            transit_duration: columns.number(fields, Column::TransitDuration),
            stellar_radius: columns.number(fields, Column::StellarRadius),
            insolation_flux: columns.number(fields, Column::InsolationFlux),
            stellar_temp: columns.number(fields, Column::StellarTemp),
        }
    }

    /// Confirmed, named, and with a usable orbit.
    pub fn is_explorable(&self) -> bool {
        self.disposition == CONFIRMED && !self.kepler_name.is_empty() && self.orbital_period > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "kepid,kepoi_name,kepler_name,koi_disposition,koi_period,koi_prad,koi_teq";

    fn planet(row: &str) -> Planet {
        let columns = ColumnMap::from_header(HEADER).unwrap();
        let fields: Vec<&str> = row.split(',').collect();
        Planet::from_fields(&columns, &fields)
    }

    #[test]
    fn test_from_fields_reads_named_columns() {
        let p = planet("11904151,K00072.01,Kepler-10 b,CONFIRMED,0.837,1.47,2169");
        assert_eq!(p.kep_id, "11904151");
        assert_eq!(p.koi_name, "K00072.01");
        assert_eq!(p.kepler_name, "Kepler-10 b");
        assert_eq!(p.orbital_period, 0.837);
        assert_eq!(p.planet_radius, 1.47);
        assert_eq!(p.equilibrium_temp, 2169.0);
        assert_eq!(p.stellar_temp, 0.0);
        assert!(p.is_explorable());
    }

    #[test]
    fn test_candidate_is_not_explorable() {
        let p = planet("1,K1,,CANDIDATE,3.0,1,1");
        assert!(!p.is_explorable());
    }

    #[test]
    fn test_unnamed_confirmed_is_not_explorable() {
        let p = planet("1,K1,,CONFIRMED,3.0,1,1");
        assert!(!p.is_explorable());
    }

    #[test]
    fn test_zero_period_is_not_explorable() {
        let p = planet("1,K1,Kepler-5 b,CONFIRMED,abc,1,1");
        assert_eq!(p.orbital_period, 0.0);
        assert!(!p.is_explorable());
    }

    #[test]
    fn test_disposition_is_case_sensitive() {
        let p = planet("1,K1,Kepler-5 b,confirmed,3.0,1,1");
        assert!(!p.is_explorable());
    }
}
