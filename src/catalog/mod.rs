//! Kepler catalog ingestion: CSV text → confirmed planets → multi-planet
//! star systems → aggregate statistics.
//!
//! Row-level problems never fail a parse. Blank numerics become zero and
//! unconfirmed rows are dropped. Only a failed fetch or a header without
//! the required columns is an error.

pub mod columns;
pub mod planet;
pub mod stats;
pub mod system;

use anyhow::{Context, Result};
use serde::Serialize;

use columns::ColumnMap;
pub use planet::{Planet, CONFIRMED};
pub use stats::CatalogStats;
pub use system::{group_systems, star_name, StarSystem, MAX_SYSTEMS};

/// Field delimiter of the archive export.
pub const DELIMITER: char = ',';

/// Everything derived from one catalog fetch. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    pub planets: Vec<Planet>,
    pub systems: Vec<StarSystem>,
    pub stats: CatalogStats,
}

impl Catalog {
    /// Parse raw catalog text. The first non-comment line is the header.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut lines = raw
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .skip_while(|l| l.trim().is_empty() || l.starts_with('#'));

        let header = lines.next().context("Catalog is empty: no header row")?;
        let columns = ColumnMap::from_header(header)?;

        let planets: Vec<Planet> = lines
            .filter(|l| !l.trim().is_empty())
            .map(|l| {
                let fields: Vec<&str> = l.split(DELIMITER).collect();
                Planet::from_fields(&columns, &fields)
            })
            .filter(Planet::is_explorable)
            .collect();

        let systems = group_systems(&planets);
        let stats = CatalogStats::compute(&planets, systems.len());

        Ok(Self {
            planets,
            systems,
            stats,
        })
    }

    /// Case-insensitive lookup of a retained system.
    pub fn system(&self, name: &str) -> Option<&StarSystem> {
        let name = name.trim();
        self.systems
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Retained systems whose name contains `term`, ignoring case.
    pub fn search(&self, term: &str) -> Vec<&StarSystem> {
        let needle = term.trim().to_lowercase();
        self.systems
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .collect()
    }
}

/// Fetch the catalog from a local path or an http(s) URL and parse it.
pub async fn load(client: &reqwest::Client, source: &str) -> Result<Catalog> {
    let raw = if source.starts_with("http://") || source.starts_with("https://") {
        let resp = client
            .get(source)
            .send()
            .await
            .with_context(|| format!("Failed to fetch catalog from {source}"))?;
        if !resp.status().is_success() {
            anyhow::bail!("Catalog fetch from {source} returned {}", resp.status());
        }
        resp.text()
            .await
            .context("Failed to read catalog response body")?
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("Failed to read catalog file {source}"))?
    };

    let catalog = Catalog::parse(&raw)?;
    tracing::info!(
        "Catalog loaded: {} confirmed planets, {} multi-planet systems",
        catalog.stats.total_planets,
        catalog.stats.total_systems
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "kepid,kepoi_name,kepler_name,koi_disposition,koi_period,koi_prad,koi_teq,koi_duration,koi_srad,koi_insol,koi_steff";

    fn csv(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    #[test]
    fn test_two_planet_system_ordered_by_period() {
        let text = csv(&[
            "1,K1.01,Kepler-10 b,CONFIRMED,3.5,1.4,2000,2.0,1.0,100,5700",
            "1,K1.02,Kepler-10 c,CONFIRMED,1.2,2.3,600,3.0,1.0,20,5700",
        ]);
        let catalog = Catalog::parse(&text).unwrap();
        assert_eq!(catalog.systems.len(), 1);
        let system = &catalog.systems[0];
        assert_eq!(system.name, "Kepler-10");
        assert_eq!(system.planet_count, 2);
        assert_eq!(system.planets[0].orbital_period, 1.2);
        assert_eq!(system.planets[1].orbital_period, 3.5);
    }

    #[test]
    fn test_filters_unconfirmed_and_unnamed() {
        let text = csv(&[
            "1,K1.01,Kepler-1 b,CONFIRMED,3.5,1,1,1,1,1,1",
            "2,K2.01,,CANDIDATE,4.0,1,1,1,1,1,1",
            "3,K3.01,,CONFIRMED,4.0,1,1,1,1,1,1",
            "4,K4.01,Kepler-4 b,FALSE POSITIVE,4.0,1,1,1,1,1,1",
            "5,K5.01,Kepler-5 b,CONFIRMED,0,1,1,1,1,1,1",
        ]);
        let catalog = Catalog::parse(&text).unwrap();
        assert_eq!(catalog.planets.len(), 1);
        assert!(catalog
            .planets
            .iter()
            .all(|p| p.disposition == CONFIRMED && !p.kepler_name.is_empty()));
    }

    #[test]
    fn test_unmatched_name_counts_but_not_grouped() {
        let text = csv(&[
            "1,K1.01,Kepler-2 b,CONFIRMED,1.0,1,1,1,1,1,1",
            "1,K1.02,Kepler-2 c,CONFIRMED,2.0,1,1,1,1,1,1",
            "9,K9.01,KOI-9 b,CONFIRMED,2.0,1,1,1,1,1,1",
        ]);
        let catalog = Catalog::parse(&text).unwrap();
        assert_eq!(catalog.stats.total_planets, 3);
        assert_eq!(catalog.systems.len(), 1);
        assert_eq!(catalog.systems[0].planet_count, 2);
    }

    #[test]
    fn test_blank_lines_crlf_and_comments() {
        let text = format!(
            "# NASA Exoplanet Archive\n# exported\n{HEADER}\r\n\r\n1,K1.01,Kepler-7 b,CONFIRMED,4.9,16,1500,5,2,1000,5900\r\n\n"
        );
        let catalog = Catalog::parse(&text).unwrap();
        assert_eq!(catalog.planets.len(), 1);
        assert_eq!(catalog.planets[0].stellar_temp, 5900.0);
    }

    #[test]
    fn test_non_numeric_values_become_zero() {
        let text = csv(&["1,K1.01,Kepler-7 b,CONFIRMED,4.9,,abc,,,,"]);
        let catalog = Catalog::parse(&text).unwrap();
        let p = &catalog.planets[0];
        assert_eq!(p.planet_radius, 0.0);
        assert_eq!(p.equilibrium_temp, 0.0);
        assert!(!p.planet_radius.is_nan());
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(Catalog::parse("").is_err());
        assert!(Catalog::parse("\n\n").is_err());
    }

    #[test]
    fn test_header_only_yields_empty_catalog() {
        let catalog = Catalog::parse(HEADER).unwrap();
        assert!(catalog.planets.is_empty());
        assert!(catalog.systems.is_empty());
        assert_eq!(catalog.stats.avg_temperature, 0.0);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let text = csv(&[
            "1,K1.01,Kepler-11 b,CONFIRMED,10.3,1.8,900,4,1,100,5600",
            "1,K1.02,Kepler-11 c,CONFIRMED,13.0,2.9,830,4,1,80,5600",
            "1,K1.03,Kepler-11 d,CONFIRMED,22.7,3.1,700,5,1,40,5600",
            "2,K2.01,Kepler-20 b,CONFIRMED,3.7,1.9,1100,3,0.9,300,5500",
            "2,K2.02,Kepler-20 e,CONFIRMED,6.1,0.9,1000,3,0.9,200,5500",
        ]);
        assert_eq!(Catalog::parse(&text).unwrap(), Catalog::parse(&text).unwrap());
    }

    #[test]
    fn test_system_lookup_and_search() {
        let text = csv(&[
            "1,K1.01,Kepler-11 b,CONFIRMED,10.3,1,1,1,1,1,1",
            "1,K1.02,Kepler-11 c,CONFIRMED,13.0,1,1,1,1,1,1",
            "2,K2.01,Kepler-20 b,CONFIRMED,3.7,1,1,1,1,1,1",
            "2,K2.02,Kepler-20 e,CONFIRMED,6.1,1,1,1,1,1,1",
        ]);
        let catalog = Catalog::parse(&text).unwrap();
        assert!(catalog.system("kepler-11").is_some());
        assert!(catalog.system("Kepler-99").is_none());
        assert_eq!(catalog.search("20").len(), 1);
        assert_eq!(catalog.search("KEPLER").len(), 2);
        assert_eq!(catalog.search("").len(), 2);
    }

    #[tokio::test]
    async fn test_load_missing_file_is_error() {
        let client = reqwest::Client::new();
        let err = load(&client, "/definitely/not/here.csv").await.unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read catalog file"));
    }
}
