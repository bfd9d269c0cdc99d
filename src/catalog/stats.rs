use serde::{Deserialize, Serialize};

use super::planet::Planet;

/// Descriptive statistics over every confirmed planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_planets: usize,
    pub total_systems: usize,
    pub avg_orbital_period: f64,
    pub avg_planet_radius: f64,
    pub avg_temperature: f64,
    pub hottest: Option<Planet>,
    pub largest: Option<Planet>,
}

impl CatalogStats {
    /// `planets` is the filtered set before grouping; `total_systems` the retained count.
    pub fn compute(planets: &[Planet], total_systems: usize) -> Self {
        Self {
            total_planets: planets.len(),
            total_systems,
            avg_orbital_period: mean(planets, |p| p.orbital_period),
            avg_planet_radius: mean(planets, |p| p.planet_radius),
            avg_temperature: mean(planets, |p| p.equilibrium_temp),
            hottest: first_max(planets, |p| p.equilibrium_temp).cloned(),
            largest: first_max(planets, |p| p.planet_radius).cloned(),
        }
    }
}

fn mean(planets: &[Planet], field: impl Fn(&Planet) -> f64) -> f64 {
    if planets.is_empty() {
        return 0.0;
    }
    planets.iter().map(field).sum::<f64>() / planets.len() as f64
}

/// Linear max with strict `>`: the earliest planet wins a tie.
fn first_max(planets: &[Planet], field: impl Fn(&Planet) -> f64) -> Option<&Planet> {
    let mut iter = planets.iter();
    let first = iter.next()?;
    Some(iter.fold(first, |best, p| if field(p) > field(best) { p } else { best }))
}
