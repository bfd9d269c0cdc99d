//! Scene descriptors for the browser's star-system and planet viewers.
//!
//! Everything here is plain numbers and colours; the client owns the
//! renderer, the camera and the animation loop.

use std::f64::consts::PI;

use serde::Serialize;

use crate::catalog::{Planet, StarSystem};

const STAR_RADIUS: f64 = 4.0;
const STAR_COLOR: &str = "#ffdd88";
const BASE_ORBIT: f64 = 12.0;
const ORBIT_SCALE: f64 = 3.0;
const MIN_DISPLAY_RADIUS: f64 = 0.8;
const MAX_DISPLAY_RADIUS: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StarView {
    pub name: String,
    pub radius: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanetView {
    pub name: String,
    pub orbit_radius: f64,
    pub display_radius: f64,
    pub color: &'static str,
    /// Radians
    pub initial_angle: f64,
    pub orbital_period: f64,
    pub equilibrium_temp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemScene {
    pub star: StarView,
    pub planets: Vec<PlanetView>,
}

impl SystemScene {
    pub fn from_system(system: &StarSystem) -> Self {
        let n = system.planets.len();
        Self {
            star: StarView {
                name: system.name.clone(),
                radius: STAR_RADIUS,
                color: STAR_COLOR,
            },
            planets: system
                .planets
                .iter()
                .enumerate()
                .map(|(i, p)| planet_view(p, i, n))
                .collect(),
        }
    }
}

fn planet_view(planet: &Planet, index: usize, count: usize) -> PlanetView {
    PlanetView {
        name: planet.kepler_name.clone(),
        orbit_radius: orbit_radius(planet.orbital_period),
        display_radius: display_radius(planet.planet_radius),
        color: temperature_color(planet.equilibrium_temp),
        initial_angle: index as f64 / count.max(1) as f64 * 2.0 * PI,
        orbital_period: planet.orbital_period,
        equilibrium_temp: planet.equilibrium_temp,
    }
}

/// Scene-space orbit radius; grows with the square root of the period.
pub fn orbit_radius(orbital_period: f64) -> f64 {
    BASE_ORBIT + orbital_period.max(0.0).sqrt() * ORBIT_SCALE
}

/// Sphere radius drawn for a planet of `planet_radius` Earth radii.
pub fn display_radius(planet_radius: f64) -> f64 {
    (planet_radius * 0.2).clamp(MIN_DISPLAY_RADIUS, MAX_DISPLAY_RADIUS)
}

/// Hot worlds red, temperate ones cyan, cold ones deep blue.
pub fn temperature_color(equilibrium_temp: f64) -> &'static str {
    if equilibrium_temp > 1500.0 {
        "#ff4444"
    } else if equilibrium_temp > 1000.0 {
        "#ff8844"
    } else if equilibrium_temp > 600.0 {
        "#ffbb44"
    } else if equilibrium_temp > 300.0 {
        "#44ccff"
    } else {
        "#4466ff"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_color_thresholds() {
        assert_eq!(temperature_color(2000.0), "#ff4444");
        assert_eq!(temperature_color(1500.0), "#ff8844");
        assert_eq!(temperature_color(1000.0), "#ffbb44");
        assert_eq!(temperature_color(600.0), "#44ccff");
        assert_eq!(temperature_color(300.0), "#4466ff");
        assert_eq!(temperature_color(0.0), "#4466ff");
    }

    #[test]
    fn test_display_radius_clamped() {
        assert_eq!(display_radius(0.0), 0.8);
        assert_eq!(display_radius(10.0), 2.0);
        assert_eq!(display_radius(100.0), 3.0);
    }

    #[test]
    fn test_orbit_radius() {
        assert_eq!(orbit_radius(0.0), 12.0);
        assert_eq!(orbit_radius(4.0), 18.0);
        assert_eq!(orbit_radius(-1.0), 12.0);
    }

    #[test]
    fn test_scene_spreads_initial_angles() {
        let planet = |name: &str, period: f64| Planet {
            kep_id: String::new(),
            koi_name: String::new(),
            kepler_name: name.to_string(),
            disposition: "CONFIRMED".to_string(),
            orbital_period: period,
            planet_radius: 2.0,
            equilibrium_temp: 800.0,
            transit_duration: 0.0,
            stellar_radius: 0.0,
            insolation_flux: 0.0,
            stellar_temp: 0.0,
        };
        let system = StarSystem {
            name: "Kepler-9".to_string(),
            planet_count: 2,
            planets: vec![planet("Kepler-9 b", 1.0), planet("Kepler-9 c", 9.0)],
        };
        let scene = SystemScene::from_system(&system);
        assert_eq!(scene.star.name, "Kepler-9");
        assert_eq!(scene.planets.len(), 2);
        assert_eq!(scene.planets[0].initial_angle, 0.0);
        assert!((scene.planets[1].initial_angle - PI).abs() < 1e-12);
        assert!(scene.planets[0].orbit_radius < scene.planets[1].orbit_radius);
        assert_eq!(scene.planets[0].color, "#ffbb44");
    }
}
