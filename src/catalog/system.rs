use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::planet::Planet;

/// Most systems kept for exploration.
pub const MAX_SYSTEMS: usize = 50;

/// Fewest planets a system needs to be explorable.
pub const MIN_PLANETS: usize = 2;

static STAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Kepler-(\d+)").expect("valid star pattern"));

/// A multi-planet star system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarSystem {
    pub name: String,
    pub planet_count: usize,
    /// Ascending by orbital period
    pub planets: Vec<Planet>,
}

/// Host star name parsed from a confirmed planet name, e.g. `Kepler-10 b` → `Kepler-10`.
pub fn star_name(kepler_name: &str) -> Option<String> {
    STAR_PATTERN
        .captures(kepler_name)
        .map(|caps| format!("Kepler-{}", &caps[1]))
}

/// Group planets by host star and keep the largest multi-planet systems.
pub fn group_systems(planets: &[Planet]) -> Vec<StarSystem> {
    // Insertion order is kept so equal planet counts sort deterministically.
    let mut order: Vec<String> = Vec::new();
    let mut by_star: HashMap<String, Vec<Planet>> = HashMap::new();

    for planet in planets {
        let Some(star) = star_name(&planet.kepler_name) else {
            continue;
        };
        by_star
            .entry(star.clone())
            .or_insert_with(|| {
                order.push(star);
                Vec::new()
            })
            .push(planet.clone());
    }

    let mut systems: Vec<StarSystem> = order
        .into_iter()
        .filter_map(|name| {
            let mut members = by_star.remove(&name)?;
            if members.len() < MIN_PLANETS {
                return None;
            }
            members.sort_by(|a, b| a.orbital_period.total_cmp(&b.orbital_period));
            Some(StarSystem {
                name,
                planet_count: members.len(),
                planets: members,
            })
        })
        .collect();

    systems.sort_by(|a, b| b.planet_count.cmp(&a.planet_count));
    systems.truncate(MAX_SYSTEMS);
    systems
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_planet(name: &str, period: f64) -> Planet {
        Planet {
            kep_id: String::new(),
            koi_name: String::new(),
            kepler_name: name.to_string(),
            disposition: "CONFIRMED".to_string(),
            orbital_period: period,
            planet_radius: 1.0,
            equilibrium_temp: 500.0,
            transit_duration: 0.0,
            stellar_radius: 0.0,
            insolation_flux: 0.0,
            stellar_temp: 0.0,
        }
    }

    #[test]
    fn test_star_name() {
        assert_eq!(star_name("Kepler-10 b").as_deref(), Some("Kepler-10"));
        assert_eq!(star_name("Kepler-1649 c").as_deref(), Some("Kepler-1649"));
        assert_eq!(star_name("KOI-123 b"), None);
        assert_eq!(star_name(""), None);
    }

    #[test]
    fn test_group_sorts_planets_by_period() {
        let planets = vec![make_planet("Kepler-10 b", 3.5), make_planet("Kepler-10 c", 1.2)];
        let systems = group_systems(&planets);
        assert_eq!(systems.len(), 1);
        assert_eq!(systems[0].name, "Kepler-10");
        assert_eq!(systems[0].planet_count, 2);
        assert_eq!(systems[0].planets[0].kepler_name, "Kepler-10 c");
        assert_eq!(systems[0].planets[1].kepler_name, "Kepler-10 b");
    }

    #[test]
    fn test_single_planet_systems_dropped() {
        let planets = vec![
            make_planet("Kepler-1 b", 1.0),
            make_planet("Kepler-2 b", 1.0),
            make_planet("Kepler-2 c", 2.0),
        ];
        let systems = group_systems(&planets);
        assert_eq!(systems.len(), 1);
        assert_eq!(systems[0].name, "Kepler-2");
    }

    #[test]
    fn test_unmatched_names_join_no_system() {
        let planets = vec![make_planet("TOI-700 b", 1.0), make_planet("TOI-700 c", 2.0)];
        assert!(group_systems(&planets).is_empty());
    }

    #[test]
    fn test_systems_sorted_by_count_then_first_seen() {
        let planets = vec![
            make_planet("Kepler-3 b", 1.0),
            make_planet("Kepler-3 c", 2.0),
            make_planet("Kepler-4 b", 1.0),
            make_planet("Kepler-4 c", 2.0),
            make_planet("Kepler-4 d", 3.0),
            make_planet("Kepler-5 b", 1.0),
            make_planet("Kepler-5 c", 2.0),
        ];
        let names: Vec<String> = group_systems(&planets).into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Kepler-4", "Kepler-3", "Kepler-5"]);
    }

    #[test]
    fn test_truncates_to_max_systems() {
        let planets: Vec<Planet> = (0..60)
            .flat_map(|i| {
                vec![
                    make_planet(&format!("Kepler-{i} b"), 1.0),
                    make_planet(&format!("Kepler-{i} c"), 2.0),
                ]
            })
            .collect();
        assert_eq!(group_systems(&planets).len(), MAX_SYSTEMS);
    }
}
