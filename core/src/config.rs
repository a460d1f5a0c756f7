//! Simulation configuration, presets, and validation.
//!
//! Every section deserializes with defaults for missing fields so adapters can
//! load partial TOML documents. [`SimulationConfig::validate`] must pass before
//! a world is built from the configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::NutritionRange;

const MAX_MAP_OCCUPANCY: f64 = 0.75;
const MAX_GRASS_SHARE: f64 = 0.3;
const MAX_OBSTACLE_SHARE: f64 = 0.15;
const MAX_CREATURE_SHARE: f64 = 0.15;
const SHARE_TOLERANCE: f64 = 1e-9;

/// Reasons a configuration is rejected.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Width or height is zero.
    #[error("map dimensions must be positive, got {width}x{height}")]
    EmptyMap {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },
    /// A ratio or share lies outside its permitted range.
    #[error("{name} must lie in (0, {max}], got {value}")]
    ShareOutOfRange {
        /// Name of the offending field.
        name: &'static str,
        /// Configured value.
        value: f64,
        /// Largest permitted value.
        max: f64,
    },
    /// The per-category shares do not fit within the map occupancy ratio.
    #[error(
        "category shares exceed the map occupancy ratio: grass={grass:.2}, obstacles={obstacles:.2}, \
         herbivores={herbivores:.2}, predators={predators:.2} (sum={sum:.2}, allowed={allowed:.2})"
    )]
    SharesExceedOccupancy {
        /// Grass share.
        grass: f64,
        /// Obstacle share.
        obstacles: f64,
        /// Herbivore share.
        herbivores: f64,
        /// Predator share.
        predators: f64,
        /// Sum of all shares.
        sum: f64,
        /// Map occupancy ratio.
        allowed: f64,
    },
    /// Grass nutrition bounds are inverted or allow zero-value meals.
    #[error("grass nutrition range {min}..={max} is invalid")]
    InvalidNutrition {
        /// Configured minimum.
        min: u32,
        /// Configured maximum.
        max: u32,
    },
    /// The regrowth share lies outside `[0, 1]`.
    #[error("grass regrowth share must lie in [0, 1], got {0}")]
    InvalidRegrowth(f64),
}

/// Grid dimensions and the overall occupancy cap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
    /// Fraction of cells that may be occupied at once.
    pub occupancy_ratio: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            occupancy_ratio: 0.65,
        }
    }
}

/// Initial grass placement and regrowth tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrassConfig {
    /// Grass cells requested at initialization.
    pub initial_count: u32,
    /// Largest fraction of the map grass may cover.
    pub cap_share: f64,
    /// Fraction of the map regrown per tick.
    pub regen_share: f64,
    /// Lower bound on cells regrown per tick.
    pub min_spawn_per_tick: u32,
    /// Bounds for the nutrition of every grass cell.
    pub nutrition: NutritionRange,
}

impl Default for GrassConfig {
    fn default() -> Self {
        Self {
            initial_count: 50,
            cap_share: 0.2,
            regen_share: 0.0075,
            min_spawn_per_tick: 3,
            nutrition: NutritionRange::default(),
        }
    }
}

/// Rock and tree placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstaclesConfig {
    /// Obstacles requested at initialization, alternating rocks and trees.
    pub count: u32,
    /// Largest fraction of the map obstacles may cover.
    pub cap_share: f64,
}

impl Default for ObstaclesConfig {
    fn default() -> Self {
        Self {
            count: 30,
            cap_share: 0.1,
        }
    }
}

/// Creature populations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreaturesConfig {
    /// Herbivores requested at initialization.
    pub herbivores: u32,
    /// Predators requested at initialization.
    pub predators: u32,
    /// Largest fraction of the map herbivores may cover.
    pub herbivore_cap_share: f64,
    /// Largest fraction of the map predators may cover.
    pub predator_cap_share: f64,
}

impl Default for CreaturesConfig {
    fn default() -> Self {
        Self {
            herbivores: 15,
            predators: 15,
            herbivore_cap_share: 0.1,
            predator_cap_share: 0.1,
        }
    }
}

/// Complete configuration for one simulation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grid layout.
    pub map: MapConfig,
    /// Plants.
    pub grass: GrassConfig,
    /// Blockers.
    pub obstacles: ObstaclesConfig,
    /// Herbivores and predators.
    pub creatures: CreaturesConfig,
}

impl SimulationConfig {
    /// Checks every bound and that the category shares fit on the map.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map.width == 0 || self.map.height == 0 {
            return Err(ConfigError::EmptyMap {
                width: self.map.width,
                height: self.map.height,
            });
        }

        check_share("map.occupancy_ratio", self.map.occupancy_ratio, MAX_MAP_OCCUPANCY)?;
        check_share("grass.cap_share", self.grass.cap_share, MAX_GRASS_SHARE)?;
        check_share(
            "obstacles.cap_share",
            self.obstacles.cap_share,
            MAX_OBSTACLE_SHARE,
        )?;
        check_share(
            "creatures.herbivore_cap_share",
            self.creatures.herbivore_cap_share,
            MAX_CREATURE_SHARE,
        )?;
        check_share(
            "creatures.predator_cap_share",
            self.creatures.predator_cap_share,
            MAX_CREATURE_SHARE,
        )?;

        let nutrition = self.grass.nutrition;
        if nutrition.min == 0 || nutrition.min > nutrition.max {
            return Err(ConfigError::InvalidNutrition {
                min: nutrition.min,
                max: nutrition.max,
            });
        }

        if !(0.0..=1.0).contains(&self.grass.regen_share) {
            return Err(ConfigError::InvalidRegrowth(self.grass.regen_share));
        }

        let sum = self.grass.cap_share
            + self.obstacles.cap_share
            + self.creatures.herbivore_cap_share
            + self.creatures.predator_cap_share;
        if sum > self.map.occupancy_ratio + SHARE_TOLERANCE {
            return Err(ConfigError::SharesExceedOccupancy {
                grass: self.grass.cap_share,
                obstacles: self.obstacles.cap_share,
                herbivores: self.creatures.herbivore_cap_share,
                predators: self.creatures.predator_cap_share,
                sum,
                allowed: self.map.occupancy_ratio,
            });
        }

        Ok(())
    }
}

fn check_share(name: &'static str, value: f64, max: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value <= max {
        Ok(())
    } else {
        Err(ConfigError::ShareOutOfRange { name, value, max })
    }
}

/// Ready-made map sizes with matching populations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// 12x12 map.
    Small,
    /// 20x20 map.
    Medium,
    /// 30x30 map.
    Large,
}

impl Preset {
    /// Builds the configuration described by the preset.
    #[must_use]
    pub fn config(self) -> SimulationConfig {
        let (map, grass, obstacles, creatures) = match self {
            Self::Small => ((12, 12, 0.45), (12, 0.15), (10, 0.08), (10, 5, 0.07, 0.06)),
            Self::Medium => ((20, 20, 0.5), (40, 0.2), (30, 0.1), (25, 15, 0.08, 0.07)),
            Self::Large => ((30, 30, 0.55), (80, 0.24), (50, 0.12), (40, 25, 0.1, 0.09)),
        };

        SimulationConfig {
            map: MapConfig {
                width: map.0,
                height: map.1,
                occupancy_ratio: map.2,
            },
            grass: GrassConfig {
                initial_count: grass.0,
                cap_share: grass.1,
                ..GrassConfig::default()
            },
            obstacles: ObstaclesConfig {
                count: obstacles.0,
                cap_share: obstacles.1,
            },
            creatures: CreaturesConfig {
                herbivores: creatures.0,
                predators: creatures.1,
                herbivore_cap_share: creatures.2,
                predator_cap_share: creatures.3,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_and_presets_validate() {
        SimulationConfig::default().validate().expect("default config");
        for preset in [Preset::Small, Preset::Medium, Preset::Large] {
            preset
                .config()
                .validate()
                .unwrap_or_else(|error| panic!("{preset:?} rejected: {error}"));
        }
    }

    #[test]
    fn shares_exceeding_occupancy_are_rejected() {
        let mut config = SimulationConfig::default();
        config.map.occupancy_ratio = 0.3;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SharesExceedOccupancy { .. })
        ));
    }

    #[test]
    fn out_of_range_share_names_the_field() {
        let mut config = SimulationConfig::default();
        config.obstacles.cap_share = 0.5;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ShareOutOfRange {
                name: "obstacles.cap_share",
                value: 0.5,
                max: MAX_OBSTACLE_SHARE,
            })
        );
    }

    #[test]
    fn inverted_nutrition_is_rejected() {
        let mut config = SimulationConfig::default();
        config.grass.nutrition = NutritionRange::new(9, 3);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidNutrition { min: 9, max: 3 })
        ));
    }

    #[test]
    fn empty_map_is_rejected() {
        let mut config = SimulationConfig::default();
        config.map.width = 0;
        assert!(matches!(config.validate(), Err(ConfigError::EmptyMap { .. })));
    }
}
