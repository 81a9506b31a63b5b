//! # Generation Module
//!
//! Procedural dungeon generation from named templates.
//!
//! A [`GenerationConfig`] names a template, a difficulty and a seed. The
//! [`DungeonGenerator`] turns it into a concrete [`crate::DungeonMap`]:
//! room typing and sizing, layout, connectivity, door typing and
//! rasterization. Every random decision draws from one seeded [`StdRng`],
//! so the same config always yields the same map.

pub mod dungeon;
pub mod layout;
pub mod templates;

pub use dungeon::*;
pub use layout::*;
pub use templates::*;

use crate::{DelveError, DelveResult};
use log::warn;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Difficulty of a generated dungeon. Scales room dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Deadly,
}

impl Difficulty {
    /// Multiplier applied to both room dimensions.
    pub fn size_multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Hard => 1.2,
            Difficulty::Normal | Difficulty::Deadly => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Deadly => "deadly",
        }
    }

    /// Parses a difficulty name, normalizing unknown names to `normal`.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!("Unknown difficulty '{name}', using normal");
            Difficulty::Normal
        })
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = DelveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" | "medium" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            "deadly" => Ok(Difficulty::Deadly),
            _ => Err(DelveError::InvalidState(format!("unknown difficulty '{s}'"))),
        }
    }
}

/// Trap and treasure density of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityTier {
    Low,
    Medium,
    High,
}

impl DensityTier {
    /// Chance that an ordinary room locks its door.
    pub fn lock_chance(self) -> f64 {
        match self {
            DensityTier::High => 0.3,
            DensityTier::Medium => 0.15,
            DensityTier::Low => 0.0,
        }
    }

    /// Trap tiles placed in each trap room.
    pub fn traps_per_room(self) -> usize {
        match self {
            DensityTier::Low => 1,
            DensityTier::Medium => 2,
            DensityTier::High => 3,
        }
    }

    /// Chests placed in each treasure room.
    pub fn chests_per_room(self) -> usize {
        match self {
            DensityTier::High => 2,
            DensityTier::Low | DensityTier::Medium => 1,
        }
    }
}

/// How rooms are positioned in map space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutStrategy {
    Linear,
    Branching,
    Organic,
    Symmetrical,
    Vertical,
}

impl LayoutStrategy {
    /// Linear and vertical layouts connect rooms in placement order.
    pub fn is_sequential(self) -> bool {
        matches!(self, LayoutStrategy::Linear | LayoutStrategy::Vertical)
    }
}

/// Configuration for one generation request.
///
/// Every input that affects the result lives here, including the seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Name of the template to interpret; unknown names fall back to the default
    pub template_name: String,
    pub difficulty: Difficulty,
    /// Exact room count, overriding the template's range
    pub room_count_override: Option<u32>,
    /// Map width, overriding the template's
    pub map_width: Option<u32>,
    /// Map height, overriding the template's
    pub map_height: Option<u32>,
}

impl GenerationConfig {
    /// Creates a configuration for the default template.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{GenerationConfig, Difficulty, DEFAULT_TEMPLATE};
    ///
    /// let config = GenerationConfig::new(42);
    /// assert_eq!(config.template_name, DEFAULT_TEMPLATE);
    /// assert_eq!(config.difficulty, Difficulty::Normal);
    /// assert!(config.room_count_override.is_none());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self::for_template(DEFAULT_TEMPLATE, seed)
    }

    pub fn for_template(template_name: &str, seed: u64) -> Self {
        Self {
            seed,
            template_name: template_name.to_string(),
            difficulty: Difficulty::Normal,
            room_count_override: None,
            map_width: None,
            map_height: None,
        }
    }

    /// Creates a configuration for testing with small, predictable maps.
    pub fn for_testing(seed: u64) -> Self {
        Self::for_template("small_dungeon", seed).with_room_count(3)
    }

    pub fn with_room_count(mut self, room_count: u32) -> Self {
        self.room_count_override = Some(room_count);
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_map_size(mut self, width: u32, height: u32) -> Self {
        self.map_width = Some(width);
        self.map_height = Some(height);
        self
    }

    /// The template this config resolves to.
    pub fn template(&self) -> &'static DungeonTemplate {
        DungeonTemplate::lookup(&self.template_name)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait for procedural generators.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> DelveResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use rand::SeedableRng;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_generation_config_creation() {
        let config = GenerationConfig::new(12345);
        assert_eq!(config.seed, 12345);
        assert_eq!(config.template().name, "medium_dungeon");

        let config = GenerationConfig::for_template("crypt", 1)
            .with_room_count(6)
            .with_difficulty(Difficulty::Hard)
            .with_map_size(100, 80);
        assert_eq!(config.room_count_override, Some(6));
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!((config.map_width, config.map_height), (Some(100), Some(80)));
    }

    #[test]
    fn test_unknown_template_falls_back() {
        let config = GenerationConfig::for_template("moon_base", 1);
        assert_eq!(config.template().name, DEFAULT_TEMPLATE);
    }

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("impossible".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::from_name("impossible"), Difficulty::Normal);
        assert_eq!(Difficulty::Easy.size_multiplier(), 0.8);
        assert_eq!(Difficulty::Deadly.size_multiplier(), 1.0);
    }

    #[test]
    fn test_density_tiers() {
        assert_eq!(DensityTier::Low.lock_chance(), 0.0);
        assert_eq!(DensityTier::High.traps_per_room(), 3);
        assert_eq!(DensityTier::Medium.chests_per_room(), 1);
        assert_eq!(DensityTier::High.chests_per_room(), 2);
    }

    #[test]
    fn test_rng_is_seeded() {
        let config = GenerationConfig::new(99);
        let a: u64 = utils::create_rng(&config).gen();
        let b: u64 = utils::create_rng(&config).gen();
        assert_eq!(a, b);
    }
}
