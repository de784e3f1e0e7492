//! Game configuration loaded from RON.

use serde::{Deserialize, Serialize};

use super::resource_table::ResourceTable;
use crate::error::ConfigError;
use crate::grid::MAX_RADIUS;
use crate::players::{MAX_PLAYERS, MIN_PLAYERS};
use crate::resources::{ResourceType, Resources};
use crate::territory::MAX_RESOURCE_VALUE;

/// Complete game configuration.
///
/// Every section has defaults, so a RON file only needs the values it changes.
///
/// # Example RON
///
/// ```ron
/// GameConfig(
///     map_radius: 6,
///     players: 3,
///     seed: 42,
///     economy: (
///         base_claim_cost: { Gold: 3, Wood: 2, Metal: 1, Food: 2 },
///     ),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Radius of the hexagonal map.
    pub map_radius: u32,
    /// Number of parties, including the human player.
    pub players: u8,
    /// Seed for map generation and in-game randomness.
    pub seed: u64,
    /// Pool every party starts with.
    pub starting_resources: Resources,
    /// Claim costs and production.
    pub economy: EconomyConfig,
    /// Turn flow and random events.
    pub turns: TurnConfig,
    /// Map generation.
    pub map: MapConfig,
    /// Victory thresholds.
    pub victory: VictoryConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_radius: 5,
            players: 2,
            seed: 12345,
            starting_resources: Resources::from([
                (ResourceType::Gold, 10),
                (ResourceType::Wood, 8),
                (ResourceType::Metal, 6),
                (ResourceType::Food, 8),
            ]),
            economy: EconomyConfig::default(),
            turns: TurnConfig::default(),
            map: MapConfig::default(),
            victory: VictoryConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parse a configuration from RON text and validate it.
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render this configuration as pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of parties.
    #[must_use]
    pub const fn with_players(mut self, players: u8) -> Self {
        self.players = players;
        self
    }

    /// Set the map radius.
    #[must_use]
    pub const fn with_radius(mut self, radius: u32) -> Self {
        self.map_radius = radius;
        self
    }

    /// Set the starting pool.
    #[must_use]
    pub fn with_starting_resources(mut self, resources: Resources) -> Self {
        self.starting_resources = resources;
        self
    }

    /// Check every value is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.players) {
            return Err(ConfigError::Invalid(format!(
                "players must be between {MIN_PLAYERS} and {MAX_PLAYERS}, got {}",
                self.players
            )));
        }
        if self.map_radius < 2 || self.map_radius > MAX_RADIUS {
            return Err(ConfigError::Invalid(format!(
                "map_radius must be between 2 and {MAX_RADIUS}, got {}",
                self.map_radius
            )));
        }
        if !self.starting_resources.is_non_negative() {
            return Err(ConfigError::Invalid(
                "starting_resources must not be negative".into(),
            ));
        }
        self.economy.validate()?;
        self.turns.validate()?;
        self.map.validate()?;
        self.victory.validate()
    }
}

/// Claim cost model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Cost of claiming a plain territory.
    pub base_claim_cost: Resources,
    /// Resource type that carries a surcharge.
    pub premium_resource: ResourceType,
    /// Extra units of the premium resource charged for premium land.
    pub premium_surcharge: i64,
    /// Production value that counts as the top tier (+50% cost).
    pub max_tier: u32,
    /// Cap on the per-neighbor discount.
    pub max_neighbor_discount: i64,
    /// No cost entry drops below this after discounts.
    pub min_cost: i64,
    /// Resource table for territories created after setup.
    pub resource_table: ResourceTable,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            base_claim_cost: Resources::from([
                (ResourceType::Gold, 3),
                (ResourceType::Wood, 2),
                (ResourceType::Metal, 1),
                (ResourceType::Food, 2),
            ]),
            premium_resource: ResourceType::Gold,
            premium_surcharge: 1,
            max_tier: 3,
            max_neighbor_discount: 3,
            min_cost: 1,
            resource_table: ResourceTable::standard(),
        }
    }
}

impl EconomyConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.base_claim_cost.is_empty()
            || self.base_claim_cost.iter().any(|(t, a)| a < 1 || !t.is_producible())
        {
            return Err(ConfigError::Invalid(
                "base_claim_cost needs positive amounts of producible resources".into(),
            ));
        }
        if self.premium_surcharge < 0 || self.max_neighbor_discount < 0 || self.min_cost < 0 {
            return Err(ConfigError::Invalid(
                "surcharges and discounts must not be negative".into(),
            ));
        }
        if self.max_tier == 0 {
            return Err(ConfigError::Invalid("max_tier must be positive".into()));
        }
        self.resource_table.validate()
    }
}

/// Turn flow and random events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnConfig {
    /// Chance, in percent, of a random event at each resolution phase.
    pub random_event_chance_percent: u8,
    /// Random events only happen after this turn.
    pub random_event_after_turn: u32,
    /// Units of every tradable resource granted by a windfall.
    pub windfall_amount: i64,
    /// Production multiplier of a surge, in percent.
    pub surge_multiplier_percent: u32,
    /// How long a surge lasts, in ticks.
    pub surge_duration_ticks: u64,
    /// Units knocked off every claim cost entry by a discount event.
    pub discount_amount: i64,
    /// How long a discount lasts, in ticks.
    pub discount_duration_ticks: u64,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            random_event_chance_percent: 30,
            random_event_after_turn: 2,
            windfall_amount: 3,
            surge_multiplier_percent: 150,
            surge_duration_ticks: 8,
            discount_amount: 1,
            discount_duration_ticks: 8,
        }
    }
}

impl TurnConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.random_event_chance_percent > 100 {
            return Err(ConfigError::Invalid(
                "random_event_chance_percent must be at most 100".into(),
            ));
        }
        if self.windfall_amount < 0 || self.discount_amount < 0 {
            return Err(ConfigError::Invalid(
                "event amounts must not be negative".into(),
            ));
        }
        Ok(())
    }
}

/// Map generation parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Resource table used while generating.
    pub resource_table: ResourceTable,
    /// Fortification given to home bases.
    pub home_base_fortification: u32,
    /// Units garrisoned in home bases.
    pub home_base_units: u32,
    /// Minimum production value of a home base.
    pub home_base_min_value: u32,
    /// Every tradable resource appears within this range of each home base.
    pub diversity_range: u32,
    /// Strategic points cover the center and rings up to this radius.
    pub strategic_radius: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            resource_table: ResourceTable::map_generation(),
            home_base_fortification: 2,
            home_base_units: 1,
            home_base_min_value: 2,
            diversity_range: 2,
            strategic_radius: 1,
        }
    }
}

impl MapConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_RESOURCE_VALUE).contains(&self.home_base_min_value) {
            return Err(ConfigError::Invalid(format!(
                "home_base_min_value must be between 1 and {MAX_RESOURCE_VALUE}"
            )));
        }
        if self.diversity_range == 0 {
            return Err(ConfigError::Invalid("diversity_range must be positive".into()));
        }
        self.resource_table.validate()
    }
}

/// Victory thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VictoryConfig {
    /// Share of all territories, in percent, needed for a territorial win.
    pub territory_share_percent: u8,
    /// Total pooled resources needed for an economic win.
    pub economic_threshold: i64,
    /// Whether holding every strategic point wins.
    pub strategic_points: bool,
}

impl Default for VictoryConfig {
    fn default() -> Self {
        Self {
            territory_share_percent: 60,
            economic_threshold: 200,
            strategic_points: true,
        }
    }
}

impl VictoryConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.territory_share_percent == 0 || self.territory_share_percent > 100 {
            return Err(ConfigError::Invalid(
                "territory_share_percent must be between 1 and 100".into(),
            ));
        }
        if self.economic_threshold <= 0 {
            return Err(ConfigError::Invalid(
                "economic_threshold must be positive".into(),
            ));
        }
        Ok(())
    }
}
