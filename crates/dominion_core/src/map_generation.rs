//! Procedural construction of a balanced starting map.
//!
//! Generates a territory map with:
//! - Home bases on symmetric corners of the second-outermost ring
//! - Affordable first expansions around every home base
//! - All four tradable resources within reach of every home base
//! - Strategic points at the contested center

use rand::{Rng, RngCore};

use crate::data::{GameConfig, MapConfig, ResourceTable};
use crate::error::{ConfigError, Result};
use crate::grid::HexGrid;
use crate::hex::HexCoord;
use crate::players::{PlayerId, MAX_PLAYERS, MIN_PLAYERS};
use crate::resources::ResourceType;
use crate::store::TerritoryStore;
use crate::territory::{TerritoryId, TerritoryPatch};

/// Corner directions of the home bases for 2, 3 and 4 parties, first party first.
///
/// Every layout is symmetric under rotation about the origin.
const HOME_DIRECTIONS: [&[usize]; 3] = [&[3, 0], &[3, 5, 1], &[3, 4, 0, 1]];

/// One-shot builder of the initial [`TerritoryStore`].
#[derive(Debug, Clone)]
pub struct MapGenerator {
    radius: u32,
    players: Vec<PlayerId>,
    map: MapConfig,
    max_tier: u32,
    lazy_table: ResourceTable,
}

impl MapGenerator {
    /// Create a generator for `config`.
    #[must_use]
    pub fn new(config: &GameConfig) -> Self {
        Self {
            radius: config.map_radius,
            players: PlayerId::turn_order(config.players),
            map: config.map.clone(),
            max_tier: config.economy.max_tier,
            lazy_table: config.economy.resource_table.clone(),
        }
    }

    /// Parties that receive a home base, in turn order.
    #[must_use]
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    /// Home base coordinate of every party, in turn order.
    #[must_use]
    pub fn home_bases(&self) -> Vec<(PlayerId, HexCoord)> {
        let ring = self.radius.saturating_sub(1) as i32;
        let layout = HOME_DIRECTIONS[self.players.len().clamp(2, 4) - 2];
        self.players
            .iter()
            .zip(layout.iter())
            .map(|(&player, &dir)| (player, HexCoord::direction(dir) * ring))
            .collect()
    }

    /// Build and seal the map. Identical seeds give identical maps.
    pub fn generate(&self, rng: &mut dyn RngCore) -> Result<TerritoryStore> {
        self.validate()?;

        let grid = HexGrid::new(self.radius);
        let coords: Vec<HexCoord> = grid.coords().collect();
        let mut store = TerritoryStore::new(grid, self.map.resource_table.clone());

        for coord in coords {
            store.create_or_get(coord, TerritoryPatch::default(), rng)?;
        }

        let homes = self.home_bases();
        for &(player, coord) in &homes {
            self.place_home_base(&mut store, player, coord)?;
        }
        self.cap_home_neighbors(&mut store, &homes)?;
        self.ensure_diversity(&mut store, &homes, rng)?;
        self.mark_strategic_points(&mut store)?;

        store.set_resource_table(self.lazy_table.clone());
        store.finish_setup();

        tracing::info!(
            radius = self.radius,
            players = self.players.len(),
            territories = store.len(),
            "Map generated"
        );
        Ok(store)
    }

    fn validate(&self) -> Result<()> {
        let count = self.players.len();
        if count < usize::from(MIN_PLAYERS) || count > usize::from(MAX_PLAYERS) {
            return Err(ConfigError::Invalid(format!("cannot place {count} home bases")).into());
        }
        if self.radius < 2 {
            return Err(ConfigError::Invalid(format!(
                "map radius {} is too small for home bases",
                self.radius
            ))
            .into());
        }
        Ok(())
    }

    fn place_home_base(&self, store: &mut TerritoryStore, player: PlayerId, coord: HexCoord) -> Result<()> {
        let id = TerritoryId::new(coord);
        let (kind, value) = store
            .get(id)
            .map_or((ResourceType::Food, 1), |t| (t.resource_type, t.resource_value));
        // Home bases always produce something tradable
        let kind = if ResourceType::TRADABLE.contains(&kind) {
            kind
        } else {
            ResourceType::Food
        };
        let patch = TerritoryPatch::default()
            .owner(player)
            .home_base(true)
            .fortification(self.map.home_base_fortification)
            .units(self.map.home_base_units)
            .resource(kind, value.max(self.map.home_base_min_value));
        store.update(id, &patch)?;
        tracing::debug!(%player, %coord, "Home base placed");
        Ok(())
    }

    /// Keep the first ring around each home base below the top tier.
    fn cap_home_neighbors(&self, store: &mut TerritoryStore, homes: &[(PlayerId, HexCoord)]) -> Result<()> {
        let cap = self.max_tier.saturating_sub(1).max(1);
        for &(_, home) in homes {
            let neighbors = store.grid().neighbors_of(home).to_vec();
            for coord in neighbors {
                let Some(t) = store.get_at(coord) else {
                    continue;
                };
                if t.is_home_base || t.resource_value < self.max_tier {
                    continue;
                }
                let (id, kind) = (t.id, t.resource_type);
                store.update(id, &TerritoryPatch::default().resource(kind, cap))?;
            }
        }
        Ok(())
    }

    /// Make every tradable resource available within `diversity_range` of every home base.
    fn ensure_diversity(
        &self,
        store: &mut TerritoryStore,
        homes: &[(PlayerId, HexCoord)],
        rng: &mut dyn RngCore,
    ) -> Result<()> {
        let range = self.map.diversity_range;
        for &(player, home) in homes {
            for resource in ResourceType::TRADABLE {
                let area = store.grid().hexes_in_range(home, range);
                let present = area
                    .iter()
                    .any(|c| store.get_at(*c).is_some_and(|t| t.resource_type == resource));
                if present {
                    continue;
                }

                let candidates: Vec<HexCoord> = area
                    .iter()
                    .copied()
                    .filter(|c| self.is_replaceable(store, *c, homes))
                    .collect();
                if candidates.is_empty() {
                    tracing::warn!(%player, %resource, "No room to place missing resource");
                    continue;
                }
                let coord = candidates[rng.gen_range(0..candidates.len())];
                let value = store.get_at(coord).map_or(1, |t| t.resource_value);
                store.update(
                    TerritoryId::new(coord),
                    &TerritoryPatch::default().resource(resource, value),
                )?;
                tracing::debug!(%player, %resource, %coord, "Placed missing resource");
            }
        }
        Ok(())
    }

    /// Whether retyping `coord` keeps every home base's neighborhood diverse.
    fn is_replaceable(&self, store: &TerritoryStore, coord: HexCoord, homes: &[(PlayerId, HexCoord)]) -> bool {
        let Some(territory) = store.get_at(coord) else {
            return false;
        };
        if territory.is_home_base {
            return false;
        }
        let kind = territory.resource_type;
        if !ResourceType::TRADABLE.contains(&kind) {
            return true;
        }
        let range = self.map.diversity_range as i32;
        homes
            .iter()
            .filter(|(_, home)| home.distance(coord) <= range)
            .all(|(_, home)| {
                store
                    .grid()
                    .hexes_in_range(*home, self.map.diversity_range)
                    .iter()
                    .filter(|c| **c != coord)
                    .any(|c| store.get_at(*c).is_some_and(|t| t.resource_type == kind))
            })
    }

    fn mark_strategic_points(&self, store: &mut TerritoryStore) -> Result<()> {
        let points = store.grid().spiral(HexCoord::ORIGIN, self.map.strategic_radius);
        for coord in points {
            if store.get_at(coord).is_some_and(|t| !t.is_home_base) {
                store.update(TerritoryId::new(coord), &TerritoryPatch::default().strategic(true))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn generate(players: u8, radius: u32, seed: u64) -> TerritoryStore {
        let config = GameConfig::default()
            .with_players(players)
            .with_radius(radius)
            .with_seed(seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        MapGenerator::new(&config).generate(&mut rng).unwrap()
    }

    #[test]
    fn test_every_hex_has_a_territory() {
        let store = generate(2, 5, 1);
        assert_eq!(store.len(), store.grid().len());
        assert!(store.is_setup_complete());
    }

    #[test]
    fn test_home_bases_per_player() {
        for players in 2..=4u8 {
            let store = generate(players, 5, 42);
            for player in PlayerId::turn_order(players) {
                let owned = store.get_by_owner(player);
                assert_eq!(owned.len(), 1, "{player}");
                let home = owned[0];
                assert!(home.is_home_base);
                assert_eq!(home.coord.length(), 4);
                assert!(home.resource_value >= 2);
                assert_eq!(home.fortification_level, 2);
                assert!(ResourceType::TRADABLE.contains(&home.resource_type));
            }
        }
    }

    #[test]
    fn test_home_layout_is_symmetric() {
        let config = GameConfig::default().with_players(4);
        let homes = MapGenerator::new(&config).home_bases();
        let coords: Vec<HexCoord> = homes.iter().map(|(_, c)| *c).collect();
        for c in &coords {
            let mirrored = HexCoord::new(-c.q, -c.r);
            assert!(coords.contains(&mirrored), "{c} has no mirror");
        }
        assert_eq!(homes[0].0, PlayerId::Human);
    }

    #[test]
    fn test_home_neighbors_below_max_tier() {
        for seed in 0..20 {
            let store = generate(3, 5, seed);
            for home in store.iter().filter(|t| t.is_home_base) {
                for n in store.neighbors_of(home.id) {
                    assert!(n.resource_value < 3, "seed {seed}: {}", n.id);
                }
            }
        }
    }

    #[test]
    fn test_resource_diversity_near_home() {
        for seed in 0..20 {
            for players in 2..=4u8 {
                let store = generate(players, 4, seed);
                for home in store.iter().filter(|t| t.is_home_base) {
                    let area = store.grid().hexes_in_range(home.coord, 2);
                    for resource in ResourceType::TRADABLE {
                        assert!(
                            area.iter().any(|c| store.get_at(*c).unwrap().resource_type == resource),
                            "seed {seed}, {players} players: {resource} missing near {}",
                            home.id
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_strategic_points() {
        let store = generate(2, 5, 3);
        let points: Vec<_> = store.strategic_points().iter().map(|t| t.coord).collect();
        assert_eq!(points.len(), 7);
        assert!(points.contains(&HexCoord::ORIGIN));
        assert!(points.iter().all(|c| c.length() <= 1));
    }

    #[test]
    fn test_owners_sealed_after_generation() {
        let mut store = generate(2, 3, 3);
        let err = store
            .update(TerritoryId::at(0, 0), &TerritoryPatch::default().owner(PlayerId::Human))
            .unwrap_err();
        assert_eq!(err.code(), "ownership_requires_claim");
    }

    #[test]
    fn test_determinism() {
        let a = generate(3, 6, 99);
        let b = generate(3, 6, 99);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds() {
        let a = generate(2, 6, 1);
        let b = generate(2, 6, 2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_rejects_tiny_map() {
        let config = GameConfig::default().with_radius(1);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(MapGenerator::new(&config).generate(&mut rng).is_err());
    }

    #[test]
    fn test_stone_only_from_generation() {
        let stone = (0..10)
            .map(|seed| generate(2, 6, seed))
            .flat_map(|s| s.iter().cloned().collect::<Vec<_>>())
            .filter(|t| t.resource_type == ResourceType::Stone)
            .count();
        assert!(stone > 0);
    }
}
