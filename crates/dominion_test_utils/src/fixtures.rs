//! Test fixtures and helpers.
//!
//! Pre-built configurations, maps and games for consistent testing.

use dominion_core::data::{EconomyConfig, GameConfig, ResourceTable};
use dominion_core::economy::ResourceEngine;
use dominion_core::game::Game;
use dominion_core::grid::HexGrid;
use dominion_core::hex::HexCoord;
use dominion_core::players::PlayerId;
use dominion_core::resources::{ResourceType, Resources};
use dominion_core::store::TerritoryStore;
use dominion_core::territory::TerritoryPatch;
use fixed::types::I32F32;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real game code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// A seeded RNG.
#[must_use]
pub fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Default configuration with a fixed seed.
#[must_use]
pub fn config(seed: u64) -> GameConfig {
    GameConfig::default().with_seed(seed)
}

/// A started two-player game.
///
/// # Panics
///
/// Panics if the default configuration is rejected.
#[must_use]
pub fn started_game(seed: u64) -> Game {
    let mut game = Game::new(config(seed)).expect("default config is valid");
    game.start().expect("fresh game starts");
    game
}

/// An unsealed store where every hex produces `value` of `kind`.
///
/// # Panics
///
/// Panics if `value` is zero.
#[must_use]
pub fn uniform_store(radius: u32, kind: ResourceType, value: u32) -> TerritoryStore {
    let mut store = TerritoryStore::new(HexGrid::new(radius), ResourceTable::fixed(kind, value));
    let mut rng = rng(0);
    let coords: Vec<HexCoord> = store.grid().coords().collect();
    for coord in coords {
        store
            .create_or_get(coord, TerritoryPatch::default(), &mut rng)
            .expect("coordinate is on the grid");
    }
    store
}

/// Give `player` the territories at `coords`. Only valid before setup is sealed.
///
/// # Panics
///
/// Panics if a coordinate is not in the store.
pub fn assign(store: &mut TerritoryStore, player: PlayerId, coords: &[HexCoord]) {
    for &coord in coords {
        store
            .update(coord.into(), &TerritoryPatch::default().owner(player))
            .expect("territory exists during setup");
    }
}

/// An engine with default economy rules and the given parties.
#[must_use]
pub fn engine_with(parties: &[(PlayerId, Resources)]) -> ResourceEngine {
    let mut engine = ResourceEngine::new(EconomyConfig::default());
    for (player, pool) in parties {
        engine.register_player(*player, pool.clone());
    }
    engine
}

/// A pool with `amount` of every tradable resource.
#[must_use]
pub fn flat_pool(amount: i64) -> Resources {
    ResourceType::TRADABLE.iter().map(|&t| (t, amount)).collect()
}
