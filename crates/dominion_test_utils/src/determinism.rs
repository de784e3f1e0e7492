//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a game produces identical results
//! given identical inputs.
//!
//! # Testing Strategy
//!
//! Save games and balance runs rely on the rules being fully reproducible.
//! Sources of non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   Rule math uses fixed-point arithmetic via [`dominion_core::math::Fixed`].
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Core state lives in ordered maps and is iterated in key order.
//!
//! - **Ambient randomness**: Every roll draws from the game's seeded RNG,
//!   which is part of the saved state.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual component determinism (map generation, costs)
//! 2. **Property tests**: Random inputs must still produce deterministic outputs
//! 3. **Integration tests**: Full games are reproducible, including across save/load
//! 4. **Parallel tests**: Running N games on separate threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use dominion_core::data::GameConfig;
use dominion_core::game::Game;
use dominion_core::save::SaveGame;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps taken per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic game).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Game is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
///
/// # Example
///
/// ```ignore
/// use dominion_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(
///     5,  // Run 5 times
///     40, // 40 phase transitions each
///     || started_game(7),
///     |game| { let _ = game.advance(); },
///     |game| game.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..steps {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Advance a game one phase, ignoring the error a finished game returns.
pub fn step_game(game: &mut Game) {
    let _ = game.advance();
}

/// Play the same configuration twice and compare final state hashes.
///
/// # Panics
///
/// Panics if `config` is rejected or the game cannot start.
pub fn verify_game_determinism(config: &GameConfig, steps: u64) -> bool {
    verify_determinism(
        2,
        steps,
        || {
            let mut game = Game::new(config.clone()).expect("config is valid");
            game.start().expect("fresh game starts");
            game
        },
        step_game,
        Game::state_hash,
    )
    .is_deterministic
}

/// Result of parallel game runs.
#[derive(Debug, Clone)]
pub struct ParallelRunResult {
    /// Final state hash from each game.
    pub hashes: Vec<u64>,
    /// Number of steps each game ran.
    pub steps: u64,
    /// Number of games run.
    pub num_games: usize,
}

impl ParallelRunResult {
    /// Check if all games produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all games matched.
    ///
    /// # Panics
    ///
    /// Panics if games produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel games diverged!\n\
                 Games: {}\n\
                 Steps: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_games,
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run N games on scoped threads and collect final hashes.
///
/// Each game is built inside its own thread.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_games<F>(setup_fn: F, num_games: usize, steps: u64) -> ParallelRunResult
where
    F: Fn() -> Game + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_games)
            .map(|_| {
                s.spawn(|| {
                    let mut game = setup_fn();
                    for _ in 0..steps {
                        step_game(&mut game);
                    }
                    game.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("game thread panicked"))
            .collect()
    });

    ParallelRunResult {
        hashes,
        steps,
        num_games,
    }
}

/// Compare two runs step by step, finding the first divergence.
///
/// # Returns
///
/// `None` if the games stay identical, `Some(step)` if they diverge at that
/// step (0 means the initial states already differ).
pub fn find_first_divergence<F>(setup_fn: F, steps: u64) -> Option<u64>
where
    F: Fn() -> Game,
{
    let mut game1 = setup_fn();
    let mut game2 = setup_fn();

    if game1.state_hash() != game2.state_hash() {
        return Some(0);
    }

    for step in 1..=steps {
        step_game(&mut game1);
        step_game(&mut game2);

        if game1.state_hash() != game2.state_hash() {
            tracing::debug!(step, "Games diverged");
            return Some(step);
        }
    }

    None
}

/// Verify that a save round trip preserves the game exactly and that the
/// loaded game keeps playing identically for `after` more steps.
pub fn verify_save_determinism<F>(setup_fn: F, before: u64, after: u64) -> bool
where
    F: Fn() -> Game,
{
    let mut game = setup_fn();
    for _ in 0..before {
        step_game(&mut game);
    }

    let Ok(bytes) = game.save().to_bytes() else {
        return false;
    };
    let Ok(mut restored) = SaveGame::from_bytes(&bytes).and_then(Game::load) else {
        return false;
    };

    for _ in 0..=after {
        if restored.state_hash() != game.state_hash() {
            return false;
        }
        step_game(&mut game);
        step_game(&mut restored);
    }
    true
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of the game rules.
pub mod strategies {
    use dominion_core::data::GameConfig;
    use dominion_core::hex::HexCoord;
    use dominion_core::players::PlayerId;
    use dominion_core::resources::{ResourceType, Resources};
    use proptest::prelude::*;

    /// Generate an axial coordinate with both components in `-span..=span`.
    pub fn arb_hex_coord(span: i32) -> impl Strategy<Value = HexCoord> {
        (-span..=span, -span..=span).prop_map(|(q, r)| HexCoord::new(q, r))
    }

    /// Generate a coordinate inside a grid of `radius`.
    pub fn arb_coord_within(radius: u32) -> impl Strategy<Value = HexCoord> {
        let span = i32::try_from(radius).unwrap_or(i32::MAX);
        arb_hex_coord(span).prop_filter("inside the grid", move |c| {
            c.distance(HexCoord::ORIGIN) <= span
        })
    }

    /// Generate a grid radius (2-8).
    pub fn arb_radius() -> impl Strategy<Value = u32> {
        2u32..=8u32
    }

    /// Generate a game seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }

    /// Generate one of the tradable resource types.
    pub fn arb_tradable() -> impl Strategy<Value = ResourceType> {
        prop::sample::select(ResourceType::TRADABLE.to_vec())
    }

    /// Generate a non-negative bundle of tradable resources.
    pub fn arb_pool(max: i64) -> impl Strategy<Value = Resources> {
        prop::collection::vec(0..=max, 4).prop_map(|amounts| {
            ResourceType::TRADABLE.iter().copied().zip(amounts).collect()
        })
    }

    /// Generate a party of a game with `players` parties.
    pub fn arb_party(players: u8) -> impl Strategy<Value = PlayerId> {
        prop::sample::select(PlayerId::turn_order(players))
    }

    /// Generate a valid game configuration.
    pub fn arb_config() -> impl Strategy<Value = GameConfig> {
        (arb_seed(), 2u8..=4u8, 3u32..=7u32).prop_map(|(seed, players, radius)| {
            GameConfig::default()
                .with_seed(seed)
                .with_players(players)
                .with_radius(radius)
        })
    }
}
