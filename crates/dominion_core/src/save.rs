//! Save games.
//!
//! A [`SaveGame`] captures everything needed to continue a game exactly
//! where it stopped, including the RNG position, so a loaded game plays out
//! identically to one that was never saved. Opponent strategies are not
//! saved; a loaded game starts with the default strategy for every seat.
//!
//! Two encodings are offered: RON for human-readable saves and bincode for
//! compact ones. File handling is left to the caller.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::data::GameConfig;
use crate::economy::ResourceEngine;
use crate::error::{GameError, Result};
use crate::game::Game;
use crate::grid::HexGrid;
use crate::players::PlayerId;
use crate::store::TerritoryStore;
use crate::territory::Territory;
use crate::turn::TurnEngine;
use crate::victory::{GameStatus, Victory};

/// Save format version for compatibility.
pub const SAVE_VERSION: u32 = 1;

/// Position of a [`ChaCha8Rng`] stream.
///
/// The 128-bit word position is split so every text format can carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    /// Seed the generator was created from.
    pub seed: [u8; 32],
    /// Stream number.
    pub stream: u64,
    /// High half of the word position.
    pub word_pos_hi: u64,
    /// Low half of the word position.
    pub word_pos_lo: u64,
}

impl RngState {
    /// Capture the position of `rng`.
    #[must_use]
    pub fn capture(rng: &ChaCha8Rng) -> Self {
        let pos = rng.get_word_pos();
        Self {
            seed: rng.get_seed(),
            stream: rng.get_stream(),
            word_pos_hi: (pos >> 64) as u64,
            word_pos_lo: pos as u64,
        }
    }

    /// A generator at the captured position.
    #[must_use]
    pub fn restore(&self) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::from_seed(self.seed);
        rng.set_stream(self.stream);
        rng.set_word_pos((u128::from(self.word_pos_hi) << 64) | u128::from(self.word_pos_lo));
        rng
    }
}

/// Complete saved game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveGame {
    /// Save format version.
    pub version: u32,
    /// Configuration the game was created with.
    pub config: GameConfig,
    /// Game status.
    pub status: GameStatus,
    /// Victory, if the game is over.
    pub victory: Option<Victory>,
    /// Turn state machine and random-event log.
    pub turns: TurnEngine,
    /// Pools, multipliers, effects and ledger.
    pub economy: ResourceEngine,
    /// Every territory in id order.
    pub territories: Vec<Territory>,
    /// Whether map setup was sealed.
    pub setup_complete: bool,
    /// Position of the game RNG.
    pub rng: RngState,
}

impl SaveGame {
    /// Encode as pretty RON.
    pub fn to_ron(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| GameError::Serialization(format!("Failed to encode save: {e}")))
    }

    /// Decode from RON, checking the version.
    pub fn from_ron(text: &str) -> Result<Self> {
        let save: Self = ron::from_str(text)
            .map_err(|e| GameError::Serialization(format!("Failed to decode save: {e}")))?;
        save.check_version()
    }

    /// Encode with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::Serialization(format!("Failed to encode save: {e}")))
    }

    /// Decode from bincode, checking the version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let save: Self = bincode::deserialize(bytes)
            .map_err(|e| GameError::Serialization(format!("Failed to decode save: {e}")))?;
        save.check_version()
    }

    fn check_version(self) -> Result<Self> {
        if self.version != SAVE_VERSION {
            return Err(GameError::VersionMismatch {
                expected: SAVE_VERSION,
                found: self.version,
            });
        }
        Ok(self)
    }
}

impl Game {
    /// Capture the full game state.
    #[must_use]
    pub fn save(&self) -> SaveGame {
        SaveGame {
            version: SAVE_VERSION,
            config: self.config.clone(),
            status: self.status,
            victory: self.victory.clone(),
            turns: self.turns.clone(),
            economy: self.economy.clone(),
            territories: self.store.iter().cloned().collect(),
            setup_complete: self.store.is_setup_complete(),
            rng: RngState::capture(&self.rng),
        }
    }

    /// Rebuild a game from a save.
    ///
    /// # Errors
    ///
    /// Fails on a version mismatch, an invalid configuration, territories
    /// that do not cover the configured map, or turn and pool state that no
    /// game with this configuration could reach.
    pub fn load(save: SaveGame) -> Result<Self> {
        let save = save.check_version()?;
        save.config.validate()?;

        let parties = PlayerId::turn_order(save.config.players);
        save.turns.validate(&parties)?;
        save.economy.validate(&parties)?;
        if save.status == GameStatus::InProgress && save.turns.state().is_none() {
            return Err(GameError::InvalidState(
                "game in progress without a turn state".into(),
            ));
        }

        let grid = HexGrid::new(save.config.map_radius);
        let table = save.config.economy.resource_table.clone();
        let store = TerritoryStore::from_parts(grid, table, save.territories, save.setup_complete)?;
        if !store.is_setup_complete() || !store.covers_grid() {
            return Err(GameError::InvalidState(format!(
                "saved map must be sealed and cover all {} hexes of radius {}",
                store.grid().len(),
                save.config.map_radius
            )));
        }

        tracing::info!(turn = ?save.turns.state().map(|s| s.turn_number), "Game loaded");
        Ok(Self::assemble(
            save.config,
            store,
            save.economy,
            save.turns,
            save.rng.restore(),
            save.status,
            save.victory,
        ))
    }
}
