//! # Dominion Core
//!
//! Deterministic rules for a turn-based hex territory game.
//!
//! This crate contains **only** game logic:
//! - No rendering
//! - No IO
//! - No ambient randomness (every roll takes an injected RNG)
//! - No floating-point math in the rules (uses fixed-point)
//!
//! This separation enables:
//! - Headless simulation and balance runs
//! - Save games that continue identically after loading
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`hex`], [`grid`], [`pathfinding`] - Axial hex math and bounded maps
//! - [`store`] - Territory ownership and attributes
//! - [`economy`], [`effects`], [`ledger`], [`analytics`] - Resource pools,
//!   claim costs, timed effects and transaction history
//! - [`turn`], [`random_event`] - Turn and phase state machine
//! - [`map_generation`] - Seeded map layout
//! - [`victory`], [`opponent`] - Win conditions and computer strategies
//! - [`game`], [`save`] - The facade that ties it together
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod analytics;
pub mod data;
pub mod economy;
pub mod effects;
pub mod error;
pub mod events;
pub mod game;
pub mod grid;
pub mod hex;
pub mod ledger;
pub mod map_generation;
pub mod math;
pub mod opponent;
pub mod pathfinding;
pub mod players;
pub mod random_event;
pub mod resources;
pub mod save;
pub mod store;
pub mod territory;
pub mod turn;
pub mod victory;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::data::GameConfig;
    pub use crate::economy::{ClaimReceipt, ResourceEngine};
    pub use crate::effects::{Effect, Multiplier};
    pub use crate::error::{ClaimError, GameError, Result, StoreError, TransactionError, TurnError};
    pub use crate::events::{DomainEvent, EventSubscriber};
    pub use crate::game::Game;
    pub use crate::grid::HexGrid;
    pub use crate::hex::{HexCoord, HexLayout};
    pub use crate::math::Fixed;
    pub use crate::opponent::{FrontierOpponent, Opponent, OpponentAction, PassiveOpponent, RandomOpponent};
    pub use crate::players::PlayerId;
    pub use crate::resources::{ResourceType, Resources};
    pub use crate::save::SaveGame;
    pub use crate::store::TerritoryStore;
    pub use crate::territory::{Territory, TerritoryId, TerritoryPatch};
    pub use crate::turn::{Phase, TurnState};
    pub use crate::victory::{GameStatus, Victory, VictoryCondition};
}
