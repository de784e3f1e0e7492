//! Data structures for game configuration.
//!
//! This module contains pure data structures that tune the rules: map size,
//! claim costs, resource weights, random events and victory thresholds. All
//! structs are designed to be deserialized from RON files.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! File loading is handled by `dominion_tools`.

mod game_config;
mod resource_table;

pub use game_config::{EconomyConfig, GameConfig, MapConfig, TurnConfig, VictoryConfig};
pub use resource_table::ResourceTable;
