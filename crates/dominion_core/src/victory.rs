//! Victory conditions.
//!
//! Evaluated by the game after every claim and turn change. The turn engine
//! knows nothing about winning; it is simply halted once a winner exists.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::VictoryConfig;
use crate::economy::ResourceEngine;
use crate::players::PlayerId;
use crate::store::TerritoryStore;

/// Lifecycle of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Map built, turns not started.
    Setup,
    /// Turns are being played.
    InProgress,
    /// Someone won.
    Finished,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Setup => "setup",
            Self::InProgress => "in progress",
            Self::Finished => "finished",
        })
    }
}

/// The ways to win, in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VictoryCondition {
    /// Only one party still holds land.
    Elimination,
    /// Owns the configured share of all territories.
    Territorial,
    /// Holds every strategic point.
    Strategic,
    /// Has stockpiled the configured total of resources.
    Economic,
}

impl fmt::Display for VictoryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Elimination => "elimination",
            Self::Territorial => "territorial",
            Self::Strategic => "strategic",
            Self::Economic => "economic",
        })
    }
}

/// A met victory condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Victory {
    /// Winning party.
    pub winner: PlayerId,
    /// Condition met.
    pub condition: VictoryCondition,
    /// Human-readable summary.
    pub details: String,
}

/// Checks the victory conditions against the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VictoryEvaluator {
    config: VictoryConfig,
}

impl VictoryEvaluator {
    /// Create an evaluator with the given thresholds.
    #[must_use]
    pub const fn new(config: VictoryConfig) -> Self {
        Self { config }
    }

    /// The first met condition, checking conditions in [`VictoryCondition`]
    /// order and parties in turn order.
    #[must_use]
    pub fn evaluate(
        &self,
        parties: &[PlayerId],
        store: &TerritoryStore,
        economy: &ResourceEngine,
    ) -> Option<Victory> {
        let counts = store.ownership_counts();
        let owned = |p: PlayerId| counts.get(&p).copied().unwrap_or(0);

        let landed: Vec<PlayerId> = parties.iter().copied().filter(|p| owned(*p) > 0).collect();
        if parties.len() > 1 && landed.len() == 1 {
            let winner = landed[0];
            return Some(Victory {
                winner,
                condition: VictoryCondition::Elimination,
                details: format!("{winner} is the last party holding territory"),
            });
        }

        let total = store.len();
        let share = usize::from(self.config.territory_share_percent);
        if total > 0 {
            if let Some(&winner) = parties.iter().find(|p| owned(**p) * 100 >= share * total) {
                return Some(Victory {
                    winner,
                    condition: VictoryCondition::Territorial,
                    details: format!("{winner} controls {} of {total} territories", owned(winner)),
                });
            }
        }

        if self.config.strategic_points {
            let points = store.strategic_points();
            if let Some(first) = points.first() {
                let holder = first.owner;
                if holder.is_party() && points.iter().all(|t| t.owner == holder) {
                    return Some(Victory {
                        winner: holder,
                        condition: VictoryCondition::Strategic,
                        details: format!("{holder} holds all {} strategic points", points.len()),
                    });
                }
            }
        }

        parties
            .iter()
            .copied()
            .find_map(|p| {
                let total = economy.pool(p)?.total();
                (total >= self.config.economic_threshold).then_some((p, total))
            })
            .map(|(winner, total)| Victory {
                winner,
                condition: VictoryCondition::Economic,
                details: format!("{winner} has stockpiled {total} resources"),
            })
    }
}
