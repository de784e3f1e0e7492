//! JSON-friendly summaries of games.
//!
//! Core maps are keyed by enums, which JSON cannot express, so summaries
//! re-key everything by display name.

use std::collections::BTreeMap;

use dominion_core::game::Game;
use dominion_core::players::PlayerId;
use dominion_core::resources::Resources;
use serde::{Deserialize, Serialize};

/// Outcome and final state of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    /// Seed the game was created with.
    pub seed: u64,
    /// Number of parties.
    pub players: u8,
    /// Turn the game stopped on.
    pub turns: u32,
    /// Final status.
    pub status: String,
    /// Winner, if any.
    pub winner: Option<String>,
    /// How the winner won.
    pub condition: Option<String>,
    /// Human-readable victory details.
    pub details: Option<String>,
    /// Territories held per party.
    pub territories: BTreeMap<String, usize>,
    /// Final pool per party.
    pub pools: BTreeMap<String, BTreeMap<String, i64>>,
    /// Number of random events that fired.
    pub random_events: usize,
    /// Final state hash, for determinism checks.
    pub state_hash: u64,
}

impl GameSummary {
    /// Summarize `game` as it stands.
    #[must_use]
    pub fn from_game(game: &Game) -> Self {
        let victory = game.victory();
        let parties = game.players();
        let territories = parties
            .iter()
            .map(|p| (p.to_string(), game.territories().count_by_owner(*p)))
            .collect();
        let pools = parties
            .iter()
            .filter_map(|p| game.resources(*p).map(|pool| (p.to_string(), named(pool))))
            .collect();

        Self {
            seed: game.config().seed,
            players: u8::try_from(parties.len()).unwrap_or(u8::MAX),
            turns: game.turn_state().map_or(0, |s| s.turn_number),
            status: game.status().to_string(),
            winner: victory.map(|v| v.winner.to_string()),
            condition: victory.map(|v| v.condition.to_string()),
            details: victory.map(|v| v.details.clone()),
            territories,
            pools,
            random_events: game.random_events().len(),
            state_hash: game.state_hash(),
        }
    }
}

/// Aggregate of many games.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Games played.
    pub games: usize,
    /// Wins per party.
    pub wins: BTreeMap<String, usize>,
    /// Wins per victory condition.
    pub conditions: BTreeMap<String, usize>,
    /// Games that hit the turn limit.
    pub unfinished: usize,
    /// Mean final turn.
    pub avg_turns: f64,
}

impl BatchSummary {
    /// Aggregate `results`.
    #[must_use]
    pub fn from_games(results: &[GameSummary]) -> Self {
        let mut summary = Self {
            games: results.len(),
            ..Self::default()
        };
        for result in results {
            match (&result.winner, &result.condition) {
                (Some(winner), Some(condition)) => {
                    *summary.wins.entry(winner.clone()).or_default() += 1;
                    *summary.conditions.entry(condition.clone()).or_default() += 1;
                }
                _ => summary.unfinished += 1,
            }
        }
        if !results.is_empty() {
            let turns: u64 = results.iter().map(|r| u64::from(r.turns)).sum();
            summary.avg_turns = turns as f64 / results.len() as f64;
        }
        summary
    }

    /// Share of games won by `player`, 0.0 to 1.0.
    #[must_use]
    pub fn win_rate(&self, player: PlayerId) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        let wins = self.wins.get(&player.to_string()).copied().unwrap_or(0);
        wins as f64 / self.games as f64
    }
}

fn named(pool: &Resources) -> BTreeMap<String, i64> {
    pool.iter().map(|(t, a)| (t.name().to_string(), a)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dominion_test_utils::fixtures::started_game;

    #[test]
    fn test_summary_of_fresh_game() {
        let game = started_game(3);
        let summary = GameSummary::from_game(&game);
        assert_eq!(summary.seed, 3);
        assert_eq!(summary.turns, 1);
        assert_eq!(summary.territories.get("Player"), Some(&1));
        assert_eq!(summary.pools["Player"].get("gold"), Some(&10));
        assert!(summary.winner.is_none());

        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"Opponent 1\""));
    }

    #[test]
    fn test_batch_aggregation() {
        let mut a = GameSummary::from_game(&started_game(1));
        a.winner = Some("Player".into());
        a.condition = Some("economic".into());
        a.turns = 10;
        let mut b = a.clone();
        b.winner = None;
        b.condition = None;
        b.turns = 20;

        let batch = BatchSummary::from_games(&[a, b]);
        assert_eq!(batch.games, 2);
        assert_eq!(batch.unfinished, 1);
        assert!((batch.avg_turns - 15.0).abs() < f64::EPSILON);
        assert!((batch.win_rate(PlayerId::Human) - 0.5).abs() < f64::EPSILON);
    }
}
