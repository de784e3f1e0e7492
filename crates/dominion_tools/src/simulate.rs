//! Headless game runner.
//!
//! Plays whole games with computer strategies in every seat. Batches run in
//! parallel with rayon; each game is built, played and summarized on one
//! worker, so results do not depend on scheduling.

use dominion_core::data::GameConfig;
use dominion_core::game::Game;
use dominion_core::opponent::{FrontierOpponent, Opponent, PassiveOpponent, RandomOpponent};
use dominion_core::turn::Phase;
use dominion_core::victory::GameStatus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::report::{BatchSummary, GameSummary};

/// Built-in strategies selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum StrategyKind {
    /// Claim a random affordable neutral territory.
    #[default]
    Random,
    /// Claim the cheapest affordable territory bordering own land.
    Frontier,
    /// Never claim.
    Passive,
}

impl StrategyKind {
    /// A fresh strategy instance.
    #[must_use]
    pub fn build(self) -> Box<dyn Opponent> {
        match self {
            Self::Random => Box::new(RandomOpponent),
            Self::Frontier => Box::new(FrontierOpponent),
            Self::Passive => Box::new(PassiveOpponent),
        }
    }
}

/// How to play a headless game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationOptions {
    /// Strategy for the human seat.
    pub human: StrategyKind,
    /// Strategy for every computer opponent.
    pub opponents: StrategyKind,
    /// Stop after this many turns if nobody has won.
    pub max_turns: u32,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            human: StrategyKind::Frontier,
            opponents: StrategyKind::Random,
            max_turns: 100,
        }
    }
}

/// Set up a game for headless play.
pub fn prepare_game(config: GameConfig, options: &SimulationOptions) -> Result<Game> {
    let mut game = Game::new(config)?;
    let opponents: Vec<_> = game.players().iter().copied().filter(|p| !p.is_human()).collect();
    for player in opponents {
        game.set_opponent(player, options.opponents.build())?;
    }
    game.start()?;
    Ok(game)
}

/// Play `game` until someone wins or the turn limit is reached.
pub fn play(game: &mut Game, options: &SimulationOptions) -> Result<()> {
    let mut human = options.human.build();
    while game.status() == GameStatus::InProgress {
        let Some(state) = game.turn_state() else {
            break;
        };
        if state.turn_number > options.max_turns {
            debug!(turn = state.turn_number, "Turn limit reached");
            break;
        }
        if state.active_player.is_human() && state.phase == Phase::Action {
            if let Err(err) = game.act_with(human.as_mut()) {
                debug!(%err, "Human seat action rejected");
            }
            if game.status() != GameStatus::InProgress {
                break;
            }
        }
        game.advance()?;
    }
    Ok(())
}

/// Create, play and summarize one game.
pub fn run_game(config: GameConfig, options: &SimulationOptions) -> Result<GameSummary> {
    let mut game = prepare_game(config, options)?;
    play(&mut game, options)?;
    let summary = GameSummary::from_game(&game);
    debug!(seed = summary.seed, winner = ?summary.winner, turns = summary.turns, "Game finished");
    Ok(summary)
}

/// Play `count` games with consecutive seeds starting at `seed_start`.
pub fn run_batch(
    config: &GameConfig,
    count: u64,
    seed_start: u64,
    options: &SimulationOptions,
) -> Result<(Vec<GameSummary>, BatchSummary)> {
    info!(count, seed_start, "Starting batch");
    let results = (0..count)
        .into_par_iter()
        .map(|i| run_game(config.clone().with_seed(seed_start.wrapping_add(i)), options))
        .collect::<Result<Vec<_>>>()?;
    let summary = BatchSummary::from_games(&results);
    info!(games = summary.games, unfinished = summary.unfinished, "Batch complete");
    Ok((results, summary))
}
