//! The turn-phase state machine.
//!
//! A party's turn moves through phases:
//!
//! ```text
//! human:     ResourceCollection -> Action -> Resolution -> (end turn)
//! opponent:  OpponentTurn -> (end turn)
//! ```
//!
//! Entering a phase runs its work synchronously through the [`TurnWorld`]
//! hooks and then waits for the driver to call [`TurnEngine::advance`]. Every
//! phase transition advances the logical clock by one tick. Transitions take
//! `&mut self` and the hooks never see the engine, so one transition cannot
//! start inside another.
//!
//! The engine never decides the game is over. A collaborator evaluates
//! victory and calls [`TurnEngine::halt`].

use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::data::TurnConfig;
use crate::error::{GameError, Result, TurnError};
use crate::events::TurnEvent;
use crate::players::PlayerId;
use crate::random_event::{self, RandomEvent, RandomEventRecord};

/// One stage of a party's turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Production is added to the active player's pool.
    ResourceCollection,
    /// The player claims and spends.
    Action,
    /// End-of-turn effects and random events.
    Resolution,
    /// A computer opponent decides and acts.
    OpponentTurn,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ResourceCollection => "collection",
            Self::Action => "action",
            Self::Resolution => "resolution",
            Self::OpponentTurn => "opponent turn",
        })
    }
}

/// Whose turn it is and where in it we are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnState {
    /// Round number, starting at 1. Increments when play returns to the first party.
    pub turn_number: u32,
    /// Party whose turn it is.
    pub active_player: PlayerId,
    /// Current phase.
    pub phase: Phase,
}

/// Collaborators the state machine drives.
///
/// Hooks that fail are logged and the phase still advances, so a missing or
/// broken collaborator can never stall the game.
pub trait TurnWorld {
    /// Collect production for the active player.
    fn collect(&mut self, state: &TurnState) -> Result<()>;

    /// Resolve end-of-turn influence. Nothing to do by default.
    fn resolve_influence(&mut self, _state: &TurnState) -> Result<()> {
        Ok(())
    }

    /// Put a rolled random event into effect.
    fn apply_random_event(&mut self, state: &TurnState, event: &RandomEvent) -> Result<()>;

    /// Let the active computer opponent act.
    fn take_opponent_turn(&mut self, state: &TurnState) -> Result<()>;

    /// Advance the logical clock.
    fn advance_time(&mut self, ticks: u64);

    /// Randomness for event rolls.
    fn rng(&mut self) -> &mut dyn RngCore;
}

/// Owner of the [`TurnState`] and the random-event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEngine {
    config: TurnConfig,
    players: Vec<PlayerId>,
    state: Option<TurnState>,
    active_index: usize,
    halted: bool,
    event_log: Vec<RandomEventRecord>,
    #[serde(skip)]
    pending: Vec<TurnEvent>,
}

impl TurnEngine {
    /// Create an engine for `players` in turn order.
    ///
    /// # Panics
    ///
    /// Panics if `players` is empty or contains [`PlayerId::Neutral`].
    #[must_use]
    pub fn new(players: Vec<PlayerId>, config: TurnConfig) -> Self {
        assert!(!players.is_empty(), "TurnEngine needs at least one party");
        assert!(
            players.iter().all(|p| p.is_party()),
            "the neutral party never takes a turn"
        );
        Self {
            config,
            players,
            state: None,
            active_index: 0,
            halted: false,
            event_log: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Begin turn 1 in the first party's `Action` phase. Collection is skipped
    /// on the opening turn since territories were just assigned.
    pub fn start(&mut self) {
        let player = self.players[0];
        self.active_index = 0;
        self.halted = false;
        self.state = Some(TurnState {
            turn_number: 1,
            active_player: player,
            phase: Phase::Action,
        });
        tracing::debug!(%player, "Turn engine started");
        self.pending.push(TurnEvent::TurnStarted { turn: 1, player });
    }

    /// Current state, `None` before [`start`](Self::start).
    #[must_use]
    pub const fn state(&self) -> Option<&TurnState> {
        self.state.as_ref()
    }

    /// Parties in turn order.
    #[must_use]
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    /// Random events so far, oldest first.
    #[must_use]
    pub fn event_log(&self) -> &[RandomEventRecord] {
        &self.event_log
    }

    /// Stop auto-advancing. Further transitions fail with [`TurnError::Halted`].
    pub fn halt(&mut self) {
        if !self.halted {
            tracing::info!("Turn engine halted");
        }
        self.halted = true;
    }

    /// Whether [`halt`](Self::halt) was called.
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        self.halted
    }

    /// Move to the next phase, ending the turn where the phase map says so.
    ///
    /// `ResourceCollection → Action`, `Action → Resolution` for the human
    /// player (any other party ends the turn), `Resolution` and
    /// `OpponentTurn` end the turn.
    pub fn advance(&mut self, world: &mut dyn TurnWorld) -> std::result::Result<TurnState, TurnError> {
        let state = self.begin_transition()?;
        match state.phase {
            Phase::ResourceCollection => self.set_phase(world, Phase::Action),
            Phase::Action if state.active_player.is_human() => {
                self.set_phase(world, Phase::Resolution);
                self.enter_resolution(world);
            }
            Phase::Action | Phase::Resolution | Phase::OpponentTurn => self.rotate(world),
        }
        Ok(self.state.unwrap_or(state))
    }

    /// End the active party's turn regardless of phase.
    ///
    /// Rotates to the next party, bumps the turn number after a full round,
    /// and enters the new party's first phase.
    pub fn end_turn(&mut self, world: &mut dyn TurnWorld) -> std::result::Result<TurnState, TurnError> {
        let state = self.begin_transition()?;
        self.rotate(world);
        Ok(self.state.unwrap_or(state))
    }

    /// Check that restored state is one this engine could have reached
    /// playing `expected` in turn order.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] describing the first inconsistency.
    pub fn validate(&self, expected: &[PlayerId]) -> Result<()> {
        if self.players.is_empty() || self.players != expected {
            return Err(GameError::InvalidState(format!(
                "turn order {:?} does not match the seated parties {expected:?}",
                self.players
            )));
        }
        if self.active_index >= self.players.len() {
            return Err(GameError::InvalidState(format!(
                "active index {} is out of range for {} parties",
                self.active_index,
                self.players.len()
            )));
        }
        let Some(state) = self.state else {
            return Ok(());
        };
        if state.turn_number == 0 {
            return Err(GameError::InvalidState("turn numbers start at 1".into()));
        }
        let active = self.players[self.active_index];
        if state.active_player != active {
            return Err(GameError::InvalidState(format!(
                "active player {} does not match turn order position {active}",
                state.active_player
            )));
        }
        let opponent_phase = state.phase == Phase::OpponentTurn;
        if active.is_human() == opponent_phase {
            return Err(GameError::InvalidState(format!("{active} cannot be in phase {}", state.phase)));
        }
        Ok(())
    }

    /// Take the events raised since the last drain.
    pub fn drain_events(&mut self) -> Vec<TurnEvent> {
        std::mem::take(&mut self.pending)
    }

    fn begin_transition(&self) -> std::result::Result<TurnState, TurnError> {
        let state = self.state.ok_or(TurnError::NotStarted)?;
        if self.halted {
            return Err(TurnError::Halted);
        }
        Ok(state)
    }

    fn set_phase(&mut self, world: &mut dyn TurnWorld, phase: Phase) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let old_phase = state.phase;
        state.phase = phase;
        let player = state.active_player;
        tracing::debug!(turn = state.turn_number, %player, from = %old_phase, to = %phase, "Phase changed");
        self.pending.push(TurnEvent::PhaseChanged {
            old_phase,
            new_phase: phase,
            player,
        });
        world.advance_time(1);
    }

    fn rotate(&mut self, world: &mut dyn TurnWorld) {
        let Some(state) = self.state else {
            return;
        };
        self.pending.push(TurnEvent::TurnEnded {
            turn: state.turn_number,
            player: state.active_player,
        });

        self.active_index = (self.active_index + 1) % self.players.len();
        let player = self.players[self.active_index];
        let turn = if self.active_index == 0 {
            state.turn_number + 1
        } else {
            state.turn_number
        };
        if let Some(s) = self.state.as_mut() {
            s.turn_number = turn;
            s.active_player = player;
        }
        self.pending.push(TurnEvent::TurnStarted { turn, player });

        let first_phase = if player.is_human() {
            Phase::ResourceCollection
        } else {
            Phase::OpponentTurn
        };
        self.set_phase(world, first_phase);
        self.start_turn(world);
    }

    /// Run the entry action of the new party's first phase.
    fn start_turn(&mut self, world: &mut dyn TurnWorld) {
        let Some(state) = self.state else {
            return;
        };
        let outcome = match state.phase {
            Phase::ResourceCollection => world.collect(&state),
            Phase::OpponentTurn => world.take_opponent_turn(&state),
            Phase::Action | Phase::Resolution => Ok(()),
        };
        if let Err(err) = outcome {
            tracing::warn!(phase = %state.phase, player = %state.active_player, %err, "Phase action failed; continuing");
        }
    }

    fn enter_resolution(&mut self, world: &mut dyn TurnWorld) {
        let Some(state) = self.state else {
            return;
        };
        if let Err(err) = world.resolve_influence(&state) {
            tracing::warn!(%err, "Influence resolution failed; continuing");
        }

        let Some(kind) = random_event::roll(&self.config, state.turn_number, world.rng()) else {
            return;
        };
        let event = RandomEvent::materialize(kind, &self.config, world.rng());
        match world.apply_random_event(&state, &event) {
            Ok(()) => self.event_log.push(RandomEventRecord {
                turn: state.turn_number,
                player: state.active_player,
                event,
            }),
            Err(err) => tracing::warn!(%kind, %err, "Random event failed; continuing"),
        }
    }
}
