//! The game facade.
//!
//! [`Game`] owns every core component plus the seeded RNG and the event bus,
//! and is the surface collaborators drive: claims, phase advances, opponent
//! turns, queries, subscriptions and save/load.
//!
//! Ownership is one-directional. The turn engine drives a short-lived
//! [`TurnWorld`] that borrows the economy and the territory map for the
//! duration of one transition; nothing holds a reference back to the game.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::data::GameConfig;
use crate::economy::{ClaimReceipt, ResourceEngine};
use crate::error::{GameError, Result};
use crate::events::{DomainEvent, EventBus, EventSubscriber, GameEvent, SubscriberId};
use crate::map_generation::MapGenerator;
use crate::opponent::{GameView, Opponent, OpponentAction, RandomOpponent};
use crate::players::PlayerId;
use crate::random_event::{RandomEvent, RandomEventRecord};
use crate::resources::Resources;
use crate::store::TerritoryStore;
use crate::territory::TerritoryId;
use crate::turn::{Phase, TurnEngine, TurnState, TurnWorld};
use crate::victory::{GameStatus, Victory, VictoryEvaluator};

/// A complete game: map, economy, turns, opponents and events.
pub struct Game {
    pub(crate) config: GameConfig,
    pub(crate) store: TerritoryStore,
    pub(crate) economy: ResourceEngine,
    pub(crate) turns: TurnEngine,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) status: GameStatus,
    pub(crate) victory: Option<Victory>,
    opponents: BTreeMap<PlayerId, Box<dyn Opponent>>,
    evaluator: VictoryEvaluator,
    bus: EventBus,
}

impl Game {
    /// Generate a map and set up every party from `config`.
    ///
    /// All opponents start with [`RandomOpponent`].
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid.
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let store = MapGenerator::new(&config).generate(&mut rng)?;

        let players = PlayerId::turn_order(config.players);
        let mut economy = ResourceEngine::new(config.economy.clone());
        for &player in &players {
            economy.register_player(player, config.starting_resources.clone());
        }
        let turns = TurnEngine::new(players, config.turns.clone());

        let mut game = Self::assemble(config, store, economy, turns, rng, GameStatus::Setup, None);
        game.flush_events();
        tracing::info!(seed = game.config.seed, players = game.config.players, "Game created");
        Ok(game)
    }

    pub(crate) fn assemble(
        config: GameConfig,
        store: TerritoryStore,
        economy: ResourceEngine,
        turns: TurnEngine,
        rng: ChaCha8Rng,
        status: GameStatus,
        victory: Option<Victory>,
    ) -> Self {
        let opponents = turns
            .players()
            .iter()
            .filter(|p| !p.is_human())
            .map(|&p| (p, Box::new(RandomOpponent) as Box<dyn Opponent>))
            .collect();
        let evaluator = VictoryEvaluator::new(config.victory.clone());
        Self {
            config,
            store,
            economy,
            turns,
            rng,
            status,
            victory,
            opponents,
            evaluator,
            bus: EventBus::new(),
        }
    }

    /// Begin turn 1.
    ///
    /// # Errors
    ///
    /// Fails if the game was already started.
    pub fn start(&mut self) -> Result<()> {
        if self.status != GameStatus::Setup {
            return Err(GameError::InvalidState(format!("cannot start a game that is {}", self.status)));
        }
        self.turns.start();
        self.economy.set_turn(1);
        self.set_status(GameStatus::InProgress);
        self.flush_events();
        Ok(())
    }

    /// Replace the strategy of a computer opponent.
    ///
    /// # Errors
    ///
    /// Fails if `player` is not a computer opponent in this game.
    pub fn set_opponent(&mut self, player: PlayerId, opponent: Box<dyn Opponent>) -> Result<()> {
        match self.opponents.get_mut(&player) {
            Some(slot) => {
                tracing::debug!(%player, strategy = opponent.name(), "Opponent strategy set");
                *slot = opponent;
                Ok(())
            }
            None => Err(GameError::InvalidState(format!("{player} is not a computer opponent"))),
        }
    }

    /// Register an event subscriber.
    pub fn subscribe(&mut self, subscriber: Box<dyn EventSubscriber>) -> SubscriberId {
        self.bus.subscribe(subscriber)
    }

    /// Remove an event subscriber.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Recent events, oldest first.
    pub fn event_history(&self) -> impl Iterator<Item = &DomainEvent> + '_ {
        self.bus.history()
    }

    /// The configuration the game was created with.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The territory map.
    #[must_use]
    pub const fn territories(&self) -> &TerritoryStore {
        &self.store
    }

    /// The resource engine.
    #[must_use]
    pub const fn economy(&self) -> &ResourceEngine {
        &self.economy
    }

    /// Current turn state, `None` before [`start`](Self::start).
    #[must_use]
    pub fn turn_state(&self) -> Option<TurnState> {
        self.turns.state().copied()
    }

    /// Parties in turn order.
    #[must_use]
    pub fn players(&self) -> &[PlayerId] {
        self.turns.players()
    }

    /// Game status.
    #[must_use]
    pub const fn status(&self) -> GameStatus {
        self.status
    }

    /// The victory that ended the game, if any.
    #[must_use]
    pub const fn victory(&self) -> Option<&Victory> {
        self.victory.as_ref()
    }

    /// Random events so far.
    #[must_use]
    pub fn random_events(&self) -> &[RandomEventRecord] {
        self.turns.event_log()
    }

    /// Pool of `player`.
    #[must_use]
    pub fn resources(&self, player: PlayerId) -> Option<&Resources> {
        self.economy.pool(player)
    }

    /// What `player` would pay for territory `id`.
    #[must_use]
    pub fn claim_cost(&self, id: TerritoryId, player: PlayerId) -> Option<Resources> {
        let territory = self.store.get(id)?;
        Some(self.economy.claim_cost(territory, player, &self.store))
    }

    /// Read-only view from `player`'s seat.
    #[must_use]
    pub fn view(&self, player: PlayerId) -> Option<GameView<'_>> {
        let state = self.turn_state()?;
        Some(GameView::new(player, state, &self.store, &self.economy))
    }

    /// Claim territory `id` for the human player.
    pub fn claim_territory(&mut self, id: TerritoryId) -> Result<ClaimReceipt> {
        self.claim_for(PlayerId::Human, id)
    }

    /// Claim territory `id` for the active party.
    ///
    /// # Errors
    ///
    /// Fails if the game is not in progress, `player` is not the active party
    /// or is outside its acting phase, or the claim transaction fails.
    pub fn claim_for(&mut self, player: PlayerId, id: TerritoryId) -> Result<ClaimReceipt> {
        let state = self.require_in_progress()?;
        let acting = matches!(state.phase, Phase::Action | Phase::OpponentTurn);
        if state.active_player != player || !acting {
            return Err(GameError::InvalidState(format!(
                "{player} cannot claim during {}'s {} phase",
                state.active_player, state.phase
            )));
        }

        self.economy.set_turn(state.turn_number);
        let outcome = self.economy.claim_territory(id, player, &mut self.store);
        self.flush_events();
        let receipt = outcome?;
        self.check_victory();
        Ok(receipt)
    }

    /// Let `strategy` decide for the active party and carry out its choice.
    ///
    /// This is how a headless driver plays the human seat.
    pub fn act_with(&mut self, strategy: &mut dyn Opponent) -> Result<OpponentAction> {
        let state = self.require_in_progress()?;
        let view = GameView::new(state.active_player, state, &self.store, &self.economy);
        let action = strategy.decide(&view, &mut self.rng);
        if let OpponentAction::Claim(id) = action {
            self.claim_for(state.active_player, id)?;
        }
        Ok(action)
    }

    /// Advance to the next phase.
    pub fn advance(&mut self) -> Result<TurnState> {
        self.require_in_progress()?;
        let Self { turns, store, economy, opponents, rng, .. } = self;
        let mut world = GameWorld { store, economy, opponents, rng };
        let outcome = turns.advance(&mut world);
        self.after_transition(outcome)
    }

    /// End the active party's turn.
    pub fn end_turn(&mut self) -> Result<TurnState> {
        self.require_in_progress()?;
        let Self { turns, store, economy, opponents, rng, .. } = self;
        let mut world = GameWorld { store, economy, opponents, rng };
        let outcome = turns.end_turn(&mut world);
        self.after_transition(outcome)
    }

    /// Advance through computer opponents' turns until the human is active
    /// again or the game ends. Returns how many transitions were made.
    pub fn run_opponents(&mut self) -> Result<usize> {
        let mut transitions = 0;
        while self.status == GameStatus::InProgress {
            match self.turn_state() {
                Some(state) if !state.active_player.is_human() => {
                    self.advance()?;
                    transitions += 1;
                }
                _ => break,
            }
        }
        Ok(transitions)
    }

    /// Hash of all rule-relevant state. Equal games hash equal.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.status.hash(&mut hasher);
        self.turns.state().hash(&mut hasher);
        self.turns.event_log().len().hash(&mut hasher);
        self.economy.tick().hash(&mut hasher);

        for player in self.players() {
            player.hash(&mut hasher);
            self.economy.pool(*player).hash(&mut hasher);
        }
        for territory in self.store.iter() {
            territory.hash(&mut hasher);
        }
        self.economy.effects().hash(&mut hasher);
        self.economy.ledger().len().hash(&mut hasher);

        hasher.finish()
    }

    fn require_in_progress(&self) -> Result<TurnState> {
        if self.status != GameStatus::InProgress {
            return Err(GameError::InvalidState(format!("game is {}", self.status)));
        }
        self.turn_state()
            .ok_or_else(|| GameError::InvalidState("turns have not started".into()))
    }

    fn after_transition(
        &mut self,
        outcome: std::result::Result<TurnState, crate::error::TurnError>,
    ) -> Result<TurnState> {
        self.flush_events();
        let state = outcome?;
        #[cfg(feature = "debug-validation")]
        debug_assert!(
            self.economy.validate(self.turns.players()).is_ok(),
            "pool invariants violated after a transition"
        );
        self.check_victory();
        Ok(state)
    }

    fn check_victory(&mut self) {
        if self.status != GameStatus::InProgress {
            return;
        }
        let Some(victory) = self.evaluator.evaluate(self.turns.players(), &self.store, &self.economy) else {
            return;
        };
        tracing::info!(winner = %victory.winner, condition = %victory.condition, "Victory");
        self.bus.publish(GameEvent::VictoryConditionMet {
            winner: victory.winner,
            condition: victory.condition,
            details: victory.details.clone(),
        });
        self.victory = Some(victory);
        self.turns.halt();
        self.set_status(GameStatus::Finished);
    }

    fn set_status(&mut self, status: GameStatus) {
        let old = self.status;
        if old == status {
            return;
        }
        self.status = status;
        tracing::debug!(from = %old, to = %status, "Game status changed");
        self.bus.publish(GameEvent::StatusChanged { old, new: status });
    }

    /// Publish buffered component events: turn progress first, then pool
    /// changes, then map changes.
    fn flush_events(&mut self) {
        self.bus.publish_all(self.turns.drain_events());
        self.bus.publish_all(self.economy.drain_events());
        self.bus.publish_all(self.store.drain_events());
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("status", &self.status)
            .field("turn", &self.turns.state())
            .field("territories", &self.store.len())
            .field("opponents", &self.opponents.keys().collect::<Vec<_>>())
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

/// Borrowed collaborators for one turn transition.
struct GameWorld<'a> {
    store: &'a mut TerritoryStore,
    economy: &'a mut ResourceEngine,
    opponents: &'a mut BTreeMap<PlayerId, Box<dyn Opponent>>,
    rng: &'a mut ChaCha8Rng,
}

impl TurnWorld for GameWorld<'_> {
    fn collect(&mut self, state: &TurnState) -> Result<()> {
        self.economy.set_turn(state.turn_number);
        self.economy.collect(state.active_player, self.store)?;
        Ok(())
    }

    fn apply_random_event(&mut self, state: &TurnState, event: &RandomEvent) -> Result<()> {
        self.economy.set_turn(state.turn_number);
        event.apply(self.economy, state.active_player)?;
        Ok(())
    }

    fn take_opponent_turn(&mut self, state: &TurnState) -> Result<()> {
        let player = state.active_player;
        let opponent = self
            .opponents
            .get_mut(&player)
            .ok_or_else(|| GameError::InvalidState(format!("no strategy for {player}")))?;

        let view = GameView::new(player, *state, self.store, self.economy);
        let action = opponent.decide(&view, self.rng);
        tracing::debug!(%player, strategy = opponent.name(), ?action, "Opponent decided");

        if let OpponentAction::Claim(id) = action {
            self.economy.set_turn(state.turn_number);
            self.economy.claim_territory(id, player, self.store)?;
        }
        Ok(())
    }

    fn advance_time(&mut self, ticks: u64) {
        self.economy.advance_time(ticks);
    }

    fn rng(&mut self) -> &mut dyn RngCore {
        &mut *self.rng
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::events::TurnEvent;
    use crate::opponent::PassiveOpponent;

    fn started(seed: u64) -> Game {
        let mut game = Game::new(GameConfig::default().with_seed(seed)).unwrap();
        game.start().unwrap();
        game
    }

    #[derive(Default)]
    struct Log(Rc<RefCell<Vec<DomainEvent>>>);

    impl EventSubscriber for Log {
        fn on_event(&mut self, event: &DomainEvent) {
            self.0.borrow_mut().push(event.clone());
        }
    }

    #[test]
    fn test_new_game_setup() {
        let game = Game::new(GameConfig::default()).unwrap();
        assert_eq!(game.status(), GameStatus::Setup);
        assert_eq!(game.players(), &[PlayerId::Human, PlayerId::Opponent(1)]);
        assert!(game.turn_state().is_none());
        assert_eq!(
            game.resources(PlayerId::Human),
            Some(&GameConfig::default().starting_resources)
        );
    }

    #[test]
    fn test_start_twice_fails() {
        let mut game = started(1);
        assert!(game.start().is_err());
        assert_eq!(game.status(), GameStatus::InProgress);
    }

    #[test]
    fn test_claim_requires_active_player() {
        let mut game = started(1);
        let target = game
            .territories()
            .iter()
            .find(|t| t.is_neutral())
            .map(|t| t.id)
            .unwrap();
        let err = game.claim_for(PlayerId::Opponent(1), target).unwrap_err();
        assert_eq!(err.code(), "invalid_state");
    }

    #[test]
    fn test_claim_publishes_events() {
        let mut game = started(1);
        let log = Log::default();
        let events = Rc::clone(&log.0);
        game.subscribe(Box::new(log));

        let target = game
            .territories()
            .iter()
            .filter(|t| t.is_neutral())
            .find(|t| {
                game.claim_cost(t.id, PlayerId::Human)
                    .is_some_and(|c| game.economy().can_afford(PlayerId::Human, &c))
            })
            .map(|t| t.id)
            .unwrap();
        let receipt = game.claim_territory(target).unwrap();
        assert_eq!(receipt.territory.owner, PlayerId::Human);

        let events = events.borrow();
        assert!(events.iter().any(|e| matches!(
            e,
            DomainEvent::Territory(crate::events::TerritoryEvent::OwnershipChanged { .. })
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            DomainEvent::Resource(crate::events::ResourceEvent::Spent { .. })
        )));
    }

    #[test]
    fn test_failed_claim_changes_nothing() {
        let mut game = started(1);
        let hash = game.state_hash();
        let owned = game.territories().get_by_owner(PlayerId::Opponent(1))[0].id;
        let err = game.claim_territory(owned).unwrap_err();
        assert_eq!(err.code(), "already_owned");
        assert_eq!(game.state_hash(), hash);
    }

    #[test]
    fn test_full_round_and_collection() {
        let mut game = started(2);
        game.set_opponent(PlayerId::Opponent(1), Box::new(PassiveOpponent)).unwrap();
        let before = game.resources(PlayerId::Human).cloned().unwrap();

        game.end_turn().unwrap();
        assert_eq!(game.turn_state().unwrap().active_player, PlayerId::Opponent(1));
        assert_eq!(game.run_opponents().unwrap(), 1);

        let state = game.turn_state().unwrap();
        assert_eq!(state.active_player, PlayerId::Human);
        assert_eq!(state.turn_number, 2);
        assert_eq!(state.phase, Phase::ResourceCollection);

        let production = game.economy().production(PlayerId::Human, game.territories());
        let mut expected = before;
        expected.add_all(&production.non_zero());
        assert_eq!(game.resources(PlayerId::Human), Some(&expected));
    }

    #[test]
    fn test_set_opponent_rejects_human() {
        let mut game = started(3);
        assert!(game.set_opponent(PlayerId::Human, Box::new(PassiveOpponent)).is_err());
        assert!(game.set_opponent(PlayerId::Opponent(3), Box::new(PassiveOpponent)).is_err());
    }

    #[test]
    fn test_victory_halts_turns() {
        let mut config = GameConfig::default().with_seed(4);
        config.victory.economic_threshold = 1;
        let mut game = Game::new(config).unwrap();
        game.start().unwrap();

        // Any transition triggers the check
        game.advance().unwrap();
        assert_eq!(game.status(), GameStatus::Finished);
        assert_eq!(game.victory().map(|v| v.winner), Some(PlayerId::Human));
        assert!(game.advance().is_err());
        assert!(game.event_history().any(|e| matches!(
            e,
            DomainEvent::Game(GameEvent::VictoryConditionMet { .. })
        )));
    }

    #[test]
    fn test_same_seed_same_game() {
        let play = |seed| {
            let mut game = started(seed);
            for _ in 0..12 {
                game.advance().unwrap();
            }
            game.state_hash()
        };
        assert_eq!(play(7), play(7));
        assert_ne!(play(7), play(8));
    }

    #[test]
    fn test_turn_events_published_in_order() {
        let mut game = started(5);
        let log = Log::default();
        let events = Rc::clone(&log.0);
        game.subscribe(Box::new(log));
        game.end_turn().unwrap();

        let turn_events: Vec<_> = events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                DomainEvent::Turn(t) => Some(*t),
                _ => None,
            })
            .collect();
        assert!(matches!(turn_events[0], TurnEvent::TurnEnded { .. }));
        assert!(matches!(turn_events[1], TurnEvent::TurnStarted { .. }));
    }
}
