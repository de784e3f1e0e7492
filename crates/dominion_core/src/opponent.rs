//! Pluggable opponent strategies.
//!
//! Every computer opponent decides through the same read-only [`GameView`]
//! a human player's interface would show, and acts only by returning an
//! [`OpponentAction`] that the game then executes through the normal claim
//! path. There is no backdoor into the state.

use rand::{Rng, RngCore};

use crate::economy::ResourceEngine;
use crate::players::PlayerId;
use crate::resources::Resources;
use crate::store::TerritoryStore;
use crate::territory::{Territory, TerritoryId};
use crate::turn::TurnState;

/// Read-only snapshot of the game from one party's seat.
#[derive(Debug, Clone, Copy)]
pub struct GameView<'a> {
    player: PlayerId,
    turn: TurnState,
    store: &'a TerritoryStore,
    economy: &'a ResourceEngine,
}

impl<'a> GameView<'a> {
    /// View of the game for `player`.
    #[must_use]
    pub const fn new(
        player: PlayerId,
        turn: TurnState,
        store: &'a TerritoryStore,
        economy: &'a ResourceEngine,
    ) -> Self {
        Self {
            player,
            turn,
            store,
            economy,
        }
    }

    /// The deciding party.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Current turn state.
    #[must_use]
    pub const fn turn(&self) -> &TurnState {
        &self.turn
    }

    /// The territory map.
    #[must_use]
    pub const fn territories(&self) -> &'a TerritoryStore {
        self.store
    }

    /// The deciding party's pool.
    #[must_use]
    pub fn resources(&self) -> Option<&'a Resources> {
        self.economy.pool(self.player)
    }

    /// Territories owned by the deciding party.
    #[must_use]
    pub fn owned(&self) -> Vec<&'a Territory> {
        self.store.get_by_owner(self.player)
    }

    /// Neutral territories, in coordinate order.
    #[must_use]
    pub fn claimable(&self) -> Vec<&'a Territory> {
        self.store.iter().filter(|t| t.is_neutral()).collect()
    }

    /// What the deciding party would pay for `territory`.
    #[must_use]
    pub fn claim_cost(&self, territory: &Territory) -> Resources {
        self.economy.claim_cost(territory, self.player, self.store)
    }

    /// Whether the deciding party can pay `cost`.
    #[must_use]
    pub fn can_afford(&self, cost: &Resources) -> bool {
        self.economy.can_afford(self.player, cost)
    }

    /// Per-turn production of the deciding party.
    #[must_use]
    pub fn production(&self) -> Resources {
        self.economy.production(self.player, self.store)
    }
}

/// What an opponent wants to do this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpponentAction {
    /// Claim a territory through the normal claim transaction.
    Claim(TerritoryId),
    /// Do nothing.
    Pass,
}

/// A decision procedure for a computer-controlled party.
pub trait Opponent {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Choose an action. Randomness must come from `rng` only.
    fn decide(&mut self, view: &GameView<'_>, rng: &mut dyn RngCore) -> OpponentAction;
}

/// Picks one random neutral territory and claims it if affordable.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomOpponent;

impl Opponent for RandomOpponent {
    fn name(&self) -> &str {
        "random"
    }

    fn decide(&mut self, view: &GameView<'_>, rng: &mut dyn RngCore) -> OpponentAction {
        let candidates = view.claimable();
        if candidates.is_empty() {
            return OpponentAction::Pass;
        }
        let target = candidates[rng.gen_range(0..candidates.len())];
        if view.can_afford(&view.claim_cost(target)) {
            OpponentAction::Claim(target.id)
        } else {
            OpponentAction::Pass
        }
    }
}

/// Claims the cheapest affordable territory touching its own land.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontierOpponent;

impl Opponent for FrontierOpponent {
    fn name(&self) -> &str {
        "frontier"
    }

    fn decide(&mut self, view: &GameView<'_>, _rng: &mut dyn RngCore) -> OpponentAction {
        let store = view.territories();
        view.claimable()
            .into_iter()
            .filter(|t| store.owned_neighbor_count(t.id, view.player()) > 0)
            .map(|t| (view.claim_cost(t), t.id))
            .filter(|(cost, _)| view.can_afford(cost))
            .min_by_key(|(cost, id)| (cost.total(), *id))
            .map_or(OpponentAction::Pass, |(_, id)| OpponentAction::Claim(id))
    }
}

/// Never acts.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassiveOpponent;

impl Opponent for PassiveOpponent {
    fn name(&self) -> &str {
        "passive"
    }

    fn decide(&mut self, _view: &GameView<'_>, _rng: &mut dyn RngCore) -> OpponentAction {
        OpponentAction::Pass
    }
}
