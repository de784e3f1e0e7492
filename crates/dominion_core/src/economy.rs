//! Resource pools, production and the claim transaction.
//!
//! The [`ResourceEngine`] owns every player's pool, the base multipliers, the
//! schedule of timed effects and the ledger. It never holds on to the
//! territory map: callers pass the [`TerritoryStore`] into each operation that
//! needs it.
//!
//! All arithmetic is integer or fixed-point so that identical inputs give
//! identical pools on every platform.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::EconomyConfig;
use crate::effects::{Effect, EffectId, EffectSchedule, Multiplier, ScheduledEffect};
use crate::error::{ClaimError, GameError, TransactionError};
use crate::events::ResourceEvent;
use crate::ledger::{Ledger, LedgerAction, LedgerEntry};
use crate::players::PlayerId;
use crate::resources::{ResourceType, Resources};
use crate::store::TerritoryStore;
use crate::territory::{Territory, TerritoryId};

/// Result of a successful claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimReceipt {
    /// The territory after the ownership change.
    pub territory: Territory,
    /// Amount paid.
    pub cost: Resources,
    /// Claimant's pool after paying.
    pub resources: Resources,
}

/// Owner of player pools, multipliers, timed effects and the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEngine {
    config: EconomyConfig,
    pools: BTreeMap<PlayerId, Resources>,
    multipliers: BTreeMap<ResourceType, Multiplier>,
    effects: EffectSchedule,
    ledger: Ledger,
    tick: u64,
    turn: u32,
    #[serde(skip)]
    pending: Vec<ResourceEvent>,
}

impl ResourceEngine {
    /// Create an engine with no parties yet. The neutral pool exists and stays at zero.
    #[must_use]
    pub fn new(config: EconomyConfig) -> Self {
        let mut pools = BTreeMap::new();
        pools.insert(PlayerId::Neutral, Resources::zeroed());
        Self {
            config,
            pools,
            multipliers: BTreeMap::new(),
            effects: EffectSchedule::new(),
            ledger: Ledger::new(),
            tick: 0,
            turn: 1,
            pending: Vec::new(),
        }
    }

    /// Cost model in use.
    #[must_use]
    pub const fn config(&self) -> &EconomyConfig {
        &self.config
    }

    /// Give `player` a pool holding `starting`. Re-registering replaces the pool.
    pub fn register_player(&mut self, player: PlayerId, starting: Resources) {
        if !player.is_party() {
            tracing::warn!("Ignoring pool registration for the neutral party");
            return;
        }
        let mut pool = Resources::zeroed();
        pool.add_all(&starting);
        debug_assert!(pool.is_non_negative(), "starting pool must not be negative");
        tracing::debug!(%player, pool = %pool, "Registered player pool");
        self.pools.insert(player, pool);
    }

    /// Pool of `player`.
    #[must_use]
    pub fn pool(&self, player: PlayerId) -> Option<&Resources> {
        self.pools.get(&player)
    }

    /// Every party with a pool, in turn order.
    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.pools.keys().copied().filter(|p| p.is_party())
    }

    /// Current logical tick.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Turn number stamped on new ledger entries.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Set the turn number stamped on new ledger entries.
    pub fn set_turn(&mut self, turn: u32) {
        self.turn = turn;
    }

    /// The transaction ledger.
    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Ledger entries of `player` over the last `turns` turns.
    #[must_use]
    pub fn history(&self, player: PlayerId, turns: u32) -> Vec<&LedgerEntry> {
        self.ledger.history(player, self.turn, turns)
    }

    /// Active timed and permanent effects.
    #[must_use]
    pub fn effects(&self) -> &[ScheduledEffect] {
        self.effects.active()
    }

    /// Effective multiplier for `resource`: the newest active override, else the base.
    #[must_use]
    pub fn multiplier(&self, resource: ResourceType) -> Multiplier {
        self.effects
            .multiplier_override(resource)
            .unwrap_or_else(|| self.base_multiplier(resource))
    }

    /// Permanent multiplier for `resource`.
    #[must_use]
    pub fn base_multiplier(&self, resource: ResourceType) -> Multiplier {
        self.multipliers.get(&resource).copied().unwrap_or_default()
    }

    /// Aggregate boost for `(player, resource)`.
    #[must_use]
    pub fn boost(&self, player: PlayerId, resource: ResourceType) -> i64 {
        self.effects.boost(player, resource)
    }

    /// Per-turn production of `player`.
    ///
    /// Each owned territory yields `floor(value × multiplier) + boost` of its
    /// type. Every tradable type is present in the result, zero or not.
    #[must_use]
    pub fn production(&self, player: PlayerId, store: &TerritoryStore) -> Resources {
        let mut production = Resources::zeroed();
        for territory in store.get_by_owner(player) {
            let kind = territory.resource_type;
            if !kind.is_producible() {
                continue;
            }
            let amount = self
                .multiplier(kind)
                .apply(territory.resource_value)
                .saturating_add(self.boost(player, kind));
            production.add(kind, amount.max(0));
        }
        production
    }

    /// Whether `player`'s pool covers `cost`.
    #[must_use]
    pub fn can_afford(&self, player: PlayerId, cost: &Resources) -> bool {
        self.pools.get(&player).is_some_and(|pool| pool.covers(cost))
    }

    /// Price for `player` to claim `territory`.
    ///
    /// Starting from the base cost, in order: the premium surcharge, +50%
    /// (rounded up) at the top tier, `+times_contested` on every entry, then
    /// the neighbor discount and any active claim discount, neither taking an
    /// entry below the configured minimum.
    #[must_use]
    pub fn claim_cost(&self, territory: &Territory, player: PlayerId, store: &TerritoryStore) -> Resources {
        let cfg = &self.config;
        let mut cost = cfg.base_claim_cost.clone();

        if territory.resource_type == cfg.premium_resource {
            cost.add(cfg.premium_resource, cfg.premium_surcharge);
        }
        if territory.resource_value >= cfg.max_tier {
            cost.map_amounts(|_, amount| (amount * 3 + 1) / 2);
        }
        if territory.times_contested > 0 {
            let surcharge = i64::from(territory.times_contested);
            cost.map_amounts(|_, amount| amount + surcharge);
        }

        let owned_neighbors = store.owned_neighbor_count(territory.id, player) as i64;
        let discount = owned_neighbors.min(cfg.max_neighbor_discount);
        if discount > 0 {
            cost.map_amounts(|_, amount| (amount - discount).max(cfg.min_cost));
        }

        let event_discount = self.effects.claim_discount();
        if event_discount > 0 {
            cost.map_amounts(|_, amount| (amount - event_discount).max(cfg.min_cost));
        }

        cost
    }

    /// Pay `cost` from `player`'s pool.
    ///
    /// Either every entry is deducted and a ledger entry appended, or nothing
    /// changes at all. Returns the pool after paying.
    ///
    /// # Errors
    ///
    /// See [`TransactionError`] for the rejection reasons, checked in order.
    pub fn spend(&mut self, player: PlayerId, cost: &Resources) -> Result<Resources, TransactionError> {
        if !player.is_party() {
            return Err(TransactionError::InvalidPlayer(player));
        }
        validate_cost(cost)?;
        let pool = self
            .pools
            .get_mut(&player)
            .ok_or(TransactionError::PlayerNotFound(player))?;
        if !pool.covers(cost) {
            tracing::debug!(%player, cost = %cost, available = %pool, "Spend rejected");
            return Err(TransactionError::InsufficientResources {
                player,
                cost: cost.clone(),
                available: pool.clone(),
            });
        }

        let before = pool.clone();
        pool.subtract_all(cost);
        debug_assert!(pool.is_non_negative(), "pool went negative after spend");
        let after = pool.clone();

        tracing::debug!(%player, cost = %cost, after = %after, "Resources spent");
        let mut delta = Resources::new();
        delta.subtract_all(cost);
        self.pending.push(ResourceEvent::Spent {
            player,
            cost: cost.clone(),
        });
        self.pending.push(ResourceEvent::Changed {
            player,
            delta: delta.non_zero(),
            reason: LedgerAction::Spend,
        });
        self.record(player, LedgerAction::Spend, cost.clone(), before, after.clone());
        Ok(after)
    }

    /// Add `player`'s production to their pool and return the full report.
    ///
    /// # Errors
    ///
    /// Fails for the neutral party or a player without a pool.
    pub fn collect(&mut self, player: PlayerId, store: &TerritoryStore) -> Result<Resources, TransactionError> {
        if !player.is_party() {
            return Err(TransactionError::InvalidPlayer(player));
        }
        if !self.pools.contains_key(&player) {
            return Err(TransactionError::PlayerNotFound(player));
        }

        let production = self.production(player, store);
        let gained = production.non_zero();
        let (before, after) = self.credit(player, &gained)?;

        tracing::debug!(%player, production = %production, "Resources collected");
        self.pending.push(ResourceEvent::Collected {
            player,
            production: production.clone(),
        });
        if !gained.is_empty() {
            self.pending.push(ResourceEvent::Changed {
                player,
                delta: gained,
                reason: LedgerAction::Collect,
            });
        }
        self.record(player, LedgerAction::Collect, production.clone(), before, after);
        Ok(production)
    }

    /// Credit `amounts` to `player` outside of production.
    ///
    /// # Errors
    ///
    /// Fails for the neutral party, a missing pool or negative amounts.
    pub fn grant(&mut self, player: PlayerId, amounts: &Resources) -> Result<Resources, TransactionError> {
        if !player.is_party() {
            return Err(TransactionError::InvalidPlayer(player));
        }
        if !amounts.is_non_negative() {
            return Err(TransactionError::InvalidCost(format!(
                "grant amounts must not be negative: {amounts}"
            )));
        }
        let (before, after) = self.credit(player, amounts)?;

        tracing::debug!(%player, amounts = %amounts, "Resources granted");
        self.pending.push(ResourceEvent::Changed {
            player,
            delta: amounts.non_zero(),
            reason: LedgerAction::Grant,
        });
        self.record(player, LedgerAction::Grant, amounts.clone(), before, after.clone());
        Ok(after)
    }

    /// Pay for and take ownership of territory `id`.
    ///
    /// Payment happens first; ownership changes only if payment succeeded. If
    /// the ownership change is still rejected, the payment is rolled back so
    /// the engine is left exactly as it was.
    ///
    /// # Errors
    ///
    /// `not_found`, `already_owned`, or any [`spend`](Self::spend) failure,
    /// propagated untouched.
    pub fn claim_territory(
        &mut self,
        id: TerritoryId,
        player: PlayerId,
        store: &mut TerritoryStore,
    ) -> Result<ClaimReceipt, ClaimError> {
        let Some(territory) = store.get(id) else {
            tracing::warn!(%id, %player, "Claim on unknown territory");
            return Err(ClaimError::NotFound(id));
        };
        if territory.owner.is_party() {
            return Err(ClaimError::AlreadyOwned {
                id,
                owner: territory.owner,
            });
        }

        let cost = self.claim_cost(territory, player, store);
        let checkpoint = (self.pools.get(&player).cloned(), self.pending.len());
        let resources = self.spend(player, &cost)?;

        match store.claim(id, player, self.turn) {
            Ok(territory) => {
                tracing::info!(%id, %player, cost = %cost, "Territory claim settled");
                Ok(ClaimReceipt {
                    territory: territory.clone(),
                    cost,
                    resources,
                })
            }
            Err(err) => {
                self.rollback(player, checkpoint);
                Err(err.into())
            }
        }
    }

    /// Add a flat per-territory boost. `None` makes it permanent.
    pub fn apply_boost(
        &mut self,
        player: PlayerId,
        resource: ResourceType,
        amount: i64,
        duration: Option<u64>,
    ) -> EffectId {
        self.schedule(
            Effect::Boost {
                player,
                resource,
                amount,
            },
            duration,
        )
    }

    /// Change the multiplier of `resource`.
    ///
    /// With a duration the value overrides the base until it expires (the most
    /// recent active override wins). Without one the base itself changes.
    pub fn set_multiplier(
        &mut self,
        resource: ResourceType,
        value: Multiplier,
        duration: Option<u64>,
    ) -> Option<EffectId> {
        let effect = Effect::Multiplier { resource, value };
        if duration.is_some() {
            return Some(self.schedule(effect, duration));
        }
        self.multipliers.insert(resource, value);
        tracing::debug!(%resource, %value, "Base multiplier changed");
        self.pending.push(ResourceEvent::EffectApplied {
            effect,
            expires_at: None,
        });
        None
    }

    /// Reduce every claim cost entry by `amount` for `duration` ticks.
    pub fn apply_claim_discount(&mut self, amount: i64, duration: Option<u64>) -> EffectId {
        self.schedule(Effect::ClaimDiscount { amount }, duration)
    }

    /// Move the clock forward and expire every effect that ran out.
    pub fn advance_time(&mut self, ticks: u64) -> Vec<ScheduledEffect> {
        self.tick = self.tick.saturating_add(ticks);
        let expired = self.effects.expire_until(self.tick);
        for effect in &expired {
            tracing::debug!(id = effect.id.0, tick = self.tick, "Effect expired");
            self.pending.push(ResourceEvent::EffectExpired {
                effect: effect.effect,
            });
        }
        expired
    }

    /// Take the events raised since the last drain.
    pub fn drain_events(&mut self) -> Vec<ResourceEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Check pool invariants: exactly the neutral party plus `parties` hold
    /// pools, none negative, and the neutral pool stays empty.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidState`] describing the first violation.
    pub fn validate(&self, parties: &[PlayerId]) -> Result<(), GameError> {
        for (player, pool) in &self.pools {
            if !pool.is_non_negative() {
                return Err(GameError::InvalidState(format!(
                    "{player} has a negative pool: {pool}"
                )));
            }
        }
        let registered: Vec<PlayerId> = self.players().collect();
        if registered != parties {
            return Err(GameError::InvalidState(format!(
                "pools are held by {registered:?}, expected {parties:?}"
            )));
        }
        match self.pools.get(&PlayerId::Neutral) {
            Some(pool) if pool.non_zero().is_empty() => Ok(()),
            _ => Err(GameError::InvalidState(
                "neutral pool must exist and stay empty".into(),
            )),
        }
    }

    fn schedule(&mut self, effect: Effect, duration: Option<u64>) -> EffectId {
        let scheduled = self.effects.schedule(effect, self.tick, duration);
        tracing::debug!(id = scheduled.id.0, ?effect, expires_at = ?scheduled.expires_at, "Effect applied");
        self.pending.push(ResourceEvent::EffectApplied {
            effect,
            expires_at: scheduled.expires_at,
        });
        scheduled.id
    }

    fn credit(
        &mut self,
        player: PlayerId,
        amounts: &Resources,
    ) -> Result<(Resources, Resources), TransactionError> {
        let pool = self
            .pools
            .get_mut(&player)
            .ok_or(TransactionError::PlayerNotFound(player))?;
        let before = pool.clone();
        pool.add_all(amounts);
        debug_assert!(pool.is_non_negative(), "pool went negative after credit");
        Ok((before, pool.clone()))
    }

    fn record(
        &mut self,
        player: PlayerId,
        action: LedgerAction,
        amounts: Resources,
        before: Resources,
        after: Resources,
    ) {
        self.ledger.record(LedgerEntry {
            turn: self.turn,
            tick: self.tick,
            player,
            action,
            amounts,
            before,
            after,
        });
    }

    fn rollback(&mut self, player: PlayerId, checkpoint: (Option<Resources>, usize)) {
        let (pool, pending_len) = checkpoint;
        if let Some(pool) = pool {
            self.pools.insert(player, pool);
        }
        self.ledger.pop();
        self.pending.truncate(pending_len);
        tracing::warn!(%player, "Claim rolled back after payment");
    }
}

fn validate_cost(cost: &Resources) -> Result<(), TransactionError> {
    if cost.is_empty() {
        return Err(TransactionError::InvalidCost("cost is empty".into()));
    }
    for (resource, amount) in cost.iter() {
        if !resource.is_producible() {
            return Err(TransactionError::InvalidCost(format!(
                "'{resource}' cannot be spent"
            )));
        }
        if amount < 0 {
            return Err(TransactionError::InvalidCost(format!(
                "negative amount for {resource}: {amount}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::data::ResourceTable;
    use crate::grid::HexGrid;
    use crate::hex::HexCoord;
    use crate::territory::TerritoryPatch;

    fn gold(n: i64) -> Resources {
        Resources::from([(ResourceType::Gold, n)])
    }

    fn setup() -> (ResourceEngine, TerritoryStore) {
        let mut store = TerritoryStore::new(HexGrid::new(2), ResourceTable::fixed(ResourceType::None, 1));
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for coord in HexGrid::new(2).coords() {
            store
                .create_or_get(coord, TerritoryPatch::default(), &mut rng)
                .unwrap();
        }
        store.finish_setup();
        store.drain_events();

        let mut engine = ResourceEngine::new(EconomyConfig::default());
        engine.register_player(PlayerId::Human, gold(10));
        (engine, store)
    }

    #[test]
    fn test_spend_rejections_leave_pool_untouched() {
        let (mut engine, _) = setup();
        let before = engine.pool(PlayerId::Human).cloned();

        let cases = [
            (PlayerId::Neutral, gold(1), "invalid_player"),
            (PlayerId::Human, Resources::new(), "invalid_cost"),
            (PlayerId::Human, gold(-1), "invalid_cost"),
            (PlayerId::Human, Resources::from([(ResourceType::None, 1)]), "invalid_cost"),
            (PlayerId::Opponent(2), gold(1), "player_not_found"),
            (PlayerId::Human, gold(11), "insufficient_resources"),
        ];
        for (player, cost, code) in cases {
            let err = engine.spend(player, &cost).unwrap_err();
            assert_eq!(err.code(), code, "{player} {cost}");
        }

        assert_eq!(engine.pool(PlayerId::Human).cloned(), before);
        assert!(engine.ledger().is_empty());
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn test_spend_success_records_ledger() {
        let (mut engine, _) = setup();
        let after = engine.spend(PlayerId::Human, &gold(4)).unwrap();
        assert_eq!(after.get(ResourceType::Gold), 6);

        let entry = &engine.ledger().entries()[0];
        assert_eq!(entry.action, LedgerAction::Spend);
        assert_eq!(entry.before.get(ResourceType::Gold), 10);
        assert_eq!(entry.after.get(ResourceType::Gold), 6);
    }

    #[test]
    fn test_insufficient_resources_carries_context() {
        let (mut engine, _) = setup();
        match engine.spend(PlayerId::Human, &gold(20)) {
            Err(TransactionError::InsufficientResources { cost, available, .. }) => {
                assert_eq!(cost.get(ResourceType::Gold), 20);
                assert_eq!(available.get(ResourceType::Gold), 10);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_production_and_collect() {
        let (mut engine, mut store) = setup();
        store.update(TerritoryId::at(0, 0), &TerritoryPatch::default().resource(ResourceType::Food, 3)).unwrap();
        store.update(TerritoryId::at(1, 0), &TerritoryPatch::default().resource(ResourceType::Wood, 2)).unwrap();
        store.claim(TerritoryId::at(0, 0), PlayerId::Human, 1).unwrap();
        store.claim(TerritoryId::at(1, 0), PlayerId::Human, 1).unwrap();

        let production = engine.collect(PlayerId::Human, &store).unwrap();
        assert_eq!(production.get(ResourceType::Food), 3);
        assert_eq!(production.get(ResourceType::Wood), 2);
        assert_eq!(production.get(ResourceType::Gold), 0);
        assert_eq!(production.get(ResourceType::Metal), 0);

        let pool = engine.pool(PlayerId::Human).unwrap();
        assert_eq!(pool.get(ResourceType::Food), 3);
        assert_eq!(pool.get(ResourceType::Wood), 2);
        assert_eq!(pool.get(ResourceType::Gold), 10);
    }

    #[test]
    fn test_multiplier_and_boost_in_production() {
        let (mut engine, mut store) = setup();
        store.update(TerritoryId::at(0, 0), &TerritoryPatch::default().resource(ResourceType::Wood, 3)).unwrap();
        store.claim(TerritoryId::at(0, 0), PlayerId::Human, 1).unwrap();

        engine.set_multiplier(ResourceType::Wood, Multiplier::from_percent(150), None);
        assert_eq!(engine.production(PlayerId::Human, &store).get(ResourceType::Wood), 4);

        engine.apply_boost(PlayerId::Human, ResourceType::Wood, 2, Some(1));
        assert_eq!(engine.production(PlayerId::Human, &store).get(ResourceType::Wood), 6);

        engine.advance_time(1);
        assert_eq!(engine.production(PlayerId::Human, &store).get(ResourceType::Wood), 4);
    }

    #[test]
    fn test_temporary_multiplier_reverts_to_base() {
        let (mut engine, _) = setup();
        engine.set_multiplier(ResourceType::Food, Multiplier::from_percent(200), None);
        engine.set_multiplier(ResourceType::Food, Multiplier::from_percent(50), Some(2));
        assert_eq!(engine.multiplier(ResourceType::Food), Multiplier::from_percent(50));

        engine.advance_time(2);
        assert_eq!(engine.multiplier(ResourceType::Food), Multiplier::from_percent(200));
    }

    #[test]
    fn test_claim_cost_ordering_example() {
        let (mut engine, mut store) = setup();
        let target = TerritoryId::at(0, 0);
        store.update(target, &TerritoryPatch::default().resource(ResourceType::Gold, 3)).unwrap();
        store.claim(TerritoryId::at(1, 0), PlayerId::Human, 1).unwrap();
        store.claim(TerritoryId::at(0, 1), PlayerId::Human, 1).unwrap();
        engine.drain_events();

        let territory = store.get(target).unwrap();
        let cost = engine.claim_cost(territory, PlayerId::Human, &store);
        assert_eq!(
            cost,
            Resources::from([
                (ResourceType::Gold, 4),
                (ResourceType::Wood, 1),
                (ResourceType::Metal, 1),
                (ResourceType::Food, 1),
            ])
        );
    }

    #[test]
    fn test_claim_cost_modifiers() {
        let (mut engine, mut store) = setup();
        let id = TerritoryId::at(0, 0);
        store.update(id, &TerritoryPatch::default().resource(ResourceType::Food, 1)).unwrap();
        let base = engine.config().base_claim_cost.clone();
        assert_eq!(engine.claim_cost(store.get(id).unwrap(), PlayerId::Human, &store), base);

        // Contested land costs more
        store.claim(id, PlayerId::Opponent(1), 1).unwrap();
        store.claim(id, PlayerId::Neutral, 2).unwrap();
        let contested = engine.claim_cost(store.get(id).unwrap(), PlayerId::Human, &store);
        assert_eq!(contested.get(ResourceType::Gold), 5);

        // An event discount never takes an entry below one
        engine.apply_claim_discount(10, Some(3));
        let discounted = engine.claim_cost(store.get(id).unwrap(), PlayerId::Human, &store);
        assert!(discounted.iter().all(|(_, a)| a == 1));
    }

    #[test]
    fn test_claim_territory_spend_then_claim() {
        let (mut engine, mut store) = setup();
        engine.register_player(
            PlayerId::Human,
            Resources::from([
                (ResourceType::Gold, 5),
                (ResourceType::Wood, 5),
                (ResourceType::Metal, 5),
                (ResourceType::Food, 5),
            ]),
        );
        let id = TerritoryId::at(0, 0);
        store.update(id, &TerritoryPatch::default().resource(ResourceType::Metal, 1)).unwrap();

        let receipt = engine.claim_territory(id, PlayerId::Human, &mut store).unwrap();
        assert_eq!(receipt.territory.owner, PlayerId::Human);
        assert_eq!(receipt.cost, engine.config().base_claim_cost);
        assert_eq!(receipt.resources.get(ResourceType::Gold), 2);
        assert_eq!(engine.pool(PlayerId::Human), Some(&receipt.resources));

        let err = engine.claim_territory(id, PlayerId::Opponent(1), &mut store).unwrap_err();
        assert_eq!(err.code(), "already_owned");
        let err = engine
            .claim_territory(TerritoryId::new(HexCoord::new(9, 9)), PlayerId::Human, &mut store)
            .unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn test_failed_claim_is_atomic() {
        let (mut engine, mut store) = setup();
        let id = TerritoryId::at(0, 0);
        let pool_before = engine.pool(PlayerId::Human).cloned();

        let err = engine.claim_territory(id, PlayerId::Human, &mut store).unwrap_err();
        assert_eq!(err.code(), "insufficient_resources");
        assert_eq!(engine.pool(PlayerId::Human).cloned(), pool_before);
        assert!(store.get(id).unwrap().is_neutral());
        assert!(store.drain_events().is_empty());
    }

    #[test]
    fn test_grant() {
        let (mut engine, _) = setup();
        let after = engine.grant(PlayerId::Human, &gold(3)).unwrap();
        assert_eq!(after.get(ResourceType::Gold), 13);
        assert_eq!(engine.ledger().entries()[0].action, LedgerAction::Grant);
        assert!(engine.grant(PlayerId::Human, &gold(-3)).is_err());
        assert!(engine.grant(PlayerId::Neutral, &gold(3)).is_err());
    }

    #[test]
    fn test_neutral_pool_stays_zero() {
        let (mut engine, store) = setup();
        engine.register_player(PlayerId::Neutral, gold(50));
        assert_eq!(engine.pool(PlayerId::Neutral).map(Resources::total), Some(0));
        assert!(engine.collect(PlayerId::Neutral, &store).is_err());
        assert_eq!(engine.players().collect::<Vec<_>>(), vec![PlayerId::Human]);
    }

    #[test]
    fn test_validate_pools() {
        let (mut engine, _) = setup();
        assert!(engine.validate(&[PlayerId::Human]).is_ok());
        assert!(engine.validate(&[PlayerId::Human, PlayerId::Opponent(1)]).is_err());

        engine.pools.insert(PlayerId::Human, gold(-1));
        let err = engine.validate(&[PlayerId::Human]).unwrap_err();
        assert_eq!(err.code(), "invalid_state");

        engine.pools.insert(PlayerId::Human, gold(1));
        engine.pools.insert(PlayerId::Neutral, gold(3));
        assert!(engine.validate(&[PlayerId::Human]).is_err());
    }
}
