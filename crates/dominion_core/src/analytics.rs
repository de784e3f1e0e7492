//! Read-side economy summaries for presentation and opponents.
//!
//! Nothing here mutates state or feeds back into the rules.

use serde::{Deserialize, Serialize};

use crate::economy::ResourceEngine;
use crate::ledger::{Ledger, LedgerAction};
use crate::math::Fixed;
use crate::players::PlayerId;
use crate::resources::{ResourceType, Resources};
use crate::store::TerritoryStore;
use crate::territory::TerritoryId;

/// Turns of ledger history considered for spending advice.
pub const ADVICE_WINDOW_TURNS: u32 = 3;

/// A suggestion for a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    /// Claim this territory to raise the scarcest resource.
    Claim {
        /// Resource the territory yields.
        resource: ResourceType,
        /// Suggested territory.
        territory: TerritoryId,
        /// Its current price.
        cost: Resources,
    },
    /// No affordable claim yields the scarcest resource; save up.
    Save {
        /// Resource most short of the cheapest such claim.
        resource: ResourceType,
        /// Units still missing.
        shortfall: i64,
    },
    /// The player produces none of this resource.
    Diversify {
        /// Missing resource.
        resource: ResourceType,
    },
    /// Recent turns spent more than they collected.
    Overspending {
        /// Collected over the window.
        collected: i64,
        /// Spent over the window.
        spent: i64,
    },
}

impl ResourceEngine {
    /// Average production per owned territory.
    #[must_use]
    pub fn efficiency(&self, player: PlayerId, store: &TerritoryStore) -> Fixed {
        let owned = store.count_by_owner(player);
        if owned == 0 {
            return Fixed::ZERO;
        }
        let total = self.production(player, store).total();
        Fixed::from_num(total) / Fixed::from_num(owned)
    }

    /// Ratio of the smallest to the largest tradable amount in the pool.
    ///
    /// `1` means perfectly even, `0` means at least one tradable resource is
    /// empty while another is not. An empty pool counts as even.
    #[must_use]
    pub fn balance(&self, player: PlayerId) -> Fixed {
        let Some(pool) = self.pool(player) else {
            return Fixed::ZERO;
        };
        let amounts = ResourceType::TRADABLE.map(|t| pool.get(t).max(0));
        let max = amounts.iter().copied().max().unwrap_or(0);
        let min = amounts.iter().copied().min().unwrap_or(0);
        if max == 0 {
            return Fixed::ONE;
        }
        Fixed::from_num(min) / Fixed::from_num(max)
    }

    /// Suggestions for `player`, most actionable first.
    #[must_use]
    pub fn recommendations(&self, player: PlayerId, store: &TerritoryStore) -> Vec<Recommendation> {
        let Some(pool) = self.pool(player) else {
            return Vec::new();
        };
        let mut advice = Vec::new();

        let scarcest = ResourceType::TRADABLE
            .into_iter()
            .min_by_key(|t| (pool.get(*t), *t))
            .unwrap_or(ResourceType::Gold);
        if let Some(claim) = self.claim_advice(player, scarcest, pool, store) {
            advice.push(claim);
        }

        let production = self.production(player, store);
        advice.extend(
            ResourceType::TRADABLE
                .into_iter()
                .filter(|t| production.get(*t) == 0)
                .map(|resource| Recommendation::Diversify { resource }),
        );

        let recent = self.history(player, ADVICE_WINDOW_TURNS);
        let collected = Ledger::totals(recent.iter().copied(), LedgerAction::Collect).total();
        let spent = Ledger::totals(recent.iter().copied(), LedgerAction::Spend).total();
        if spent > collected {
            advice.push(Recommendation::Overspending { collected, spent });
        }

        advice
    }

    fn claim_advice(
        &self,
        player: PlayerId,
        resource: ResourceType,
        pool: &Resources,
        store: &TerritoryStore,
    ) -> Option<Recommendation> {
        // Cheapest neutral candidate yielding the resource, ties in coordinate order
        let (territory, cost) = store
            .iter()
            .filter(|t| t.is_neutral() && t.resource_type == resource)
            .map(|t| (t.id, self.claim_cost(t, player, store)))
            .min_by_key(|(id, cost)| (cost.total(), *id))?;

        if pool.covers(&cost) {
            return Some(Recommendation::Claim {
                resource,
                territory,
                cost,
            });
        }
        cost.iter()
            .map(|(t, amount)| (t, amount - pool.get(t)))
            .filter(|(_, missing)| *missing > 0)
            .max_by_key(|(t, missing)| (*missing, std::cmp::Reverse(*t)))
            .map(|(resource, shortfall)| Recommendation::Save {
                resource,
                shortfall,
            })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::data::{EconomyConfig, ResourceTable};
    use crate::grid::HexGrid;
    use crate::territory::TerritoryPatch;

    fn world(table: ResourceTable) -> (ResourceEngine, TerritoryStore) {
        let grid = HexGrid::new(2);
        let mut store = TerritoryStore::new(grid.clone(), table);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for coord in grid.coords() {
            store
                .create_or_get(coord, TerritoryPatch::default(), &mut rng)
                .unwrap();
        }
        store.finish_setup();
        (ResourceEngine::new(EconomyConfig::default()), store)
    }

    #[test]
    fn test_efficiency() {
        let (mut engine, mut store) = world(ResourceTable::fixed(ResourceType::Food, 2));
        engine.register_player(PlayerId::Human, Resources::new());
        assert_eq!(engine.efficiency(PlayerId::Human, &store), Fixed::ZERO);

        store.claim(TerritoryId::at(0, 0), PlayerId::Human, 1).unwrap();
        store.claim(TerritoryId::at(1, 0), PlayerId::Human, 1).unwrap();
        assert_eq!(engine.efficiency(PlayerId::Human, &store), Fixed::from_num(2));
    }

    #[test]
    fn test_balance() {
        let (mut engine, _) = world(ResourceTable::standard());
        engine.register_player(PlayerId::Human, Resources::new());
        assert_eq!(engine.balance(PlayerId::Human), Fixed::ONE);

        engine.register_player(
            PlayerId::Human,
            Resources::from([
                (ResourceType::Gold, 8),
                (ResourceType::Wood, 4),
                (ResourceType::Metal, 6),
                (ResourceType::Food, 8),
            ]),
        );
        assert_eq!(engine.balance(PlayerId::Human), Fixed::from_num(0.5));
        assert_eq!(engine.balance(PlayerId::Opponent(3)), Fixed::ZERO);
    }

    #[test]
    fn test_recommends_claim_for_scarcest_resource() {
        let (mut engine, store) = world(ResourceTable::fixed(ResourceType::Metal, 1));
        engine.register_player(
            PlayerId::Human,
            Resources::from([
                (ResourceType::Gold, 9),
                (ResourceType::Wood, 9),
                (ResourceType::Metal, 1),
                (ResourceType::Food, 9),
            ]),
        );

        let advice = engine.recommendations(PlayerId::Human, &store);
        assert!(matches!(
            advice.first(),
            Some(Recommendation::Claim {
                resource: ResourceType::Metal,
                ..
            })
        ));
        // Owns nothing, so produces nothing
        assert!(advice.contains(&Recommendation::Diversify {
            resource: ResourceType::Food
        }));
    }

    #[test]
    fn test_recommends_saving_when_broke() {
        let (mut engine, store) = world(ResourceTable::fixed(ResourceType::Gold, 1));
        engine.register_player(PlayerId::Human, Resources::new());

        let advice = engine.recommendations(PlayerId::Human, &store);
        // Gold land costs 4 gold with the premium surcharge
        assert_eq!(
            advice.first(),
            Some(&Recommendation::Save {
                resource: ResourceType::Gold,
                shortfall: 4
            })
        );
    }

    #[test]
    fn test_overspending_warning() {
        let (mut engine, store) = world(ResourceTable::standard());
        engine.register_player(PlayerId::Human, Resources::from([(ResourceType::Gold, 10)]));
        engine
            .spend(PlayerId::Human, &Resources::from([(ResourceType::Gold, 5)]))
            .unwrap();

        let advice = engine.recommendations(PlayerId::Human, &store);
        assert!(advice.contains(&Recommendation::Overspending {
            collected: 0,
            spent: 5
        }));
    }
}
