//! Integration tests for the game rules.
//!
//! These drive the public API the way a client would and check the rules
//! that span several components.

use dominion_core::prelude::*;
use dominion_core::data::ResourceTable;
use dominion_core::random_event::RandomEvent;
use dominion_test_utils::fixtures::{assign, engine_with, flat_pool, started_game, uniform_store};
use dominion_test_utils::proptest::prelude::*;

// =============================================================================
// Claims
// =============================================================================

mod claims {
    use super::*;

    /// Claim cost uses the documented ordering: premium, tier, contest,
    /// neighbor discount.
    #[test]
    fn test_claim_cost_for_owned_neighbors() {
        let mut store = uniform_store(3, ResourceType::Gold, 2);
        let target = HexCoord::new(1, 0);
        assign(&mut store, PlayerId::Human, &[HexCoord::ORIGIN, HexCoord::new(2, -1)]);
        store.finish_setup();
        let engine = engine_with(&[(PlayerId::Human, flat_pool(20))]);

        let territory = store.get(target.into()).unwrap();
        let cost = engine.claim_cost(territory, PlayerId::Human, &store);
        // base {3,2,1,2}, +1 gold surcharge, two neighbors owned
        assert_eq!(cost.get(ResourceType::Gold), 2);
        assert_eq!(cost.get(ResourceType::Wood), 1);
        assert_eq!(cost.get(ResourceType::Metal), 1);
        assert_eq!(cost.get(ResourceType::Food), 1);
    }

    #[test]
    fn test_claim_moves_ownership_and_pays() {
        let mut store = uniform_store(2, ResourceType::Food, 1);
        store.finish_setup();
        let mut engine = engine_with(&[(PlayerId::Human, flat_pool(10))]);
        let id = TerritoryId::at(1, -1);

        let receipt = engine.claim_territory(id, PlayerId::Human, &mut store).unwrap();
        assert_eq!(receipt.territory.owner(), PlayerId::Human);
        assert_eq!(receipt.territory.times_contested(), 1);
        let mut expected = flat_pool(10);
        expected.subtract_all(&receipt.cost);
        assert_eq!(engine.pool(PlayerId::Human), Some(&expected));
    }

    #[test]
    fn test_owned_territory_cannot_be_claimed() {
        let mut store = uniform_store(2, ResourceType::Food, 1);
        assign(&mut store, PlayerId::Opponent(1), &[HexCoord::ORIGIN]);
        store.finish_setup();
        let mut engine = engine_with(&[(PlayerId::Human, flat_pool(10))]);

        let err = engine
            .claim_territory(TerritoryId::at(0, 0), PlayerId::Human, &mut store)
            .unwrap_err();
        assert_eq!(err.code(), "already_owned");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// A failed claim leaves pools and territories untouched.
        #[test]
        fn prop_claims_are_atomic(amount in 0i64..4, q in -2i32..=2, r in -2i32..=2) {
            let mut store = uniform_store(2, ResourceType::Wood, 2);
            store.finish_setup();
            let mut engine = engine_with(&[(PlayerId::Human, flat_pool(amount))]);
            let id = TerritoryId::at(q, r);
            let store_before = store.clone();
            let pool_before = engine.pool(PlayerId::Human).cloned();

            match engine.claim_territory(id, PlayerId::Human, &mut store) {
                Ok(receipt) => {
                    prop_assert_eq!(store.get(id).map(|t| t.owner()), Some(PlayerId::Human));
                    prop_assert!(engine.pool(PlayerId::Human).unwrap().is_non_negative());
                    prop_assert!(pool_before.unwrap().covers(&receipt.cost));
                }
                Err(_) => {
                    prop_assert_eq!(&store, &store_before);
                    prop_assert_eq!(engine.pool(PlayerId::Human).cloned(), pool_before);
                }
            }
        }
    }
}

// =============================================================================
// Economy
// =============================================================================

mod economy {
    use super::*;

    /// A boost for one party never changes another party's production.
    #[test]
    fn test_boosts_are_per_player() {
        let mut store = uniform_store(2, ResourceType::Metal, 2);
        assign(&mut store, PlayerId::Human, &[HexCoord::new(-1, 0)]);
        assign(&mut store, PlayerId::Opponent(1), &[HexCoord::new(1, 0)]);
        store.finish_setup();
        let mut engine = engine_with(&[
            (PlayerId::Human, flat_pool(0)),
            (PlayerId::Opponent(1), flat_pool(0)),
        ]);

        engine.apply_boost(PlayerId::Human, ResourceType::Metal, 3, Some(4));
        assert_eq!(engine.production(PlayerId::Human, &store).get(ResourceType::Metal), 5);
        assert_eq!(engine.production(PlayerId::Opponent(1), &store).get(ResourceType::Metal), 2);

        engine.advance_time(4);
        assert_eq!(engine.production(PlayerId::Human, &store).get(ResourceType::Metal), 2);
    }

    #[test]
    fn test_temporary_multiplier_reverts() {
        let mut store = uniform_store(2, ResourceType::Food, 2);
        assign(&mut store, PlayerId::Human, &[HexCoord::ORIGIN]);
        store.finish_setup();
        let mut engine = engine_with(&[(PlayerId::Human, flat_pool(0))]);

        engine.set_multiplier(ResourceType::Food, Multiplier::from_percent(150), Some(2));
        assert_eq!(engine.production(PlayerId::Human, &store).get(ResourceType::Food), 3);
        engine.advance_time(2);
        assert_eq!(engine.production(PlayerId::Human, &store).get(ResourceType::Food), 2);
    }

    #[test]
    fn test_windfall_event_grants_every_tradable() {
        let mut engine = engine_with(&[(PlayerId::Human, flat_pool(1))]);
        let event = RandomEvent::Windfall {
            amounts: flat_pool(3),
        };
        event.apply(&mut engine, PlayerId::Human).unwrap();
        assert_eq!(engine.pool(PlayerId::Human), Some(&flat_pool(4)));
    }
}

// =============================================================================
// Store
// =============================================================================

mod store {
    use super::*;
    use dominion_test_utils::fixtures::rng;

    #[test]
    fn test_create_or_get_is_idempotent() {
        let mut store = TerritoryStore::new(HexGrid::new(2), ResourceTable::standard());
        let mut rng = rng(1);
        let first = store
            .create_or_get(HexCoord::new(1, 1), TerritoryPatch::default(), &mut rng)
            .unwrap()
            .clone();
        let second = store
            .create_or_get(
                HexCoord::new(1, 1),
                TerritoryPatch::default().resource(ResourceType::Gold, 9),
                &mut rng,
            )
            .unwrap()
            .clone();
        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_off_grid_create_fails() {
        let mut store = TerritoryStore::new(HexGrid::new(2), ResourceTable::standard());
        let err = store
            .create_or_get(HexCoord::new(3, 0), TerritoryPatch::default(), &mut rng(1))
            .unwrap_err();
        assert_eq!(err.code(), "invalid_coordinate");
    }
}

// =============================================================================
// Turns and full games
// =============================================================================

mod games {
    use super::*;

    #[test]
    fn test_turn_rotation_visits_every_party() {
        let mut game = Game::new(GameConfig::default().with_players(3).with_seed(21)).unwrap();
        game.start().unwrap();
        for player in [PlayerId::Opponent(1), PlayerId::Opponent(2)] {
            game.set_opponent(player, Box::new(PassiveOpponent)).unwrap();
        }

        game.end_turn().unwrap();
        assert_eq!(game.turn_state().unwrap().active_player, PlayerId::Opponent(1));
        game.advance().unwrap();
        assert_eq!(game.turn_state().unwrap().active_player, PlayerId::Opponent(2));
        game.advance().unwrap();
        let state = game.turn_state().unwrap();
        assert_eq!(state.active_player, PlayerId::Human);
        assert_eq!(state.turn_number, 2);
    }

    #[test]
    fn test_random_events_only_after_second_turn() {
        let mut game = started_game(31);
        for _ in 0..200 {
            if game.advance().is_err() {
                break;
            }
        }
        assert!(game.random_events().iter().all(|r| r.turn > 2));
    }

    #[test]
    fn test_frontier_opponents_expand() {
        let mut game = started_game(17);
        game.set_opponent(PlayerId::Opponent(1), Box::new(FrontierOpponent)).unwrap();
        let before = game.territories().count_by_owner(PlayerId::Opponent(1));
        for _ in 0..12 {
            if game.advance().is_err() {
                break;
            }
        }
        assert!(game.territories().count_by_owner(PlayerId::Opponent(1)) > before);
    }

    #[test]
    fn test_home_bases_are_placed_and_sealed() {
        let game = Game::new(GameConfig::default().with_players(4)).unwrap();
        let store = game.territories();
        assert!(store.is_setup_complete());
        for player in game.players() {
            let homes: Vec<_> = store
                .get_by_owner(*player)
                .into_iter()
                .filter(|t| t.is_home_base())
                .collect();
            assert_eq!(homes.len(), 1, "{player} should have one home base");
        }
    }

    #[test]
    fn test_same_seed_same_map() {
        let a = Game::new(GameConfig::default().with_seed(99)).unwrap();
        let b = Game::new(GameConfig::default().with_seed(99)).unwrap();
        assert_eq!(a.territories(), b.territories());
    }
}
