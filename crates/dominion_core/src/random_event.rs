//! Random events rolled at the end of a turn.

use std::fmt;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::data::TurnConfig;
use crate::economy::ResourceEngine;
use crate::effects::Multiplier;
use crate::error::TransactionError;
use crate::players::PlayerId;
use crate::resources::{ResourceType, Resources};

/// The fixed set of random events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RandomEventKind {
    /// Free resources for the active player.
    Windfall,
    /// Temporary production multiplier on one resource.
    ProductionSurge,
    /// Temporary discount on every claim.
    ClaimDiscount,
}

impl RandomEventKind {
    /// Every kind, in selection order.
    pub const ALL: [Self; 3] = [Self::Windfall, Self::ProductionSurge, Self::ClaimDiscount];
}

impl fmt::Display for RandomEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Windfall => "windfall",
            Self::ProductionSurge => "production surge",
            Self::ClaimDiscount => "claim discount",
        })
    }
}

/// A rolled event with its concrete parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RandomEvent {
    /// Grant `amounts` to the active player.
    Windfall {
        /// Granted resources.
        amounts: Resources,
    },
    /// Override the multiplier of `resource` for `duration` ticks.
    ProductionSurge {
        /// Affected resource.
        resource: ResourceType,
        /// Multiplier while active.
        multiplier: Multiplier,
        /// Lifetime in ticks.
        duration: u64,
    },
    /// Knock `amount` off every claim cost entry for `duration` ticks.
    ClaimDiscount {
        /// Units removed per entry.
        amount: i64,
        /// Lifetime in ticks.
        duration: u64,
    },
}

/// An event that happened, as kept in the turn engine's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomEventRecord {
    /// Turn it happened on.
    pub turn: u32,
    /// Active player at the time.
    pub player: PlayerId,
    /// The event.
    pub event: RandomEvent,
}

/// Roll for an event at the end of `turn`.
///
/// Nothing happens on or before `random_event_after_turn`. After that the
/// configured chance applies and the kind is picked uniformly.
pub fn roll(config: &TurnConfig, turn: u32, rng: &mut dyn RngCore) -> Option<RandomEventKind> {
    if turn <= config.random_event_after_turn {
        return None;
    }
    if rng.gen_range(0..100u8) >= config.random_event_chance_percent {
        return None;
    }
    let index = rng.gen_range(0..RandomEventKind::ALL.len());
    Some(RandomEventKind::ALL[index])
}

impl RandomEvent {
    /// Fill in the parameters of an event of `kind`.
    pub fn materialize(kind: RandomEventKind, config: &TurnConfig, rng: &mut dyn RngCore) -> Self {
        match kind {
            RandomEventKind::Windfall => Self::Windfall {
                amounts: ResourceType::TRADABLE
                    .into_iter()
                    .map(|t| (t, config.windfall_amount))
                    .collect(),
            },
            RandomEventKind::ProductionSurge => {
                let index = rng.gen_range(0..ResourceType::TRADABLE.len());
                Self::ProductionSurge {
                    resource: ResourceType::TRADABLE[index],
                    multiplier: Multiplier::from_percent(config.surge_multiplier_percent),
                    duration: config.surge_duration_ticks,
                }
            }
            RandomEventKind::ClaimDiscount => Self::ClaimDiscount {
                amount: config.discount_amount,
                duration: config.discount_duration_ticks,
            },
        }
    }

    /// Which kind this is.
    #[must_use]
    pub const fn kind(&self) -> RandomEventKind {
        match self {
            Self::Windfall { .. } => RandomEventKind::Windfall,
            Self::ProductionSurge { .. } => RandomEventKind::ProductionSurge,
            Self::ClaimDiscount { .. } => RandomEventKind::ClaimDiscount,
        }
    }

    /// Put the event into effect for `player`.
    ///
    /// # Errors
    ///
    /// Only a windfall can fail, when `player` has no pool.
    pub fn apply(&self, engine: &mut ResourceEngine, player: PlayerId) -> Result<(), TransactionError> {
        match self {
            Self::Windfall { amounts } => {
                engine.grant(player, amounts)?;
            }
            Self::ProductionSurge {
                resource,
                multiplier,
                duration,
            } => {
                engine.set_multiplier(*resource, *multiplier, Some(*duration));
            }
            Self::ClaimDiscount { amount, duration } => {
                engine.apply_claim_discount(*amount, Some(*duration));
            }
        }
        tracing::info!(kind = %self.kind(), %player, "Random event");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::data::EconomyConfig;

    #[test]
    fn test_no_events_early() {
        let config = TurnConfig {
            random_event_chance_percent: 100,
            ..TurnConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for turn in 1..=2 {
            assert_eq!(roll(&config, turn, &mut rng), None);
        }
        assert!(roll(&config, 3, &mut rng).is_some());
    }

    #[test]
    fn test_zero_chance_never_fires() {
        let config = TurnConfig {
            random_event_chance_percent: 0,
            ..TurnConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        assert!((3..200).all(|turn| roll(&config, turn, &mut rng).is_none()));
    }

    #[test]
    fn test_roll_rate_roughly_matches_chance() {
        let config = TurnConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let fired = (0..2000)
            .filter(|_| roll(&config, 10, &mut rng).is_some())
            .count();
        assert!((450..750).contains(&fired), "fired {fired} of 2000");
    }

    #[test]
    fn test_every_kind_is_reachable() {
        let config = TurnConfig {
            random_event_chance_percent: 100,
            ..TurnConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..100 {
            seen.extend(roll(&config, 5, &mut rng));
        }
        assert_eq!(seen.len(), RandomEventKind::ALL.len());
    }

    #[test]
    fn test_apply_events() {
        let config = TurnConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut engine = ResourceEngine::new(EconomyConfig::default());
        engine.register_player(PlayerId::Human, Resources::new());

        let windfall = RandomEvent::materialize(RandomEventKind::Windfall, &config, &mut rng);
        windfall.apply(&mut engine, PlayerId::Human).unwrap();
        assert_eq!(
            engine.pool(PlayerId::Human).map(Resources::total),
            Some(4 * config.windfall_amount)
        );
        assert!(windfall.apply(&mut engine, PlayerId::Opponent(1)).is_err());

        let surge = RandomEvent::materialize(RandomEventKind::ProductionSurge, &config, &mut rng);
        surge.apply(&mut engine, PlayerId::Human).unwrap();
        if let RandomEvent::ProductionSurge { resource, .. } = surge {
            assert_eq!(engine.multiplier(resource), Multiplier::from_percent(150));
        }

        let discount = RandomEvent::materialize(RandomEventKind::ClaimDiscount, &config, &mut rng);
        discount.apply(&mut engine, PlayerId::Human).unwrap();
        assert_eq!(discount.kind(), RandomEventKind::ClaimDiscount);
        assert_eq!(engine.effects().len(), 2);
    }
}
