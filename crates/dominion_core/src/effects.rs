//! Production multipliers, boosts and other timed effects.
//!
//! Temporary effects are deferred actions keyed by the logical tick counter.
//! Nothing here reads a clock: an effect scheduled at tick `t` with duration
//! `d` is removed by the first [`EffectSchedule::expire_until`] call at or
//! after tick `t + d`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed};
use crate::players::PlayerId;
use crate::resources::ResourceType;

/// A production multiplier in fixed-point.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Multiplier(#[serde(with = "fixed_serde")] Fixed);

impl Multiplier {
    /// Identity multiplier.
    pub const ONE: Self = Self(Fixed::ONE);

    /// Wrap a fixed-point value.
    #[must_use]
    pub const fn from_fixed(value: Fixed) -> Self {
        Self(value)
    }

    /// `percent / 100`, e.g. `150` for ×1.5.
    #[must_use]
    pub fn from_percent(percent: u32) -> Self {
        Self(Fixed::saturating_from_num(percent) / Fixed::from_num(100))
    }

    /// The raw value.
    #[must_use]
    pub const fn value(self) -> Fixed {
        self.0
    }

    /// `floor(amount × self)`, saturating at the fixed-point range.
    #[must_use]
    pub fn apply(self, amount: u32) -> i64 {
        Fixed::saturating_from_num(amount)
            .saturating_mul(self.0)
            .floor()
            .to_num::<i64>()
    }
}

impl Default for Multiplier {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Multiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// Something that changes production or claim costs for a while.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    /// Flat extra production per owned territory of a type.
    Boost {
        /// Boosted player.
        player: PlayerId,
        /// Boosted resource.
        resource: ResourceType,
        /// Extra units per territory.
        amount: i64,
    },
    /// Overrides the base multiplier of a resource for everyone.
    Multiplier {
        /// Affected resource.
        resource: ResourceType,
        /// Multiplier while active.
        value: Multiplier,
    },
    /// Knocks a flat amount off every claim cost entry.
    ClaimDiscount {
        /// Units removed per entry.
        amount: i64,
    },
}

/// Identifier of a scheduled effect. Increases with scheduling order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EffectId(pub u64);

/// An effect with its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduledEffect {
    /// Identifier.
    pub id: EffectId,
    /// The effect.
    pub effect: Effect,
    /// Tick at which it was applied.
    pub applied_at: u64,
    /// Tick at which it expires, `None` for permanent.
    pub expires_at: Option<u64>,
}

/// Active effects, in scheduling order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectSchedule {
    next_id: u64,
    active: Vec<ScheduledEffect>,
}

impl EffectSchedule {
    /// Empty schedule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an effect starting at `now`, lasting `duration` ticks (`None` = forever).
    pub fn schedule(&mut self, effect: Effect, now: u64, duration: Option<u64>) -> ScheduledEffect {
        let scheduled = ScheduledEffect {
            id: EffectId(self.next_id),
            effect,
            applied_at: now,
            expires_at: duration.map(|d| now.saturating_add(d)),
        };
        self.next_id += 1;
        self.active.push(scheduled);
        scheduled
    }

    /// Remove and return every effect due at or before `now`, ordered by
    /// expiry tick then id.
    pub fn expire_until(&mut self, now: u64) -> Vec<ScheduledEffect> {
        let mut expired: Vec<ScheduledEffect> = self
            .active
            .iter()
            .filter(|e| e.expires_at.is_some_and(|t| t <= now))
            .copied()
            .collect();
        if expired.is_empty() {
            return expired;
        }
        self.active
            .retain(|e| !e.expires_at.is_some_and(|t| t <= now));
        expired.sort_by_key(|e| (e.expires_at, e.id));
        expired
    }

    /// Remove one effect early.
    pub fn cancel(&mut self, id: EffectId) -> Option<ScheduledEffect> {
        let index = self.active.iter().position(|e| e.id == id)?;
        Some(self.active.remove(index))
    }

    /// Active effects in scheduling order.
    #[must_use]
    pub fn active(&self) -> &[ScheduledEffect] {
        &self.active
    }

    /// Sum of active boosts for `(player, resource)`.
    #[must_use]
    pub fn boost(&self, player: PlayerId, resource: ResourceType) -> i64 {
        self.active
            .iter()
            .filter_map(|e| match e.effect {
                Effect::Boost {
                    player: p,
                    resource: r,
                    amount,
                } if p == player && r == resource => Some(amount),
                _ => None,
            })
            .sum()
    }

    /// Most recently applied active multiplier override for `resource`.
    #[must_use]
    pub fn multiplier_override(&self, resource: ResourceType) -> Option<Multiplier> {
        self.active.iter().rev().find_map(|e| match e.effect {
            Effect::Multiplier { resource: r, value } if r == resource => Some(value),
            _ => None,
        })
    }

    /// Sum of active claim discounts.
    #[must_use]
    pub fn claim_discount(&self) -> i64 {
        self.active
            .iter()
            .filter_map(|e| match e.effect {
                Effect::ClaimDiscount { amount } => Some(amount),
                _ => None,
            })
            .sum()
    }
}
