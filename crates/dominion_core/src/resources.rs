//! Resource types and resource bundles.
//!
//! A [`Resources`] bundle is the single currency shape used for player
//! pools, claim costs, production reports and ledger entries. Amounts are
//! signed so that malformed costs can be represented and rejected; pools
//! themselves never go negative.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of resource a territory yields.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ResourceType {
    /// Premium currency; claiming gold land costs extra.
    Gold,
    /// Timber from forests.
    Wood,
    /// Iron and other ores.
    Metal,
    /// Grain, livestock, fish.
    Food,
    /// Quarry stone. Only placed by map generation.
    Stone,
    /// Barren land that produces nothing.
    None,
}

impl ResourceType {
    /// Resource types that appear in claim costs and starting pools.
    pub const TRADABLE: [Self; 4] = [Self::Gold, Self::Wood, Self::Metal, Self::Food];

    /// Every type that can be produced.
    pub const PRODUCIBLE: [Self; 5] = [
        Self::Gold,
        Self::Wood,
        Self::Metal,
        Self::Food,
        Self::Stone,
    ];

    /// Whether territories of this type yield anything.
    #[must_use]
    pub const fn is_producible(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Lowercase name, used for display and JSON output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gold => "gold",
            Self::Wood => "wood",
            Self::Metal => "metal",
            Self::Food => "food",
            Self::Stone => "stone",
            Self::None => "none",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An amount per resource type.
///
/// Missing entries read as zero. Iteration is in [`ResourceType`] order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resources(BTreeMap<ResourceType, i64>);

impl Resources {
    /// An empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// A bundle with an explicit zero for every tradable type.
    #[must_use]
    pub fn zeroed() -> Self {
        Self(ResourceType::TRADABLE.iter().map(|&t| (t, 0)).collect())
    }

    /// Amount of `resource`, zero if absent.
    #[must_use]
    pub fn get(&self, resource: ResourceType) -> i64 {
        self.0.get(&resource).copied().unwrap_or(0)
    }

    /// Set the amount of `resource`.
    pub fn set(&mut self, resource: ResourceType, amount: i64) {
        self.0.insert(resource, amount);
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, resource: ResourceType, amount: i64) -> Self {
        self.set(resource, amount);
        self
    }

    /// Add `amount` to `resource`.
    pub fn add(&mut self, resource: ResourceType, amount: i64) {
        *self.0.entry(resource).or_insert(0) += amount;
    }

    /// Add every entry of `other`.
    pub fn add_all(&mut self, other: &Self) {
        for (resource, amount) in other.iter() {
            self.add(resource, amount);
        }
    }

    /// Subtract every entry of `other`.
    pub fn subtract_all(&mut self, other: &Self) {
        for (resource, amount) in other.iter() {
            self.add(resource, -amount);
        }
    }

    /// Apply `f` to every stored amount.
    pub fn map_amounts<F>(&mut self, mut f: F)
    where
        F: FnMut(ResourceType, i64) -> i64,
    {
        for (resource, amount) in &mut self.0 {
            *amount = f(*resource, *amount);
        }
    }

    /// Iterate over `(type, amount)` pairs in type order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceType, i64)> + '_ {
        self.0.iter().map(|(&t, &a)| (t, a))
    }

    /// Whether no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all amounts.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.0.values().sum()
    }

    /// Whether every amount is zero or positive.
    #[must_use]
    pub fn is_non_negative(&self) -> bool {
        self.0.values().all(|&a| a >= 0)
    }

    /// Whether every entry of `cost` is covered by this bundle.
    #[must_use]
    pub fn covers(&self, cost: &Self) -> bool {
        cost.iter().all(|(resource, amount)| amount <= self.get(resource))
    }

    /// Entries that are not zero.
    #[must_use]
    pub fn non_zero(&self) -> Self {
        Self(self.0.iter().filter(|(_, &a)| a != 0).map(|(&t, &a)| (t, a)).collect())
    }
}

impl<const N: usize> From<[(ResourceType, i64); N]> for Resources {
    fn from(entries: [(ResourceType, i64); N]) -> Self {
        Self(entries.into_iter().collect())
    }
}

impl FromIterator<(ResourceType, i64)> for Resources {
    fn from_iter<I: IntoIterator<Item = (ResourceType, i64)>>(iter: I) -> Self {
        let mut bundle = Self::new();
        for (resource, amount) in iter {
            bundle.add(resource, amount);
        }
        bundle
    }
}

impl fmt::Display for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (resource, amount)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{resource}: {amount}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_reads_zero() {
        let bundle = Resources::new();
        assert_eq!(bundle.get(ResourceType::Gold), 0);
        assert!(bundle.is_empty());
    }

    #[test]
    fn test_arithmetic() {
        let mut pool = Resources::from([(ResourceType::Gold, 5), (ResourceType::Wood, 2)]);
        pool.add_all(&Resources::from([(ResourceType::Wood, 3), (ResourceType::Food, 1)]));
        assert_eq!(pool.get(ResourceType::Wood), 5);
        assert_eq!(pool.get(ResourceType::Food), 1);

        pool.subtract_all(&Resources::from([(ResourceType::Gold, 5)]));
        assert_eq!(pool.get(ResourceType::Gold), 0);
        assert_eq!(pool.total(), 6);
        assert!(pool.is_non_negative());
    }

    #[test]
    fn test_covers() {
        let pool = Resources::from([(ResourceType::Gold, 3), (ResourceType::Wood, 1)]);
        assert!(pool.covers(&Resources::from([(ResourceType::Gold, 3)])));
        assert!(!pool.covers(&Resources::from([(ResourceType::Wood, 2)])));
        assert!(!pool.covers(&Resources::from([(ResourceType::Metal, 1)])));
        assert!(pool.covers(&Resources::new()));
    }

    #[test]
    fn test_zeroed_has_tradable_types() {
        let zeroed = Resources::zeroed();
        assert_eq!(zeroed.iter().count(), 4);
        assert_eq!(zeroed.total(), 0);
        assert!(zeroed.non_zero().is_empty());
    }

    #[test]
    fn test_display() {
        let bundle = Resources::from([(ResourceType::Food, 3), (ResourceType::Gold, 1)]);
        assert_eq!(bundle.to_string(), "{gold: 1, food: 3}");
    }
}
