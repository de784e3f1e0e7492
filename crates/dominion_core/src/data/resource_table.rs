//! Weighted resource tables for procedural territory contents.

use rand::distributions::{Distribution, WeightedIndex};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::resources::ResourceType;
use crate::territory::MAX_RESOURCE_VALUE;

/// Weights used to pick a territory's resource type and production value.
///
/// # Example RON
///
/// ```ron
/// ResourceTable(
///     types: [(Food, 30), (Wood, 25), (Metal, 20), (Gold, 15), (None, 10)],
///     values: [(1, 50), (2, 35), (3, 15)],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTable {
    /// `(type, weight)` pairs.
    pub types: Vec<(ResourceType, u32)>,
    /// `(production value, weight)` pairs.
    pub values: Vec<(u32, u32)>,
}

impl ResourceTable {
    /// Table for territories created outside map generation. Never yields stone.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            types: vec![
                (ResourceType::Food, 30),
                (ResourceType::Wood, 25),
                (ResourceType::Metal, 20),
                (ResourceType::Gold, 15),
                (ResourceType::None, 10),
            ],
            values: vec![(1, 50), (2, 35), (3, 15)],
        }
    }

    /// Table used by map generation.
    #[must_use]
    pub fn map_generation() -> Self {
        Self {
            types: vec![
                (ResourceType::Food, 28),
                (ResourceType::Wood, 24),
                (ResourceType::Metal, 18),
                (ResourceType::Gold, 12),
                (ResourceType::Stone, 8),
                (ResourceType::None, 10),
            ],
            values: vec![(1, 45), (2, 38), (3, 17)],
        }
    }

    /// A table that always yields the same type and value.
    #[must_use]
    pub fn fixed(resource: ResourceType, value: u32) -> Self {
        Self {
            types: vec![(resource, 1)],
            values: vec![(value, 1)],
        }
    }

    /// Pick a resource type. Falls back to [`ResourceType::None`] on an unusable table.
    pub fn sample_type(&self, rng: &mut dyn RngCore) -> ResourceType {
        WeightedIndex::new(self.types.iter().map(|(_, weight)| *weight))
            .map(|dist| self.types[dist.sample(rng)].0)
            .unwrap_or(ResourceType::None)
    }

    /// Pick a production value. Falls back to 1 on an unusable table.
    pub fn sample_value(&self, rng: &mut dyn RngCore) -> u32 {
        WeightedIndex::new(self.values.iter().map(|(_, weight)| *weight))
            .map(|dist| self.values[dist.sample(rng)].0)
            .unwrap_or(1)
    }

    /// Highest value this table can yield.
    #[must_use]
    pub fn max_value(&self) -> u32 {
        self.values.iter().map(|(value, _)| *value).max().unwrap_or(1)
    }

    /// Check that both tables can be sampled and yield positive values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.types.iter().all(|(_, weight)| *weight == 0) {
            return Err(ConfigError::Invalid(
                "resource table needs at least one weighted type".into(),
            ));
        }
        if self.values.iter().all(|(_, weight)| *weight == 0) {
            return Err(ConfigError::Invalid(
                "resource table needs at least one weighted value".into(),
            ));
        }
        if self
            .values
            .iter()
            .any(|(value, _)| !(1..=MAX_RESOURCE_VALUE).contains(value))
        {
            return Err(ConfigError::Invalid(format!(
                "resource values must be between 1 and {MAX_RESOURCE_VALUE}"
            )));
        }
        Ok(())
    }
}

impl Default for ResourceTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_standard_never_yields_stone() {
        let table = ResourceTable::standard();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..500 {
            assert_ne!(table.sample_type(&mut rng), ResourceType::Stone);
        }
    }

    #[test]
    fn test_fixed_table_is_deterministic() {
        let table = ResourceTable::fixed(ResourceType::Metal, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(table.sample_type(&mut rng), ResourceType::Metal);
        assert_eq!(table.sample_value(&mut rng), 2);
    }

    #[test]
    fn test_same_seed_same_samples() {
        let table = ResourceTable::map_generation();
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        let left: Vec<_> = (0..50).map(|_| table.sample_type(&mut a)).collect();
        let right: Vec<_> = (0..50).map(|_| table.sample_type(&mut b)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_validate() {
        assert!(ResourceTable::standard().validate().is_ok());
        let empty = ResourceTable {
            types: vec![(ResourceType::Gold, 0)],
            values: vec![(1, 1)],
        };
        assert!(empty.validate().is_err());
        let zero_value = ResourceTable {
            types: vec![(ResourceType::Gold, 1)],
            values: vec![(0, 1)],
        };
        assert!(zero_value.validate().is_err());
        assert!(ResourceTable::fixed(ResourceType::Gold, MAX_RESOURCE_VALUE).validate().is_ok());
        assert!(ResourceTable::fixed(ResourceType::Gold, MAX_RESOURCE_VALUE + 1).validate().is_err());
        assert_eq!(ResourceTable::map_generation().max_value(), 3);
    }

    #[test]
    fn test_unusable_table_falls_back() {
        let table = ResourceTable {
            types: Vec::new(),
            values: Vec::new(),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(table.sample_type(&mut rng), ResourceType::None);
        assert_eq!(table.sample_value(&mut rng), 1);
    }
}
