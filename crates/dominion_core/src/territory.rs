//! A single hex cell with ownership and production state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::hex::HexCoord;
use crate::players::PlayerId;
use crate::resources::ResourceType;

/// Largest production value a territory may carry.
pub const MAX_RESOURCE_VALUE: u32 = 1_000_000;

/// Stable key of a territory, derived from its coordinate.
///
/// Renders as `"q,r"` and parses back from the same form.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TerritoryId(HexCoord);

impl TerritoryId {
    /// Id of the territory at `coord`.
    #[must_use]
    pub const fn new(coord: HexCoord) -> Self {
        Self(coord)
    }

    /// Id of the territory at `(q, r)`.
    #[must_use]
    pub const fn at(q: i32, r: i32) -> Self {
        Self(HexCoord::new(q, r))
    }

    /// The coordinate this id refers to.
    #[must_use]
    pub const fn coord(self) -> HexCoord {
        self.0
    }
}

impl From<HexCoord> for TerritoryId {
    fn from(coord: HexCoord) -> Self {
        Self(coord)
    }
}

impl fmt::Display for TerritoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.0.q, self.0.r)
    }
}

/// Error parsing a [`TerritoryId`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid territory id '{0}', expected 'q,r'")]
pub struct ParseTerritoryIdError(String);

impl FromStr for TerritoryId {
    type Err = ParseTerritoryIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseTerritoryIdError(s.to_string());
        let (q, r) = s.split_once(',').ok_or_else(err)?;
        let q = q.trim().parse().map_err(|_| err())?;
        let r = r.trim().parse().map_err(|_| err())?;
        Ok(Self::at(q, r))
    }
}

/// Mutable state of one territory.
///
/// Instances are only constructed and mutated by
/// [`TerritoryStore`](crate::store::TerritoryStore); everything else reads
/// them through the accessors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Territory {
    /// Stable key.
    pub(crate) id: TerritoryId,
    /// Grid position.
    pub(crate) coord: HexCoord,
    /// Current owner.
    pub(crate) owner: PlayerId,
    /// What this territory produces.
    pub(crate) resource_type: ResourceType,
    /// Units of `resource_type` produced per turn.
    pub(crate) resource_value: u32,
    /// Starting territory of a party.
    pub(crate) is_home_base: bool,
    /// Counts toward strategic victory.
    #[serde(default)]
    pub(crate) is_strategic: bool,
    /// Defensive level. Reserved for a combat layer.
    pub(crate) fortification_level: u32,
    /// Garrisoned units. Reserved for a combat layer.
    pub(crate) unit_count: u32,
    /// Turn of the last ownership change.
    pub(crate) turn_claimed: Option<u32>,
    /// Owner before the last ownership change.
    pub(crate) previous_owner: Option<PlayerId>,
    /// Number of ownership changes; raises the claim cost.
    pub(crate) times_contested: u32,
}

impl Territory {
    pub(crate) fn new(coord: HexCoord, resource_type: ResourceType, resource_value: u32) -> Self {
        Self {
            id: TerritoryId::new(coord),
            coord,
            owner: PlayerId::Neutral,
            resource_type,
            resource_value,
            is_home_base: false,
            is_strategic: false,
            fortification_level: 0,
            unit_count: 0,
            turn_claimed: None,
            previous_owner: None,
            times_contested: 0,
        }
    }

    /// Stable key.
    #[must_use]
    pub const fn id(&self) -> TerritoryId {
        self.id
    }

    /// Grid position.
    #[must_use]
    pub const fn coord(&self) -> HexCoord {
        self.coord
    }

    /// Current owner.
    #[must_use]
    pub const fn owner(&self) -> PlayerId {
        self.owner
    }

    /// What this territory produces.
    #[must_use]
    pub const fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Units produced per turn.
    #[must_use]
    pub const fn resource_value(&self) -> u32 {
        self.resource_value
    }

    /// Whether this is a party's starting territory.
    #[must_use]
    pub const fn is_home_base(&self) -> bool {
        self.is_home_base
    }

    /// Whether this counts toward strategic victory.
    #[must_use]
    pub const fn is_strategic(&self) -> bool {
        self.is_strategic
    }

    /// Defensive level.
    #[must_use]
    pub const fn fortification_level(&self) -> u32 {
        self.fortification_level
    }

    /// Garrisoned units.
    #[must_use]
    pub const fn unit_count(&self) -> u32 {
        self.unit_count
    }

    /// Turn of the last ownership change, if any.
    #[must_use]
    pub const fn turn_claimed(&self) -> Option<u32> {
        self.turn_claimed
    }

    /// Owner before the last ownership change, if any.
    #[must_use]
    pub const fn previous_owner(&self) -> Option<PlayerId> {
        self.previous_owner
    }

    /// How often ownership has changed.
    #[must_use]
    pub const fn times_contested(&self) -> u32 {
        self.times_contested
    }

    /// Whether nobody owns this territory.
    #[must_use]
    pub const fn is_neutral(&self) -> bool {
        matches!(self.owner, PlayerId::Neutral)
    }

    /// Whether `player` owns this territory.
    #[must_use]
    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == player
    }

    /// Apply every set field of `patch`, returning the fields that changed.
    pub(crate) fn apply(&mut self, patch: &TerritoryPatch) -> TerritoryPatch {
        let mut changed = TerritoryPatch::default();

        if let Some(owner) = patch.owner.filter(|o| *o != self.owner) {
            self.owner = owner;
            changed.owner = Some(owner);
        }
        if let Some(kind) = patch.resource_type.filter(|t| *t != self.resource_type) {
            self.resource_type = kind;
            changed.resource_type = Some(kind);
        }
        if let Some(value) = patch.resource_value.filter(|v| *v != self.resource_value) {
            self.resource_value = value;
            changed.resource_value = Some(value);
        }
        if let Some(home) = patch.is_home_base.filter(|h| *h != self.is_home_base) {
            self.is_home_base = home;
            changed.is_home_base = Some(home);
        }
        if let Some(strategic) = patch.is_strategic.filter(|s| *s != self.is_strategic) {
            self.is_strategic = strategic;
            changed.is_strategic = Some(strategic);
        }
        if let Some(level) = patch
            .fortification_level
            .filter(|l| *l != self.fortification_level)
        {
            self.fortification_level = level;
            changed.fortification_level = Some(level);
        }
        if let Some(units) = patch.unit_count.filter(|u| *u != self.unit_count) {
            self.unit_count = units;
            changed.unit_count = Some(units);
        }

        changed
    }
}

/// A typed partial update of a [`Territory`].
///
/// The field set is closed: anything not listed here cannot be patched.
/// History fields (`turn_claimed`, `previous_owner`, `times_contested`) are
/// only written by a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TerritoryPatch {
    /// New owner (setup only; see [`TerritoryStore::finish_setup`](crate::store::TerritoryStore::finish_setup)).
    pub owner: Option<PlayerId>,
    /// New resource type.
    pub resource_type: Option<ResourceType>,
    /// New production value (must be positive).
    pub resource_value: Option<u32>,
    /// New home-base flag.
    pub is_home_base: Option<bool>,
    /// New strategic-point flag.
    pub is_strategic: Option<bool>,
    /// New fortification level.
    pub fortification_level: Option<u32>,
    /// New unit count.
    pub unit_count: Option<u32>,
}

impl TerritoryPatch {
    /// Whether no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Set the owner.
    #[must_use]
    pub const fn owner(mut self, owner: PlayerId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Set the resource type and value.
    #[must_use]
    pub const fn resource(mut self, kind: ResourceType, value: u32) -> Self {
        self.resource_type = Some(kind);
        self.resource_value = Some(value);
        self
    }

    /// Set the home-base flag.
    #[must_use]
    pub const fn home_base(mut self, home: bool) -> Self {
        self.is_home_base = Some(home);
        self
    }

    /// Set the strategic-point flag.
    #[must_use]
    pub const fn strategic(mut self, strategic: bool) -> Self {
        self.is_strategic = Some(strategic);
        self
    }

    /// Set the fortification level.
    #[must_use]
    pub const fn fortification(mut self, level: u32) -> Self {
        self.fortification_level = Some(level);
        self
    }

    /// Set the unit count.
    #[must_use]
    pub const fn units(mut self, count: u32) -> Self {
        self.unit_count = Some(count);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip() {
        let id = TerritoryId::at(-2, 3);
        assert_eq!(id.to_string(), "-2,3");
        assert_eq!("-2,3".parse::<TerritoryId>(), Ok(id));
        assert_eq!(" 4 , -1 ".parse::<TerritoryId>(), Ok(TerritoryId::at(4, -1)));
        assert!("nope".parse::<TerritoryId>().is_err());
        assert!("1;2".parse::<TerritoryId>().is_err());
    }

    #[test]
    fn test_new_territory_is_neutral() {
        let t = Territory::new(HexCoord::new(1, 1), ResourceType::Food, 2);
        assert!(t.is_neutral());
        assert_eq!(t.id, TerritoryId::at(1, 1));
        assert_eq!(t.times_contested, 0);
        assert_eq!(t.turn_claimed, None);
    }

    #[test]
    fn test_accessors_mirror_state() {
        let mut t = Territory::new(HexCoord::new(2, -1), ResourceType::Gold, 3);
        t.apply(&TerritoryPatch::default().owner(PlayerId::Human).home_base(true).units(4));
        assert_eq!(t.id(), TerritoryId::at(2, -1));
        assert_eq!(t.coord(), HexCoord::new(2, -1));
        assert_eq!(t.owner(), PlayerId::Human);
        assert_eq!((t.resource_type(), t.resource_value()), (ResourceType::Gold, 3));
        assert!(t.is_home_base());
        assert!(!t.is_strategic());
        assert_eq!(t.unit_count(), 4);
        assert_eq!(t.fortification_level(), 0);
        assert_eq!((t.turn_claimed(), t.previous_owner(), t.times_contested()), (None, None, 0));
    }

    #[test]
    fn test_apply_reports_only_changes() {
        let mut t = Territory::new(HexCoord::ORIGIN, ResourceType::Wood, 2);
        let patch = TerritoryPatch::default()
            .resource(ResourceType::Wood, 3)
            .fortification(2);
        let changed = t.apply(&patch);

        assert_eq!(changed.resource_type, None);
        assert_eq!(changed.resource_value, Some(3));
        assert_eq!(changed.fortification_level, Some(2));
        assert_eq!(t.resource_value, 3);

        // Re-applying is a no-op
        assert!(t.apply(&patch).is_empty());
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        let ok: Result<TerritoryPatch, _> = ron::from_str("(unit_count: Some(4))");
        assert_eq!(ok.ok().and_then(|p| p.unit_count), Some(4));

        let bad: Result<TerritoryPatch, _> = ron::from_str("(gold_bonus: Some(4))");
        assert!(bad.is_err());
    }
}
