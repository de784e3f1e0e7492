//! Authoritative collection of territories.
//!
//! [`TerritoryStore`] is the only place a [`Territory`] is constructed or
//! mutated. Iteration is always in coordinate order (row-major), so anything
//! derived from a scan over the map is deterministic.
//!
//! Ownership is free to change while the map is being set up. Once
//! [`finish_setup`](TerritoryStore::finish_setup) has been called the only way
//! to change an owner is [`claim`](TerritoryStore::claim).

use std::collections::BTreeMap;

use rand::RngCore;

use crate::data::ResourceTable;
use crate::error::StoreError;
use crate::events::TerritoryEvent;
use crate::grid::HexGrid;
use crate::hex::HexCoord;
use crate::players::PlayerId;
use crate::territory::{Territory, TerritoryId, TerritoryPatch, MAX_RESOURCE_VALUE};

/// Map of every territory on a [`HexGrid`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerritoryStore {
    grid: HexGrid,
    territories: BTreeMap<TerritoryId, Territory>,
    table: ResourceTable,
    setup_complete: bool,
    pending: Vec<TerritoryEvent>,
}

impl TerritoryStore {
    /// Create an empty store over `grid`.
    ///
    /// `table` picks the resource of territories created without an explicit one.
    #[must_use]
    pub fn new(grid: HexGrid, table: ResourceTable) -> Self {
        Self {
            grid,
            territories: BTreeMap::new(),
            table,
            setup_complete: false,
            pending: Vec::new(),
        }
    }

    /// Rebuild a store from saved territories.
    ///
    /// No events are raised.
    ///
    /// # Errors
    ///
    /// Fails if a territory lies outside `grid`, has a zero value, or its id
    /// does not match its coordinate.
    pub fn from_parts(
        grid: HexGrid,
        table: ResourceTable,
        territories: impl IntoIterator<Item = Territory>,
        setup_complete: bool,
    ) -> Result<Self, StoreError> {
        let mut map = BTreeMap::new();
        for territory in territories {
            if !grid.contains(territory.coord) || territory.id.coord() != territory.coord {
                return Err(StoreError::InvalidCoordinate(territory.coord));
            }
            if !(1..=MAX_RESOURCE_VALUE).contains(&territory.resource_value) {
                return Err(StoreError::InvalidValue(territory.id));
            }
            map.insert(territory.id, territory);
        }
        Ok(Self {
            grid,
            territories: map,
            table,
            setup_complete,
            pending: Vec::new(),
        })
    }

    /// The underlying grid.
    #[must_use]
    pub const fn grid(&self) -> &HexGrid {
        &self.grid
    }

    /// Table used for procedural defaults.
    #[must_use]
    pub const fn resource_table(&self) -> &ResourceTable {
        &self.table
    }

    /// Replace the table used for territories created from now on.
    pub fn set_resource_table(&mut self, table: ResourceTable) {
        self.table = table;
    }

    /// Number of territories created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.territories.len()
    }

    /// Whether no territory exists yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.territories.is_empty()
    }

    /// Whether the initial configuration pass is over.
    #[must_use]
    pub const fn is_setup_complete(&self) -> bool {
        self.setup_complete
    }

    /// Whether every hex of the grid has a territory.
    #[must_use]
    pub fn covers_grid(&self) -> bool {
        self.territories.len() == self.grid.len()
            && self.grid.coords().all(|c| self.territories.contains_key(&TerritoryId::new(c)))
    }

    /// End the configuration pass. Owners can only change through [`claim`](Self::claim) afterwards.
    pub fn finish_setup(&mut self) {
        self.setup_complete = true;
        tracing::debug!(territories = self.territories.len(), "Territory setup complete");
    }

    /// Fetch the territory at `coord`, creating it if needed, and apply `patch`.
    ///
    /// A new territory starts neutral with a resource drawn from the store's
    /// table, then takes the patch as overrides and raises
    /// [`TerritoryEvent::Created`]. An existing territory is merge-updated and
    /// raises [`TerritoryEvent::Updated`] only if a field actually changed.
    ///
    /// # Errors
    ///
    /// Fails if `coord` is outside the grid or the patch is rejected.
    pub fn create_or_get(
        &mut self,
        coord: HexCoord,
        patch: TerritoryPatch,
        rng: &mut dyn RngCore,
    ) -> Result<&Territory, StoreError> {
        if !self.grid.contains(coord) {
            tracing::warn!(%coord, "Territory requested outside the grid");
            return Err(StoreError::InvalidCoordinate(coord));
        }
        let id = TerritoryId::new(coord);
        self.check_patch(id, &patch)?;

        if let Some(territory) = self.territories.get_mut(&id) {
            let changes = territory.apply(&patch);
            if !changes.is_empty() {
                self.pending.push(TerritoryEvent::Updated { id, changes });
            }
        } else {
            let kind = self.table.sample_type(rng);
            let value = self.table.sample_value(rng).max(1);
            let mut territory = Territory::new(coord, kind, value);
            territory.apply(&patch);
            self.pending.push(TerritoryEvent::Created {
                id,
                owner: territory.owner,
            });
            self.territories.insert(id, territory);
        }

        self.territories.get(&id).ok_or(StoreError::NotFound(id))
    }

    /// Territory by id.
    #[must_use]
    pub fn get(&self, id: TerritoryId) -> Option<&Territory> {
        self.territories.get(&id)
    }

    /// Territory at a coordinate.
    #[must_use]
    pub fn get_at(&self, coord: HexCoord) -> Option<&Territory> {
        self.get(TerritoryId::new(coord))
    }

    /// Every territory in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = &Territory> + '_ {
        self.territories.values()
    }

    /// Territories owned by `owner`, in coordinate order.
    #[must_use]
    pub fn get_by_owner(&self, owner: PlayerId) -> Vec<&Territory> {
        self.iter().filter(|t| t.owner == owner).collect()
    }

    /// Number of territories owned by `owner`.
    #[must_use]
    pub fn count_by_owner(&self, owner: PlayerId) -> usize {
        self.iter().filter(|t| t.owner == owner).count()
    }

    /// Territory count per owner, neutral included.
    #[must_use]
    pub fn ownership_counts(&self) -> BTreeMap<PlayerId, usize> {
        let mut counts = BTreeMap::new();
        for territory in self.iter() {
            *counts.entry(territory.owner).or_insert(0) += 1;
        }
        counts
    }

    /// Strategic points in coordinate order.
    #[must_use]
    pub fn strategic_points(&self) -> Vec<&Territory> {
        self.iter().filter(|t| t.is_strategic).collect()
    }

    /// Existing territories adjacent to `id`, in direction order.
    #[must_use]
    pub fn neighbors_of(&self, id: TerritoryId) -> Vec<&Territory> {
        self.grid
            .neighbors_of(id.coord())
            .iter()
            .filter_map(|c| self.get_at(*c))
            .collect()
    }

    /// How many neighbors of `id` belong to `player`.
    #[must_use]
    pub fn owned_neighbor_count(&self, id: TerritoryId, player: PlayerId) -> usize {
        self.grid
            .neighbors_of(id.coord())
            .iter()
            .filter(|c| self.get_at(**c).is_some_and(|t| t.owner == player))
            .count()
    }

    /// Transfer `id` to `new_owner`.
    ///
    /// Records the previous owner, stamps `turn`, strips home-base status and
    /// bumps `times_contested`. Callers that charge for a claim must have paid
    /// before calling this.
    ///
    /// # Errors
    ///
    /// Fails if the territory does not exist or already belongs to `new_owner`.
    pub fn claim(
        &mut self,
        id: TerritoryId,
        new_owner: PlayerId,
        turn: u32,
    ) -> Result<&Territory, StoreError> {
        let Some(territory) = self.territories.get_mut(&id) else {
            tracing::warn!(%id, "Claim on unknown territory");
            return Err(StoreError::NotFound(id));
        };
        if territory.owner == new_owner {
            return Err(StoreError::SameOwner {
                id,
                owner: new_owner,
            });
        }

        let old_owner = territory.owner;
        territory.previous_owner = Some(old_owner);
        territory.owner = new_owner;
        territory.is_home_base = false;
        territory.times_contested += 1;
        territory.turn_claimed = Some(turn);

        tracing::info!(%id, from = %old_owner, to = %new_owner, turn, "Territory claimed");
        self.pending.push(TerritoryEvent::OwnershipChanged {
            id,
            old_owner,
            new_owner,
        });

        Ok(territory)
    }

    /// Merge `patch` into an existing territory, returning the fields that changed.
    ///
    /// # Errors
    ///
    /// Fails if the territory does not exist or the patch is rejected.
    pub fn update(
        &mut self,
        id: TerritoryId,
        patch: &TerritoryPatch,
    ) -> Result<TerritoryPatch, StoreError> {
        if !self.territories.contains_key(&id) {
            tracing::warn!(%id, "Update on unknown territory");
            return Err(StoreError::NotFound(id));
        }
        self.check_patch(id, patch)?;

        let territory = self
            .territories
            .get_mut(&id)
            .ok_or(StoreError::NotFound(id))?;
        let changes = territory.apply(patch);
        if !changes.is_empty() {
            tracing::debug!(%id, ?changes, "Territory updated");
            self.pending.push(TerritoryEvent::Updated { id, changes });
        }
        Ok(changes)
    }

    /// Take the events raised since the last drain.
    pub fn drain_events(&mut self) -> Vec<TerritoryEvent> {
        std::mem::take(&mut self.pending)
    }

    fn check_patch(&self, id: TerritoryId, patch: &TerritoryPatch) -> Result<(), StoreError> {
        if patch
            .resource_value
            .is_some_and(|v| !(1..=MAX_RESOURCE_VALUE).contains(&v))
        {
            return Err(StoreError::InvalidValue(id));
        }
        if self.setup_complete {
            if let Some(owner) = patch.owner {
                let current = self.get(id).map_or(PlayerId::Neutral, |t| t.owner);
                if owner != current {
                    tracing::warn!(%id, %owner, "Ownership patch after setup");
                    return Err(StoreError::OwnershipRequiresClaim(id));
                }
            }
        }
        Ok(())
    }
}
