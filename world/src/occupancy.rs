//! Dense occupancy grid with a reverse index from entity to cell.

use std::collections::BTreeMap;

use subjunctive_core::{EntityId, Grid, Location};

/// One slot per grid cell plus the inverse mapping.
///
/// Every location always has a slot (empty or holding one entity), and an
/// entity appears in at most one slot. The reverse index is kept in lockstep
/// so lookups by entity never scan the grid.
#[derive(Clone, Debug)]
pub(crate) struct OccupancyGrid {
    grid: Grid,
    cells: Vec<Option<EntityId>>,
    placements: BTreeMap<EntityId, Location>,
}

impl OccupancyGrid {
    pub(crate) fn new(grid: Grid) -> Self {
        Self {
            grid,
            cells: vec![None; grid.cell_count()],
            placements: BTreeMap::new(),
        }
    }

    /// Empties every slot while keeping one slot per location.
    pub(crate) fn reset(&mut self) {
        self.cells.clear();
        self.cells.resize(self.grid.cell_count(), None);
        self.placements.clear();
    }

    pub(crate) fn occupant(&self, location: Location) -> Option<EntityId> {
        self.cells.get(location.index()).copied().flatten()
    }

    pub(crate) fn is_free(&self, location: Location) -> bool {
        self.occupant(location).is_none()
    }

    pub(crate) fn location_of(&self, entity: EntityId) -> Option<Location> {
        self.placements.get(&entity).copied()
    }

    /// Records the entity at the location. Callers check the slot and the
    /// reverse index first.
    pub(crate) fn occupy(&mut self, entity: EntityId, location: Location) {
        if let Some(slot) = self.cells.get_mut(location.index()) {
            *slot = Some(entity);
            let _ = self.placements.insert(entity, location);
        }
    }

    /// Clears the entity's slot, returning the location it vacated.
    pub(crate) fn vacate(&mut self, entity: EntityId) -> Option<Location> {
        let location = self.placements.remove(&entity)?;
        if let Some(slot) = self.cells.get_mut(location.index()) {
            *slot = None;
        }
        Some(location)
    }

    pub(crate) fn placed(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.placements.keys().copied()
    }

    pub(crate) fn placed_count(&self) -> usize {
        self.placements.len()
    }

    pub(crate) fn cells(&self) -> &[Option<EntityId>] {
        &self.cells
    }
}
