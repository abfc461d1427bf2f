//! Randomised placement of freshly built entities.

use log::debug;
use rand::Rng;
use subjunctive_core::{Entity, EntityId, Location};

use crate::{World, WorldError};

/// Options accepted by [`World::spawn_random`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnOptions {
    count: usize,
    avoid: Option<EntityId>,
    edges: bool,
}

impl SpawnOptions {
    /// Spawns `count` entities anywhere on the board, edges included.
    #[must_use]
    pub const fn new(count: usize) -> Self {
        Self {
            count,
            avoid: None,
            edges: true,
        }
    }

    /// Keeps new entities out of the row and column of `entity`.
    #[must_use]
    pub const fn avoiding(mut self, entity: EntityId) -> Self {
        self.avoid = Some(entity);
        self
    }

    /// Keeps new entities off the outer ring of cells.
    #[must_use]
    pub const fn without_edges(mut self) -> Self {
        self.edges = false;
        self
    }

    /// Number of entities requested.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Entity whose row and column are kept clear.
    #[must_use]
    pub const fn avoid(&self) -> Option<EntityId> {
        self.avoid
    }

    /// Whether the outer ring is eligible.
    #[must_use]
    pub const fn edges(&self) -> bool {
        self.edges
    }
}

impl Default for SpawnOptions {
    fn default() -> Self {
        Self::new(1)
    }
}

impl World {
    /// Places up to `options.count` entities built by `factory` on distinct
    /// empty cells chosen uniformly at random.
    ///
    /// Returns the identifiers in placement order. Fewer entities are placed
    /// when the eligible cells run out; that is not an error. Fails with
    /// [`WorldError::NotFound`] when the avoided entity is not on the board.
    pub fn spawn_random<E, F>(
        &mut self,
        mut factory: F,
        options: SpawnOptions,
    ) -> Result<Vec<EntityId>, WorldError>
    where
        E: Entity,
        F: FnMut() -> E,
    {
        let avoid = options.avoid.map(|id| self.locate(id)).transpose()?;
        let mut candidates: Vec<Location> = self
            .grid
            .locations()
            .filter(|location| self.occupancy.is_free(*location))
            .filter(|location| {
                avoid.map_or(true, |avoid| {
                    location.x() != avoid.x() && location.y() != avoid.y()
                })
            })
            .filter(|location| options.edges || !self.grid.is_edge(*location))
            .collect();

        let mut spawned = Vec::with_capacity(options.count.min(candidates.len()));
        while spawned.len() < options.count {
            if candidates.is_empty() {
                debug!(
                    "spawn stopped after {} of {} entities: no eligible cells left",
                    spawned.len(),
                    options.count
                );
                break;
            }
            let pick = self.rng.gen_range(0..candidates.len());
            let location = candidates.swap_remove(pick);
            spawned.push(self.spawn(factory(), location)?);
        }
        Ok(spawned)
    }
}
