#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the Subjunctive grid engine.
//!
//! The [`World`] owns a [`Grid`], every entity registered with it, and the
//! occupancy of each cell. It is the only place where entities are placed,
//! moved, or removed, and it resolves push chains started by player input.

use log::debug;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use subjunctive_core::{Entity, EntityId, Grid, Location, OutOfBounds};
use thiserror::Error;

mod level;
mod occupancy;
mod push;
mod registry;
mod spawn;

pub use level::{EntityFactory, LevelError, LoadedLevel, Palette};
pub use spawn::SpawnOptions;

use occupancy::OccupancyGrid;
use registry::EntityRegistry;

/// Seed used by [`World::new`] and [`World::load`].
pub const DEFAULT_SPAWN_SEED: u64 = 0x42f0_e1eb_d4a5_3c21;

/// Errors reported by placement and push operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WorldError {
    /// The target cell already holds an entity.
    #[error("location {at} already contains {occupant}")]
    Occupied {
        /// Cell that was requested.
        at: Location,
        /// Entity currently standing there.
        occupant: EntityId,
    },
    /// The entity is not placed in the world.
    #[error("entity {0} is not in the world")]
    NotFound(EntityId),
    /// The identifier was never registered or has been forgotten.
    #[error("entity {0} is not registered with the world")]
    UnknownEntity(EntityId),
    /// The entity already occupies another cell.
    #[error("entity {entity} is already placed at {at}")]
    AlreadyPlaced {
        /// Entity that was placed twice.
        entity: EntityId,
        /// Cell it currently occupies.
        at: Location,
    },
    /// The location was minted by a grid of a different size.
    #[error(transparent)]
    OutOfBounds(#[from] OutOfBounds),
}

/// Represents the authoritative state of one board.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    registry: EntityRegistry,
    occupancy: OccupancyGrid,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates an empty world over the provided grid.
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        Self::with_seed(grid, DEFAULT_SPAWN_SEED)
    }

    /// Creates an empty world whose random spawning replays from `seed`.
    #[must_use]
    pub fn with_seed(grid: Grid, seed: u64) -> Self {
        Self {
            grid,
            registry: EntityRegistry::new(),
            occupancy: OccupancyGrid::new(grid),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Grid the world is laid out on.
    #[must_use]
    pub const fn grid(&self) -> Grid {
        self.grid
    }

    /// Registers an entity without placing it.
    pub fn add<E: Entity>(&mut self, entity: E) -> EntityId {
        self.add_boxed(Box::new(entity))
    }

    /// Registers an already boxed entity without placing it.
    pub fn add_boxed(&mut self, entity: Box<dyn Entity>) -> EntityId {
        self.registry.insert(entity)
    }

    /// Registers an entity and places it at `location`.
    ///
    /// When placement fails the entity is dropped again.
    pub fn spawn<E: Entity>(&mut self, entity: E, location: Location) -> Result<EntityId, WorldError> {
        self.spawn_boxed(Box::new(entity), location)
    }

    /// Boxed counterpart of [`World::spawn`].
    pub fn spawn_boxed(
        &mut self,
        entity: Box<dyn Entity>,
        location: Location,
    ) -> Result<EntityId, WorldError> {
        let id = self.registry.insert(entity);
        if let Err(error) = self.place(id, location) {
            let _ = self.registry.take(id);
            return Err(error);
        }
        Ok(id)
    }

    /// Places a registered entity at `location`.
    ///
    /// Fails with [`WorldError::Occupied`] when the cell is taken and with
    /// [`WorldError::AlreadyPlaced`] when the entity sits elsewhere.
    pub fn place(&mut self, entity: EntityId, location: Location) -> Result<(), WorldError> {
        self.check_location(location)?;
        if !self.registry.contains(entity) {
            return Err(WorldError::UnknownEntity(entity));
        }
        if let Some(at) = self.occupancy.location_of(entity) {
            return Err(WorldError::AlreadyPlaced { entity, at });
        }
        if let Some(occupant) = self.occupancy.occupant(location) {
            return Err(WorldError::Occupied {
                at: location,
                occupant,
            });
        }

        debug!("placing {entity} at {location}");
        self.occupancy.occupy(entity, location);
        Ok(())
    }

    /// Takes the entity off the board and returns the cell it vacated.
    ///
    /// The entity stays registered and may be placed again.
    pub fn remove(&mut self, entity: EntityId) -> Result<Location, WorldError> {
        let location = self
            .occupancy
            .vacate(entity)
            .ok_or(WorldError::NotFound(entity))?;
        debug!("removed {entity} from {location}");
        Ok(location)
    }

    /// Swaps `entity` for `new_entity` in the same cell.
    ///
    /// Both identifiers are validated before anything changes, so a failed
    /// replacement leaves the world untouched.
    pub fn replace(&mut self, entity: EntityId, new_entity: EntityId) -> Result<Location, WorldError> {
        let location = self.locate(entity)?;
        if !self.registry.contains(new_entity) {
            return Err(WorldError::UnknownEntity(new_entity));
        }
        if let Some(at) = self.occupancy.location_of(new_entity) {
            return Err(WorldError::AlreadyPlaced {
                entity: new_entity,
                at,
            });
        }

        let vacated = self.remove(entity)?;
        self.place(new_entity, vacated)?;
        Ok(location)
    }

    /// Cell the entity currently occupies.
    pub fn locate(&self, entity: EntityId) -> Result<Location, WorldError> {
        self.occupancy
            .location_of(entity)
            .ok_or(WorldError::NotFound(entity))
    }

    /// Entity standing at `location`, if any.
    #[must_use]
    pub fn occupant(&self, location: Location) -> Option<EntityId> {
        self.occupancy.occupant(location)
    }

    /// Reports whether the entity is currently on the board.
    #[must_use]
    pub fn is_placed(&self, entity: EntityId) -> bool {
        self.occupancy.location_of(entity).is_some()
    }

    /// Looks up a registered entity.
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&dyn Entity> {
        self.registry.get(id)
    }

    /// Looks up a registered entity mutably.
    #[must_use]
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut (dyn Entity + 'static)> {
        self.registry.get_mut(id)
    }

    /// Looks up a registered entity of concrete type `T`.
    #[must_use]
    pub fn entity_as<T: Entity>(&self, id: EntityId) -> Option<&T> {
        self.registry.get(id)?.downcast_ref::<T>()
    }

    /// Looks up a registered entity of concrete type `T` mutably.
    #[must_use]
    pub fn entity_as_mut<T: Entity>(&mut self, id: EntityId) -> Option<&mut T> {
        self.registry.get_mut(id)?.downcast_mut::<T>()
    }

    /// Number of placed entities matching `predicate`.
    pub fn count<P>(&self, predicate: P) -> usize
    where
        P: Fn(&dyn Entity) -> bool,
    {
        self.occupancy
            .placed()
            .filter_map(|id| self.registry.get(id))
            .filter(|entity| predicate(*entity))
            .count()
    }

    /// Number of placed entities of concrete type `T`.
    #[must_use]
    pub fn count_of<T: Entity>(&self) -> usize {
        self.count(|entity| entity.is::<T>())
    }

    /// Number of entities on the board.
    #[must_use]
    pub fn population(&self) -> usize {
        self.occupancy.placed_count()
    }

    /// Number of registered entities, placed or detached.
    #[must_use]
    pub fn registered(&self) -> usize {
        self.registry.len()
    }

    /// Placed entities in row-major order of their cells.
    pub fn placed(&self) -> impl Iterator<Item = (Location, EntityId)> + '_ {
        self.grid
            .locations()
            .zip(self.occupancy.cells().iter())
            .filter_map(|(location, slot)| slot.map(|id| (location, id)))
    }

    /// Removes the entity from the board, if placed, and from the registry.
    pub fn forget(&mut self, entity: EntityId) -> Result<Box<dyn Entity>, WorldError> {
        let _ = self.occupancy.vacate(entity);
        self.registry
            .take(entity)
            .ok_or(WorldError::UnknownEntity(entity))
    }

    /// Empties every cell and drops every entity.
    pub fn clear(&mut self) {
        debug!("clearing {} entities", self.registry.len());
        self.occupancy.reset();
        self.registry.clear();
    }

    fn check_location(&self, location: Location) -> Result<(), WorldError> {
        if location.grid() == self.grid {
            return Ok(());
        }
        Err(WorldError::OutOfBounds(OutOfBounds {
            x: i64::from(location.x()),
            y: i64::from(location.y()),
            width: self.grid.width(),
            height: self.grid.height(),
        }))
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use subjunctive_core::{EntityId, Grid};

    use super::World;

    /// Exposes a read-only view of the dense occupancy grid.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        OccupancyView {
            grid: world.grid,
            cells: world.occupancy.cells(),
        }
    }

    /// Read-only view into the dense occupancy grid.
    #[derive(Clone, Copy, Debug)]
    pub struct OccupancyView<'a> {
        grid: Grid,
        cells: &'a [Option<EntityId>],
    }

    impl<'a> OccupancyView<'a> {
        /// Returns an iterator over the rows, top to bottom.
        pub fn rows(&self) -> impl Iterator<Item = &'a [Option<EntityId>]> + 'a {
            let width = usize::try_from(self.grid.width()).unwrap_or(usize::MAX);
            let cells = self.cells;
            cells.chunks(width)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subjunctive_core::Profile;

    #[derive(Debug)]
    struct Stone {
        profile: Profile,
    }

    impl Stone {
        fn new() -> Self {
            Self {
                profile: Profile::new("Stone"),
            }
        }
    }

    impl Entity for Stone {
        fn profile(&self) -> &Profile {
            &self.profile
        }

        fn profile_mut(&mut self) -> &mut Profile {
            &mut self.profile
        }
    }

    #[derive(Debug)]
    struct Seed {
        profile: Profile,
    }

    impl Entity for Seed {
        fn profile(&self) -> &Profile {
            &self.profile
        }

        fn profile_mut(&mut self) -> &mut Profile {
            &mut self.profile
        }
    }

    fn world(width: u32, height: u32) -> World {
        World::new(Grid::new(width, height).expect("valid grid"))
    }

    #[test]
    fn place_rejects_occupied_cells() {
        let mut world = world(3, 3);
        let at = world.grid().location(1, 1).expect("valid location");
        let first = world.spawn(Stone::new(), at).expect("empty cell");
        let second = world.add(Stone::new());

        assert_eq!(
            world.place(second, at),
            Err(WorldError::Occupied {
                at,
                occupant: first
            })
        );
        assert!(!world.is_placed(second));
    }

    #[test]
    fn place_rejects_entities_that_are_already_placed() {
        let mut world = world(3, 3);
        let at = world.grid().location(0, 0).expect("valid location");
        let elsewhere = world.grid().location(2, 2).expect("valid location");
        let stone = world.spawn(Stone::new(), at).expect("empty cell");

        assert_eq!(
            world.place(stone, elsewhere),
            Err(WorldError::AlreadyPlaced { entity: stone, at })
        );
        assert_eq!(world.occupant(elsewhere), None);
    }

    #[test]
    fn failed_spawn_does_not_leak_a_registration() {
        let mut world = world(2, 2);
        let at = world.grid().location(0, 1).expect("valid location");
        let _ = world.spawn(Stone::new(), at).expect("empty cell");
        assert!(world.spawn(Stone::new(), at).is_err());
        assert_eq!(world.registered(), 1);
    }

    #[test]
    fn locate_inverts_place_and_remove_frees_the_cell() {
        let mut world = world(3, 3);
        let at = world.grid().location(2, 0).expect("valid location");
        let stone = world.spawn(Stone::new(), at).expect("empty cell");

        assert_eq!(world.locate(stone), Ok(at));
        assert_eq!(world.remove(stone), Ok(at));
        assert_eq!(world.locate(stone), Err(WorldError::NotFound(stone)));
        assert_eq!(world.remove(stone), Err(WorldError::NotFound(stone)));
        assert!(world.entity(stone).is_some(), "removed entities stay registered");

        world.place(stone, at).expect("entity can be placed again");
        assert_eq!(world.occupant(at), Some(stone));
    }

    #[test]
    fn replace_swaps_in_place() {
        let mut world = world(3, 3);
        let at = world.grid().location(1, 2).expect("valid location");
        let stone = world.spawn(Stone::new(), at).expect("empty cell");
        let seed = world.add(Seed {
            profile: Profile::new("Seed"),
        });

        assert_eq!(world.replace(stone, seed), Ok(at));
        assert_eq!(world.occupant(at), Some(seed));
        assert!(!world.is_placed(stone));
    }

    #[test]
    fn replace_of_missing_entity_changes_nothing() {
        let mut world = world(3, 3);
        let missing = world.add(Stone::new());
        let seed = world.add(Seed {
            profile: Profile::new("Seed"),
        });

        assert_eq!(world.replace(missing, seed), Err(WorldError::NotFound(missing)));
        assert!(!world.is_placed(seed));
    }

    #[test]
    fn replace_with_placed_entity_is_rejected_before_mutation() {
        let mut world = world(3, 3);
        let first_at = world.grid().location(0, 0).expect("valid location");
        let second_at = world.grid().location(1, 0).expect("valid location");
        let first = world.spawn(Stone::new(), first_at).expect("empty cell");
        let second = world.spawn(Stone::new(), second_at).expect("empty cell");

        assert_eq!(
            world.replace(first, second),
            Err(WorldError::AlreadyPlaced {
                entity: second,
                at: second_at
            })
        );
        assert_eq!(world.locate(first), Ok(first_at));
    }

    #[test]
    fn count_filters_by_type() {
        let mut world = world(3, 3);
        for x in 0..3 {
            let at = world.grid().location(x, 0).expect("valid location");
            let _ = world.spawn(Stone::new(), at).expect("empty cell");
        }
        let at = world.grid().location(0, 2).expect("valid location");
        let _ = world
            .spawn(
                Seed {
                    profile: Profile::new("Seed"),
                },
                at,
            )
            .expect("empty cell");
        let _ = world.add(Seed {
            profile: Profile::new("Seed"),
        });

        assert_eq!(world.count_of::<Stone>(), 3);
        assert_eq!(world.count_of::<Seed>(), 1, "detached entities are not counted");
        assert_eq!(world.count(|entity| entity.name() == "Seed"), 1);
        assert_eq!(world.population(), 4);
    }

    #[test]
    fn locations_from_other_grids_are_rejected() {
        let mut world = world(3, 3);
        let foreign = Grid::new(5, 5)
            .expect("valid grid")
            .location(4, 4)
            .expect("valid location");
        let stone = world.add(Stone::new());
        assert!(matches!(
            world.place(stone, foreign),
            Err(WorldError::OutOfBounds(_))
        ));
    }

    #[test]
    fn clear_keeps_a_slot_for_every_location() {
        let mut world = world(4, 2);
        let at = world.grid().location(3, 1).expect("valid location");
        let stone = world.spawn(Stone::new(), at).expect("empty cell");
        world.clear();

        let view = query::occupancy_view(&world);
        assert_eq!(view.rows().count(), 2);
        assert!(view.rows().all(|row| row.len() == 4 && row.iter().all(Option::is_none)));
        assert_eq!(world.entity(stone).map(|entity| entity.name().to_owned()), None);
        assert_eq!(world.population(), 0);
    }

    #[test]
    fn placed_iterates_in_row_major_order() {
        let mut world = world(3, 2);
        let late = world.grid().location(0, 1).expect("valid location");
        let early = world.grid().location(2, 0).expect("valid location");
        let first = world.spawn(Stone::new(), late).expect("empty cell");
        let second = world.spawn(Stone::new(), early).expect("empty cell");

        let placed: Vec<_> = world.placed().collect();
        assert_eq!(placed, vec![(early, second), (late, first)]);
    }

    #[test]
    fn typed_lookup_downcasts() {
        let mut world = world(2, 2);
        let stone = world.add(Stone::new());
        assert!(world.entity_as::<Stone>(stone).is_some());
        assert!(world.entity_as::<Seed>(stone).is_none());
        world
            .entity_as_mut::<Stone>(stone)
            .expect("stone registered")
            .profile
            .set_direction(subjunctive_core::Direction::Down);
        assert_eq!(
            world.entity(stone).map(|entity| entity.direction()),
            Some(subjunctive_core::Direction::Down)
        );
    }

    #[test]
    fn forget_drops_the_entity_entirely() {
        let mut world = world(2, 2);
        let at = world.grid().location(1, 1).expect("valid location");
        let stone = world.spawn(Stone::new(), at).expect("empty cell");
        let forgotten = world.forget(stone).expect("registered");
        assert_eq!(forgotten.name(), "Stone");
        assert!(world.occupant(at).is_none());
        assert!(matches!(
            world.forget(stone),
            Err(WorldError::UnknownEntity(_))
        ));
    }
}
