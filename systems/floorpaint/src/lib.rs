#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Floorpaint: walk over every floor cell of a level to paint it.
//!
//! Levels are plain text: `#` wall, `.` floor, `@` player, `o` crate. Crates
//! can be pushed around but may end up covering floor that still needs paint.

use log::{debug, info};
use subjunctive_core::{Direction, Entity, EntityId, Event, Location, Profile, Resolution};
use subjunctive_world::{query, LevelError, Palette, World, WorldError};
use thiserror::Error;

/// Errors raised while loading or playing a level.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FloorpaintError {
    /// The level text could not be loaded.
    #[error(transparent)]
    Level(#[from] LevelError),
    /// The level has no `@` cell.
    #[error("level has no player")]
    MissingPlayer,
    /// The world rejected an operation.
    #[error(transparent)]
    World(#[from] WorldError),
}

/// Immovable wall.
#[derive(Debug)]
pub struct Wall {
    profile: Profile,
}

impl Entity for Wall {
    fn profile(&self) -> &Profile {
        &self.profile
    }

    fn profile_mut(&mut self) -> &mut Profile {
        &mut self.profile
    }
}

/// The painter.
#[derive(Debug)]
pub struct Player {
    profile: Profile,
}

impl Entity for Player {
    fn profile(&self) -> &Profile {
        &self.profile
    }

    fn profile_mut(&mut self) -> &mut Profile {
        &mut self.profile
    }

    fn is_pushable(&self) -> bool {
        true
    }

    fn is_orientable(&self) -> bool {
        true
    }
}

/// Pushable crate.
#[derive(Debug)]
pub struct Crate {
    profile: Profile,
}

impl Entity for Crate {
    fn profile(&self) -> &Profile {
        &self.profile
    }

    fn profile_mut(&mut self) -> &mut Profile {
        &mut self.profile
    }

    fn is_pushable(&self) -> bool {
        true
    }
}

/// Level characters understood by Floorpaint.
#[must_use]
pub fn palette() -> Palette {
    Palette::new()
        .entity('#', || Wall {
            profile: Profile::new("Wall"),
        })
        .empty('.')
        .player('@', || Player {
            profile: Profile::new("Player"),
        })
        .entity('o', || Crate {
            profile: Profile::new("Crate"),
        })
}

/// A level in progress.
#[derive(Debug)]
pub struct Floorpaint {
    world: World,
    player: EntityId,
    floor: Vec<bool>,
    painted: Vec<bool>,
    moves: u32,
}

impl Floorpaint {
    /// Loads a level and paints the player's starting cell.
    pub fn load(text: &str) -> Result<Self, FloorpaintError> {
        let level = World::load(text, &palette())?;
        let player = level.player.ok_or(FloorpaintError::MissingPlayer)?;
        let world = level.world;
        let grid = world.grid();

        let floor: Vec<bool> = grid
            .locations()
            .map(|location| {
                world
                    .occupant(location)
                    .and_then(|id| world.entity(id))
                    .map_or(true, |entity| !entity.is::<Wall>())
            })
            .collect();
        let mut game = Self {
            painted: vec![false; floor.len()],
            floor,
            world,
            player,
            moves: 0,
        };
        let start = game.world.locate(player)?;
        game.paint(start);
        debug!(
            "floorpaint level with {} floor cells loaded",
            game.floor_count()
        );
        Ok(game)
    }

    /// The board.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// The player entity.
    #[must_use]
    pub const fn player(&self) -> EntityId {
        self.player
    }

    /// Moves made so far, blocked ones included.
    #[must_use]
    pub const fn moves(&self) -> u32 {
        self.moves
    }

    /// Pushes the player one step and paints the cell it lands on.
    pub fn play(&mut self, direction: Direction) -> Result<Resolution, FloorpaintError> {
        self.moves += 1;
        let mut events = Vec::new();
        let resolution = self.world.push(self.player, direction, &mut events)?;
        for event in &events {
            if let Event::Moved { entity, to, .. } = *event {
                if entity == self.player {
                    self.paint(to);
                }
            }
        }
        if self.is_solved() {
            info!("level solved in {} moves", self.moves);
        }
        Ok(resolution)
    }

    /// Whether the cell has been walked over.
    #[must_use]
    pub fn is_painted(&self, location: Location) -> bool {
        self.painted.get(location.index()).copied().unwrap_or(false)
    }

    /// Number of cells that are not walls.
    #[must_use]
    pub fn floor_count(&self) -> usize {
        self.floor.iter().filter(|floor| **floor).count()
    }

    /// Number of painted cells.
    #[must_use]
    pub fn painted_count(&self) -> usize {
        self.painted.iter().filter(|painted| **painted).count()
    }

    /// Whether every floor cell is painted.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.floor
            .iter()
            .zip(&self.painted)
            .all(|(floor, painted)| !floor || *painted)
    }

    /// Draws the level: `#` wall, `@` player, `o` crate, `+` painted floor,
    /// `.` bare floor.
    #[must_use]
    pub fn render(&self) -> String {
        let width = usize::try_from(self.world.grid().width()).unwrap_or(usize::MAX);
        let mut out = String::new();
        let view = query::occupancy_view(&self.world);
        for (row, painted) in view.rows().zip(self.painted.chunks(width)) {
            for (slot, painted) in row.iter().zip(painted) {
                out.push(match slot.and_then(|id| self.world.entity(id)) {
                    Some(entity) if entity.is::<Wall>() => '#',
                    Some(entity) if entity.is::<Player>() => '@',
                    Some(_) => 'o',
                    None if *painted => '+',
                    None => '.',
                });
            }
            out.push('\n');
        }
        out
    }

    fn paint(&mut self, location: Location) {
        if let Some(cell) = self.painted.get_mut(location.index()) {
            *cell = true;
        }
    }
}
