#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Subjunctive grid engine.
//!
//! This crate defines the vocabulary that connects the authoritative world,
//! the games built on top of it, and the adapters that drive them. A
//! [`Grid`] is the only authority that can mint a [`Location`]; entities
//! implement the [`Entity`] capability contract and answer pushes with an
//! [`Action`]; the world reports what a push did through [`Event`] values.

use std::{fmt, iter::FusedIterator, num::NonZeroU32, str::FromStr};

use serde::{Deserialize, Serialize};

mod entity;
mod error;

pub use entity::{Action, AsAny, Effect, Entity, Profile, Pusher, Resolution};
pub use error::{ConfigError, OutOfBounds, ParseDirectionError};

/// Cardinal directions in clockwise order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Toward decreasing column indices.
    Left,
    /// Toward decreasing row indices.
    Up,
    /// Toward increasing column indices.
    Right,
    /// Toward increasing row indices.
    Down,
}

impl Direction {
    /// Every direction in clockwise order starting from [`Direction::Left`].
    pub const ALL: [Direction; 4] = [Self::Left, Self::Up, Self::Right, Self::Down];

    /// Position of the direction in the clockwise ordering.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Left => 0,
            Self::Up => 1,
            Self::Right => 2,
            Self::Down => 3,
        }
    }

    /// Number of clockwise quarter turns needed to face `other`.
    ///
    /// Sprites facing right rotate by `Direction::Right.rotations_to(d) * 90`
    /// degrees to face `d`.
    #[must_use]
    pub const fn rotations_to(self, other: Direction) -> u8 {
        (other.ordinal() + 4 - self.ordinal()) % 4
    }

    /// Direction a quarter turn clockwise from this one.
    #[must_use]
    pub const fn clockwise(self) -> Self {
        match self {
            Self::Left => Self::Up,
            Self::Up => Self::Right,
            Self::Right => Self::Down,
            Self::Down => Self::Left,
        }
    }

    /// Direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        self.clockwise().clockwise()
    }

    /// Column and row delta of a single step.
    #[must_use]
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Self::Left => (-1, 0),
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
        }
    }

    /// Lowercase name of the direction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Up => "up",
            Self::Right => "right",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|direction| direction.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseDirectionError(trimmed.to_owned()))
    }
}

/// Bounded two-dimensional grid with fixed, positive dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    width: NonZeroU32,
    height: NonZeroU32,
}

impl Grid {
    /// Creates a grid, rejecting zero-sized dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self, ConfigError> {
        match (NonZeroU32::new(width), NonZeroU32::new(height)) {
            (Some(width), Some(height)) => Ok(Self { width, height }),
            _ => Err(ConfigError::ZeroDimension { width, height }),
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width.get()
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height.get()
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let cells = u64::from(self.width()) * u64::from(self.height());
        usize::try_from(cells).unwrap_or(usize::MAX)
    }

    /// Reports whether the coordinate lies on the grid.
    #[must_use]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        (0..i64::from(self.width())).contains(&x) && (0..i64::from(self.height())).contains(&y)
    }

    /// Mints a validated location.
    pub fn location(&self, x: u32, y: u32) -> Result<Location, OutOfBounds> {
        self.checked_location(i64::from(x), i64::from(y))
    }

    /// Location in the middle of the grid, rounding toward the origin.
    #[must_use]
    pub const fn center(&self) -> Location {
        Location {
            x: self.width() / 2,
            y: self.height() / 2,
            grid: *self,
        }
    }

    /// Reports whether the location sits on the outer ring of cells.
    #[must_use]
    pub fn is_edge(&self, location: Location) -> bool {
        location.x == 0
            || location.y == 0
            || location.x + 1 == self.width()
            || location.y + 1 == self.height()
    }

    /// Lazily enumerates every location in row-major order.
    ///
    /// The iterator is finite and the grid can produce a fresh one at any
    /// time, so the sequence is restartable.
    #[must_use]
    pub const fn locations(&self) -> Locations {
        Locations {
            grid: *self,
            next: 0,
            end: self.width() as u64 * self.height() as u64,
        }
    }

    fn checked_location(&self, x: i64, y: i64) -> Result<Location, OutOfBounds> {
        if !self.contains(x, y) {
            return Err(OutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            });
        }

        Ok(Location {
            x: u32::try_from(x).map_err(|_| self.out_of_bounds(x, y))?,
            y: u32::try_from(y).map_err(|_| self.out_of_bounds(x, y))?,
            grid: *self,
        })
    }

    const fn out_of_bounds(&self, x: i64, y: i64) -> OutOfBounds {
        OutOfBounds {
            x,
            y,
            width: self.width(),
            height: self.height(),
        }
    }
}

/// Row-major iterator over every location of a [`Grid`].
#[derive(Clone, Debug)]
pub struct Locations {
    grid: Grid,
    next: u64,
    end: u64,
}

impl Iterator for Locations {
    type Item = Location;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }

        let width = u64::from(self.grid.width());
        let location = Location {
            x: (self.next % width) as u32,
            y: (self.next / width) as u32,
            grid: self.grid,
        };
        self.next += 1;
        Some(location)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.end - self.next).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Locations {}

impl FusedIterator for Locations {}

/// Grid cell validated against the grid that minted it.
///
/// Only [`Grid`] can construct locations, so holding one proves the
/// coordinate is on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    x: u32,
    y: u32,
    grid: Grid,
}

impl Location {
    /// Zero-based column.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Grid the location belongs to.
    #[must_use]
    pub const fn grid(&self) -> Grid {
        self.grid
    }

    /// Row-major ordinal of the location within its grid.
    #[must_use]
    pub fn index(&self) -> usize {
        let index = u64::from(self.y) * u64::from(self.grid.width()) + u64::from(self.x);
        usize::try_from(index).unwrap_or(usize::MAX)
    }

    /// Neighbouring location one step in `direction`.
    ///
    /// Fails with [`OutOfBounds`] at the edge of the board.
    pub fn adjacent(&self, direction: Direction) -> Result<Location, OutOfBounds> {
        let (dx, dy) = direction.offset();
        self.grid
            .checked_location(i64::from(self.x) + dx, i64::from(self.y) + dy)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Unique identifier the world assigns to each entity it registers.
///
/// Identity is by allocation, not by value: two entities with identical
/// attributes still receive distinct identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Records broadcast by the world while resolving a push chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// An entity advanced one cell.
    Moved {
        /// Entity that moved.
        entity: EntityId,
        /// Cell it left.
        from: Location,
        /// Cell it entered.
        to: Location,
    },
    /// An entity refused to move or was stopped by the edge of the grid.
    Blocked {
        /// Entity that held its ground.
        entity: EntityId,
        /// Cell it still occupies.
        at: Location,
    },
    /// An entity got out of the way by disappearing.
    Vanished {
        /// Entity that was removed.
        entity: EntityId,
        /// Cell it vacated.
        at: Location,
    },
    /// An entity was removed by a consume reaction, either as the pushed
    /// entity or as the pusher it took along.
    Consumed {
        /// Entity that was removed.
        entity: EntityId,
        /// Cell it vacated.
        at: Location,
    },
    /// An entity answered with a custom action.
    Effect {
        /// Entity that reported the effect.
        entity: EntityId,
        /// Entity that pushed it, or `None` for the environment.
        pusher: Option<EntityId>,
        /// Cell the entity occupied when it reacted.
        at: Location,
        /// Tag chosen by the entity.
        tag: &'static str,
    },
}
