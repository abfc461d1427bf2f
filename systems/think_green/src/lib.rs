#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Think Green: push recycle crates into receptors, turn charged receptors
//! into neutralizers, and use those to clear hazards before the score runs
//! out.

use log::{debug, info};
use subjunctive_core::{ConfigError, Direction, Entity, EntityId, Event, Grid, Resolution};
use subjunctive_world::{query, SpawnOptions, World, WorldError};
use thiserror::Error;

mod entities;

pub use entities::{
    Cursor, Hazard, Neutralizer, Receptor, Recycle, CHARGED, FUEL, HAZARD, MAX_FUEL, NEUTRALIZED,
};

/// Side length of the square planet.
pub const PLANET_SIZE: u32 = 22;
/// Score at the start of a game.
pub const INITIAL_SCORE: i64 = 100;

const SETUP_RECYCLE: usize = 25;
const SETUP_RECEPTORS: usize = 7;
const SETUP_HAZARDS: usize = 7;

/// Replenishment rule for one kind of entity.
#[derive(Clone, Copy, Debug)]
struct Cadence {
    /// Larger values space spawns further apart.
    spread: f64,
    /// Below this many on the board, one is spawned every tick.
    minimum: usize,
}

const RECYCLE_CADENCE: Cadence = Cadence {
    spread: 250.0,
    minimum: 5,
};
const RECEPTOR_CADENCE: Cadence = Cadence {
    spread: 900.0,
    minimum: 1,
};
const HAZARD_CADENCE: Cadence = Cadence {
    spread: 700.0,
    minimum: 1,
};

impl Cadence {
    /// Ticks between scheduled spawns. The gap shrinks as the game goes on.
    fn period(self, tick_count: u64) -> u64 {
        let scaled = (tick_count.max(1) as f64).powf(0.45);
        (((scaled + self.spread) / scaled).floor() as u64).max(1)
    }

    fn is_due(self, tick_count: u64, on_board: usize) -> bool {
        on_board < self.minimum || tick_count % self.period(tick_count) == 0
    }
}

/// Errors raised while playing.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    /// The cursor touched a hazard; no further moves are accepted.
    #[error("the game is over")]
    GameOver,
    /// The planet dimensions were invalid.
    #[error(transparent)]
    Grid(#[from] ConfigError),
    /// The world rejected an operation.
    #[error(transparent)]
    World(#[from] WorldError),
}

/// Summary of a single move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    /// How the cursor's push resolved.
    pub resolution: Resolution,
    /// Points gained from effects during the move.
    pub points: i64,
    /// Whether the move ended the game.
    pub fatal: bool,
}

/// A running game of Think Green.
#[derive(Debug)]
pub struct Planet {
    world: World,
    cursor: EntityId,
    score: i64,
    combo: u32,
    tick_count: u64,
    alive: bool,
    events: Vec<Event>,
}

impl Planet {
    /// Starts a new game: cursor in the middle of an empty planet, then the
    /// initial crates, receptors and hazards scattered from `seed`.
    pub fn new(seed: u64) -> Result<Self, GameError> {
        let grid = Grid::new(PLANET_SIZE, PLANET_SIZE)?;
        let mut world = World::with_seed(grid, seed);
        let cursor = world.spawn(Cursor::new("John Smith"), grid.center())?;
        let mut planet = Self::with_world(world, cursor)?;
        planet.setup()?;
        Ok(planet)
    }

    /// Starts a game on a prepared board. `cursor` must be placed.
    pub fn with_world(world: World, cursor: EntityId) -> Result<Self, GameError> {
        let _ = world.locate(cursor)?;
        Ok(Self {
            world,
            cursor,
            score: INITIAL_SCORE,
            combo: 1,
            tick_count: 0,
            alive: true,
            events: Vec::new(),
        })
    }

    fn setup(&mut self) -> Result<(), GameError> {
        let _ = self
            .world
            .spawn_random(Recycle::new, SpawnOptions::new(SETUP_RECYCLE))?;
        let _ = self
            .world
            .spawn_random(Receptor::new, SpawnOptions::new(SETUP_RECEPTORS))?;
        let _ = self
            .world
            .spawn_random(Hazard::new, SpawnOptions::new(SETUP_HAZARDS))?;
        Ok(())
    }

    /// The board.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// The player's cursor.
    #[must_use]
    pub const fn cursor(&self) -> EntityId {
        self.cursor
    }

    /// Current score. Drops by one every tick and may go negative.
    #[must_use]
    pub const fn score(&self) -> i64 {
        self.score
    }

    /// Multiplier applied to the next scoring effect.
    #[must_use]
    pub const fn combo(&self) -> u32 {
        self.combo
    }

    /// Ticks elapsed since the game started.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Events broadcast by the most recent move.
    #[must_use]
    pub fn last_events(&self) -> &[Event] {
        &self.events
    }

    /// Whether the cursor has touched a hazard.
    #[must_use]
    pub const fn is_over(&self) -> bool {
        !self.alive
    }

    /// Advances the clock: costs a point and replenishes the board.
    pub fn tick(&mut self) -> Result<(), GameError> {
        if !self.alive {
            return Err(GameError::GameOver);
        }
        self.score -= 1;
        self.tick_count += 1;
        debug!("tick {} (score {})", self.tick_count, self.score);

        self.replenish(RECYCLE_CADENCE, Recycle::new)?;
        self.replenish(RECEPTOR_CADENCE, Receptor::new)?;
        self.replenish(HAZARD_CADENCE, Hazard::new)?;
        Ok(())
    }

    /// Plays one move: a tick followed by pushing the cursor.
    pub fn play(&mut self, direction: Direction) -> Result<Turn, GameError> {
        self.tick()?;

        self.events.clear();
        let resolution = self
            .world
            .push(self.cursor, direction, &mut self.events)?;
        let events = std::mem::take(&mut self.events);
        let points = self.apply_effects(&events)?;
        self.forget_consumed(&events)?;
        self.events = events;

        if points == 0 {
            self.combo = 1;
        }
        Ok(Turn {
            resolution,
            points,
            fatal: !self.alive,
        })
    }

    /// Draws the board as text, one line per row.
    ///
    /// The cursor shows its facing (`<`, `^`, `>`, `v`), receptors their fuel.
    #[must_use]
    pub fn render(&self) -> String {
        let grid = self.world.grid();
        let mut out = String::with_capacity(grid.cell_count() + grid.height() as usize);
        for row in query::occupancy_view(&self.world).rows() {
            out.extend(
                row.iter()
                    .map(|slot| slot.and_then(|id| self.world.entity(id)).map_or('.', glyph)),
            );
            out.push('\n');
        }
        out
    }

    fn replenish<E, F>(&mut self, cadence: Cadence, factory: F) -> Result<(), GameError>
    where
        E: Entity,
        F: FnMut() -> E,
    {
        let on_board = self.world.count_of::<E>();
        if !cadence.is_due(self.tick_count, on_board) {
            return Ok(());
        }
        let spawned = self
            .world
            .spawn_random(factory, SpawnOptions::new(1).avoiding(self.cursor))?;
        debug!("replenished {} entities at tick {}", spawned.len(), self.tick_count);
        Ok(())
    }

    fn apply_effects(&mut self, events: &[Event]) -> Result<i64, GameError> {
        let mut points = 0;
        for event in events {
            let Event::Effect { entity, at, tag, .. } = *event else {
                continue;
            };
            match tag {
                FUEL => {
                    points += self.award(self.fuel_points());
                    self.world.place(entity, at)?;
                }
                CHARGED => {
                    points += self.award(self.fuel_points());
                    let _ = self.world.forget(entity)?;
                    let _ = self.world.spawn(Neutralizer::new(), at)?;
                }
                NEUTRALIZED => {
                    points += self.award(self.neutralize_points());
                }
                HAZARD => {
                    info!("cursor touched a hazard at {at}; final score {}", self.score);
                    self.alive = false;
                }
                _ => {}
            }
        }
        Ok(points)
    }

    fn forget_consumed(&mut self, events: &[Event]) -> Result<(), GameError> {
        for event in events {
            if let Event::Consumed { entity, .. } | Event::Vanished { entity, .. } = *event {
                if !self.world.is_placed(entity) && self.world.entity(entity).is_some() {
                    let _ = self.world.forget(entity)?;
                }
            }
        }
        Ok(())
    }

    fn award(&mut self, points: i64) -> i64 {
        self.score += points;
        self.combo += 1;
        points
    }

    fn fuel_points(&self) -> i64 {
        i64::from(self.combo).pow(2) * 50
    }

    fn neutralize_points(&self) -> i64 {
        1000 * f64::from(self.combo).powf(1.5).floor() as i64
    }
}

fn glyph(entity: &dyn Entity) -> char {
    if entity.is::<Cursor>() {
        return match entity.direction() {
            Direction::Left => '<',
            Direction::Up => '^',
            Direction::Right => '>',
            Direction::Down => 'v',
        };
    }
    if let Some(receptor) = entity.downcast_ref::<Receptor>() {
        return char::from(b'0' + receptor.fuel());
    }
    if entity.is::<Recycle>() {
        'r'
    } else if entity.is::<Hazard>() {
        'H'
    } else if entity.is::<Neutralizer>() {
        'N'
    } else {
        '?'
    }
}
