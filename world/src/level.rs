//! Text level loading.

use std::{collections::BTreeMap, fmt};

use log::{debug, warn};
use subjunctive_core::{ConfigError, Entity, EntityId, Grid};
use thiserror::Error;

use crate::{World, WorldError, DEFAULT_SPAWN_SEED};

/// Builds a fresh entity for one level cell.
pub type EntityFactory = Box<dyn Fn() -> Box<dyn Entity>>;

/// Errors raised while turning level text into a world.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// The text contained no non-blank lines.
    #[error("level text is empty")]
    Empty,
    /// A row was wider or narrower than the first one.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// The level dimensions were not a valid grid.
    #[error(transparent)]
    Grid(#[from] ConfigError),
    /// Placing a cell's entity failed.
    #[error(transparent)]
    World(#[from] WorldError),
}

/// Maps level characters to entity factories.
///
/// Characters mapped with [`Palette::empty`] are explicit empty cells.
/// Characters that are not mapped at all are reported and left empty.
#[derive(Default)]
pub struct Palette {
    entries: BTreeMap<char, Option<EntityFactory>>,
    player: Option<char>,
}

impl Palette {
    /// Creates an empty palette.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `glyph` to entities built by `factory`.
    #[must_use]
    pub fn entity<E, F>(mut self, glyph: char, factory: F) -> Self
    where
        E: Entity,
        F: Fn() -> E + 'static,
    {
        let factory: EntityFactory = Box::new(move || -> Box<dyn Entity> { Box::new(factory()) });
        let _ = self.entries.insert(glyph, Some(factory));
        self
    }

    /// Marks `glyph` as an empty cell.
    #[must_use]
    pub fn empty(mut self, glyph: char) -> Self {
        let _ = self.entries.insert(glyph, None);
        self
    }

    /// Maps `glyph` to the player entity, whose id is reported separately.
    #[must_use]
    pub fn player<E, F>(mut self, glyph: char, factory: F) -> Self
    where
        E: Entity,
        F: Fn() -> E + 'static,
    {
        self.player = Some(glyph);
        self.entity(glyph, factory)
    }

    fn lookup(&self, glyph: char) -> Option<&Option<EntityFactory>> {
        self.entries.get(&glyph)
    }
}

impl fmt::Debug for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let glyphs: Vec<(char, bool)> = self
            .entries
            .iter()
            .map(|(glyph, factory)| (*glyph, factory.is_some()))
            .collect();
        f.debug_struct("Palette")
            .field("glyphs", &glyphs)
            .field("player", &self.player)
            .finish()
    }
}

/// A world built from level text plus the player it contains.
#[derive(Debug)]
pub struct LoadedLevel {
    /// The populated world.
    pub world: World,
    /// The player entity, when the palette names one and the level uses it.
    pub player: Option<EntityId>,
}

impl World {
    /// Builds a world from level text using the default spawn seed.
    pub fn load(text: &str, palette: &Palette) -> Result<LoadedLevel, LevelError> {
        Self::load_with_seed(text, palette, DEFAULT_SPAWN_SEED)
    }

    /// Builds a world from level text.
    ///
    /// Lines are trimmed and blank lines dropped; the remaining lines must all
    /// have the same width. The grid takes the level's dimensions.
    pub fn load_with_seed(
        text: &str,
        palette: &Palette,
        seed: u64,
    ) -> Result<LoadedLevel, LevelError> {
        let rows: Vec<Vec<char>> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.chars().collect())
            .collect();
        let expected = rows.first().map(Vec::len).ok_or(LevelError::Empty)?;
        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, found)| *found != expected)
        {
            return Err(LevelError::RaggedRow {
                row,
                expected,
                found,
            });
        }

        let width = u32::try_from(expected).unwrap_or(u32::MAX);
        let height = u32::try_from(rows.len()).unwrap_or(u32::MAX);
        let mut world = Self::with_seed(Grid::new(width, height)?, seed);
        let mut player = None;

        for (location, glyph) in world
            .grid
            .locations()
            .zip(rows.iter().flatten().copied())
        {
            let factory = match palette.lookup(glyph) {
                Some(Some(factory)) => factory,
                Some(None) => continue,
                None => {
                    warn!("character {glyph:?} at {location} is not defined; ignoring");
                    continue;
                }
            };
            let id = world.spawn_boxed(factory(), location)?;
            if palette.player == Some(glyph) {
                if player.is_none() {
                    player = Some(id);
                } else {
                    warn!("extra player character at {location}; keeping the first");
                }
            }
        }

        debug!(
            "loaded {width}x{height} level with {} entities",
            world.population()
        );
        Ok(LoadedLevel { world, player })
    }
}
