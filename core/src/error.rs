//! Error types shared by every crate built on the engine.

use thiserror::Error;

/// Signals that a coordinate fell outside the grid it was validated against.
///
/// Stepping off the board is an ordinary outcome for movement code; callers
/// routinely match on this error to mean "blocked by the edge".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
#[error("({x}, {y}) lies outside the {width}x{height} grid")]
pub struct OutOfBounds {
    /// Requested column, which may be negative after stepping off the left edge.
    pub x: i64,
    /// Requested row, which may be negative after stepping off the top edge.
    pub y: i64,
    /// Width of the grid that rejected the coordinate.
    pub width: u32,
    /// Height of the grid that rejected the coordinate.
    pub height: u32,
}

/// Configuration mistakes detected at the call site.
///
/// These are never deferred: a bad grid size or timespec fails when it is
/// supplied, not when it is first used.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Grids need at least one column and one row.
    #[error("grid dimensions must be positive (received {width}x{height})")]
    ZeroDimension {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
    /// The timespec did not match `<integer><ms|s|m>`.
    #[error("invalid timespec {0:?}")]
    InvalidTimespec(String),
    /// A task was registered without a delay or a period.
    #[error("a scheduled task needs either a delay or a period")]
    MissingTiming,
    /// A task was registered with both a delay and a period.
    #[error("a scheduled task takes a delay or a period, not both")]
    ConflictingTiming,
}

/// Raised when a direction name cannot be recognised.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown direction {0:?}")]
pub struct ParseDirectionError(pub String);
