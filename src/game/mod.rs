//! # Game Module
//!
//! Core value types and the play session.
//!
//! - Cells, directions and victim priority classes
//! - The grid model (bounds, perimeter, clearance footprints)
//! - The bounded carry stack
//! - Snapshots handed to renderers and remote viewers
//! - The session state machine that drives a level from setup to its end

pub mod carry;
pub mod grid;
pub mod snapshot;
pub mod state;

pub use carry::*;
pub use grid::*;
pub use snapshot::*;
pub use state::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single grid coordinate.
///
/// Cells carry no identity beyond their coordinates and are used as map keys
/// everywhere. The ordering (x first, then y) is what makes every set and map
/// of cells iterate deterministically.
///
/// # Examples
///
/// ```
/// use sar_mission::Cell;
///
/// let cell = Cell::new(3, 4);
/// assert_eq!(cell.manhattan_distance(Cell::new(0, 0)), 7);
/// assert_eq!(cell.chebyshev_distance(Cell::new(0, 0)), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    /// Creates a new cell with the given coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan (taxicab) distance to another cell.
    pub fn manhattan_distance(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Chebyshev (king-move) distance to another cell.
    pub fn chebyshev_distance(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// The cell one step away in `direction`.
    pub fn step(self, direction: Direction) -> Cell {
        self + direction.to_delta()
    }

    /// The 4 cardinal neighbors (no diagonals), unclipped.
    pub fn cardinal_neighbors(self) -> [Cell; 4] {
        [
            Cell::new(self.x, self.y - 1),
            Cell::new(self.x - 1, self.y),
            Cell::new(self.x + 1, self.y),
            Cell::new(self.x, self.y + 1),
        ]
    }

    /// The `"x,y"` key used by snapshots.
    pub fn key(self) -> String {
        format!("{},{}", self.x, self.y)
    }

    /// The `[x, y]` pair used by snapshots.
    pub fn pair(self) -> [i32; 2] {
        [self.x, self.y]
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl std::ops::Add for Cell {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Cell {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// Axis-aligned movement directions. North is toward row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Converts a direction to a cell delta.
    ///
    /// # Examples
    ///
    /// ```
    /// use sar_mission::{Cell, Direction};
    ///
    /// assert_eq!(Direction::North.to_delta(), Cell::new(0, -1));
    /// ```
    pub fn to_delta(self) -> Cell {
        match self {
            Direction::North => Cell::new(0, -1),
            Direction::South => Cell::new(0, 1),
            Direction::East => Cell::new(1, 0),
            Direction::West => Cell::new(-1, 0),
        }
    }

    /// Converts a unit delta back to a direction.
    pub fn from_delta(delta: Cell) -> Option<Direction> {
        match (delta.x, delta.y) {
            (0, -1) => Some(Direction::North),
            (0, 1) => Some(Direction::South),
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            _ => None,
        }
    }

    /// All four directions in a fixed order.
    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ]
    }

    /// Lowercase compass name, as used in situation summaries.
    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }
}

/// Victim urgency tier.
///
/// The original color coding is kept for display: red is the highest
/// priority, then yellow, then purple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityClass {
    High,
    Medium,
    Low,
}

impl PriorityClass {
    /// All classes, most urgent first.
    pub fn all() -> [PriorityClass; 3] {
        [PriorityClass::High, PriorityClass::Medium, PriorityClass::Low]
    }

    /// Display color name.
    pub fn color_name(self) -> &'static str {
        match self {
            PriorityClass::High => "red",
            PriorityClass::Medium => "yellow",
            PriorityClass::Low => "purple",
        }
    }

    /// Code used in the exported level matrix.
    pub fn matrix_code(self) -> u8 {
        match self {
            PriorityClass::High => 2,
            PriorityClass::Medium => 3,
            PriorityClass::Low => 4,
        }
    }
}

/// Whether the camera follows the player closely or shows the whole map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    Local,
    Global,
}

impl ViewMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Local => ViewMode::Global,
            ViewMode::Global => ViewMode::Local,
        }
    }

    /// Capitalized label for the HUD.
    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Local => "Local",
            ViewMode::Global => "Global",
        }
    }
}
