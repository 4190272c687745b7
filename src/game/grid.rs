//! # Grid Model
//!
//! Bounds and cell-set queries for the play area. No game logic lives here.

use crate::game::Cell;
use crate::utils::CellSet;
use serde::{Deserialize, Serialize};

/// The rectangular play area, measured in cells.
///
/// # Examples
///
/// ```
/// use sar_mission::{Cell, Grid};
///
/// let grid = Grid::new(10, 6);
/// assert!(grid.contains(Cell::new(9, 5)));
/// assert!(!grid.contains(Cell::new(10, 0)));
/// assert!(grid.is_perimeter(Cell::new(0, 3)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    /// Width in cells (always > 0)
    pub width: i32,
    /// Height in cells (always > 0)
    pub height: i32,
    /// Rendering-only pixel size of one cell
    pub cell_size: f32,
}

impl Grid {
    /// Creates a grid; zero dimensions are bumped to one.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1) as i32,
            height: height.max(1) as i32,
            cell_size: crate::config::DEFAULT_CELL_SIZE,
        }
    }

    /// Sets the pixel size used by the renderer.
    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Total number of cells.
    pub fn area(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Whether `cell` lies inside the grid.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    /// Whether `cell` is on the outer ring.
    pub fn is_perimeter(&self, cell: Cell) -> bool {
        self.contains(cell)
            && (cell.x == 0 || cell.y == 0 || cell.x == self.width - 1 || cell.y == self.height - 1)
    }

    /// Every cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Cell::new(x, y)))
    }

    /// The full perimeter ring.
    pub fn perimeter(&self) -> CellSet {
        self.cells().filter(|&cell| self.is_perimeter(cell)).collect()
    }

    /// The square footprint of radius `radius` around every input cell,
    /// clipped to the grid. Used for clearance buffers.
    pub fn buffer<I>(&self, cells: I, radius: u32) -> CellSet
    where
        I: IntoIterator<Item = Cell>,
    {
        let r = radius as i32;
        let mut out = CellSet::new();
        for cell in cells {
            for dy in -r..=r {
                for dx in -r..=r {
                    let candidate = Cell::new(cell.x + dx, cell.y + dy);
                    if self.contains(candidate) {
                        out.insert(candidate);
                    }
                }
            }
        }
        out
    }

    /// Every in-bounds cell not in `walls`, plus `start`.
    pub fn passable_cells(&self, walls: &CellSet, start: Cell) -> CellSet {
        let mut passable: CellSet = self.cells().filter(|cell| !walls.contains(cell)).collect();
        if self.contains(start) {
            passable.insert(start);
        }
        passable
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_GRID_WIDTH,
            crate::config::DEFAULT_GRID_HEIGHT,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_dimensions_are_clamped() {
        let grid = Grid::new(0, 0);
        assert_eq!(grid.width, 1);
        assert_eq!(grid.height, 1);
        assert_eq!(grid.area(), 1);
    }

    #[test]
    fn test_perimeter_size() {
        let grid = Grid::new(10, 6);
        // 2 * 10 + 2 * (6 - 2)
        assert_eq!(grid.perimeter().len(), 28);
        assert!(grid.perimeter().iter().all(|&c| grid.is_perimeter(c)));
    }

    #[test]
    fn test_buffer_is_clipped() {
        let grid = Grid::new(10, 10);
        let corner = grid.buffer([Cell::new(0, 0)], 2);
        assert_eq!(corner.len(), 9);

        let middle = grid.buffer([Cell::new(5, 5)], 1);
        assert_eq!(middle.len(), 9);
        assert!(middle.contains(&Cell::new(4, 6)));
    }

    #[test]
    fn test_passable_includes_start() {
        let grid = Grid::new(5, 5);
        let mut walls = grid.perimeter();
        walls.insert(Cell::new(1, 1));

        let passable = grid.passable_cells(&walls, Cell::new(1, 1));
        assert!(passable.contains(&Cell::new(1, 1)));
        assert!(!passable.contains(&Cell::new(0, 0)));
        assert_eq!(passable.len(), 9);
    }

    #[test]
    fn test_cells_iterates_row_major() {
        let grid = Grid::new(3, 2);
        let cells: Vec<Cell> = grid.cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], Cell::new(0, 0));
        assert_eq!(cells[3], Cell::new(0, 1));
    }
}
