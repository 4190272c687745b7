//! # Game Mathematics
//!
//! Small numeric helpers for fraction-of-a-count sizing and sector bucketing.

use crate::game::{Cell, Grid};

/// `floor(total * fraction)`, with the fraction clamped to `[0, 1]`.
///
/// # Examples
///
/// ```
/// use sar_mission::utils::scaled_count;
///
/// assert_eq!(scaled_count(10, 0.35), 3);
/// assert_eq!(scaled_count(10, 2.0), 10);
/// ```
pub fn scaled_count(total: usize, fraction: f64) -> usize {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    ((total as f64) * fraction).floor() as usize
}

/// Like [`scaled_count`] but never below one when `total` is non-zero.
pub fn scaled_count_at_least_one(total: usize, fraction: f64) -> usize {
    if total == 0 {
        0
    } else {
        scaled_count(total, fraction).max(1)
    }
}

/// Sector index of `cell` when the grid is split into `sectors_x` by
/// `sectors_y` equal bands.
pub fn sector_of(cell: Cell, grid: &Grid, sectors_x: u32, sectors_y: u32) -> (u32, u32) {
    let sx = sectors_x.max(1) as i64;
    let sy = sectors_y.max(1) as i64;
    let col = (cell.x.max(0) as i64 * sx / grid.width as i64).min(sx - 1);
    let row = (cell.y.max(0) as i64 * sy / grid.height as i64).min(sy - 1);
    (col as u32, row as u32)
}

/// Orders a `(min, max)` pair.
pub fn ordered_span(span: (u32, u32)) -> (u32, u32) {
    if span.0 <= span.1 {
        span
    } else {
        (span.1, span.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_count_floors() {
        assert_eq!(scaled_count(7, 0.5), 3);
        assert_eq!(scaled_count(0, 0.9), 0);
        assert_eq!(scaled_count(10, -1.0), 0);
        assert_eq!(scaled_count(10, f64::NAN), 0);
    }

    #[test]
    fn test_scaled_count_at_least_one() {
        assert_eq!(scaled_count_at_least_one(3, 0.1), 1);
        assert_eq!(scaled_count_at_least_one(0, 0.5), 0);
        assert_eq!(scaled_count_at_least_one(20, 0.25), 5);
    }

    #[test]
    fn test_sector_of_corners() {
        let grid = Grid::new(80, 40);
        assert_eq!(sector_of(Cell::new(0, 0), &grid, 4, 3), (0, 0));
        assert_eq!(sector_of(Cell::new(79, 39), &grid, 4, 3), (3, 2));
        assert_eq!(sector_of(Cell::new(20, 14), &grid, 4, 3), (1, 1));
    }

    #[test]
    fn test_ordered_span() {
        assert_eq!(ordered_span((3, 10)), (3, 10));
        assert_eq!(ordered_span((5, 2)), (2, 5));
    }
}
