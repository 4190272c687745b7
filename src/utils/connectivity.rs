//! # Connectivity Analysis
//!
//! Breadth-first distances over the passable set and 4-connected component
//! extraction over arbitrary cell sets. Both run in time linear in the size of
//! the input set.

use crate::game::Cell;
use crate::utils::CellSet;
use std::collections::{BTreeMap, VecDeque};

/// Hop counts from an origin to every reachable cell.
///
/// Unreachable cells are absent. The origin is always present with distance 0,
/// and every other entry has a 4-neighbor exactly one hop closer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMap {
    origin: Cell,
    distances: BTreeMap<Cell, u32>,
}

impl DistanceMap {
    /// The cell distances are measured from.
    pub fn origin(&self) -> Cell {
        self.origin
    }

    /// Distance to `cell`, if reachable.
    pub fn get(&self, cell: Cell) -> Option<u32> {
        self.distances.get(&cell).copied()
    }

    /// Whether `cell` is reachable from the origin.
    pub fn contains(&self, cell: Cell) -> bool {
        self.distances.contains_key(&cell)
    }

    /// Number of reachable cells, origin included.
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// Always false; the origin is always present.
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Reachable cells with their distances, in cell order.
    pub fn iter(&self) -> impl Iterator<Item = (Cell, u32)> + '_ {
        self.distances.iter().map(|(&cell, &d)| (cell, d))
    }

    /// Reachable cells, in cell order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.distances.keys().copied()
    }

    /// The largest distance in the map.
    pub fn max_distance(&self) -> u32 {
        self.distances.values().copied().max().unwrap_or(0)
    }

    /// Reachable cells sorted farthest first; ties keep cell order.
    pub fn farthest_first(&self) -> Vec<(Cell, u32)> {
        let mut entries: Vec<(Cell, u32)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }

    /// Reachable cells as a set.
    pub fn reachable_set(&self) -> CellSet {
        self.cells().collect()
    }
}

/// FIFO breadth-first search over 4-neighbors.
///
/// The first discovery of a cell fixes its distance, so every distance is an
/// exact shortest hop count. An origin outside `passable` is not an error: the
/// result then holds only the origin at distance 0.
///
/// # Examples
///
/// ```
/// use sar_mission::{bfs_distances, Cell, CellSet};
///
/// let passable: CellSet = (0..4).map(|x| Cell::new(x, 0)).collect();
/// let distances = bfs_distances(Cell::new(0, 0), &passable);
/// assert_eq!(distances.get(Cell::new(3, 0)), Some(3));
/// ```
pub fn bfs_distances(origin: Cell, passable: &CellSet) -> DistanceMap {
    let mut distances = BTreeMap::new();
    distances.insert(origin, 0);

    if !passable.contains(&origin) {
        return DistanceMap { origin, distances };
    }

    let mut queue = VecDeque::from([origin]);
    while let Some(current) = queue.pop_front() {
        let next = distances[&current] + 1;
        for neighbor in current.cardinal_neighbors() {
            if passable.contains(&neighbor) && !distances.contains_key(&neighbor) {
                distances.insert(neighbor, next);
                queue.push_back(neighbor);
            }
        }
    }

    DistanceMap { origin, distances }
}

/// Partitions `cells` into maximal 4-connected components.
///
/// Components are returned in order of their smallest cell, which makes the
/// output deterministic for a given input.
pub fn connected_components(cells: &CellSet) -> Vec<CellSet> {
    let mut seen = CellSet::new();
    let mut components = Vec::new();

    for &seed in cells {
        if seen.contains(&seed) {
            continue;
        }

        let mut component = CellSet::new();
        let mut stack = vec![seed];
        seen.insert(seed);

        while let Some(current) = stack.pop() {
            component.insert(current);
            for neighbor in current.cardinal_neighbors() {
                if cells.contains(&neighbor) && seen.insert(neighbor) {
                    stack.push(neighbor);
                }
            }
        }

        components.push(component);
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Grid;

    fn open_room(width: u32, height: u32) -> (Grid, CellSet) {
        let grid = Grid::new(width, height);
        let walls = grid.perimeter();
        let passable = grid.passable_cells(&walls, Cell::new(1, 1));
        (grid, passable)
    }

    #[test]
    fn test_bfs_origin_is_zero() {
        let (_, passable) = open_room(8, 8);
        let distances = bfs_distances(Cell::new(1, 1), &passable);
        assert_eq!(distances.get(Cell::new(1, 1)), Some(0));
        assert_eq!(distances.origin(), Cell::new(1, 1));
        assert_eq!(distances.len(), passable.len());
    }

    #[test]
    fn test_bfs_distances_are_manhattan_in_open_room() {
        let (_, passable) = open_room(8, 8);
        let origin = Cell::new(1, 1);
        let distances = bfs_distances(origin, &passable);
        for (cell, d) in distances.iter() {
            assert_eq!(d, cell.manhattan_distance(origin));
        }
        assert_eq!(distances.max_distance(), 10);
    }

    #[test]
    fn test_bfs_predecessor_property() {
        let (_, mut passable) = open_room(12, 9);
        for y in 1..7 {
            passable.remove(&Cell::new(5, y));
        }
        let distances = bfs_distances(Cell::new(1, 1), &passable);

        for (cell, d) in distances.iter() {
            if d == 0 {
                continue;
            }
            let has_predecessor = cell
                .cardinal_neighbors()
                .iter()
                .any(|&n| distances.get(n) == Some(d - 1));
            assert!(has_predecessor, "{} at {} has no predecessor", cell, d);
        }
    }

    #[test]
    fn test_bfs_origin_not_passable() {
        let (_, passable) = open_room(6, 6);
        let distances = bfs_distances(Cell::new(0, 0), &passable);
        assert_eq!(distances.len(), 1);
        assert_eq!(distances.get(Cell::new(0, 0)), Some(0));
    }

    #[test]
    fn test_bfs_skips_enclosed_pocket() {
        let (grid, mut passable) = open_room(10, 10);
        // Enclose (6,6) with walls on all four sides.
        for cell in Cell::new(6, 6).cardinal_neighbors() {
            passable.remove(&cell);
        }
        assert!(grid.contains(Cell::new(6, 6)));

        let distances = bfs_distances(Cell::new(1, 1), &passable);
        assert!(!distances.contains(Cell::new(6, 6)));
        assert!(distances.contains(Cell::new(8, 8)));
    }

    #[test]
    fn test_farthest_first_ordering() {
        let passable: CellSet = (0..5).map(|x| Cell::new(x, 0)).collect();
        let distances = bfs_distances(Cell::new(2, 0), &passable);
        let ordered = distances.farthest_first();
        assert_eq!(ordered[0], (Cell::new(0, 0), 2));
        assert_eq!(ordered[1], (Cell::new(4, 0), 2));
        assert_eq!(ordered.last(), Some(&(Cell::new(2, 0), 0)));
    }

    #[test]
    fn test_components_partition() {
        let mut cells = CellSet::new();
        cells.extend([Cell::new(0, 0), Cell::new(1, 0), Cell::new(1, 1)]);
        cells.extend([Cell::new(5, 5), Cell::new(5, 6)]);
        // Diagonal contact does not connect.
        cells.insert(Cell::new(2, 2));

        let components = connected_components(&cells);
        assert_eq!(components.len(), 3);

        let total: usize = components.iter().map(|c| c.len()).sum();
        assert_eq!(total, cells.len());
        assert_eq!(components[0].len(), 3);
    }

    #[test]
    fn test_components_idempotent() {
        let grid = Grid::new(9, 9);
        let mut cells = grid.perimeter();
        cells.extend([Cell::new(4, 4), Cell::new(4, 5)]);

        let first = connected_components(&cells);
        for component in &first {
            let again = connected_components(component);
            assert_eq!(again.len(), 1);
            assert_eq!(&again[0], component);
        }
    }

    #[test]
    fn test_components_empty() {
        assert!(connected_components(&CellSet::new()).is_empty());
    }
}
