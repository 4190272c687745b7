//! # Rescue Point Selection
//!
//! With a single rescue point the farthest free reachable cell is used. With
//! several, random anchors are drawn and each one snaps to the nearest free
//! cell, which spreads the points across the map.

use crate::game::{Cell, PriorityClass};
use crate::utils::{CellSet, DistanceMap};
use rand::rngs::StdRng;
use rand::seq::index;
use std::collections::BTreeMap;

/// Chooses delivery targets for a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RescuePointSelector {
    count: usize,
    allow_unreachable: bool,
}

impl RescuePointSelector {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            allow_unreachable: false,
        }
    }

    /// Lets anchors and snapped points use passable cells the start cannot
    /// reach.
    pub fn allow_unreachable(mut self, allow: bool) -> Self {
        self.allow_unreachable = allow;
        self
    }

    /// Picks up to `count` rescue points.
    ///
    /// Points never sit on a victim or on `start` unless the map leaves no
    /// other choice, in which case the documented fallbacks apply.
    pub fn select_rescue_points(
        &self,
        distances: &DistanceMap,
        start: Cell,
        victims: &BTreeMap<Cell, PriorityClass>,
        passable: &CellSet,
        rng: &mut StdRng,
    ) -> Vec<Cell> {
        match self.count {
            0 => Vec::new(),
            1 => vec![self.farthest_free(distances, start, victims)],
            _ => self.anchored(distances, start, victims, passable, rng),
        }
    }

    fn farthest_free(
        &self,
        distances: &DistanceMap,
        start: Cell,
        victims: &BTreeMap<Cell, PriorityClass>,
    ) -> Cell {
        let ordered = distances.farthest_first();
        ordered
            .iter()
            .find(|(cell, _)| *cell != start && !victims.contains_key(cell))
            .or_else(|| ordered.first())
            .map(|(cell, _)| *cell)
            .unwrap_or(start)
    }

    fn anchored(
        &self,
        distances: &DistanceMap,
        start: Cell,
        victims: &BTreeMap<Cell, PriorityClass>,
        passable: &CellSet,
        rng: &mut StdRng,
    ) -> Vec<Cell> {
        let candidates: Vec<Cell> = passable
            .iter()
            .filter(|cell| **cell != start)
            .filter(|cell| self.allow_unreachable || distances.contains(**cell))
            .copied()
            .collect();
        if candidates.is_empty() {
            return vec![start];
        }

        let anchors: Vec<Cell> = index::sample(rng, candidates.len(), self.count.min(candidates.len()))
            .into_iter()
            .map(|i| candidates[i])
            .collect();

        let mut chosen = Vec::with_capacity(anchors.len());
        let mut taken = CellSet::new();
        for anchor in anchors {
            let pick = candidates
                .iter()
                .filter(|cell| !victims.contains_key(*cell) && !taken.contains(*cell))
                .min_by_key(|cell| cell.manhattan_distance(anchor))
                .copied()
                .unwrap_or(start);
            taken.insert(pick);
            chosen.push(pick);
        }
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Grid;
    use crate::utils::bfs_distances;
    use rand::SeedableRng;

    fn open_room(width: u32, height: u32) -> (CellSet, DistanceMap) {
        let grid = Grid::new(width, height);
        let walls = grid.perimeter();
        let passable = grid.passable_cells(&walls, Cell::new(1, 1));
        let distances = bfs_distances(Cell::new(1, 1), &passable);
        (passable, distances)
    }

    #[test]
    fn test_single_point_is_farthest_free_cell() {
        let (passable, distances) = open_room(10, 8);
        let mut victims = BTreeMap::new();
        victims.insert(Cell::new(8, 6), PriorityClass::High);

        let mut rng = StdRng::seed_from_u64(0);
        let points = RescuePointSelector::new(1).select_rescue_points(
            &distances,
            Cell::new(1, 1),
            &victims,
            &passable,
            &mut rng,
        );

        assert_eq!(points.len(), 1);
        // (8,6) is taken; next farthest in cell order is (7,6).
        assert_eq!(points[0], Cell::new(7, 6));
    }

    #[test]
    fn test_single_point_falls_back_to_farthest() {
        let passable: CellSet = [Cell::new(1, 1), Cell::new(2, 1)].into_iter().collect();
        let distances = bfs_distances(Cell::new(1, 1), &passable);
        let mut victims = BTreeMap::new();
        victims.insert(Cell::new(2, 1), PriorityClass::Low);

        let mut rng = StdRng::seed_from_u64(0);
        let points = RescuePointSelector::new(1).select_rescue_points(
            &distances,
            Cell::new(1, 1),
            &victims,
            &passable,
            &mut rng,
        );
        assert_eq!(points, vec![Cell::new(2, 1)]);
    }

    #[test]
    fn test_multi_points_are_distinct_and_free() {
        let (passable, distances) = open_room(30, 20);
        let mut victims = BTreeMap::new();
        for x in 5..15 {
            victims.insert(Cell::new(x, 10), PriorityClass::Medium);
        }

        let mut rng = StdRng::seed_from_u64(21);
        let points = RescuePointSelector::new(3).select_rescue_points(
            &distances,
            Cell::new(1, 1),
            &victims,
            &passable,
            &mut rng,
        );

        assert_eq!(points.len(), 3);
        let unique: CellSet = points.iter().copied().collect();
        assert_eq!(unique.len(), 3);
        for point in &points {
            assert_ne!(*point, Cell::new(1, 1));
            assert!(!victims.contains_key(point));
            assert!(passable.contains(point));
        }
    }

    #[test]
    fn test_multi_points_fall_back_to_start() {
        let passable: CellSet = [Cell::new(1, 1)].into_iter().collect();
        let distances = bfs_distances(Cell::new(1, 1), &passable);
        let mut rng = StdRng::seed_from_u64(0);
        let points = RescuePointSelector::new(3).select_rescue_points(
            &distances,
            Cell::new(1, 1),
            &BTreeMap::new(),
            &passable,
            &mut rng,
        );
        assert_eq!(points, vec![Cell::new(1, 1)]);
    }

    #[test]
    fn test_zero_count() {
        let (passable, distances) = open_room(6, 6);
        let mut rng = StdRng::seed_from_u64(0);
        let points = RescuePointSelector::new(0).select_rescue_points(
            &distances,
            Cell::new(1, 1),
            &BTreeMap::new(),
            &passable,
            &mut rng,
        );
        assert!(points.is_empty());
    }
}
