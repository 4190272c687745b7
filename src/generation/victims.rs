//! # Victim Placement
//!
//! Places victims of the three priority classes under per-class quotas.
//!
//! High priority victims go on far cells. The far pool is split into sectors
//! and visited round-robin so they spread across the map, while a minimum
//! Chebyshev separation keeps them apart. When the sectors run dry the
//! separation is relaxed one step at a time down to a floor, then a top-up
//! pass draws from the whole pool. Medium and Low victims fill shuffled
//! remaining cells.

use super::PlacementParams;
use crate::game::{Cell, Grid, PriorityClass};
use crate::utils::{bfs_distances, scaled_count, sector_of, CellSet, DistanceMap};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::{BTreeMap, VecDeque};

/// Result of a placement run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VictimPlacement {
    /// Victim cell to priority class
    pub victims: BTreeMap<Cell, PriorityClass>,
    /// Smallest separation any High victim was accepted under. Every pair of
    /// High victims is at least this far apart (Chebyshev).
    pub high_separation: u32,
}

impl VictimPlacement {
    /// Number of victims of one class.
    pub fn count(&self, priority: PriorityClass) -> usize {
        self.victims.values().filter(|p| **p == priority).count()
    }

    /// Cells holding a victim of `priority`.
    pub fn cells_of(&self, priority: PriorityClass) -> Vec<Cell> {
        self.victims
            .iter()
            .filter(|(_, p)| **p == priority)
            .map(|(cell, _)| *cell)
            .collect()
    }
}

/// Places victims according to [`PlacementParams`].
#[derive(Debug, Clone)]
pub struct VictimPlanner<'a> {
    params: &'a PlacementParams,
}

impl<'a> VictimPlanner<'a> {
    pub fn new(params: &'a PlacementParams) -> Self {
        Self { params }
    }

    /// Places all three classes.
    ///
    /// Only cells in the distance map are used unless `allow_unreachable` is
    /// set and the reachable pool is too small for the quotas.
    pub fn place_victims(
        &self,
        grid: &Grid,
        distances: &DistanceMap,
        start: Cell,
        passable: &CellSet,
        rng: &mut StdRng,
    ) -> VictimPlacement {
        let pool = self.candidate_pool(distances, start, passable, rng);

        let mut scored: Vec<(Cell, u32)> = pool
            .iter()
            .map(|&cell| (cell, distances.get(cell).unwrap_or(0)))
            .collect();
        scored.sort_by_key(|&(_, distance)| distance);

        let (high, high_separation) = self.place_high(grid, &scored);
        if high.len() < self.params.quotas.high {
            warn!(
                "Placed {} of {} high priority victims; not enough free cells",
                high.len(),
                self.params.quotas.high
            );
        }

        let mut victims: BTreeMap<Cell, PriorityClass> =
            high.into_iter().map(|cell| (cell, PriorityClass::High)).collect();

        let mut rest: Vec<Cell> = pool
            .into_iter()
            .filter(|cell| !victims.contains_key(cell))
            .collect();
        rest.shuffle(rng);

        let mut rest = rest.into_iter();
        for priority in [PriorityClass::Medium, PriorityClass::Low] {
            let quota = self.params.quotas.quota(priority);
            for cell in rest.by_ref().take(quota) {
                victims.insert(cell, priority);
            }
        }

        debug!(
            "Victims: {} placed of {} requested, high separation {}",
            victims.len(),
            self.params.quotas.total(),
            high_separation
        );

        VictimPlacement {
            victims,
            high_separation,
        }
    }

    fn candidate_pool(
        &self,
        distances: &DistanceMap,
        start: Cell,
        passable: &CellSet,
        rng: &mut StdRng,
    ) -> Vec<Cell> {
        let mut pool: Vec<Cell> = distances
            .cells()
            .filter(|cell| *cell != start && passable.contains(cell))
            .collect();

        if self.params.allow_unreachable && pool.len() < self.params.quotas.total() {
            let mut extras: Vec<Cell> = passable
                .iter()
                .filter(|cell| **cell != start && !distances.contains(**cell))
                .copied()
                .collect();
            extras.shuffle(rng);
            pool.extend(extras);
        }

        pool
    }

    /// `scored` must be sorted by ascending distance.
    fn place_high(&self, grid: &Grid, scored: &[(Cell, u32)]) -> (Vec<Cell>, u32) {
        let floor = self.params.min_separation.max(1);
        let mut separation = self.params.separation.max(floor);
        let mut recorded = separation;

        let quota = self.params.quotas.high.min(scored.len());
        if quota == 0 {
            return (Vec::new(), recorded);
        }

        let cutoff_index = scaled_count(scored.len(), self.params.far_quantile).min(scored.len() - 1);
        let cutoff = scored[cutoff_index].1;
        let mut far: Vec<(Cell, u32)> = scored
            .iter()
            .filter(|(_, distance)| *distance >= cutoff)
            .copied()
            .collect();
        far.sort_by(|a, b| b.1.cmp(&a.1));
        let far: Vec<Cell> = far.into_iter().map(|(cell, _)| cell).collect();

        let mut placed: Vec<Cell> = Vec::with_capacity(quota);
        let mut taken = CellSet::new();

        // Sector passes: each separation level starts from fresh buckets; a
        // level ends when every bucket has been drained.
        while placed.len() < quota && separation >= floor {
            let mut buckets = self.sector_buckets(grid, &far, &taken);
            loop {
                let mut accepted = false;
                for bucket in buckets.iter_mut() {
                    if placed.len() >= quota {
                        break;
                    }
                    while let Some(candidate) = bucket.pop_front() {
                        if is_separated(candidate, &placed, separation) {
                            placed.push(candidate);
                            taken.insert(candidate);
                            recorded = recorded.min(separation);
                            accepted = true;
                            break;
                        }
                    }
                }
                if !accepted || placed.len() >= quota {
                    break;
                }
            }
            if placed.len() < quota {
                separation -= 1;
            }
        }

        // Top-up from the whole pool, farthest first, at the floor and then
        // without any separation.
        for pass_separation in [floor, 0] {
            for &(candidate, _) in scored.iter().rev() {
                if placed.len() >= quota {
                    break;
                }
                if taken.contains(&candidate) || !is_separated(candidate, &placed, pass_separation) {
                    continue;
                }
                placed.push(candidate);
                taken.insert(candidate);
                recorded = recorded.min(pass_separation.max(1));
            }
        }

        (placed, recorded)
    }

    /// Buckets `far` cells by sector, keeping far-first order inside each
    /// bucket. Buckets are ordered by their farthest cell.
    fn sector_buckets(&self, grid: &Grid, far: &[Cell], taken: &CellSet) -> Vec<VecDeque<Cell>> {
        let (sectors_x, sectors_y) = self.params.sectors;
        let mut order = Vec::new();
        let mut buckets: BTreeMap<(u32, u32), VecDeque<Cell>> = BTreeMap::new();

        for &cell in far.iter().filter(|cell| !taken.contains(*cell)) {
            let sector = sector_of(cell, grid, sectors_x, sectors_y);
            buckets
                .entry(sector)
                .or_insert_with(|| {
                    order.push(sector);
                    VecDeque::new()
                })
                .push_back(cell);
        }

        order
            .into_iter()
            .filter_map(|sector| buckets.remove(&sector))
            .collect()
    }
}

fn is_separated(candidate: Cell, placed: &[Cell], separation: u32) -> bool {
    placed
        .iter()
        .all(|other| candidate.chebyshev_distance(*other) >= separation)
}

/// Convenience wrapper: BFS from `start` over `passable`, then place victims.
pub fn place_victims_from(
    grid: &Grid,
    start: Cell,
    passable: &CellSet,
    params: &PlacementParams,
    rng: &mut StdRng,
) -> VictimPlacement {
    let distances = bfs_distances(start, passable);
    VictimPlanner::new(params).place_victims(grid, &distances, start, passable, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::VictimQuotas;
    use rand::SeedableRng;

    fn open_room(width: u32, height: u32) -> (Grid, CellSet) {
        let grid = Grid::new(width, height);
        let walls = grid.perimeter();
        let passable = grid.passable_cells(&walls, Cell::new(1, 1));
        (grid, passable)
    }

    fn params(high: usize, medium: usize, low: usize) -> PlacementParams {
        PlacementParams {
            quotas: VictimQuotas::new(high, medium, low),
            ..PlacementParams::default()
        }
    }

    #[test]
    fn test_quotas_met_in_open_room() {
        let (grid, passable) = open_room(40, 30);
        let mut rng = StdRng::seed_from_u64(1);
        let placement =
            place_victims_from(&grid, Cell::new(1, 1), &passable, &params(8, 10, 12), &mut rng);

        assert_eq!(placement.count(PriorityClass::High), 8);
        assert_eq!(placement.count(PriorityClass::Medium), 10);
        assert_eq!(placement.count(PriorityClass::Low), 12);
        assert!(!placement.victims.contains_key(&Cell::new(1, 1)));
        assert!(placement.victims.keys().all(|cell| passable.contains(cell)));
    }

    #[test]
    fn test_high_victims_respect_recorded_separation() {
        let (grid, passable) = open_room(60, 40);
        let mut rng = StdRng::seed_from_u64(2);
        let placement =
            place_victims_from(&grid, Cell::new(1, 1), &passable, &params(12, 0, 0), &mut rng);

        let high = placement.cells_of(PriorityClass::High);
        assert_eq!(high.len(), 12);
        for (i, a) in high.iter().enumerate() {
            for b in &high[i + 1..] {
                assert!(a.chebyshev_distance(*b) >= placement.high_separation);
            }
        }
    }

    #[test]
    fn test_high_victims_prefer_far_cells() {
        let (grid, passable) = open_room(40, 20);
        let start = Cell::new(1, 1);
        let distances = bfs_distances(start, &passable);
        let mut rng = StdRng::seed_from_u64(3);
        let placement = VictimPlanner::new(&params(3, 0, 0))
            .place_victims(&grid, &distances, start, &passable, &mut rng);

        let mut all: Vec<u32> = distances.iter().map(|(_, d)| d).collect();
        all.sort_unstable();
        let median = all[all.len() / 2];
        for cell in placement.cells_of(PriorityClass::High) {
            assert!(distances.get(cell).unwrap_or(0) > median);
        }
    }

    #[test]
    fn test_small_pool_places_everything_possible() {
        let (grid, passable) = open_room(5, 5);
        // 9 passable cells, 8 free once the start is excluded.
        let mut rng = StdRng::seed_from_u64(4);
        let placement =
            place_victims_from(&grid, Cell::new(1, 1), &passable, &params(5, 5, 5), &mut rng);

        assert_eq!(placement.victims.len(), 8);
        assert_eq!(placement.count(PriorityClass::High), 5);
        assert_eq!(placement.high_separation, 1);
    }

    #[test]
    fn test_unreachable_cells_need_opt_in() {
        let grid = Grid::new(12, 7);
        let mut walls = grid.perimeter();
        for y in 1..6 {
            walls.insert(Cell::new(4, y));
        }
        let start = Cell::new(1, 1);
        let passable = grid.passable_cells(&walls, start);
        let reachable = bfs_distances(start, &passable).len() - 1;

        let mut rng = StdRng::seed_from_u64(5);
        let strict = place_victims_from(&grid, start, &passable, &params(2, 10, 10), &mut rng);
        assert_eq!(strict.victims.len(), reachable);
        assert!(strict.victims.keys().all(|cell| cell.x < 4));

        let relaxed_params = PlacementParams {
            allow_unreachable: true,
            ..params(2, 10, 10)
        };
        let mut rng = StdRng::seed_from_u64(5);
        let relaxed = place_victims_from(&grid, start, &passable, &relaxed_params, &mut rng);
        assert_eq!(relaxed.victims.len(), 22);
        assert!(relaxed.victims.keys().any(|cell| cell.x > 4));
    }

    #[test]
    fn test_placement_is_deterministic() {
        let (grid, passable) = open_room(30, 20);
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            place_victims_from(&grid, Cell::new(1, 1), &passable, &params(5, 5, 5), &mut rng)
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn test_empty_pool() {
        let grid = Grid::new(3, 3);
        let walls = grid.perimeter();
        let passable = grid.passable_cells(&walls, Cell::new(1, 1));
        let mut rng = StdRng::seed_from_u64(6);
        let placement =
            place_victims_from(&grid, Cell::new(1, 1), &passable, &params(3, 3, 3), &mut rng);
        assert!(placement.victims.is_empty());
    }
}
