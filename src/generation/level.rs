//! # Level Assembly
//!
//! Runs the whole generation pipeline and bundles the result into a [`Level`],
//! the immutable layout a play session works from.

use super::{
    highlight_components, utils, Generator, LevelParams, RescuePointSelector, VictimPlanner,
    WallGenerator,
};
use crate::game::{Cell, Grid, PriorityClass};
use crate::utils::{bfs_distances, CellSet, DistanceMap};
use crate::{SarError, SarResult};
use log::{info, warn};
use rand::rngs::StdRng;
use std::collections::BTreeMap;

/// Counters collected while a level was generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenerationReport {
    pub max_walls: usize,
    pub segments_placed: u32,
    pub segment_attempts: u64,
    pub components_thickened: usize,
    pub victims_requested: usize,
    /// Final separation the High victims were placed under
    pub high_separation: u32,
}

/// A fully generated level.
#[derive(Debug, Clone)]
pub struct Level {
    pub grid: Grid,
    pub start: Cell,
    pub walls: CellSet,
    /// Non-perimeter cells of the wall components flagged for highlighted rendering
    pub highlighted: CellSet,
    pub passable: CellSet,
    /// BFS distances from `start`
    pub distances: DistanceMap,
    /// Victims as generated; the session keeps its own mutable copy
    pub victims: BTreeMap<Cell, PriorityClass>,
    pub rescue_points: Vec<Cell>,
    pub report: GenerationReport,
}

impl Level {
    /// Whether `cell` is blocked.
    pub fn is_wall(&self, cell: Cell) -> bool {
        self.walls.contains(&cell)
    }

    /// Whether the player may stand on `cell`.
    pub fn is_passable(&self, cell: Cell) -> bool {
        self.passable.contains(&cell)
    }

    /// Whether `cell` is one of the rescue points.
    pub fn is_rescue_point(&self, cell: Cell) -> bool {
        self.rescue_points.contains(&cell)
    }

    /// Victim counts as generated, indexed High, Medium, Low.
    pub fn victim_counts(&self) -> [usize; 3] {
        count_by_priority(self.victims.values())
    }

    /// Row-major integer matrix of the layout.
    ///
    /// Codes: 0 passable, 1 wall, 2 High, 3 Medium, 4 Low, 5 rescue point,
    /// 9 start. `victims` overrides the generated victims so a session can
    /// export its current state.
    pub fn matrix_with(&self, victims: &BTreeMap<Cell, PriorityClass>) -> Vec<Vec<u8>> {
        let mut rows = vec![vec![0u8; self.grid.width as usize]; self.grid.height as usize];
        let mut mark = |cell: Cell, code: u8| {
            if self.grid.contains(cell) {
                rows[cell.y as usize][cell.x as usize] = code;
            }
        };

        for &cell in &self.walls {
            mark(cell, 1);
        }
        for (&cell, priority) in victims {
            mark(cell, priority.matrix_code());
        }
        for &cell in &self.rescue_points {
            mark(cell, 5);
        }
        mark(self.start, 9);
        rows
    }

    /// [`Level::matrix_with`] using the generated victims.
    pub fn matrix(&self) -> Vec<Vec<u8>> {
        self.matrix_with(&self.victims)
    }

    /// Builds a level from a hand-made layout, deriving passable cells and
    /// distances. Used for scripted scenarios and replays.
    pub fn from_layout(
        grid: Grid,
        start: Cell,
        walls: CellSet,
        victims: BTreeMap<Cell, PriorityClass>,
        rescue_points: Vec<Cell>,
    ) -> Self {
        let passable = grid.passable_cells(&walls, start);
        let distances = bfs_distances(start, &passable);
        let report = GenerationReport {
            victims_requested: victims.len(),
            ..GenerationReport::default()
        };
        Self {
            grid,
            start,
            walls,
            highlighted: CellSet::new(),
            passable,
            distances,
            victims,
            rescue_points,
            report,
        }
    }
}

/// Counts priorities, indexed High, Medium, Low.
pub fn count_by_priority<'a, I>(priorities: I) -> [usize; 3]
where
    I: IntoIterator<Item = &'a PriorityClass>,
{
    let mut counts = [0; 3];
    for priority in priorities {
        let slot = match priority {
            PriorityClass::High => 0,
            PriorityClass::Medium => 1,
            PriorityClass::Low => 2,
        };
        counts[slot] += 1;
    }
    counts
}

/// Runs walls, BFS, victims and rescue points in order.
#[derive(Debug, Default, Clone, Copy)]
pub struct LevelGenerator;

impl LevelGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generates a level from its own seed and logs any broken guarantee.
    ///
    /// # Examples
    ///
    /// ```
    /// use sar_mission::{LevelGenerator, LevelParams};
    ///
    /// let level = LevelGenerator::new().build(&LevelParams::for_testing(3));
    /// assert!(!level.is_wall(level.start));
    /// ```
    pub fn build(&self, params: &LevelParams) -> Level {
        let mut rng = utils::create_rng(params);
        let level = self.generate(params, &mut rng);
        if let Err(e) = self.validate(&level, params) {
            warn!("Generated level failed validation: {}", e);
        }
        level
    }
}

impl Generator<Level> for LevelGenerator {
    fn generate(&self, params: &LevelParams, rng: &mut StdRng) -> Level {
        let layout = WallGenerator::new().generate(params, rng);
        let highlighted = highlight_components(
            &params.grid,
            &layout.walls,
            params.walls.highlight_fraction,
            rng,
        );

        let passable = params.grid.passable_cells(&layout.walls, params.start);
        let distances = bfs_distances(params.start, &passable);

        let placement = VictimPlanner::new(&params.placement).place_victims(
            &params.grid,
            &distances,
            params.start,
            &passable,
            rng,
        );

        let rescue_points = RescuePointSelector::new(params.rescue_point_count)
            .allow_unreachable(params.placement.allow_unreachable)
            .select_rescue_points(
                &distances,
                params.start,
                &placement.victims,
                &passable,
                rng,
            );

        info!(
            "Generated {}x{} level (seed {}): {} walls, {} victims, {} rescue points, high separation {}",
            params.grid.width,
            params.grid.height,
            params.walls.seed,
            layout.walls.len(),
            placement.victims.len(),
            rescue_points.len(),
            placement.high_separation
        );

        Level {
            grid: params.grid,
            start: params.start,
            report: GenerationReport {
                max_walls: layout.max_walls,
                segments_placed: layout.segments_placed,
                segment_attempts: layout.attempts_used,
                components_thickened: layout.components_thickened,
                victims_requested: params.placement.quotas.total(),
                high_separation: placement.high_separation,
            },
            walls: layout.walls,
            highlighted,
            passable,
            distances,
            victims: placement.victims,
            rescue_points,
        }
    }

    fn validate(&self, level: &Level, params: &LevelParams) -> SarResult<()> {
        if !level.grid.perimeter().is_subset(&level.walls) {
            return Err(SarError::InvalidState("perimeter is not fully walled".to_string()));
        }
        if level.is_wall(level.start) {
            return Err(SarError::InvalidState("start cell is a wall".to_string()));
        }
        if level.victims.len() > params.placement.quotas.total() {
            return Err(SarError::InvalidState(format!(
                "{} victims exceed the quota total",
                level.victims.len()
            )));
        }
        for cell in level.victims.keys() {
            if *cell == level.start || !level.is_passable(*cell) {
                return Err(SarError::InvalidState(format!(
                    "victim at {} is on the start cell or a wall",
                    cell
                )));
            }
        }
        for cell in &level.rescue_points {
            if !level.is_passable(*cell) {
                return Err(SarError::InvalidState(format!(
                    "rescue point {} is not passable",
                    cell
                )));
            }
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "level"
    }
}
