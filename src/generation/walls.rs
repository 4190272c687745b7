//! # Wall Generation
//!
//! Builds the wall set in three passes:
//!
//! - the full perimeter ring, with a clearance buffer reserved around it and
//!   around the start cell
//! - random straight segments that keep their clearance buffer free of walls
//! - thickening of a sampled subset of wall components, layer by layer
//!
//! Every pass respects the coverage budget `floor(area * (1 - min_passable_ratio))`.
//! The perimeter is never truncated, so on tiny grids it may exceed the budget
//! on its own; nothing else is added in that case.

use super::{Generator, LevelParams, WallParams};
use crate::game::{Cell, Direction, Grid};
use crate::utils::{connected_components, ordered_span, scaled_count, scaled_count_at_least_one, CellSet};
use crate::{SarError, SarResult};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::{index, SliceRandom};
use rand::Rng;

/// Output of the wall generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallLayout {
    /// Every blocked cell, perimeter included
    pub walls: CellSet,
    /// Coverage budget the layout was built against
    pub max_walls: usize,
    /// Segments accepted in the segment pass
    pub segments_placed: u32,
    /// Segment sampling attempts consumed
    pub attempts_used: u64,
    /// Components that went through the thickening pass
    pub components_thickened: usize,
}

/// Maximum number of wall cells for a grid and passable ratio.
///
/// # Examples
///
/// ```
/// use sar_mission::{generation::coverage_budget, Grid};
///
/// assert_eq!(coverage_budget(&Grid::new(80, 40), 0.5), 1600);
/// ```
pub fn coverage_budget(grid: &Grid, min_passable_ratio: f64) -> usize {
    let ratio = if min_passable_ratio.is_finite() {
        min_passable_ratio.clamp(0.0, 1.0)
    } else {
        0.5
    };
    ((grid.area() as f64) * (1.0 - ratio)).floor() as usize
}

/// Generates wall layouts.
#[derive(Debug, Default, Clone, Copy)]
pub struct WallGenerator;

impl WallGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Builds a wall set for `grid` around `start`.
    pub fn generate_walls(
        &self,
        grid: &Grid,
        start: Cell,
        params: &WallParams,
        rng: &mut StdRng,
    ) -> WallLayout {
        let mut builder = WallBuilder::new(grid, start, params);
        builder.place_segments(rng);
        builder.thicken(rng);

        debug!(
            "Walls: {} cells (budget {}), {} segments in {} attempts, {} components thickened",
            builder.walls.len(),
            builder.max_walls,
            builder.segments_placed,
            builder.attempts_used,
            builder.components_thickened
        );

        WallLayout {
            walls: builder.walls,
            max_walls: builder.max_walls,
            segments_placed: builder.segments_placed,
            attempts_used: builder.attempts_used,
            components_thickened: builder.components_thickened,
        }
    }
}

impl Generator<WallLayout> for WallGenerator {
    fn generate(&self, params: &LevelParams, rng: &mut StdRng) -> WallLayout {
        self.generate_walls(&params.grid, params.start, &params.walls, rng)
    }

    fn validate(&self, content: &WallLayout, params: &LevelParams) -> SarResult<()> {
        let perimeter = params.grid.perimeter();
        if !perimeter.is_subset(&content.walls) {
            return Err(SarError::InvalidState(
                "perimeter is not fully walled".to_string(),
            ));
        }
        if content.walls.contains(&params.start) {
            return Err(SarError::InvalidState(format!(
                "start cell {} is a wall",
                params.start
            )));
        }
        if content.walls.len() > content.max_walls.max(perimeter.len()) {
            return Err(SarError::InvalidState(format!(
                "{} walls exceed the budget of {}",
                content.walls.len(),
                content.max_walls
            )));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "walls"
    }
}

/// Working state shared by the passes.
struct WallBuilder<'a> {
    grid: &'a Grid,
    start: Cell,
    params: &'a WallParams,
    walls: CellSet,
    reserved: CellSet,
    spawn_zone: CellSet,
    max_walls: usize,
    segments_placed: u32,
    attempts_used: u64,
    components_thickened: usize,
}

impl<'a> WallBuilder<'a> {
    fn new(grid: &'a Grid, start: Cell, params: &'a WallParams) -> Self {
        let walls = grid.perimeter();
        let spawn_zone = grid.buffer([start], params.clearance_radius.max(2));
        let mut reserved = grid.buffer(walls.iter().copied(), params.clearance_radius);
        reserved.extend(spawn_zone.iter().copied());

        Self {
            grid,
            start,
            params,
            walls,
            reserved,
            spawn_zone,
            max_walls: coverage_budget(grid, params.min_passable_ratio),
            segments_placed: 0,
            attempts_used: 0,
            components_thickened: 0,
        }
    }

    fn remaining(&self) -> usize {
        self.max_walls.saturating_sub(self.walls.len())
    }

    fn commit(&mut self, cells: &[Cell]) {
        self.walls.extend(cells.iter().copied());
        self.reserved
            .extend(self.grid.buffer(cells.iter().copied(), self.params.clearance_radius));
    }

    fn place_segments(&mut self, rng: &mut StdRng) {
        // Segments start strictly inside the perimeter.
        if self.grid.width < 3 || self.grid.height < 3 {
            return;
        }

        let (min_len, max_len) = ordered_span(self.params.segment_length);
        let min_len = min_len.max(1);
        let max_len = max_len.max(min_len);
        let max_attempts =
            u64::from(self.params.segment_count) * u64::from(self.params.attempts_per_segment);

        while self.segments_placed < self.params.segment_count
            && self.attempts_used < max_attempts
            && self.remaining() > 0
        {
            self.attempts_used += 1;

            let origin = Cell::new(
                rng.gen_range(1..self.grid.width - 1),
                rng.gen_range(1..self.grid.height - 1),
            );
            if origin == self.start || self.reserved.contains(&origin) {
                continue;
            }

            let direction = Direction::all()[rng.gen_range(0..4)];
            let length = rng.gen_range(min_len..=max_len) as i32;
            let delta = direction.to_delta();
            let mut proposal: Vec<Cell> = (0..length)
                .map(|i| Cell::new(origin.x + delta.x * i, origin.y + delta.y * i))
                .collect();

            let blocked = proposal.iter().any(|cell| {
                !self.grid.contains(*cell)
                    || *cell == self.start
                    || self.reserved.contains(cell)
                    || self.walls.contains(cell)
            });
            if blocked {
                continue;
            }

            let footprint = self
                .grid
                .buffer(proposal.iter().copied(), self.params.clearance_radius);
            if footprint.iter().any(|cell| self.walls.contains(cell)) {
                continue;
            }

            let remaining = self.remaining();
            let truncated = proposal.len() > remaining;
            proposal.truncate(remaining);
            self.commit(&proposal);
            self.segments_placed += 1;

            if truncated {
                break;
            }
        }
    }

    fn thicken(&mut self, rng: &mut StdRng) {
        let mut components = connected_components(&self.walls);
        if components.is_empty() {
            return;
        }

        let picks = scaled_count_at_least_one(components.len(), self.params.cluster_growth_fraction);
        let chosen = index::sample(rng, components.len(), picks).into_vec();
        let (min_layers, max_layers) = ordered_span(self.params.thicken_layers);

        for component_index in chosen {
            if self.remaining() == 0 {
                break;
            }

            let layers = rng.gen_range(min_layers..=max_layers);
            let component = &mut components[component_index];
            for _ in 0..layers {
                if !self.grow_layer(component, rng) {
                    break;
                }
            }
            self.components_thickened += 1;
        }
    }

    /// Adds one layer of rim cells to `component`. Returns false when nothing
    /// could be added.
    fn grow_layer(&mut self, component: &mut CellSet, rng: &mut StdRng) -> bool {
        let remaining = self.remaining();
        if remaining == 0 {
            return false;
        }

        let own_buffer = self
            .grid
            .buffer(component.iter().copied(), self.params.clearance_radius);
        let rim: CellSet = component
            .iter()
            .flat_map(|cell| cell.cardinal_neighbors())
            .filter(|cell| self.grid.contains(*cell))
            .collect();

        let mut eligible: Vec<Cell> = rim
            .into_iter()
            .filter(|cell| {
                !self.walls.contains(cell)
                    && *cell != self.start
                    && !self.spawn_zone.contains(cell)
                    && (!self.reserved.contains(cell) || own_buffer.contains(cell))
            })
            .collect();
        if eligible.is_empty() {
            return false;
        }

        let take = scaled_count_at_least_one(eligible.len(), self.params.rim_growth_fraction)
            .min(remaining);
        eligible.shuffle(rng);
        eligible.truncate(take);

        self.commit(&eligible);
        component.extend(eligible);
        true
    }
}

/// Picks a seeded sample of wall components for highlighted rendering.
///
/// Any component may be picked, including the one grown from the perimeter;
/// the perimeter ring itself is always left out.
pub fn highlight_components(
    grid: &Grid,
    walls: &CellSet,
    fraction: f64,
    rng: &mut StdRng,
) -> CellSet {
    let components = connected_components(walls);
    let picks = scaled_count(components.len(), fraction);
    if picks == 0 {
        return CellSet::new();
    }

    index::sample(rng, components.len(), picks)
        .into_iter()
        .flat_map(|i| components[i].iter().copied())
        .filter(|cell| !grid.is_perimeter(*cell))
        .collect()
}
