//! # Generation Module
//!
//! Procedural level generation: walls, victims and rescue points.
//!
//! The pipeline runs in a fixed order and shares one seeded random stream, so a
//! given seed and parameter set always produces the same level:
//!
//! 1. [`WallGenerator`] lays the perimeter, random segments and thickened clusters
//! 2. The passable set and a BFS distance map from the start cell are derived
//! 3. [`VictimPlanner`] places prioritized victims on reachable cells
//! 4. [`RescuePointSelector`] chooses the delivery targets
//!
//! Nothing in here returns an error. Constraints that cannot be satisfied are
//! relaxed and the shortfall is logged.

pub mod level;
pub mod rescue;
pub mod victims;
pub mod walls;

pub use level::*;
pub use rescue::*;
pub use victims::*;
pub use walls::*;

use crate::game::{Cell, Grid, PriorityClass};
use crate::SarResult;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Knobs for the wall generator.
///
/// One of these exists per difficulty preset; see [`crate::config`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallParams {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Number of random segments to attempt to place
    pub segment_count: u32,
    /// Fraction of the grid that must stay passable (0.0 to 1.0)
    pub min_passable_ratio: f64,
    /// Fraction of wall components picked for thickening
    pub cluster_growth_fraction: f64,
    /// Inclusive range of thickening layers per picked component
    pub thicken_layers: (u32, u32),
    /// Fraction of eligible rim cells added per thickening layer
    pub rim_growth_fraction: f64,
    /// Clearance buffer radius around placed walls
    pub clearance_radius: u32,
    /// Inclusive range of segment lengths
    pub segment_length: (u32, u32),
    /// Sampling attempts allowed per requested segment
    pub attempts_per_segment: u32,
    /// Fraction of wall components flagged for highlighted rendering
    pub highlight_fraction: f64,
}

impl WallParams {
    /// Creates the medium preset with the given seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use sar_mission::WallParams;
    ///
    /// let params = WallParams::new(7);
    /// assert_eq!(params.seed, 7);
    /// assert!(params.segment_length.0 <= params.segment_length.1);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            segment_count: 120,
            min_passable_ratio: 0.5,
            cluster_growth_fraction: 0.20,
            thicken_layers: (1, 2),
            rim_growth_fraction: 0.35,
            clearance_radius: 2,
            segment_length: (3, 10),
            attempts_per_segment: 30,
            highlight_fraction: 0.20,
        }
    }

    /// A lighter configuration for small test grids.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            segment_count: 12,
            segment_length: (2, 5),
            ..Self::new(seed)
        }
    }

    /// Same knobs with a different segment count.
    pub fn with_segment_count(mut self, segment_count: u32) -> Self {
        self.segment_count = segment_count;
        self
    }
}

impl Default for WallParams {
    fn default() -> Self {
        Self::new(42)
    }
}

/// How many victims of each priority class to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VictimQuotas {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl VictimQuotas {
    pub fn new(high: usize, medium: usize, low: usize) -> Self {
        Self { high, medium, low }
    }

    /// Sum over all classes.
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }

    /// Quota for one class.
    pub fn quota(&self, priority: PriorityClass) -> usize {
        match priority {
            PriorityClass::High => self.high,
            PriorityClass::Medium => self.medium,
            PriorityClass::Low => self.low,
        }
    }
}

impl Default for VictimQuotas {
    fn default() -> Self {
        Self::new(15, 45, 30)
    }
}

/// Knobs for victim placement and rescue point selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementParams {
    pub quotas: VictimQuotas,
    /// Distance quantile above which cells count as "far" for High victims
    pub far_quantile: f64,
    /// Initial minimum Chebyshev distance between High victims
    pub separation: u32,
    /// Separation is never relaxed below this during the sector passes
    pub min_separation: u32,
    /// Sector grid used to balance High victims across the map
    pub sectors: (u32, u32),
    /// Allow victims and rescue points on passable cells the start cannot reach
    pub allow_unreachable: bool,
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            quotas: VictimQuotas::default(),
            far_quantile: 0.70,
            separation: 6,
            min_separation: 2,
            sectors: (4, 3),
            allow_unreachable: false,
        }
    }
}

/// Everything needed to build one level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelParams {
    pub grid: Grid,
    pub start: Cell,
    pub walls: WallParams,
    pub placement: PlacementParams,
    pub rescue_point_count: usize,
}

impl LevelParams {
    /// A 30x20 level with small quotas, for tests.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            grid: Grid::new(30, 20),
            start: Cell::new(1, 1),
            walls: WallParams::for_testing(seed),
            placement: PlacementParams {
                quotas: VictimQuotas::new(4, 6, 5),
                separation: 4,
                ..PlacementParams::default()
            },
            rescue_point_count: 2,
        }
    }
}

impl Default for LevelParams {
    fn default() -> Self {
        Self {
            grid: Grid::default(),
            start: Cell::new(1, 1),
            walls: WallParams::default(),
            placement: PlacementParams::default(),
            rescue_point_count: 3,
        }
    }
}

/// Trait for procedural generators.
///
/// Generation itself is infallible; `validate` reports a broken invariant so
/// callers can log it.
pub trait Generator<T> {
    /// Generates content from the parameters and random stream.
    fn generate(&self, params: &LevelParams, rng: &mut StdRng) -> T;

    /// Checks that generated content meets its guarantees.
    fn validate(&self, content: &T, params: &LevelParams) -> SarResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;

    /// Creates a seeded random number generator from the wall seed.
    pub fn create_rng(params: &LevelParams) -> StdRng {
        StdRng::seed_from_u64(params.walls.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_params_defaults() {
        let params = WallParams::default();
        assert_eq!(params.seed, 42);
        assert_eq!(params.segment_count, 120);
        assert_eq!(params.clearance_radius, 2);
        assert!((params.min_passable_ratio - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_quotas() {
        let quotas = VictimQuotas::default();
        assert_eq!(quotas.total(), 90);
        assert_eq!(quotas.quota(PriorityClass::High), 15);
        assert_eq!(quotas.quota(PriorityClass::Medium), 45);
        assert_eq!(quotas.quota(PriorityClass::Low), 30);
    }

    #[test]
    fn test_level_params_default_scenario() {
        let params = LevelParams::default();
        assert_eq!(params.grid.width, 80);
        assert_eq!(params.grid.height, 40);
        assert_eq!(params.start, Cell::new(1, 1));
        assert_eq!(params.rescue_point_count, 3);
        assert!(!params.placement.allow_unreachable);
    }

    #[test]
    fn test_create_rng_is_seeded() {
        use rand::Rng;

        let params = LevelParams::for_testing(9);
        let a: u64 = utils::create_rng(&params).gen();
        let b: u64 = utils::create_rng(&params).gen();
        assert_eq!(a, b);
    }
}
