//! # Configuration
//!
//! Game-wide constants, difficulty presets and the optional JSON config file.
//!
//! The config file is read into a [`serde_json::Value`] and each knob is
//! extracted on its own. A missing knob takes its default silently; a knob
//! with the wrong type or an out-of-range value takes its default with a
//! warning. Only an unreadable file or a document that is not a JSON object is
//! an error.

use crate::game::{Cell, Grid};
use crate::generation::{LevelParams, PlacementParams, VictimQuotas, WallParams};
use crate::{SarError, SarResult};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Default grid width in cells
pub const DEFAULT_GRID_WIDTH: u32 = 80;
/// Default grid height in cells
pub const DEFAULT_GRID_HEIGHT: u32 = 40;
/// Default pixel size of one cell
pub const DEFAULT_CELL_SIZE: f32 = 20.0;
/// Default spawn cell
pub const DEFAULT_START: Cell = Cell::new(1, 1);
/// Default seed for level generation
pub const DEFAULT_SEED: u64 = 42;
/// Default mission length in seconds
pub const DEFAULT_TIME_LIMIT: f64 = 180.0;
/// Default number of victims the player can carry at once
pub const DEFAULT_CARRY_CAPACITY: usize = 3;
/// Default number of rescue points
pub const DEFAULT_RESCUE_POINTS: usize = 3;
/// Interval between clock drains, in seconds
pub const CLOCK_INTERVAL_SECS: f64 = 1.0;
/// Interval between broadcast updates, in milliseconds
pub const BROADCAST_INTERVAL_MS: u64 = 100;
/// Zoom limits and step
pub const MIN_ZOOM: f32 = 0.25;
pub const MAX_ZOOM: f32 = 2.0;
pub const ZOOM_STEP: f32 = 0.10;
/// Lines kept in the chat scrollback
pub const CHAT_SCROLLBACK: usize = 200;
/// Situation summary scan radius in local view
pub const LOCAL_SCAN_RADIUS: i32 = 2;
/// Situation summary scan radius in global view
pub const GLOBAL_SCAN_RADIUS: i32 = 5;
/// Cells shown around the player in local view (width, height)
pub const LOCAL_VIEW_SPAN: (i32, i32) = (25, 15);

/// Difficulty preset selected on the start screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn all() -> [Difficulty; 3] {
        [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Lowercase key used in config files and on the command line.
    pub fn key(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Next preset, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }

    /// Previous preset, wrapping around.
    pub fn previous(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Hard,
            Difficulty::Medium => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Medium,
        }
    }

    /// Preset by 1-based number key.
    pub fn from_number(number: u32) -> Option<Self> {
        match number {
            1 => Some(Difficulty::Easy),
            2 => Some(Difficulty::Medium),
            3 => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = SarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "1" => Ok(Difficulty::Easy),
            "medium" | "2" => Ok(Difficulty::Medium),
            "hard" | "3" => Ok(Difficulty::Hard),
            other => Err(SarError::InvalidConfig(format!(
                "unknown difficulty '{}'",
                other
            ))),
        }
    }
}

/// Wall knobs and clock drain for one difficulty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    pub walls: WallParams,
    /// Seconds removed from the clock per clock tick
    pub time_drain: f64,
}

impl DifficultyProfile {
    /// Built-in preset.
    pub fn preset(difficulty: Difficulty) -> Self {
        let segment_count = match difficulty {
            Difficulty::Easy => 90,
            Difficulty::Medium => 120,
            Difficulty::Hard => 175,
        };
        Self {
            walls: WallParams::new(DEFAULT_SEED).with_segment_count(segment_count),
            time_drain: 1.0,
        }
    }
}

/// Complete game configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub grid_width: u32,
    pub grid_height: u32,
    pub cell_size: f32,
    pub start: Cell,
    pub time_limit: f64,
    pub carry_capacity: usize,
    pub rescue_point_count: usize,
    pub placement: PlacementParams,
    pub easy: DifficultyProfile,
    pub medium: DifficultyProfile,
    pub hard: DifficultyProfile,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: DEFAULT_GRID_WIDTH,
            grid_height: DEFAULT_GRID_HEIGHT,
            cell_size: DEFAULT_CELL_SIZE,
            start: DEFAULT_START,
            time_limit: DEFAULT_TIME_LIMIT,
            carry_capacity: DEFAULT_CARRY_CAPACITY,
            rescue_point_count: DEFAULT_RESCUE_POINTS,
            placement: PlacementParams::default(),
            easy: DifficultyProfile::preset(Difficulty::Easy),
            medium: DifficultyProfile::preset(Difficulty::Medium),
            hard: DifficultyProfile::preset(Difficulty::Hard),
        }
    }
}

impl GameConfig {
    /// Profile for a difficulty.
    pub fn profile(&self, difficulty: Difficulty) -> &DifficultyProfile {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }

    fn profile_mut(&mut self, difficulty: Difficulty) -> &mut DifficultyProfile {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Medium => &mut self.medium,
            Difficulty::Hard => &mut self.hard,
        }
    }

    /// Uses `seed` for every difficulty.
    pub fn with_seed(mut self, seed: u64) -> Self {
        for difficulty in Difficulty::all() {
            self.profile_mut(difficulty).walls.seed = seed;
        }
        self
    }

    /// The play area.
    pub fn grid(&self) -> Grid {
        Grid::new(self.grid_width, self.grid_height).with_cell_size(self.cell_size)
    }

    /// Generation parameters for one difficulty.
    ///
    /// # Examples
    ///
    /// ```
    /// use sar_mission::{Difficulty, GameConfig};
    ///
    /// let params = GameConfig::default().level_params(Difficulty::Hard);
    /// assert_eq!(params.walls.segment_count, 175);
    /// ```
    pub fn level_params(&self, difficulty: Difficulty) -> LevelParams {
        LevelParams {
            grid: self.grid(),
            start: self.start,
            walls: self.profile(difficulty).walls.clone(),
            placement: self.placement.clone(),
            rescue_point_count: self.rescue_point_count,
        }
    }

    /// Loads a JSON config file, falling back to defaults knob by knob.
    pub fn load(path: &Path) -> SarResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parses a JSON config document.
    pub fn from_json_str(text: &str) -> SarResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Extracts every knob from a JSON object.
    pub fn from_value(value: &Value) -> SarResult<Self> {
        let root = value.as_object().ok_or_else(|| {
            SarError::InvalidConfig("configuration must be a JSON object".to_string())
        })?;

        let defaults = Self::default();
        let mut config = defaults.clone();

        if let Some(grid) = section(root, "grid") {
            config.grid_width = read_u32(grid, "grid.width", "width", defaults.grid_width, 5, 1000);
            config.grid_height =
                read_u32(grid, "grid.height", "height", defaults.grid_height, 5, 1000);
            config.cell_size =
                read_f64(grid, "grid.cell_size", "cell_size", defaults.cell_size as f64, 2.0, 200.0)
                    as f32;
        }

        config.start = read_cell(root, "start", defaults.start);
        let interior_x = 1..(config.grid_width as i32 - 1);
        let interior_y = 1..(config.grid_height as i32 - 1);
        if !interior_x.contains(&config.start.x) || !interior_y.contains(&config.start.y) {
            warn!(
                "Config start: {} is not inside the grid interior, using {}",
                config.start, defaults.start
            );
            config.start = defaults.start;
        }

        config.time_limit =
            read_f64(root, "time_limit", "time_limit", defaults.time_limit, 1.0, 86_400.0);
        config.carry_capacity =
            read_u32(root, "carry_capacity", "carry_capacity", defaults.carry_capacity as u32, 1, 100)
                as usize;
        config.rescue_point_count = read_u32(
            root,
            "rescue_point_count",
            "rescue_point_count",
            defaults.rescue_point_count as u32,
            1,
            50,
        ) as usize;

        if let Some(quotas) = section(root, "quotas") {
            let base = defaults.placement.quotas;
            config.placement.quotas = VictimQuotas::new(
                read_u32(quotas, "quotas.high", "high", base.high as u32, 0, 10_000) as usize,
                read_u32(quotas, "quotas.medium", "medium", base.medium as u32, 0, 10_000) as usize,
                read_u32(quotas, "quotas.low", "low", base.low as u32, 0, 10_000) as usize,
            );
        }

        if let Some(placement) = section(root, "placement") {
            let base = &defaults.placement;
            config.placement.far_quantile = read_f64(
                placement,
                "placement.far_quantile",
                "far_quantile",
                base.far_quantile,
                0.0,
                1.0,
            );
            config.placement.separation = read_u32(
                placement,
                "placement.separation",
                "separation",
                base.separation,
                1,
                100,
            );
            config.placement.sectors =
                read_span(placement, "placement.sectors", "sectors", base.sectors, 1, 32, false);
            config.placement.allow_unreachable = read_bool(
                placement,
                "placement.allow_unreachable",
                "allow_unreachable",
                base.allow_unreachable,
            );
        }

        if let Some(difficulties) = section(root, "difficulties") {
            for difficulty in Difficulty::all() {
                if let Some(knobs) = section(difficulties, difficulty.key()) {
                    let base = defaults.profile(difficulty).clone();
                    *config.profile_mut(difficulty) = read_profile(knobs, difficulty, &base);
                }
            }
        }

        Ok(config)
    }
}

fn section<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    match object.get(key) {
        None => None,
        Some(Value::Object(map)) => Some(map),
        Some(other) => {
            warn!("Config {}: expected an object, found {}; ignoring it", key, other);
            None
        }
    }
}

fn read_profile(
    knobs: &Map<String, Value>,
    difficulty: Difficulty,
    base: &DifficultyProfile,
) -> DifficultyProfile {
    let path = |knob: &str| format!("difficulties.{}.{}", difficulty.key(), knob);
    let walls = &base.walls;

    DifficultyProfile {
        walls: WallParams {
            seed: read_u64(knobs, &path("seed"), "seed", walls.seed),
            segment_count: read_u32(
                knobs,
                &path("segment_count"),
                "segment_count",
                walls.segment_count,
                0,
                100_000,
            ),
            min_passable_ratio: read_f64(
                knobs,
                &path("min_passable_ratio"),
                "min_passable_ratio",
                walls.min_passable_ratio,
                0.0,
                1.0,
            ),
            cluster_growth_fraction: read_f64(
                knobs,
                &path("cluster_growth_fraction"),
                "cluster_growth_fraction",
                walls.cluster_growth_fraction,
                0.0,
                1.0,
            ),
            thicken_layers: read_span(
                knobs,
                &path("thicken_layers"),
                "thicken_layers",
                walls.thicken_layers,
                0,
                20,
                true,
            ),
            rim_growth_fraction: read_f64(
                knobs,
                &path("rim_growth_fraction"),
                "rim_growth_fraction",
                walls.rim_growth_fraction,
                0.0,
                1.0,
            ),
            clearance_radius: read_u32(
                knobs,
                &path("clearance_radius"),
                "clearance_radius",
                walls.clearance_radius,
                0,
                10,
            ),
            segment_length: read_span(
                knobs,
                &path("segment_length"),
                "segment_length",
                walls.segment_length,
                1,
                200,
                true,
            ),
            attempts_per_segment: read_u32(
                knobs,
                &path("attempts_per_segment"),
                "attempts_per_segment",
                walls.attempts_per_segment,
                1,
                1000,
            ),
            highlight_fraction: read_f64(
                knobs,
                &path("highlight_fraction"),
                "highlight_fraction",
                walls.highlight_fraction,
                0.0,
                1.0,
            ),
        },
        time_drain: read_f64(knobs, &path("time_drain"), "time_drain", base.time_drain, 0.0, 60.0),
    }
}

fn fallback<T: fmt::Display>(path: &str, found: &Value, default: T) -> T {
    warn!("Config {}: invalid value {}, using default {}", path, found, default);
    default
}

fn read_u64(object: &Map<String, Value>, path: &str, key: &str, default: u64) -> u64 {
    match object.get(key) {
        None => default,
        Some(value) => value.as_u64().unwrap_or_else(|| fallback(path, value, default)),
    }
}

fn read_u32(
    object: &Map<String, Value>,
    path: &str,
    key: &str,
    default: u32,
    min: u32,
    max: u32,
) -> u32 {
    match object.get(key) {
        None => default,
        Some(value) => match value.as_u64() {
            Some(n) if n >= u64::from(min) && n <= u64::from(max) => n as u32,
            _ => fallback(path, value, default),
        },
    }
}

fn read_f64(
    object: &Map<String, Value>,
    path: &str,
    key: &str,
    default: f64,
    min: f64,
    max: f64,
) -> f64 {
    match object.get(key) {
        None => default,
        Some(value) => match value.as_f64() {
            Some(n) if n.is_finite() && n >= min && n <= max => n,
            _ => fallback(path, value, default),
        },
    }
}

fn read_bool(object: &Map<String, Value>, path: &str, key: &str, default: bool) -> bool {
    match object.get(key) {
        None => default,
        Some(value) => value.as_bool().unwrap_or_else(|| fallback(path, value, default)),
    }
}

/// Reads a two-element array. When `ordered` is set the first element may
/// not exceed the second.
fn read_span(
    object: &Map<String, Value>,
    path: &str,
    key: &str,
    default: (u32, u32),
    min: u32,
    max: u32,
    ordered: bool,
) -> (u32, u32) {
    let Some(value) = object.get(key) else {
        return default;
    };

    let parsed = value.as_array().and_then(|items| match items.as_slice() {
        [a, b] => Some((a.as_u64()?, b.as_u64()?)),
        _ => None,
    });

    match parsed {
        Some((a, b))
            if (u64::from(min)..=u64::from(max)).contains(&a)
                && (u64::from(min)..=u64::from(max)).contains(&b)
                && (!ordered || a <= b) =>
        {
            (a as u32, b as u32)
        }
        _ => {
            warn!(
                "Config {}: invalid value {}, using default [{}, {}]",
                path, value, default.0, default.1
            );
            default
        }
    }
}

fn read_cell(object: &Map<String, Value>, key: &str, default: Cell) -> Cell {
    let Some(value) = object.get(key) else {
        return default;
    };

    let parsed = value.as_array().and_then(|items| match items.as_slice() {
        [x, y] => Some(Cell::new(
            i32::try_from(x.as_i64()?).ok()?,
            i32::try_from(y.as_i64()?).ok()?,
        )),
        _ => None,
    });

    parsed.unwrap_or_else(|| fallback(key, value, default))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_presets() {
        let config = GameConfig::default();
        assert_eq!(config.easy.walls.segment_count, 90);
        assert_eq!(config.medium.walls.segment_count, 120);
        assert_eq!(config.hard.walls.segment_count, 175);
        assert_eq!(config.profile(Difficulty::Hard).time_drain, 1.0);
        assert_eq!(config.placement.quotas.total(), 90);
        assert_eq!(config.start, Cell::new(1, 1));
    }

    #[test]
    fn test_difficulty_cycle() {
        assert_eq!(Difficulty::Easy.next(), Difficulty::Medium);
        assert_eq!(Difficulty::Hard.next(), Difficulty::Easy);
        assert_eq!(Difficulty::Easy.previous(), Difficulty::Hard);
        assert_eq!(Difficulty::from_number(3), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_number(4), None);
    }

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(" easy ".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert!("nightmare".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_with_seed_applies_everywhere() {
        let config = GameConfig::default().with_seed(7);
        for difficulty in Difficulty::all() {
            assert_eq!(config.profile(difficulty).walls.seed, 7);
        }
        assert_eq!(config.level_params(Difficulty::Easy).walls.seed, 7);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = GameConfig::from_json_str(
            r#"{
                "time_limit": 60,
                "quotas": { "high": 4 },
                "difficulties": { "hard": { "segment_count": 200, "time_drain": 2.0 } }
            }"#,
        )
        .unwrap();

        assert_eq!(config.time_limit, 60.0);
        assert_eq!(config.placement.quotas.high, 4);
        assert_eq!(config.placement.quotas.medium, 45);
        assert_eq!(config.hard.walls.segment_count, 200);
        assert_eq!(config.hard.time_drain, 2.0);
        assert_eq!(config.hard.walls.clearance_radius, 2);
        assert_eq!(config.easy, DifficultyProfile::preset(Difficulty::Easy));
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let config = GameConfig::from_json_str(
            r#"{
                "time_limit": "soon",
                "carry_capacity": 0,
                "start": [0, 0],
                "grid": { "width": -3 },
                "placement": { "far_quantile": 1.5, "sectors": [4] },
                "difficulties": { "easy": { "segment_length": [9, 2], "thicken_layers": "many" } }
            }"#,
        )
        .unwrap();

        let defaults = GameConfig::default();
        assert_eq!(config.time_limit, defaults.time_limit);
        assert_eq!(config.carry_capacity, defaults.carry_capacity);
        assert_eq!(config.start, defaults.start);
        assert_eq!(config.grid_width, defaults.grid_width);
        assert_eq!(config.placement.far_quantile, defaults.placement.far_quantile);
        assert_eq!(config.placement.sectors, defaults.placement.sectors);
        assert_eq!(config.easy.walls.segment_length, (3, 10));
        assert_eq!(config.easy.walls.thicken_layers, (1, 2));
    }

    #[test]
    fn test_non_object_is_rejected() {
        assert!(matches!(
            GameConfig::from_json_str("[1, 2, 3]"),
            Err(SarError::InvalidConfig(_))
        ));
        assert!(matches!(
            GameConfig::from_json_str("{ not json"),
            Err(SarError::Serde(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{ "rescue_point_count": 1, "carry_capacity": 1, "placement": {{ "allow_unreachable": true }} }}"#
        )
        .unwrap();

        let config = GameConfig::load(file.path()).unwrap();
        assert_eq!(config.rescue_point_count, 1);
        assert_eq!(config.carry_capacity, 1);
        assert!(config.placement.allow_unreachable);
    }

    #[test]
    fn test_load_missing_file() {
        let result = GameConfig::load(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(SarError::Io(_))));
    }
}
