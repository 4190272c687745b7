//! # Snapshots
//!
//! Read-only views of a running session:
//!
//! - [`Snapshot`] is an owned, serializable copy sent to tick observers and
//!   remote viewers. A full snapshot carries the static layout; an update
//!   carries only the player, victims and clock.
//! - [`RenderFeed`] borrows the session state for one frame of drawing.

use crate::game::{Cell, Grid, PriorityClass};
use crate::generation::Level;
use crate::utils::CellSet;
use crate::SarResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether a snapshot carries the static layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotKind {
    /// Full state, sent on level build and to newly connected viewers
    Snapshot,
    /// Player, victims and clock only
    Update,
}

/// Grid dimensions for viewers that need to size their canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridInfo {
    pub width: i32,
    pub height: i32,
    pub cell_size: f32,
}

/// Owned copy of the session state.
///
/// Serializes as
/// `{"type", "player": [x, y], "victims": {"x,y": class}, "timeRemaining", "grid"?, "walls"?, "rescuePoints"?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(rename = "type")]
    pub kind: SnapshotKind,
    pub player: [i32; 2],
    pub victims: BTreeMap<String, PriorityClass>,
    pub time_remaining: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walls: Option<Vec<[i32; 2]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rescue_points: Option<Vec<[i32; 2]>>,
}

impl Snapshot {
    /// Full snapshot including walls, rescue points and grid size.
    pub fn full(
        level: &Level,
        player: Cell,
        victims: &BTreeMap<Cell, PriorityClass>,
        time_remaining: f64,
    ) -> Self {
        Self {
            kind: SnapshotKind::Snapshot,
            grid: Some(GridInfo {
                width: level.grid.width,
                height: level.grid.height,
                cell_size: level.grid.cell_size,
            }),
            walls: Some(level.walls.iter().map(|cell| cell.pair()).collect()),
            rescue_points: Some(level.rescue_points.iter().map(|cell| cell.pair()).collect()),
            ..Self::update(player, victims, time_remaining)
        }
    }

    /// Lightweight update.
    pub fn update(
        player: Cell,
        victims: &BTreeMap<Cell, PriorityClass>,
        time_remaining: f64,
    ) -> Self {
        Self {
            kind: SnapshotKind::Update,
            player: player.pair(),
            victims: victims
                .iter()
                .map(|(cell, priority)| (cell.key(), *priority))
                .collect(),
            time_remaining,
            grid: None,
            walls: None,
            rescue_points: None,
        }
    }

    pub fn is_full(&self) -> bool {
        self.kind == SnapshotKind::Snapshot
    }

    /// Serializes to a single line of JSON (no trailing newline).
    pub fn to_json(&self) -> SarResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderFeed<'a> {
    pub grid: Grid,
    pub start: Cell,
    pub player: Cell,
    pub walls: &'a CellSet,
    pub highlighted: &'a CellSet,
    pub victims: &'a BTreeMap<Cell, PriorityClass>,
    pub rescue_points: &'a [Cell],
    pub carried: &'a [PriorityClass],
    pub time_remaining: f64,
}

impl<'a> RenderFeed<'a> {
    /// Walls paired with their highlight flag.
    pub fn walls(&self) -> impl Iterator<Item = (Cell, bool)> + 'a {
        let highlighted = self.highlighted;
        self.walls
            .iter()
            .map(move |cell| (*cell, highlighted.contains(cell)))
    }

    /// Ground victims with their class.
    pub fn victims(&self) -> impl Iterator<Item = (Cell, PriorityClass)> + 'a {
        self.victims.iter().map(|(cell, priority)| (*cell, *priority))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{LevelGenerator, LevelParams};

    fn sample_victims() -> BTreeMap<Cell, PriorityClass> {
        let mut victims = BTreeMap::new();
        victims.insert(Cell::new(3, 4), PriorityClass::High);
        victims.insert(Cell::new(10, 2), PriorityClass::Low);
        victims
    }

    #[test]
    fn test_update_json_shape() {
        let snapshot = Snapshot::update(Cell::new(1, 2), &sample_victims(), 42.5);
        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();

        assert_eq!(value["type"], "update");
        assert_eq!(value["player"], serde_json::json!([1, 2]));
        assert_eq!(value["victims"]["3,4"], "high");
        assert_eq!(value["victims"]["10,2"], "low");
        assert_eq!(value["timeRemaining"], 42.5);
        assert!(value.get("walls").is_none());
        assert!(value.get("rescuePoints").is_none());
    }

    #[test]
    fn test_full_snapshot_has_layout() {
        let level = LevelGenerator::new().build(&LevelParams::for_testing(2));
        let snapshot = Snapshot::full(&level, level.start, &level.victims, 180.0);
        assert!(snapshot.is_full());

        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "snapshot");
        assert_eq!(
            value["walls"].as_array().map(|walls| walls.len()),
            Some(level.walls.len())
        );
        assert_eq!(
            value["rescuePoints"].as_array().map(|points| points.len()),
            Some(level.rescue_points.len())
        );
        assert_eq!(value["grid"]["width"], 30);
    }

    #[test]
    fn test_snapshot_round_trips_through_json() {
        let snapshot = Snapshot::update(Cell::new(5, 5), &sample_victims(), 1.0);
        let parsed: Snapshot = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_render_feed_flags_highlighted_walls() {
        let walls: CellSet = [Cell::new(0, 0), Cell::new(4, 4)].into_iter().collect();
        let highlighted: CellSet = [Cell::new(4, 4)].into_iter().collect();
        let victims = sample_victims();
        let feed = RenderFeed {
            grid: Grid::new(12, 8),
            start: Cell::new(1, 1),
            player: Cell::new(1, 1),
            walls: &walls,
            highlighted: &highlighted,
            victims: &victims,
            rescue_points: &[],
            carried: &[],
            time_remaining: 10.0,
        };

        let flags: Vec<(Cell, bool)> = feed.walls().collect();
        assert_eq!(flags, vec![(Cell::new(0, 0), false), (Cell::new(4, 4), true)]);
        assert_eq!(feed.victims().count(), 2);
    }
}
