//! # Situation Summaries
//!
//! Describes the player's surroundings in plain words for the advisor. The
//! text names directions, walls, boundaries and victim colors but never
//! coordinates or step counts.

use crate::config::{GLOBAL_SCAN_RADIUS, LOCAL_SCAN_RADIUS};
use crate::game::{Cell, Direction, Grid, PriorityClass, ViewMode};
use crate::utils::CellSet;
use pathfinding::prelude::bfs;
use std::collections::BTreeMap;

/// Walls in the 5x5 window above which the local view counts as cramped.
const CRAMPED_WALL_COUNT: usize = 8;

/// Borrowed view of the state a summary is built from.
#[derive(Debug, Clone, Copy)]
pub struct SituationScanner<'a> {
    pub grid: &'a Grid,
    pub walls: &'a CellSet,
    pub victims: &'a BTreeMap<Cell, PriorityClass>,
    pub rescue_points: &'a [Cell],
    pub player: Cell,
    pub carried: usize,
}

impl<'a> SituationScanner<'a> {
    /// Builds the summary for the given view mode.
    ///
    /// Clauses are joined with ", ". Each cardinal direction reports the
    /// first wall, victim or boundary within the scan radius, or an open
    /// path when there is none.
    pub fn describe(&self, view_mode: ViewMode) -> String {
        let radius = match view_mode {
            ViewMode::Local => LOCAL_SCAN_RADIUS,
            ViewMode::Global => GLOBAL_SCAN_RADIUS,
        };

        let mut clauses: Vec<String> = Direction::all()
            .iter()
            .map(|direction| self.scan_direction(*direction, radius))
            .collect();

        if view_mode == ViewMode::Local && self.walls_near_player() > CRAMPED_WALL_COUNT {
            clauses.push("the local view is cramped with many walls".to_string());
        }

        if self.carried > 0 {
            if let Some(direction) = self.first_step_toward(|cell| self.rescue_points.contains(cell)) {
                clauses.push(format!(
                    "carrying {} victim(s), the nearest rescue point lies {}",
                    self.carried,
                    direction.name()
                ));
            }
        }

        if let Some((priority, direction)) = self.most_urgent_lead() {
            clauses.push(format!(
                "the closest {} victim is reached by heading {}",
                priority.color_name(),
                direction.name()
            ));
        }

        if clauses.is_empty() {
            "no notable features nearby.".to_string()
        } else {
            clauses.join(", ")
        }
    }

    fn scan_direction(&self, direction: Direction, radius: i32) -> String {
        let delta = direction.to_delta();
        let name = direction.name();

        for step in 1..=radius {
            let cell = Cell::new(self.player.x + delta.x * step, self.player.y + delta.y * step);
            if !self.grid.contains(cell) {
                return format!("boundary to the {}", name);
            }
            if self.walls.contains(&cell) {
                return format!("walls to the {}", name);
            }
            if let Some(priority) = self.victims.get(&cell) {
                return format!("a {} victim to the {}", priority.color_name(), name);
            }
        }
        format!("open path to the {}", name)
    }

    /// Walls in the 5x5 window centered on the player.
    fn walls_near_player(&self) -> usize {
        self.grid
            .buffer([self.player], 2)
            .iter()
            .filter(|cell| self.walls.contains(*cell))
            .count()
    }

    /// Direction of the first move on a shortest route to a victim of the
    /// highest priority still on the ground.
    fn most_urgent_lead(&self) -> Option<(PriorityClass, Direction)> {
        PriorityClass::all().into_iter().find_map(|priority| {
            if !self.victims.values().any(|p| *p == priority) {
                return None;
            }
            self.first_step_toward(|cell| self.victims.get(cell) == Some(&priority))
                .map(|direction| (priority, direction))
        })
    }

    fn first_step_toward<F>(&self, is_goal: F) -> Option<Direction>
    where
        F: Fn(&Cell) -> bool,
    {
        let path = bfs(
            &self.player,
            |cell| {
                cell.cardinal_neighbors()
                    .into_iter()
                    .filter(|next| self.grid.contains(*next) && !self.walls.contains(next))
                    .collect::<Vec<_>>()
            },
            |cell| is_goal(cell),
        )?;

        let next = *path.get(1)?;
        Direction::from_delta(next - self.player)
    }
}
