//! # Camera
//!
//! View mode, zoom and the projection from cells to screen pixels. Pure math,
//! no drawing, so it can be tested without a window.

use crate::config::{LOCAL_VIEW_SPAN, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
use crate::game::{Cell, Grid, ViewMode};

/// Camera state owned by the session.
///
/// # Examples
///
/// ```
/// use sar_mission::{Camera, ViewMode};
///
/// let mut camera = Camera::new(ViewMode::Global);
/// camera.adjust_zoom(100);
/// assert_eq!(camera.zoom(), 2.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    view_mode: ViewMode,
    zoom: f32,
}

impl Camera {
    pub fn new(view_mode: ViewMode) -> Self {
        Self {
            view_mode,
            zoom: 1.0,
        }
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.view_mode = view_mode;
    }

    pub fn toggle_view_mode(&mut self) {
        self.view_mode = self.view_mode.toggled();
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Moves zoom by `steps` increments, clamped to the zoom limits.
    pub fn adjust_zoom(&mut self, steps: i32) -> f32 {
        let target = self.zoom + steps as f32 * ZOOM_STEP;
        // Round to two decimals so repeated steps do not drift.
        self.zoom = ((target * 100.0).round() / 100.0).clamp(MIN_ZOOM, MAX_ZOOM);
        self.zoom
    }

    /// Inclusive cell bounds currently in view.
    pub fn visible_bounds(&self, grid: &Grid, focus: Cell) -> (Cell, Cell) {
        let (base_w, base_h) = match self.view_mode {
            ViewMode::Global => (grid.width, grid.height),
            ViewMode::Local => LOCAL_VIEW_SPAN,
        };
        let width = ((base_w as f32 / self.zoom).round() as i32).clamp(1, grid.width);
        let height = ((base_h as f32 / self.zoom).round() as i32).clamp(1, grid.height);

        let min_x = (focus.x - width / 2).clamp(0, grid.width - width);
        let min_y = (focus.y - height / 2).clamp(0, grid.height - height);
        (
            Cell::new(min_x, min_y),
            Cell::new(min_x + width - 1, min_y + height - 1),
        )
    }

    /// Fits the visible cells into a screen rectangle.
    pub fn viewport(&self, grid: &Grid, focus: Cell, area: ScreenRect) -> Viewport {
        let (min, max) = self.visible_bounds(grid, focus);
        let columns = (max.x - min.x + 1) as f32;
        let rows = (max.y - min.y + 1) as f32;
        let cell_px = (area.width / columns).min(area.height / rows).max(1.0);

        Viewport {
            min,
            max,
            cell_px,
            origin_x: area.x + (area.width - cell_px * columns) / 2.0,
            origin_y: area.y + (area.height - cell_px * rows) / 2.0,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(ViewMode::Local)
    }
}

/// A screen-space rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// The cell window and its pixel placement for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub min: Cell,
    pub max: Cell,
    pub cell_px: f32,
    pub origin_x: f32,
    pub origin_y: f32,
}

impl Viewport {
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.min.x && cell.x <= self.max.x && cell.y >= self.min.y && cell.y <= self.max.y
    }

    /// Top-left pixel of `cell`, if it is in view.
    pub fn to_screen(&self, cell: Cell) -> Option<(f32, f32)> {
        if !self.contains(cell) {
            return None;
        }
        Some((
            self.origin_x + (cell.x - self.min.x) as f32 * self.cell_px,
            self.origin_y + (cell.y - self.min.y) as f32 * self.cell_px,
        ))
    }
}
