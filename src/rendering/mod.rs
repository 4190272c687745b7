//! # Rendering Module
//!
//! 2D drawing with macroquad: the map, the HUD panel, the chat box and the
//! start and end screens. [`Camera`] holds the macroquad-free projection math.

pub mod camera;
pub mod display;
pub mod ui;

pub use camera::*;
pub use display::*;
pub use ui::*;

use crate::game::PriorityClass;
use macroquad::color::Color;

pub const BACKGROUND: Color = Color::new(0.06, 0.06, 0.08, 1.0);
pub const FLOOR: Color = Color::new(0.16, 0.17, 0.20, 1.0);
pub const WALL: Color = Color::new(0.55, 0.55, 0.58, 1.0);
pub const HIGHLIGHTED_WALL: Color = Color::new(0.85, 0.55, 0.20, 1.0);
pub const RESCUE_POINT: Color = Color::new(0.15, 0.75, 0.35, 1.0);
pub const PLAYER: Color = Color::new(0.25, 0.60, 1.00, 1.0);
pub const START_MARKER: Color = Color::new(0.45, 0.45, 0.50, 1.0);
pub const PANEL: Color = Color::new(0.0, 0.0, 0.0, 0.85);
pub const TEXT: Color = Color::new(0.92, 0.92, 0.92, 1.0);
pub const DIM_TEXT: Color = Color::new(0.55, 0.55, 0.58, 1.0);
pub const ACCENT: Color = Color::new(0.53, 0.81, 0.92, 1.0);

/// Fill color for a victim marker.
pub fn priority_color(priority: PriorityClass) -> Color {
    match priority {
        PriorityClass::High => Color::new(0.90, 0.16, 0.22, 1.0),
        PriorityClass::Medium => Color::new(0.99, 0.85, 0.0, 1.0),
        PriorityClass::Low => Color::new(0.63, 0.35, 0.85, 1.0),
    }
}

/// Color for a transcript line, by its prefix.
pub fn transcript_color(line: &str) -> Color {
    if line.starts_with("[SYSTEM]") {
        ACCENT
    } else if line.starts_with("[YOU]") {
        TEXT
    } else if line.starts_with("[AI] Error:") {
        priority_color(PriorityClass::High)
    } else {
        Color::new(0.70, 0.90, 0.70, 1.0)
    }
}
