//! # Display Management
//!
//! Screen layout and map drawing with macroquad.

use super::{
    priority_color, Camera, ScreenRect, Ui, BACKGROUND, FLOOR, HIGHLIGHTED_WALL, PLAYER,
    RESCUE_POINT, START_MARKER, WALL,
};
use crate::game::{GameSession, RenderFeed, SessionState};
use crate::input::InputHandler;
use macroquad::prelude::*;

/// Macroquad display manager for the game.
///
/// The map fills the left of the window, the HUD panel sits on the right and
/// the chat box runs along the bottom.
pub struct MacroquadDisplay {
    /// HUD panel width in pixels
    pub panel_width: f32,
    /// Chat box height in pixels
    pub chat_height: f32,
    pub ui: Ui,
}

impl Default for MacroquadDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl MacroquadDisplay {
    pub fn new() -> Self {
        Self {
            panel_width: 320.0,
            chat_height: 190.0,
            ui: Ui::new(),
        }
    }

    /// Map area for the current window size.
    pub fn map_area(&self) -> ScreenRect {
        ScreenRect {
            x: 0.0,
            y: 0.0,
            width: (screen_width() - self.panel_width).max(1.0),
            height: (screen_height() - self.chat_height).max(1.0),
        }
    }

    fn panel_area(&self) -> ScreenRect {
        ScreenRect {
            x: screen_width() - self.panel_width,
            y: 0.0,
            width: self.panel_width,
            height: screen_height() - self.chat_height,
        }
    }

    fn chat_area(&self) -> ScreenRect {
        ScreenRect {
            x: 0.0,
            y: screen_height() - self.chat_height,
            width: screen_width(),
            height: self.chat_height,
        }
    }

    /// Renders one frame for the session.
    pub fn render(&self, session: &GameSession, input: &InputHandler) {
        clear_background(BACKGROUND);

        if session.state() == SessionState::Start {
            self.ui.draw_start_screen(session);
            return;
        }

        if let Some(feed) = session.render_feed() {
            self.draw_map(&feed, session.camera());
        }
        self.ui.draw_hud(&session.hud(), self.panel_area());
        self.ui
            .draw_chat(session.transcript(), input, self.chat_area());

        match session.state() {
            SessionState::Paused => self.ui.draw_overlay("PAUSED", "Press P to resume"),
            SessionState::Complete => self.ui.draw_overlay(
                "MISSION COMPLETE",
                &format!(
                    "{} victims delivered. Press Enter for the menu.",
                    session.statistics().total_delivered()
                ),
            ),
            SessionState::TimeExpired => self.ui.draw_overlay(
                "TIME UP",
                &format!(
                    "{} victims left behind. Press Enter for the menu.",
                    session.victims().len() + session.carried().len()
                ),
            ),
            SessionState::Start | SessionState::Playing => {}
        }
    }

    /// Draws walls, rescue points, victims and the player.
    pub fn draw_map(&self, feed: &RenderFeed<'_>, camera: &Camera) {
        let viewport = camera.viewport(&feed.grid, feed.player, self.map_area());
        let size = viewport.cell_px;

        let (min, max) = (viewport.min, viewport.max);
        if let (Some((x0, y0)), Some((x1, y1))) = (viewport.to_screen(min), viewport.to_screen(max)) {
            draw_rectangle(x0, y0, x1 - x0 + size, y1 - y0 + size, FLOOR);
        }

        for (cell, highlighted) in feed.walls() {
            if let Some((x, y)) = viewport.to_screen(cell) {
                let color = if highlighted { HIGHLIGHTED_WALL } else { WALL };
                draw_rectangle(x, y, size, size, color);
            }
        }

        if let Some((x, y)) = viewport.to_screen(feed.start) {
            draw_rectangle_lines(x, y, size, size, 2.0, START_MARKER);
        }

        let inset = size * 0.1;
        for &cell in feed.rescue_points {
            if let Some((x, y)) = viewport.to_screen(cell) {
                draw_rectangle(x + inset, y + inset, size - 2.0 * inset, size - 2.0 * inset, RESCUE_POINT);
            }
        }

        for (cell, priority) in feed.victims() {
            if let Some((x, y)) = viewport.to_screen(cell) {
                draw_circle(x + size / 2.0, y + size / 2.0, size * 0.35, priority_color(priority));
            }
        }

        if let Some((x, y)) = viewport.to_screen(feed.player) {
            draw_rectangle(x + inset, y + inset, size - 2.0 * inset, size - 2.0 * inset, PLAYER);
            // Carried victims as pips along the top edge.
            let pip = (size / 6.0).max(2.0);
            for (i, priority) in feed.carried.iter().enumerate() {
                draw_rectangle(
                    x + inset + i as f32 * (pip + 1.0),
                    y + inset,
                    pip,
                    pip,
                    priority_color(*priority),
                );
            }
        }
    }
}
