//! # User Interface Elements
//!
//! HUD panel, chat box, start screen and end-of-mission overlays.

use super::{transcript_color, ScreenRect, ACCENT, DIM_TEXT, PANEL, TEXT};
use crate::assistant::ChatTranscript;
use crate::config::Difficulty;
use crate::game::{GameSession, HudText, ViewMode};
use crate::input::InputHandler;
use macroquad::prelude::*;

const CONTROLS: [&str; 6] = [
    "WASD/Arrows: Move",
    "V: Toggle view",
    "+/- or wheel: Zoom",
    "P: Pause",
    "Tab or /: Ask the assistant",
    "Esc: Back to menu",
];

/// Text layout settings shared by the UI pieces.
pub struct Ui {
    pub font_size: f32,
    pub line_height: f32,
}

impl Default for Ui {
    fn default() -> Self {
        Self::new()
    }
}

impl Ui {
    pub fn new() -> Self {
        Self {
            font_size: 18.0,
            line_height: 20.0,
        }
    }

    /// Draws the HUD lines and the control reference in the side panel.
    pub fn draw_hud(&self, hud: &HudText, area: ScreenRect) {
        draw_rectangle(area.x, area.y, area.width, area.height, PANEL);

        let x = area.x + 12.0;
        let mut y = area.y + 28.0;
        draw_text("SEARCH AND RESCUE", x, y, 24.0, ACCENT);
        y += self.line_height * 1.5;

        for (i, line) in hud.lines().iter().enumerate() {
            let color = if i == 0 { ACCENT } else { TEXT };
            draw_text(line, x, y, self.font_size, color);
            y += self.line_height;
        }

        y += self.line_height;
        draw_text("Controls:", x, y, self.font_size, ACCENT);
        y += self.line_height;
        for control in CONTROLS {
            draw_text(control, x, y, 16.0, DIM_TEXT);
            y += self.line_height;
        }
    }

    /// Draws the transcript tail and the input line.
    pub fn draw_chat(&self, transcript: &ChatTranscript, input: &InputHandler, area: ScreenRect) {
        draw_rectangle(area.x, area.y, area.width, area.height, PANEL);
        draw_line(area.x, area.y, area.x + area.width, area.y, 1.0, DIM_TEXT);

        let char_width = self.font_size * 0.5;
        let max_chars = ((area.width - 24.0) / char_width).max(10.0) as usize;
        let visible_rows = ((area.height - self.line_height * 2.0) / self.line_height).max(1.0) as usize;

        let mut rows: Vec<(String, Color)> = Vec::new();
        for line in transcript.lines().rev() {
            let color = transcript_color(line);
            for wrapped in wrap_line(line, max_chars).into_iter().rev() {
                rows.push((wrapped, color));
            }
            if rows.len() >= visible_rows {
                break;
            }
        }
        rows.truncate(visible_rows);

        let x = area.x + 12.0;
        let mut y = area.y + self.line_height;
        for (row, color) in rows.iter().rev() {
            draw_text(row, x, y, 16.0, *color);
            y += self.line_height;
        }

        let prompt_y = area.y + area.height - 10.0;
        if input.chat_focused() {
            let cursor = if (get_time() * 2.0) as i64 % 2 == 0 { "_" } else { " " };
            draw_text(
                &format!("> {}{}", input.chat_buffer(), cursor),
                x,
                prompt_y,
                self.font_size,
                TEXT,
            );
        } else {
            draw_text("Press Tab to ask the assistant", x, prompt_y, 16.0, DIM_TEXT);
        }
    }

    /// Difficulty and view selection.
    pub fn draw_start_screen(&self, session: &GameSession) {
        let center_x = screen_width() / 2.0;
        let mut y = screen_height() * 0.25;

        self.draw_centered("SEARCH AND RESCUE MISSION", center_x, y, 40.0, ACCENT);
        y += 60.0;
        self.draw_centered("Select difficulty", center_x, y, 24.0, TEXT);
        y += 40.0;

        for (i, difficulty) in Difficulty::all().into_iter().enumerate() {
            let selected = difficulty == session.difficulty();
            let label = format!(
                "{} {}. {}",
                if selected { ">" } else { " " },
                i + 1,
                difficulty
            );
            let color = if selected { ACCENT } else { DIM_TEXT };
            self.draw_centered(&label, center_x, y, 26.0, color);
            y += 34.0;
        }

        y += 20.0;
        let view = match session.view_mode() {
            ViewMode::Local => "View: [Local]  Global",
            ViewMode::Global => "View:  Local  [Global]",
        };
        self.draw_centered(view, center_x, y, 22.0, TEXT);
        y += 50.0;
        self.draw_centered(
            "1-3 or arrows: difficulty   L/G: view   Enter: start   Esc: quit",
            center_x,
            y,
            18.0,
            DIM_TEXT,
        );
    }

    /// Dims the screen and shows a title with a subtitle.
    pub fn draw_overlay(&self, title: &str, subtitle: &str) {
        draw_rectangle(0.0, 0.0, screen_width(), screen_height(), Color::new(0.0, 0.0, 0.0, 0.6));
        let center_x = screen_width() / 2.0;
        let center_y = screen_height() / 2.0;
        self.draw_centered(title, center_x, center_y, 48.0, ACCENT);
        self.draw_centered(subtitle, center_x, center_y + 40.0, 22.0, TEXT);
    }

    fn draw_centered(&self, text: &str, center_x: f32, y: f32, size: f32, color: Color) {
        let dims = measure_text(text, None, size as u16, 1.0);
        draw_text(text, center_x - dims.width / 2.0, y, size, color);
    }
}

/// Splits a line on word boundaries into rows of at most `max_chars`.
/// Words longer than a row are broken.
pub fn wrap_line(line: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut rows = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                rows.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            rows.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current.is_empty() {
            word.len()
        } else {
            current.chars().count() + 1 + word.len()
        };
        if needed > max_chars && !current.is_empty() {
            rows.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }

    if !current.is_empty() || rows.is_empty() {
        rows.push(current);
    }
    rows
}
