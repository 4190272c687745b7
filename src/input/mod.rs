//! # Input Module
//!
//! Keyboard and mouse handling. Keys are mapped to [`InputEvent`]s depending on
//! the session state; while the chat box has focus, typed characters go into
//! the chat buffer instead.

pub mod commands;

pub use commands::*;

use crate::config::Difficulty;
use crate::game::{Direction, SessionState, ViewMode};
use macroquad::prelude::*;

/// Keys polled every frame outside of chat.
const POLLED_KEYS: [KeyCode; 25] = [
    KeyCode::Up,
    KeyCode::Down,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::W,
    KeyCode::A,
    KeyCode::S,
    KeyCode::D,
    KeyCode::Key1,
    KeyCode::Key2,
    KeyCode::Key3,
    KeyCode::L,
    KeyCode::G,
    KeyCode::V,
    KeyCode::P,
    KeyCode::Equal,
    KeyCode::KpAdd,
    KeyCode::Minus,
    KeyCode::KpSubtract,
    KeyCode::Enter,
    KeyCode::KpEnter,
    KeyCode::Escape,
    KeyCode::Q,
    KeyCode::Tab,
    KeyCode::Slash,
];

/// Longest question the chat box accepts.
const MAX_CHAT_INPUT: usize = 240;

/// Converts keyboard and mouse input into [`InputEvent`]s.
pub struct InputHandler {
    chat_focused: bool,
    chat_buffer: String,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Creates a new input handler.
    ///
    /// # Examples
    ///
    /// ```
    /// use sar_mission::InputHandler;
    ///
    /// let input_handler = InputHandler::new();
    /// assert!(!input_handler.chat_focused());
    /// ```
    pub fn new() -> Self {
        Self {
            chat_focused: false,
            chat_buffer: String::new(),
        }
    }

    pub fn chat_focused(&self) -> bool {
        self.chat_focused
    }

    /// Text typed into the chat box so far.
    pub fn chat_buffer(&self) -> &str {
        &self.chat_buffer
    }

    /// Collects this frame's events.
    pub fn poll(&mut self, state: SessionState) -> Vec<InputEvent> {
        if self.chat_focused {
            return self.poll_chat();
        }

        let mut events = Vec::new();
        for key in POLLED_KEYS {
            if !is_key_pressed(key) {
                continue;
            }
            if matches!(key, KeyCode::Tab | KeyCode::Slash) && state.in_mission() {
                self.focus_chat();
                return events;
            }
            if let Some(event) = map_key(key, state) {
                events.push(event);
            }
        }

        let (_, wheel) = mouse_wheel();
        if wheel > 0.0 {
            events.push(InputEvent::Zoom(1));
        } else if wheel < 0.0 {
            events.push(InputEvent::Zoom(-1));
        }
        events
    }

    fn focus_chat(&mut self) {
        self.chat_focused = true;
        // Swallow the character that opened the chat box.
        while get_char_pressed().is_some() {}
    }

    fn poll_chat(&mut self) -> Vec<InputEvent> {
        while let Some(c) = get_char_pressed() {
            if !c.is_control() && self.chat_buffer.chars().count() < MAX_CHAT_INPUT {
                self.chat_buffer.push(c);
            }
        }

        if is_key_pressed(KeyCode::Backspace) {
            self.chat_buffer.pop();
        }
        if is_key_pressed(KeyCode::Escape) {
            self.chat_focused = false;
            self.chat_buffer.clear();
        }
        if is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::KpEnter) {
            self.chat_focused = false;
            let text = std::mem::take(&mut self.chat_buffer);
            if !text.trim().is_empty() {
                return vec![InputEvent::SubmitChat(text)];
            }
        }
        Vec::new()
    }
}

/// Maps a pressed key to an event for the given session state.
pub fn map_key(key: KeyCode, state: SessionState) -> Option<InputEvent> {
    let zoom = match key {
        KeyCode::Equal | KeyCode::KpAdd => Some(InputEvent::Zoom(1)),
        KeyCode::Minus | KeyCode::KpSubtract => Some(InputEvent::Zoom(-1)),
        _ => None,
    };

    match state {
        SessionState::Start => zoom.or(match key {
            KeyCode::Key1 => Some(InputEvent::SelectDifficulty(Difficulty::Easy)),
            KeyCode::Key2 => Some(InputEvent::SelectDifficulty(Difficulty::Medium)),
            KeyCode::Key3 => Some(InputEvent::SelectDifficulty(Difficulty::Hard)),
            KeyCode::Up | KeyCode::Left | KeyCode::W | KeyCode::A => {
                Some(InputEvent::CycleDifficulty(false))
            }
            KeyCode::Down | KeyCode::Right | KeyCode::S | KeyCode::D => {
                Some(InputEvent::CycleDifficulty(true))
            }
            KeyCode::L => Some(InputEvent::SelectView(ViewMode::Local)),
            KeyCode::G => Some(InputEvent::SelectView(ViewMode::Global)),
            KeyCode::V => Some(InputEvent::ToggleView),
            KeyCode::Enter | KeyCode::KpEnter => Some(InputEvent::Confirm),
            KeyCode::Escape | KeyCode::Q => Some(InputEvent::Quit),
            _ => None,
        }),
        SessionState::Playing | SessionState::Paused => zoom.or(match key {
            KeyCode::Up | KeyCode::W => Some(InputEvent::Move(Direction::North)),
            KeyCode::Down | KeyCode::S => Some(InputEvent::Move(Direction::South)),
            KeyCode::Left | KeyCode::A => Some(InputEvent::Move(Direction::West)),
            KeyCode::Right | KeyCode::D => Some(InputEvent::Move(Direction::East)),
            KeyCode::V => Some(InputEvent::ToggleView),
            KeyCode::P => Some(InputEvent::TogglePause),
            KeyCode::Escape => Some(InputEvent::Back),
            _ => None,
        }),
        SessionState::Complete | SessionState::TimeExpired => match key {
            KeyCode::Enter | KeyCode::KpEnter => Some(InputEvent::Confirm),
            KeyCode::Escape => Some(InputEvent::Back),
            KeyCode::Q => Some(InputEvent::Quit),
            _ => zoom,
        },
    }
}
