//! # Scene Management System
//!
//! The frame loop that ties input, the session clock, the session and the
//! display together, plus a headless command runner for scripted sessions.

use crate::config::CLOCK_INTERVAL_SECS;
use crate::game::{GameSession, SessionState};
use crate::input::{InputEvent, InputHandler};
use crate::net::BroadcastHandle;
use crate::rendering::MacroquadDisplay;
use crate::{SarError, SarResult};
use log::info;
use macroquad::prelude::*;

/// Turns variable frame times into whole clock ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissionClock {
    interval: f64,
    accumulated: f64,
}

impl MissionClock {
    pub fn new(interval: f64) -> Self {
        Self {
            interval: if interval > 0.0 { interval } else { 1.0 },
            accumulated: 0.0,
        }
    }

    /// Adds elapsed time and returns how many ticks are due.
    pub fn advance(&mut self, elapsed: f64) -> u32 {
        if elapsed.is_finite() && elapsed > 0.0 {
            self.accumulated += elapsed;
        }
        let mut ticks = 0;
        while self.accumulated >= self.interval {
            self.accumulated -= self.interval;
            ticks += 1;
        }
        ticks
    }

    /// Drops partial progress, used while the clock is not running.
    pub fn reset(&mut self) {
        self.accumulated = 0.0;
    }
}

impl Default for MissionClock {
    fn default() -> Self {
        Self::new(CLOCK_INTERVAL_SECS)
    }
}

/// The main scene manager that coordinates all game scenes
pub struct SceneManager {
    session: GameSession,
    display: MacroquadDisplay,
    input_handler: InputHandler,
    clock: MissionClock,
    /// Kept alive for the lifetime of the window
    _broadcast: Option<BroadcastHandle>,
}

impl SceneManager {
    pub fn new(session: GameSession, broadcast: Option<BroadcastHandle>) -> Self {
        Self {
            session,
            display: MacroquadDisplay::new(),
            input_handler: InputHandler::new(),
            clock: MissionClock::default(),
            _broadcast: broadcast,
        }
    }

    /// Runs the main scene loop until the player quits.
    pub async fn run(&mut self) -> SarResult<()> {
        loop {
            if self.update_frame() {
                break;
            }
            self.display.render(&self.session, &self.input_handler);
            next_frame().await;
        }
        info!("Scene loop ended");
        Ok(())
    }

    /// One frame of input, clock and session updates. Returns true when the
    /// player asked to quit.
    fn update_frame(&mut self) -> bool {
        for event in self.input_handler.poll(self.session.state()) {
            if event == InputEvent::Quit {
                return true;
            }
            self.session.handle_input(event);
        }

        if self.session.state() == SessionState::Playing {
            for _ in 0..self.clock.advance(get_frame_time() as f64) {
                self.session.clock_tick();
            }
        } else {
            self.clock.reset();
        }

        self.session.tick();
        false
    }
}

/// Applies a newline-separated command script to a session.
///
/// Each line is either a command understood by [`InputEvent::parse`] or
/// `wait <seconds>`, which runs the mission clock. Blank lines and lines
/// starting with `#` are skipped. The session ticks after every command.
/// Returns the number of commands applied.
///
/// # Examples
///
/// ```
/// use sar_mission::scenes::run_script;
/// use sar_mission::{GameConfig, GameSession, SessionState};
///
/// let mut session = GameSession::new(GameConfig::default().with_seed(3));
/// run_script(&mut session, "difficulty easy\nstart\nwait 5").unwrap();
/// assert_eq!(session.state(), SessionState::Playing);
/// assert_eq!(session.time_remaining(), 175.0);
/// ```
pub fn run_script(session: &mut GameSession, script: &str) -> SarResult<usize> {
    let mut applied = 0;
    for (number, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(seconds) = line.strip_prefix("wait ") {
            let seconds: u32 = seconds.trim().parse().map_err(|_| {
                SarError::InvalidState(format!("line {}: bad wait '{}'", number + 1, line))
            })?;
            for _ in 0..seconds {
                session.clock_tick();
            }
        } else {
            let event = InputEvent::parse(line).ok_or_else(|| {
                SarError::InvalidState(format!(
                    "line {}: unrecognized command '{}'",
                    number + 1,
                    line
                ))
            })?;
            if event == InputEvent::Quit {
                break;
            }
            session.handle_input(event);
        }
        session.tick();
        applied += 1;
    }
    Ok(applied)
}
