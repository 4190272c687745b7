//! # Input Events
//!
//! Window-independent player intents. The keyboard handler produces them and
//! the session consumes them, so scripted runs and tests can drive a session
//! without a window.

use crate::config::Difficulty;
use crate::game::{Direction, ViewMode};

/// A single player intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Step one cell
    Move(Direction),
    /// Switch between local and global view
    ToggleView,
    /// Pick a view mode directly (start screen)
    SelectView(ViewMode),
    /// Zoom in (positive) or out (negative) by whole steps
    Zoom(i32),
    /// Start the mission, or leave a finished one
    Confirm,
    SelectDifficulty(Difficulty),
    /// Move the difficulty selection forward (`true`) or back
    CycleDifficulty(bool),
    TogglePause,
    /// Leave the current mission for the start screen
    Back,
    /// Send a question to the advisor
    SubmitChat(String),
    Quit,
}

impl InputEvent {
    /// Whether the event only makes sense during play.
    pub fn is_gameplay(&self) -> bool {
        matches!(self, InputEvent::Move(_) | InputEvent::TogglePause)
    }

    /// Parses a scripted command such as `move north`, `zoom -2` or
    /// `ask where next?`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sar_mission::{Direction, InputEvent};
    ///
    /// assert_eq!(InputEvent::parse("move east"), Some(InputEvent::Move(Direction::East)));
    /// assert_eq!(InputEvent::parse("zoom -2"), Some(InputEvent::Zoom(-2)));
    /// assert_eq!(InputEvent::parse("fly"), None);
    /// ```
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let event = match word.to_lowercase().as_str() {
            "move" | "go" => InputEvent::Move(parse_direction(rest)?),
            "n" | "north" => InputEvent::Move(Direction::North),
            "s" | "south" => InputEvent::Move(Direction::South),
            "e" | "east" => InputEvent::Move(Direction::East),
            "w" | "west" => InputEvent::Move(Direction::West),
            "view" => match rest.to_lowercase().as_str() {
                "" => InputEvent::ToggleView,
                "local" => InputEvent::SelectView(ViewMode::Local),
                "global" => InputEvent::SelectView(ViewMode::Global),
                _ => return None,
            },
            "zoom" => InputEvent::Zoom(rest.parse().ok()?),
            "start" | "confirm" => InputEvent::Confirm,
            "difficulty" => InputEvent::SelectDifficulty(rest.parse().ok()?),
            "pause" => InputEvent::TogglePause,
            "back" | "menu" => InputEvent::Back,
            "ask" if !rest.is_empty() => InputEvent::SubmitChat(rest.to_string()),
            "quit" | "exit" => InputEvent::Quit,
            _ => return None,
        };
        Some(event)
    }
}

fn parse_direction(word: &str) -> Option<Direction> {
    Direction::all()
        .into_iter()
        .find(|direction| direction.name() == word.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(InputEvent::parse("go north"), Some(InputEvent::Move(Direction::North)));
        assert_eq!(InputEvent::parse("W"), Some(InputEvent::Move(Direction::West)));
        assert_eq!(InputEvent::parse("view"), Some(InputEvent::ToggleView));
        assert_eq!(
            InputEvent::parse("view global"),
            Some(InputEvent::SelectView(ViewMode::Global))
        );
        assert_eq!(
            InputEvent::parse("difficulty hard"),
            Some(InputEvent::SelectDifficulty(Difficulty::Hard))
        );
        assert_eq!(
            InputEvent::parse("ask  where is red?"),
            Some(InputEvent::SubmitChat("where is red?".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(InputEvent::parse(""), None);
        assert_eq!(InputEvent::parse("move up"), None);
        assert_eq!(InputEvent::parse("zoom lots"), None);
        assert_eq!(InputEvent::parse("ask"), None);
    }

    #[test]
    fn test_gameplay_events() {
        assert!(InputEvent::Move(Direction::South).is_gameplay());
        assert!(!InputEvent::Confirm.is_gameplay());
    }
}
