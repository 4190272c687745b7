//! # Advisory Assistant
//!
//! Chat transcript, situation summaries and the pluggable advisors that
//! answer the player's questions.
//!
//! The session builds a [`SituationScanner`] summary, hands it to an
//! [`Advisor`] together with the question and recent history, and appends both
//! sides of the exchange to the [`ChatTranscript`]. Advisor failures are shown
//! inline as `Error: ...` lines.

pub mod heuristic;
pub mod prompt;
pub mod situation;
pub mod traits;

pub use heuristic::*;
pub use prompt::*;
pub use situation::*;
pub use traits::*;

use crate::config::CHAT_SCROLLBACK;
use crate::{SarError, SarResult};
use std::collections::VecDeque;

/// Bounded scrollback of chat and system lines.
///
/// # Examples
///
/// ```
/// use sar_mission::ChatTranscript;
///
/// let mut transcript = ChatTranscript::new(2);
/// transcript.system("one");
/// transcript.user("two");
/// transcript.assistant("three");
/// assert_eq!(transcript.len(), 2);
/// assert_eq!(transcript.last(), Some("[AI] three"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTranscript {
    lines: VecDeque<String>,
    max_lines: usize,
}

impl ChatTranscript {
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines: max_lines.max(1),
        }
    }

    /// Appends a raw line, dropping the oldest past the limit.
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push_back(line.into());
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }

    /// Appends a `[SYSTEM]` line.
    pub fn system(&mut self, message: &str) {
        self.push(format!("[SYSTEM] {}", message));
    }

    /// Appends a `[YOU]` line.
    pub fn user(&mut self, message: &str) {
        self.push(format!("[YOU] {}", message));
    }

    /// Appends one `[AI]` line per line of the answer.
    pub fn assistant(&mut self, message: &str) {
        for line in message.lines().filter(|line| !line.trim().is_empty()) {
            self.push(format!("[AI] {}", line.trim()));
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    /// All lines, oldest first.
    pub fn lines(&self) -> impl DoubleEndedIterator<Item = &str> + '_ {
        self.lines.iter().map(String::as_str)
    }

    /// The newest `count` lines, oldest first.
    pub fn recent(&self, count: usize) -> Vec<String> {
        let skip = self.lines.len().saturating_sub(count);
        self.lines.iter().skip(skip).cloned().collect()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl Default for ChatTranscript {
    fn default() -> Self {
        Self::new(CHAT_SCROLLBACK)
    }
}

/// Advisor used when assistance is switched off. Every request fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledAdvisor;

impl Advisor for DisabledAdvisor {
    fn advise(&self, _request: &AdvisoryRequest<'_>) -> SarResult<String> {
        Err(SarError::Advisor("the assistant is disabled".to_string()))
    }

    fn name(&self) -> &str {
        "disabled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_prefixes() {
        let mut transcript = ChatTranscript::default();
        transcript.system("Mission started.");
        transcript.user("where?");
        transcript.assistant("Go north.\n\nReason: open corridor.");

        let lines: Vec<&str> = transcript.lines().collect();
        assert_eq!(
            lines,
            vec![
                "[SYSTEM] Mission started.",
                "[YOU] where?",
                "[AI] Go north.",
                "[AI] Reason: open corridor.",
            ]
        );
    }

    #[test]
    fn test_transcript_scrollback_limit() {
        let mut transcript = ChatTranscript::default();
        for i in 0..250 {
            transcript.push(format!("line {}", i));
        }
        assert_eq!(transcript.len(), 200);
        assert_eq!(transcript.lines().next(), Some("line 50"));
        assert_eq!(transcript.last(), Some("line 249"));
    }

    #[test]
    fn test_recent_lines() {
        let mut transcript = ChatTranscript::new(10);
        for i in 0..5 {
            transcript.push(format!("{}", i));
        }
        assert_eq!(transcript.recent(2), vec!["3".to_string(), "4".to_string()]);
        assert_eq!(transcript.recent(99).len(), 5);
    }

    #[test]
    fn test_disabled_advisor_errors() {
        let result = DisabledAdvisor.advise(&AdvisoryRequest {
            question: "hello",
            situation: "",
            history: &[],
        });
        assert!(matches!(result, Err(SarError::Advisor(_))));
        assert_eq!(DisabledAdvisor.name(), "disabled");
    }
}
