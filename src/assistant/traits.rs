//! # Advisor Traits
//!
//! The seam between the game and whatever answers the player's questions.

use crate::SarResult;

/// One question put to an advisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryRequest<'a> {
    /// The player's question, as typed
    pub question: &'a str,
    /// Description of the player's surroundings, free of coordinates
    pub situation: &'a str,
    /// Recent transcript lines, oldest first
    pub history: &'a [String],
}

/// Answers player questions with short advisory text.
///
/// Implementations must not panic on odd input. Failures are returned as
/// [`crate::SarError::Advisor`] and shown inline in the transcript.
pub trait Advisor: Send {
    /// Produces advice for one request.
    fn advise(&self, request: &AdvisoryRequest<'_>) -> SarResult<String>;

    /// Short name for logs and the HUD.
    fn name(&self) -> &str;
}
