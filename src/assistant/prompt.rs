//! # Prompt Assembly
//!
//! Builds the text prompt handed to a language-model advisor.

use super::AdvisoryRequest;

const PREAMBLE: &str = "You are a search-and-rescue mission assistant in a grid-based game. \
The player moves across a grid to find victims (colored red, yellow and purple) while avoiding walls. \
Answer the player's question to help them make good moves, following these rules:";

const RULES: [&str; 7] = [
    "Never reveal exact tile coordinates or step counts.",
    "Describe nearby structure when it matters: walls, bottlenecks, open corridors, dead ends, safer channels.",
    "Prioritize victims: RED before YELLOW before PURPLE.",
    "Weigh risk against payoff and steer clear of enclosed pockets.",
    "Be specific without dictating moves, for example 'the edge of the open corridor toward the north side'.",
    "If the local view is described as cramped, suggest moving to a more open area.",
    "Answer in 1 to 3 lines, then one short line of reasoning.",
];

/// Assembles the full prompt for a request.
///
/// # Examples
///
/// ```
/// use sar_mission::assistant::{build_prompt, AdvisoryRequest};
///
/// let prompt = build_prompt(&AdvisoryRequest {
///     question: "Where next?",
///     situation: "walls to the north",
///     history: &[],
/// });
/// assert!(prompt.contains("Player's question: Where next?"));
/// ```
pub fn build_prompt(request: &AdvisoryRequest<'_>) -> String {
    let mut prompt = String::from(PREAMBLE);
    prompt.push_str("\n\nRULES:\n");
    for (i, rule) in RULES.iter().enumerate() {
        prompt.push_str(&format!("{}) {}\n", i + 1, rule));
    }
    prompt.push('\n');

    if !request.history.is_empty() {
        prompt.push_str("Previous conversation:\n");
        prompt.push_str(&request.history.join("\n"));
        prompt.push_str("\n\n");
    }

    prompt.push_str(&format!("Current situation: {}\n\n", request.situation));
    prompt.push_str(&format!("Player's question: {}\n\n", request.question));
    prompt.push_str(
        "If the question is vague or lacks context, give general advice based on the mission goals.",
    );
    prompt
}
