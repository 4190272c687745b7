//! # Offline Advisors
//!
//! Advisors that work without a network connection: a rules-based one that
//! reads the situation summary, and one that pipes the assembled prompt to a
//! local command (for example a locally hosted language model).

use super::{build_prompt, Advisor, AdvisoryRequest};
use crate::{SarError, SarResult};
use log::debug;
use std::io::Write;
use std::process::{Command, Stdio};

/// Answers from the situation summary alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicAdvisor;

impl HeuristicAdvisor {
    pub fn new() -> Self {
        Self
    }
}

/// Facts pulled back out of a situation summary.
#[derive(Debug, Default)]
struct Reading<'a> {
    lead: Option<(&'a str, &'a str)>,
    rescue_direction: Option<&'a str>,
    open: Vec<&'a str>,
    victims_adjacent: Vec<&'a str>,
    cramped: bool,
}

fn read_situation(situation: &str) -> Reading<'_> {
    let mut reading = Reading::default();
    for clause in situation.split(", ").map(str::trim) {
        if let Some(rest) = clause.strip_prefix("the closest ") {
            // "<color> victim is reached by heading <direction>"
            let words: Vec<&str> = rest.split_whitespace().collect();
            if let (Some(color), Some(direction)) = (words.first(), words.last()) {
                reading.lead = Some((*color, *direction));
            }
        } else if clause.starts_with("carrying ") {
            continue;
        } else if let Some(direction) = clause.strip_prefix("the nearest rescue point lies ") {
            reading.rescue_direction = Some(direction);
        } else if let Some(direction) = clause.strip_prefix("open path to the ") {
            reading.open.push(direction);
        } else if clause.starts_with("a ") && clause.contains(" victim to the ") {
            reading.victims_adjacent.push(clause);
        } else if clause.contains("cramped") {
            reading.cramped = true;
        }
    }
    reading
}

impl Advisor for HeuristicAdvisor {
    fn advise(&self, request: &AdvisoryRequest<'_>) -> SarResult<String> {
        let reading = read_situation(request.situation);
        let question = request.question.to_lowercase();
        let asks_about_delivery = ["rescue", "drop", "deliver", "carry"]
            .iter()
            .any(|word| question.contains(word));

        let mut lines = Vec::new();

        if let Some(direction) = reading.rescue_direction {
            let line = format!("Bring the victims you carry to the rescue point to the {}.", direction);
            if asks_about_delivery {
                lines.insert(0, line);
            } else {
                lines.push(line);
            }
        }

        if let Some(clause) = reading.victims_adjacent.first() {
            lines.push(format!("There is {} close by; pick it up first.", clause));
        } else if let Some((color, direction)) = reading.lead {
            lines.push(format!(
                "Head {} toward the closest {} victim.",
                direction, color
            ));
        }

        if reading.cramped {
            lines.push("This spot is tight; step out toward a more open corridor before pushing on.".to_string());
        } else if lines.is_empty() {
            match reading.open.first() {
                Some(direction) => lines.push(format!(
                    "Follow the open path to the {} and sweep the far side of the map.",
                    direction
                )),
                None => lines.push("Back out of this pocket and look for an open corridor.".to_string()),
            }
        }

        lines.truncate(3);
        lines.push("Reason: red victims come first, then yellow, then purple.".to_string());
        Ok(lines.join("\n"))
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

/// Pipes the assembled prompt to an external command and returns its output.
///
/// The command runs to completion on the calling thread, so the game window
/// stops updating until it answers. Point it at something quick, or at a
/// wrapper that applies its own timeout.
#[derive(Debug, Clone)]
pub struct CommandAdvisor {
    program: String,
    args: Vec<String>,
}

impl CommandAdvisor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Splits a command line on whitespace; `None` when it is blank.
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }
}

impl Advisor for CommandAdvisor {
    fn advise(&self, request: &AdvisoryRequest<'_>) -> SarResult<String> {
        let prompt = build_prompt(request);
        debug!("Sending {} byte prompt to {}", prompt.len(), self.program);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SarError::Advisor(format!("could not start {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(prompt.as_bytes()) {
                drop(stdin);
                // The child may have exited already; reap it either way.
                let _ = child.kill();
                let _ = child.wait();
                return Err(SarError::Advisor(format!(
                    "could not send the prompt to {}: {}",
                    self.program, e
                )));
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SarError::Advisor(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            Ok("No response text returned.".to_string())
        } else {
            Ok(text)
        }
    }

    fn name(&self) -> &str {
        &self.program
    }
}
