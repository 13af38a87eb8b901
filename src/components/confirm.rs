//! Interactive confirmation before destructive actions.

#[cfg(test)]
#[path = "confirm_test.rs"]
mod confirm_test;

use std::io::{BufRead, Write};

/// Asks the user a yes/no question.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> bool;
}

/// Always answers yes (`--yes`).
#[derive(Clone, Copy, Debug, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, question: &str) -> bool {
        tracing::debug!(question, "confirmation assumed");
        true
    }
}

/// Prompts on stderr and reads one answer line from `input`.
/// End of input counts as "no".
pub struct LineConfirm<R> {
    input: R,
}

impl<R: BufRead> LineConfirm<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> Confirm for LineConfirm<R> {
    fn confirm(&mut self, question: &str) -> bool {
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "{question} [y/N] ");
        let _ = stderr.flush();
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(0) | Err(_) => false,
            Ok(_) => is_yes(&answer),
        }
    }
}

#[must_use]
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "s" | "si" | "sí")
}
