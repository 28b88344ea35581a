//! Guess Evaluation
//!
//! Strict comparison of free-text guesses against the canonical answer.
//! Both sides are reduced to lower-case ASCII alphanumerics; there is no
//! partial credit and no fuzzy matching.

use serde::{Deserialize, Serialize};

/// Reduce text to its comparison form.
///
/// Lower-cases and drops every character that is not an ASCII letter or
/// digit. Whitespace, punctuation and non-ASCII symbols never survive.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Result of comparing one guess with the answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessEvaluation {
    /// Normalized guess text.
    pub normalized_guess: String,
    /// Normalized answer text.
    pub normalized_answer: String,
    /// True if the normalized guess is non-empty and equals the answer.
    pub correct: bool,
}

/// Evaluate a guess against the puzzle answer.
pub fn evaluate_guess(guess: &str, answer: &str) -> GuessEvaluation {
    let normalized_guess = normalize(guess);
    let normalized_answer = normalize(answer);
    let correct = !normalized_guess.is_empty() && normalized_guess == normalized_answer;

    GuessEvaluation {
        normalized_guess,
        normalized_answer,
        correct,
    }
}
