//! Engine Configuration Errors
//!
//! Problems that prevent the engine from producing a daily selection at
//! all. These are fatal at startup. Expected gameplay outcomes (rejected
//! guesses, invalid clues) have their own types next to the code that
//! produces them.

/// Fatal engine configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Puzzle bank has no puzzles.
    #[error("Puzzle bank is empty")]
    EmptyBank,

    /// A puzzle violates a bank invariant.
    #[error("Invalid puzzle {id}: {reason}")]
    InvalidPuzzle {
        /// Offending puzzle id.
        id: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Two puzzles share an id.
    #[error("Duplicate puzzle id: {0}")]
    DuplicatePuzzleId(String),

    /// Bank JSON could not be parsed.
    #[error("Failed to parse puzzle bank: {0}")]
    BankParse(#[from] serde_json::Error),

    /// Bank file could not be read.
    #[error("Failed to read puzzle bank: {0}")]
    BankIo(#[from] std::io::Error),
}
