//! Game Logic Module
//!
//! All puzzle and scoring logic. Pure and deterministic: nothing here
//! reads the clock, touches storage or shares mutable state.
//!
//! ## Module Structure
//!
//! - `puzzle`: Puzzle bank loading and validation
//! - `selector`: Daily puzzle selection
//! - `guess`: Guess normalization and evaluation
//! - `score`: Score computation
//! - `clue`: Community clue validation and ranking
//! - `state`: Player daily state and streak records
//! - `events`: Host integration events

pub mod clue;
pub mod events;
pub mod guess;
pub mod puzzle;
pub mod score;
pub mod selector;
pub mod state;

// Re-export key types
pub use clue::{
    check_clue, rank_clues, rank_clues_for, validate_clue, ClueRejection, ClueVerdict, CommunityClue,
};
pub use events::HostEvent;
pub use guess::{evaluate_guess, normalize, GuessEvaluation};
pub use puzzle::{Puzzle, PuzzleBank};
pub use score::{compute_score, ScoreParams};
pub use selector::{compute_day_selection, select_for_day, DailySelection};
pub use state::{GuessRecord, PlayPhase, PlayerDailyState, PlayerId, StreakRecord};
