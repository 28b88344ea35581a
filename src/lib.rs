//! # ThreadPulse Daily Engine
//!
//! Deterministic daily puzzle engine for ThreadPulse Daily.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   THREADPULSE ENGINE                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── day.rs      - UTC calendar day keys                     │
//! │  ├── hash.rs     - FNV-1a seeds, bank fingerprints           │
//! │  └── rng.rs      - Deterministic Mulberry32 PRNG             │
//! │                                                              │
//! │  game/           - Game logic (pure)                         │
//! │  ├── puzzle.rs   - Puzzle bank                               │
//! │  ├── selector.rs - Daily puzzle selection                    │
//! │  ├── guess.rs    - Guess normalization and evaluation        │
//! │  ├── score.rs    - Scoring                                   │
//! │  ├── clue.rs     - Community clue validation and ranking     │
//! │  ├── state.rs    - Player daily state, streaks               │
//! │  └── events.rs   - Host events                               │
//! │                                                              │
//! │  session/        - Session layer (stateful)                  │
//! │  ├── daily.rs    - One player's day                          │
//! │  ├── manager.rs  - Concurrent session ownership              │
//! │  ├── store.rs    - Persistence port                          │
//! │  └── host.rs     - Host integration channel                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**:
//! - Seeds come from the UTC day key via FNV-1a
//! - All randomness from one Mulberry32 draw per day
//! - Wrapping 32-bit integer arithmetic throughout
//! - No clock reads; callers pass the instant in
//!
//! Given the same bank and day, every process selects **the same puzzle**.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod error;
pub mod game;
pub mod session;

// Re-export commonly used types
pub use config::EngineConfig;
pub use core::day::DayKey;
pub use core::rng::DailyRng;
pub use error::EngineError;
pub use game::clue::{rank_clues, validate_clue, ClueVerdict, CommunityClue};
pub use game::guess::{evaluate_guess, GuessEvaluation};
pub use game::puzzle::{Puzzle, PuzzleBank};
pub use game::score::compute_score;
pub use game::selector::{compute_day_selection, DailySelection};
pub use game::state::{PlayerDailyState, PlayerId, StreakRecord};
pub use session::{DailySession, KeyValueStore, SessionManager};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Guesses allowed per day.
pub const MAX_GUESSES: usize = 6;

/// Hints per puzzle (the first is free).
pub const MAX_HINTS: u8 = 3;
