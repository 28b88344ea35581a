//! Puzzle Bank
//!
//! The fixed, ordered puzzle list that daily selection indexes into.
//! Loaded once at startup and immutable afterwards. Reordering the bank
//! changes every future day's puzzle, so the bank carries a fingerprint
//! that operators can compare across deployments.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::hash::{Fingerprint, FingerprintHasher};
use crate::game::guess::normalize;
use crate::{EngineError, MAX_HINTS};

/// Built-in puzzle bank shipped with the engine.
const BUILTIN_BANK_JSON: &str = include_str!("../../data/puzzles.json");

/// A single daily puzzle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    /// Unique puzzle identifier.
    pub id: String,
    /// Canonical answer text.
    pub answer: String,
    /// Display category.
    pub category: String,
    /// Display title.
    pub title: String,
    /// Hints ordered from most general to most revealing.
    pub hints: Vec<String>,
    /// Community labels.
    #[serde(default)]
    pub subreddit_tags: Vec<String>,
}

impl Puzzle {
    /// Check the puzzle invariants.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.hints.is_empty() || self.hints.len() > MAX_HINTS as usize {
            return Err(EngineError::InvalidPuzzle {
                id: self.id.clone(),
                reason: format!("expected 1-{} hints, found {}", MAX_HINTS, self.hints.len()),
            });
        }
        if normalize(&self.answer).is_empty() {
            return Err(EngineError::InvalidPuzzle {
                id: self.id.clone(),
                reason: "answer is empty after normalization".to_string(),
            });
        }
        Ok(())
    }

    /// Hints visible with `unlocked` hints revealed.
    pub fn visible_hints(&self, unlocked: u8) -> &[String] {
        let n = (unlocked as usize).min(self.hints.len());
        &self.hints[..n]
    }
}

/// Ordered, validated puzzle collection.
#[derive(Clone, Debug)]
pub struct PuzzleBank {
    puzzles: Vec<Puzzle>,
    fingerprint: Fingerprint,
}

impl PuzzleBank {
    /// Build a bank from puzzles, validating every invariant.
    ///
    /// Fails with [`EngineError::EmptyBank`] when there is nothing to select from.
    pub fn new(puzzles: Vec<Puzzle>) -> Result<Self, EngineError> {
        if puzzles.is_empty() {
            return Err(EngineError::EmptyBank);
        }

        let mut seen = std::collections::BTreeSet::new();
        for puzzle in &puzzles {
            puzzle.validate()?;
            if !seen.insert(puzzle.id.as_str()) {
                return Err(EngineError::DuplicatePuzzleId(puzzle.id.clone()));
            }
        }

        let fingerprint = compute_fingerprint(&puzzles);
        Ok(Self { puzzles, fingerprint })
    }

    /// Parse a bank from a JSON array of puzzles.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let puzzles: Vec<Puzzle> = serde_json::from_str(json)?;
        Self::new(puzzles)
    }

    /// Load a bank from a JSON file.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let json = std::fs::read_to_string(path)?;
        let bank = Self::from_json(&json)?;
        debug!(path = %path.display(), puzzles = bank.len(), "Loaded puzzle bank");
        Ok(bank)
    }

    /// The bank compiled into the engine.
    pub fn builtin() -> Result<Self, EngineError> {
        Self::from_json(BUILTIN_BANK_JSON)
    }

    /// Number of puzzles.
    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    /// Always false; an empty bank cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }

    /// Puzzle at `index`.
    pub fn get(&self, index: usize) -> Option<&Puzzle> {
        self.puzzles.get(index)
    }

    /// Find a puzzle by id.
    pub fn find(&self, id: &str) -> Option<&Puzzle> {
        self.puzzles.iter().find(|p| p.id == id)
    }

    /// All puzzles in bank order.
    pub fn puzzles(&self) -> &[Puzzle] {
        &self.puzzles
    }

    /// SHA-256 over the ordered bank contents.
    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Hex-encoded fingerprint, for logs.
    pub fn fingerprint_hex(&self) -> String {
        hex::encode(self.fingerprint)
    }
}

fn compute_fingerprint(puzzles: &[Puzzle]) -> Fingerprint {
    let mut hasher = FingerprintHasher::for_puzzle_bank();
    hasher.update_u32(puzzles.len() as u32);
    for puzzle in puzzles {
        hasher.update_str(&puzzle.id);
        hasher.update_str(&puzzle.answer);
        hasher.update_str(&puzzle.category);
        hasher.update_str(&puzzle.title);
        hasher.update_strs(&puzzle.hints);
        hasher.update_strs(&puzzle.subreddit_tags);
    }
    hasher.finalize()
}
