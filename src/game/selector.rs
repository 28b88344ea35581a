//! Daily Puzzle Selection
//!
//! time → day key → seed → one Mulberry32 draw → bank index.
//! No stored schedule: every process computes the same answer.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::core::day::DayKey;
use crate::core::rng::DailyRng;
use crate::game::puzzle::{Puzzle, PuzzleBank};
use crate::EngineError;

/// The puzzle chosen for one day. Derived on demand, never persisted.
#[derive(Clone, Copy, Debug)]
pub struct DailySelection<'a> {
    /// Canonical UTC day.
    pub day_key: DayKey,
    /// FNV-1a seed of the day key.
    pub seed: u32,
    /// Position in the bank.
    pub index: usize,
    /// The selected puzzle.
    pub puzzle: &'a Puzzle,
}

/// Select the puzzle for the UTC day containing `now`.
pub fn compute_day_selection(
    now: DateTime<Utc>,
    bank: &[Puzzle],
) -> Result<DailySelection<'_>, EngineError> {
    select_for_day(DayKey::from_instant(now), bank)
}

/// Select the puzzle for an explicit day.
pub fn select_for_day(day_key: DayKey, bank: &[Puzzle]) -> Result<DailySelection<'_>, EngineError> {
    if bank.is_empty() {
        return Err(EngineError::EmptyBank);
    }

    let (seed, index) = draw_index(day_key, bank.len());

    debug!(day = %day_key, seed, index, "Selected daily puzzle");

    Ok(DailySelection {
        day_key,
        seed,
        index,
        puzzle: &bank[index],
    })
}

/// Seed and bank index for a day. Exactly one draw per day.
fn draw_index(day_key: DayKey, len: usize) -> (u32, usize) {
    let seed = day_key.seed();
    (seed, DailyRng::new(seed).next_index(len))
}

impl PuzzleBank {
    /// Today's selection from this bank.
    pub fn selection_at(&self, now: DateTime<Utc>) -> DailySelection<'_> {
        self.selection_for(DayKey::from_instant(now))
    }

    /// The selection for an explicit day.
    pub fn selection_for(&self, day_key: DayKey) -> DailySelection<'_> {
        let (seed, index) = draw_index(day_key, self.len());
        DailySelection {
            day_key,
            seed,
            index,
            puzzle: &self.puzzles()[index],
        }
    }
}
