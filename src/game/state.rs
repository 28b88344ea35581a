//! Player State Definitions
//!
//! Per-player, per-day game state and the cross-day streak record.
//! Uses BTreeMap/BTreeSet where ordering is observable.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::day::DayKey;
use crate::{MAX_GUESSES, MAX_HINTS};

// =============================================================================
// PLAYER ID
// =============================================================================

/// Player identity supplied by the host platform (e.g. a username).
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Create from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as str.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// PLAY PHASE
// =============================================================================

/// Lifecycle of one player's day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayPhase {
    /// No guesses yet.
    NotStarted,
    /// At least one wrong guess, attempts remain.
    InProgress,
    /// Solved. Terminal.
    Completed,
    /// Out of attempts without solving. Terminal.
    Exhausted,
}

impl PlayPhase {
    /// True for Completed and Exhausted.
    pub fn is_terminal(self) -> bool {
        matches!(self, PlayPhase::Completed | PlayPhase::Exhausted)
    }
}

// =============================================================================
// GUESSES
// =============================================================================

/// One submitted guess.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuessRecord {
    /// Text as typed.
    pub text: String,
    /// Comparison form of `text`.
    pub normalized: String,
    /// Submission time.
    pub timestamp: DateTime<Utc>,
    /// Hints unlocked when the guess was made.
    pub hints_used: u8,
    /// Whether it matched the answer.
    pub correct: bool,
}

// =============================================================================
// PLAYER DAILY STATE
// =============================================================================

/// Mutable state for one player on one day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDailyState {
    /// Day this state belongs to.
    pub day_key: DayKey,
    /// Puzzle being played.
    pub puzzle_id: String,
    /// Guesses in submission order.
    pub guesses: Vec<GuessRecord>,
    /// Hints revealed (1-3).
    pub hints_unlocked: u8,
    /// 0 until completed.
    pub score: u32,
    /// Set once, on the first correct guess.
    pub completed: bool,
    /// When the day was started.
    pub time_started: DateTime<Utc>,
    /// When the puzzle was solved.
    pub time_completed: Option<DateTime<Utc>>,
    /// Streak at the time of loading (updated on a win).
    pub streak: u32,
}

impl PlayerDailyState {
    /// Fresh state with the first hint revealed.
    pub fn new(day_key: DayKey, puzzle_id: &str, now: DateTime<Utc>, streak: u32) -> Self {
        Self {
            day_key,
            puzzle_id: puzzle_id.to_string(),
            guesses: Vec::new(),
            hints_unlocked: 1,
            score: 0,
            completed: false,
            time_started: now,
            time_completed: None,
            streak,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> PlayPhase {
        if self.completed {
            PlayPhase::Completed
        } else if self.guesses.len() >= MAX_GUESSES {
            PlayPhase::Exhausted
        } else if self.guesses.is_empty() {
            PlayPhase::NotStarted
        } else {
            PlayPhase::InProgress
        }
    }

    /// Attempts left today.
    pub fn guesses_remaining(&self) -> usize {
        MAX_GUESSES.saturating_sub(self.guesses.len())
    }

    /// True if a guess with this normalized text was already made.
    pub fn has_guessed(&self, normalized: &str) -> bool {
        self.guesses.iter().any(|g| g.normalized == normalized)
    }

    /// True if another hint can still be revealed.
    pub fn can_unlock_hint(&self) -> bool {
        !self.phase().is_terminal() && self.hints_unlocked < MAX_HINTS
    }

    /// Whole seconds since the day was started, at least 1.
    pub fn elapsed_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.time_started).num_seconds().max(1)
    }
}

// =============================================================================
// STREAK RECORD
// =============================================================================

/// Consecutive-day solve record, persisted per player.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakRecord {
    /// Most recent solved day.
    pub last_solved_day: Option<DayKey>,
    /// Current run of consecutive solved days.
    pub streak_days: u32,
    /// Longest run ever.
    #[serde(default)]
    pub best_streak: u32,
    /// Days solved in total.
    #[serde(default)]
    pub total_solved: u32,
}

impl StreakRecord {
    /// Record a solve on `day`. Returns the updated streak.
    ///
    /// Same day: unchanged. Day after the last solve: +1. Anything else: 1.
    pub fn record_win(&mut self, day: DayKey) -> u32 {
        match self.last_solved_day {
            Some(last) if last == day => return self.streak_days,
            Some(last) if day.is_day_after(&last) => {
                self.streak_days = self.streak_days.saturating_add(1);
            }
            _ => self.streak_days = 1,
        }

        self.last_solved_day = Some(day);
        self.best_streak = self.best_streak.max(self.streak_days);
        self.total_solved = self.total_solved.saturating_add(1);
        self.streak_days
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> DayKey {
        DayKey::from_ymd(2026, 2, d).unwrap()
    }

    fn guess(text: &str, correct: bool) -> GuessRecord {
        GuessRecord {
            text: text.to_string(),
            normalized: crate::game::guess::normalize(text),
            timestamp: Utc.with_ymd_and_hms(2026, 2, 4, 12, 0, 0).unwrap(),
            hints_used: 1,
            correct,
        }
    }

    fn fresh() -> PlayerDailyState {
        let now = Utc.with_ymd_and_hms(2026, 2, 4, 12, 0, 0).unwrap();
        PlayerDailyState::new(day(4), "tp-001", now, 0)
    }

    #[test]
    fn test_streak_first_win() {
        let mut record = StreakRecord::default();
        assert_eq!(record.record_win(day(4)), 1);
        assert_eq!(record.last_solved_day, Some(day(4)));
        assert_eq!(record.total_solved, 1);
    }

    #[test]
    fn test_streak_consecutive_days() {
        let mut record = StreakRecord::default();
        record.record_win(day(4));
        assert_eq!(record.record_win(day(5)), 2);
        assert_eq!(record.record_win(day(6)), 3);
        assert_eq!(record.best_streak, 3);
    }

    #[test]
    fn test_streak_same_day_idempotent() {
        let mut record = StreakRecord::default();
        record.record_win(day(4));
        record.record_win(day(5));
        assert_eq!(record.record_win(day(5)), 2);
        assert_eq!(record.total_solved, 2);
    }

    #[test]
    fn test_streak_gap_resets() {
        let mut record = StreakRecord::default();
        record.record_win(day(4));
        record.record_win(day(5));
        assert_eq!(record.record_win(day(7)), 1);
        assert_eq!(record.best_streak, 2);
    }

    #[test]
    fn test_streak_earlier_day_resets() {
        let mut record = StreakRecord::default();
        record.record_win(day(10));
        assert_eq!(record.record_win(day(9)), 1);
    }

    #[test]
    fn test_phase_transitions() {
        let mut state = fresh();
        assert_eq!(state.phase(), PlayPhase::NotStarted);

        state.guesses.push(guess("wrong", false));
        assert_eq!(state.phase(), PlayPhase::InProgress);

        for i in 0..5 {
            state.guesses.push(guess(&format!("wrong{i}"), false));
        }
        assert_eq!(state.phase(), PlayPhase::Exhausted);
        assert!(state.phase().is_terminal());
        assert_eq!(state.guesses_remaining(), 0);
    }

    #[test]
    fn test_completed_phase() {
        let mut state = fresh();
        state.guesses.push(guess("karma", true));
        state.completed = true;
        assert_eq!(state.phase(), PlayPhase::Completed);
        assert!(!state.can_unlock_hint());
    }

    #[test]
    fn test_has_guessed_uses_normalized() {
        let mut state = fresh();
        state.guesses.push(guess("Up Vote!", false));
        assert!(state.has_guessed("upvote"));
        assert!(!state.has_guessed("downvote"));
    }

    #[test]
    fn test_elapsed_minimum_one_second() {
        let state = fresh();
        assert_eq!(state.elapsed_seconds(state.time_started), 1);
        let later = state.time_started + chrono::Duration::seconds(90);
        assert_eq!(state.elapsed_seconds(later), 90);
        let earlier = state.time_started - chrono::Duration::seconds(30);
        assert_eq!(state.elapsed_seconds(earlier), 1);
    }

    #[test]
    fn test_state_serde_roundtrip() {
        let mut state = fresh();
        state.guesses.push(guess("karma", true));
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"hintsUnlocked\":1"));
        let back: PlayerDailyState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
