//! Scoring
//!
//! Converts a solve into a bounded point value. Pure integer arithmetic
//! with floor division throughout.

use serde::{Deserialize, Serialize};

/// Points for any correct solve before penalties and bonuses.
pub const BASE_SCORE: u32 = 100;

/// Penalty per hint beyond the first.
pub const HINT_PENALTY: u32 = 15;

/// Seconds per point of time penalty.
pub const SECONDS_PER_TIME_POINT: u64 = 6;

/// Maximum time penalty.
pub const MAX_TIME_PENALTY: u32 = 35;

/// Streak days per bonus point.
pub const STREAK_DAYS_PER_POINT: u64 = 2;

/// Maximum streak bonus.
pub const MAX_STREAK_BONUS: u32 = 25;

/// Lowest score a correct solve can earn.
pub const MIN_CORRECT_SCORE: u32 = 5;

/// Highest reachable score (no penalties, full streak bonus).
pub const MAX_SCORE: u32 = BASE_SCORE + MAX_STREAK_BONUS;

/// Inputs to the scorer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreParams {
    /// Whether the puzzle was solved.
    pub correct: bool,
    /// Hints unlocked at the time of the guess (1 = only the free hint).
    pub hints_used: u32,
    /// Seconds since the day was started. Negative values count as 0.
    pub time_seconds: i64,
    /// Current streak in days. Negative values count as 0.
    pub streak_days: i64,
}

impl ScoreParams {
    /// Compute the score for these inputs.
    pub fn score(&self) -> u32 {
        compute_score(self.correct, self.hints_used, self.time_seconds, self.streak_days)
    }
}

/// Score a solve.
///
/// Incorrect solves earn exactly 0. Correct solves earn
/// `max(5, 100 - hint_penalty - time_penalty + streak_bonus)`, so the
/// result is always 0 or within `[5, 125]`.
pub fn compute_score(correct: bool, hints_used: u32, time_seconds: i64, streak_days: i64) -> u32 {
    if !correct {
        return 0;
    }

    let time_seconds = time_seconds.max(0) as u64;
    let streak_days = streak_days.max(0) as u64;

    let hint_penalty = hints_used.saturating_sub(1).saturating_mul(HINT_PENALTY);
    let time_penalty = (time_seconds / SECONDS_PER_TIME_POINT).min(MAX_TIME_PENALTY as u64) as u32;
    let streak_bonus = (streak_days / STREAK_DAYS_PER_POINT).min(MAX_STREAK_BONUS as u64) as u32;

    let raw = BASE_SCORE as i64 - hint_penalty as i64 - time_penalty as i64 + streak_bonus as i64;
    raw.max(MIN_CORRECT_SCORE as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_incorrect_scores_zero() {
        assert_eq!(compute_score(false, 1, 0, 0), 0);
        assert_eq!(compute_score(false, 3, 1000, 100), 0);
    }

    #[test]
    fn test_perfect_solve() {
        assert_eq!(compute_score(true, 1, 0, 0), 100);
    }

    #[test]
    fn test_max_hints_and_slow() {
        // 100 - 30 - 35 + 0
        assert_eq!(compute_score(true, 3, 1000, 0), 35);
    }

    #[test]
    fn test_floor_engages_with_many_hints() {
        // 100 - 135 - 35 would be negative.
        assert_eq!(compute_score(true, 10, 1000, 0), MIN_CORRECT_SCORE);
    }

    #[test]
    fn test_streak_bonus_capped() {
        assert_eq!(compute_score(true, 1, 0, 100), 125);
        assert_eq!(compute_score(true, 1, 0, 50), 125);
        assert_eq!(compute_score(true, 1, 0, 49), 124);
    }

    #[test]
    fn test_floor_division_not_rounding() {
        assert_eq!(compute_score(true, 1, 5, 0), 100);
        assert_eq!(compute_score(true, 1, 6, 0), 99);
        assert_eq!(compute_score(true, 1, 11, 0), 99);
        assert_eq!(compute_score(true, 1, 12, 0), 98);
        assert_eq!(compute_score(true, 1, 0, 1), 100);
        assert_eq!(compute_score(true, 1, 0, 3), 101);
    }

    #[test]
    fn test_time_penalty_caps_at_35() {
        assert_eq!(compute_score(true, 1, 210, 0), 65);
        assert_eq!(compute_score(true, 1, 100_000, 0), 65);
    }

    #[test]
    fn test_negative_inputs_clamped() {
        assert_eq!(compute_score(true, 1, -500, -10), 100);
    }

    #[test]
    fn test_zero_hints_treated_as_one() {
        assert_eq!(compute_score(true, 0, 0, 0), 100);
    }

    #[test]
    fn test_params_wrapper() {
        let params = ScoreParams {
            correct: true,
            hints_used: 2,
            time_seconds: 30,
            streak_days: 4,
        };
        // 100 - 15 - 5 + 2
        assert_eq!(params.score(), 82);
    }

    proptest! {
        #[test]
        fn prop_score_bounds(
            correct in any::<bool>(),
            hints in 0u32..20,
            time in -10_000i64..1_000_000,
            streak in -100i64..10_000,
        ) {
            let score = compute_score(correct, hints, time, streak);
            if correct {
                prop_assert!((MIN_CORRECT_SCORE..=MAX_SCORE).contains(&score));
            } else {
                prop_assert_eq!(score, 0);
            }
        }

        #[test]
        fn prop_more_hints_never_scores_higher(
            hints in 1u32..10,
            time in 0i64..1000,
            streak in 0i64..100,
        ) {
            prop_assert!(
                compute_score(true, hints + 1, time, streak) <= compute_score(true, hints, time, streak)
            );
        }
    }
}
