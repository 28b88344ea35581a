//! Daily Session
//!
//! One player's play of one day's puzzle. Drives the pure game functions
//! against mutable state and persists the results through the store.
//!
//! Persistence is best-effort: every store failure is logged and play
//! continues from in-memory state. A clue list is only written back after
//! it was read successfully, so a failed read never overwrites stored clues.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::core::day::DayKey;
use crate::game::clue::{check_clue, rank_clues_for, ClueRejection, CommunityClue, DEFAULT_CLUE_LIMIT};
use crate::game::events::HostEvent;
use crate::game::guess::evaluate_guess;
use crate::game::puzzle::{Puzzle, PuzzleBank};
use crate::game::score::compute_score;
use crate::game::state::{GuessRecord, PlayPhase, PlayerDailyState, PlayerId, StreakRecord};
use crate::session::host::HostChannel;
use crate::session::store::{self, KeyValueStore};
use crate::MAX_HINTS;

/// Configuration for daily sessions.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Number of community clues displayed.
    pub clue_limit: usize,
    /// Resume saved progress for the day instead of starting fresh.
    pub resume_progress: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            clue_limit: DEFAULT_CLUE_LIMIT,
            resume_progress: true,
        }
    }
}

/// Why a guess was refused. `Display` is the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GuessRejection {
    /// The puzzle is already solved.
    #[error("You already solved today's puzzle")]
    AlreadyCompleted,

    /// All attempts are used.
    #[error("No guesses remaining for today")]
    NoGuessesRemaining,

    /// Same normalized text as an earlier guess.
    #[error("You already tried that guess")]
    DuplicateGuess,

    /// Nothing left after normalization.
    #[error("Enter a guess first")]
    EmptyGuess,
}

/// Why a hint unlock was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HintRejection {
    /// The day is solved or out of attempts.
    #[error("Today's puzzle is finished")]
    Finished,

    /// Every hint is already visible.
    #[error("All hints are already unlocked")]
    AllHintsUnlocked,
}

/// Why a clue action was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClueSubmitRejection {
    /// One clue per player per day.
    #[error("You already submitted a clue today")]
    AlreadySubmitted,

    /// Failed a content rule.
    #[error("{0}")]
    Invalid(#[from] ClueRejection),

    /// No clue with that id today.
    #[error("Clue not found")]
    NotFound,

    /// Player already upvoted this clue.
    #[error("You already upvoted that clue")]
    AlreadyVoted,
}

/// Result of an accepted guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessOutcome {
    /// Whether the guess solved the puzzle.
    pub correct: bool,
    /// Score for the day (0 unless solved).
    pub score: u32,
    /// Attempts left.
    pub guesses_remaining: usize,
    /// Streak after this guess.
    pub streak: u32,
    /// Phase after this guess.
    pub phase: PlayPhase,
}

/// A player's session for one day.
pub struct DailySession {
    player_id: PlayerId,
    day_key: DayKey,
    puzzle_index: usize,
    puzzle: Puzzle,
    state: PlayerDailyState,
    streak_record: StreakRecord,
    /// Every clue for the day as last read, plus local changes.
    day_clues: Vec<CommunityClue>,
    /// Ranked display set.
    clues: Vec<CommunityClue>,
    config: SessionConfig,
    store: Arc<dyn KeyValueStore>,
    host: Arc<dyn HostChannel>,
}

impl DailySession {
    /// Start (or resume) the player's session for the day containing `now`.
    pub fn start(
        player_id: PlayerId,
        now: DateTime<Utc>,
        bank: &PuzzleBank,
        store: Arc<dyn KeyValueStore>,
        host: Arc<dyn HostChannel>,
        config: SessionConfig,
    ) -> Self {
        let selection = bank.selection_at(now);
        let day_key = selection.day_key;
        let puzzle = selection.puzzle.clone();

        let streak_record = store::load_streak(store.as_ref(), &player_id).unwrap_or_else(|e| {
            warn!(player = %player_id, error = %e, "Failed to load streak, defaulting to 0");
            StreakRecord::default()
        });

        let resumed = if config.resume_progress {
            store::load_progress(store.as_ref(), day_key, &player_id)
                .unwrap_or_else(|e| {
                    warn!(player = %player_id, day = %day_key, error = %e, "Failed to load progress");
                    None
                })
                .filter(|state| state.puzzle_id == puzzle.id)
        } else {
            None
        };

        let state = match resumed {
            Some(state) => {
                debug!(player = %player_id, day = %day_key, guesses = state.guesses.len(), "Resumed session");
                state
            }
            None => PlayerDailyState::new(day_key, &puzzle.id, now, streak_record.streak_days),
        };

        let mut session = Self {
            player_id,
            day_key,
            puzzle_index: selection.index,
            puzzle,
            state,
            streak_record,
            day_clues: Vec::new(),
            clues: Vec::new(),
            config,
            store,
            host,
        };
        session.refresh_clues();

        info!(
            player = %session.player_id,
            day = %session.day_key,
            puzzle = %session.puzzle.id,
            streak = session.state.streak,
            "Session started"
        );

        session
    }

    /// Submit a guess.
    pub fn submit_guess(&mut self, text: &str, now: DateTime<Utc>) -> Result<GuessOutcome, GuessRejection> {
        match self.state.phase() {
            PlayPhase::Completed => return Err(GuessRejection::AlreadyCompleted),
            PlayPhase::Exhausted => return Err(GuessRejection::NoGuessesRemaining),
            PlayPhase::NotStarted | PlayPhase::InProgress => {}
        }

        let evaluation = evaluate_guess(text, &self.puzzle.answer);
        if evaluation.normalized_guess.is_empty() {
            return Err(GuessRejection::EmptyGuess);
        }
        if self.state.has_guessed(&evaluation.normalized_guess) {
            return Err(GuessRejection::DuplicateGuess);
        }

        let elapsed = self.state.elapsed_seconds(now);
        let score = compute_score(
            evaluation.correct,
            self.state.hints_unlocked as u32,
            elapsed,
            self.state.streak as i64,
        );

        self.state.guesses.push(GuessRecord {
            text: text.to_string(),
            normalized: evaluation.normalized_guess,
            timestamp: now,
            hints_used: self.state.hints_unlocked,
            correct: evaluation.correct,
        });

        if evaluation.correct {
            self.state.completed = true;
            self.state.time_completed = Some(now);
            self.state.score = score;
            self.state.streak = self.record_win();

            info!(
                player = %self.player_id,
                day = %self.day_key,
                score,
                guesses = self.state.guesses.len(),
                streak = self.state.streak,
                "Puzzle solved"
            );

            self.host.report(HostEvent::PuzzleCompleted {
                player_id: self.player_id.clone(),
                day_key: self.day_key,
                score,
                guess_count: self.state.guesses.len() as u32,
                streak: self.state.streak,
            });
        } else {
            debug!(
                player = %self.player_id,
                day = %self.day_key,
                remaining = self.state.guesses_remaining(),
                "Incorrect guess"
            );
        }

        self.persist_progress();

        Ok(GuessOutcome {
            correct: evaluation.correct,
            score: self.state.score,
            guesses_remaining: self.state.guesses_remaining(),
            streak: self.state.streak,
            phase: self.state.phase(),
        })
    }

    /// Reveal the next hint. Returns the number of hints now visible.
    pub fn unlock_hint(&mut self) -> Result<u8, HintRejection> {
        if self.state.phase().is_terminal() {
            return Err(HintRejection::Finished);
        }
        if self.state.hints_unlocked >= MAX_HINTS {
            return Err(HintRejection::AllHintsUnlocked);
        }

        self.state.hints_unlocked += 1;
        debug!(player = %self.player_id, hints = self.state.hints_unlocked, "Hint unlocked");
        self.persist_progress();

        Ok(self.state.hints_unlocked)
    }

    /// Post a clue for today's puzzle. Returns the new clue.
    pub fn submit_clue(&mut self, text: &str, now: DateTime<Utc>) -> Result<CommunityClue, ClueSubmitRejection> {
        let synced = self.load_day_clues();

        if self.day_clues.iter().any(|c| c.author == self.player_id) {
            return Err(ClueSubmitRejection::AlreadySubmitted);
        }

        let existing: Vec<&str> = self.day_clues.iter().map(|c| c.text.as_str()).collect();
        check_clue(text, &[self.puzzle.answer.as_str()], &existing)?;

        let clue = CommunityClue::new(self.player_id.clone(), text, now);
        self.day_clues.push(clue.clone());
        self.save_day_clues(synced);
        self.clues = self.rank(&self.day_clues);

        info!(player = %self.player_id, day = %self.day_key, clue = %clue.id, "Clue submitted");

        self.host.report(HostEvent::ClueSubmitted {
            day_key: self.day_key,
            clue: clue.clone(),
        });

        Ok(clue)
    }

    /// Upvote another player's clue.
    pub fn upvote_clue(&mut self, clue_id: &str) -> Result<u32, ClueSubmitRejection> {
        let synced = self.load_day_clues();
        let clue = self
            .day_clues
            .iter_mut()
            .find(|c| c.id == clue_id)
            .ok_or(ClueSubmitRejection::NotFound)?;

        if !clue.upvote(&self.player_id) {
            return Err(ClueSubmitRejection::AlreadyVoted);
        }
        let upvotes = clue.upvotes;

        self.save_day_clues(synced);
        self.clues = self.rank(&self.day_clues);

        Ok(upvotes)
    }

    /// Reload and re-rank the day's clues from storage.
    pub fn refresh_clues(&mut self) {
        self.load_day_clues();
        self.clues = self.rank(&self.day_clues);
    }

    /// Player this session belongs to.
    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    /// Day this session plays.
    pub fn day_key(&self) -> DayKey {
        self.day_key
    }

    /// Bank index of today's puzzle.
    pub fn puzzle_index(&self) -> usize {
        self.puzzle_index
    }

    /// Today's puzzle.
    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    /// Current player state.
    pub fn state(&self) -> &PlayerDailyState {
        &self.state
    }

    /// Current phase.
    pub fn phase(&self) -> PlayPhase {
        self.state.phase()
    }

    /// Hints visible right now.
    pub fn visible_hints(&self) -> &[String] {
        self.puzzle.visible_hints(self.state.hints_unlocked)
    }

    /// Ranked clues for display.
    pub fn clues(&self) -> &[CommunityClue] {
        &self.clues
    }

    /// Player's streak record as last seen.
    pub fn streak_record(&self) -> &StreakRecord {
        &self.streak_record
    }

    fn rank(&self, all: &[CommunityClue]) -> Vec<CommunityClue> {
        rank_clues_for(all, &[self.puzzle.answer.as_str()], self.config.clue_limit)
    }

    fn record_win(&mut self) -> u32 {
        // Re-read so another device's win today is not double counted.
        let mut record = match store::load_streak(self.store.as_ref(), &self.player_id) {
            Ok(record) => record,
            Err(e) => {
                warn!(player = %self.player_id, error = %e, "Failed to reload streak, using cached record");
                self.streak_record.clone()
            }
        };

        let streak = record.record_win(self.day_key);

        if let Err(e) = store::save_streak(self.store.as_ref(), &self.player_id, &record) {
            warn!(player = %self.player_id, error = %e, "Failed to save streak");
        }
        self.streak_record = record;
        streak
    }

    /// Reload the day's clues. Returns false (keeping the last loaded set)
    /// when the store could not be read.
    fn load_day_clues(&mut self) -> bool {
        match store::load_clues(self.store.as_ref(), self.day_key) {
            Ok(clues) => {
                self.day_clues = clues;
                true
            }
            Err(e) => {
                warn!(day = %self.day_key, error = %e, "Failed to load clues, using last loaded set");
                false
            }
        }
    }

    fn save_day_clues(&self, synced: bool) {
        if !synced {
            // Only a freshly read list may be written back.
            warn!(day = %self.day_key, "Clue change kept in memory only, store unreadable");
            return;
        }
        if let Err(e) = store::save_clues(self.store.as_ref(), self.day_key, &self.day_clues) {
            warn!(day = %self.day_key, error = %e, "Failed to save clues");
        }
    }

    fn persist_progress(&self) {
        if let Err(e) = store::save_progress(self.store.as_ref(), &self.player_id, &self.state) {
            warn!(player = %self.player_id, day = %self.day_key, error = %e, "Failed to save progress");
        }
    }
}
