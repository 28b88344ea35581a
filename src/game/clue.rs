//! Community Clues
//!
//! Content rules for player-submitted clues and the display ranking.
//!
//! Matching is plain substring containment on normalized text, so a clue
//! can be rejected for containing a longer word that happens to embed the
//! answer ("karmachameleon" contains "karma").

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::guess::normalize;
use crate::game::state::PlayerId;

/// Minimum trimmed clue length (characters).
pub const MIN_CLUE_LEN: usize = 8;

/// Maximum trimmed clue length (characters).
pub const MAX_CLUE_LEN: usize = 180;

/// Weight of one moderator boost relative to one upvote.
pub const MOD_BOOST_WEIGHT: u64 = 3;

/// Default number of clues shown.
pub const DEFAULT_CLUE_LIMIT: usize = 5;

/// Link-like fragments that are never allowed in a clue.
pub const LINK_BLOCKLIST: &[&str] = &[
    "http://",
    "https://",
    "www.",
    ".com",
    ".net",
    ".org",
    "bit.ly",
    "tinyurl",
    "goo.gl",
    "t.co/",
    "discord.gg",
    "redd.it",
];

/// Why a clue was refused. `Display` is the user-facing reason.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum ClueRejection {
    /// Fewer than [`MIN_CLUE_LEN`] characters after trimming.
    #[error("too short")]
    TooShort,
    /// More than [`MAX_CLUE_LEN`] characters after trimming.
    #[error("too long")]
    TooLong,
    /// Contains a blocklisted link fragment.
    #[error("links not allowed")]
    ContainsLink,
    /// Contains a forbidden word, usually the answer.
    #[error("contains the answer")]
    ContainsAnswer,
    /// Same normalized text as an existing clue for the day.
    #[error("duplicate")]
    Duplicate,
}

/// Structured validator result: `{valid, reason}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClueVerdict {
    /// True if the clue may be posted.
    pub valid: bool,
    /// `"ok"` when valid, otherwise the rejection reason.
    pub reason: String,
}

impl From<Result<(), ClueRejection>> for ClueVerdict {
    fn from(result: Result<(), ClueRejection>) -> Self {
        match result {
            Ok(()) => Self { valid: true, reason: "ok".to_string() },
            Err(rejection) => Self { valid: false, reason: rejection.to_string() },
        }
    }
}

/// Validate clue text. Rules apply in order and the first failure wins.
pub fn check_clue<F, E>(text: &str, forbidden_words: &[F], existing_clues: &[E]) -> Result<(), ClueRejection>
where
    F: AsRef<str>,
    E: AsRef<str>,
{
    let trimmed = text.trim();
    let len = trimmed.chars().count();
    if len < MIN_CLUE_LEN {
        return Err(ClueRejection::TooShort);
    }
    if len > MAX_CLUE_LEN {
        return Err(ClueRejection::TooLong);
    }

    let lowered = trimmed.to_lowercase();
    if LINK_BLOCKLIST.iter().any(|fragment| lowered.contains(fragment)) {
        return Err(ClueRejection::ContainsLink);
    }

    let normalized = normalize(trimmed);
    let contains_forbidden = forbidden_words.iter().any(|word| {
        let word = normalize(word.as_ref());
        // An empty forbidden word would match everything.
        !word.is_empty() && normalized.contains(&word)
    });
    if contains_forbidden {
        return Err(ClueRejection::ContainsAnswer);
    }

    if existing_clues.iter().any(|existing| normalize(existing.as_ref()) == normalized) {
        return Err(ClueRejection::Duplicate);
    }

    Ok(())
}

/// Validate clue text, returning the `{valid, reason}` verdict.
pub fn validate_clue<F, E>(text: &str, forbidden_words: &[F], existing_clues: &[E]) -> ClueVerdict
where
    F: AsRef<str>,
    E: AsRef<str>,
{
    check_clue(text, forbidden_words, existing_clues).into()
}

/// A player-submitted clue for one day's puzzle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityClue {
    /// Unique clue id.
    pub id: String,
    /// Clue text as submitted.
    pub text: String,
    /// Submitting player.
    pub author: PlayerId,
    /// Community upvotes, including the author's own.
    pub upvotes: u32,
    /// Moderator boosts.
    #[serde(default)]
    pub mod_boost: u32,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Hidden from display when false.
    pub approved: bool,
    /// Players who have upvoted.
    #[serde(default)]
    pub voters: BTreeSet<PlayerId>,
}

impl CommunityClue {
    /// New clue carrying the author's implicit upvote.
    pub fn new(author: PlayerId, text: &str, created_at: DateTime<Utc>) -> Self {
        let mut voters = BTreeSet::new();
        voters.insert(author.clone());

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.trim().to_string(),
            author,
            upvotes: 1,
            mod_boost: 0,
            created_at,
            approved: true,
            voters,
        }
    }

    /// Ranking weight: upvotes plus weighted moderator boosts.
    pub fn rank_score(&self) -> u64 {
        self.upvotes as u64 + self.mod_boost as u64 * MOD_BOOST_WEIGHT
    }

    /// Record an upvote. Returns false if this player already voted.
    pub fn upvote(&mut self, voter: &PlayerId) -> bool {
        if !self.voters.insert(voter.clone()) {
            return false;
        }
        self.upvotes = self.upvotes.saturating_add(1);
        true
    }

    /// Apply moderator boosts.
    pub fn boost(&mut self, amount: u32) {
        self.mod_boost = self.mod_boost.saturating_add(amount);
    }
}

/// Order clues for display, re-checking only length and link rules.
pub fn rank_clues(clues: &[CommunityClue], limit: usize) -> Vec<CommunityClue> {
    rank_clues_for(clues, &[] as &[&str], limit)
}

/// Order clues for display.
///
/// Drops clues that no longer pass the validator (against
/// `forbidden_words`) or are unapproved, sorts by [`CommunityClue::rank_score`]
/// descending with newer clues first on ties, and keeps at most `limit`.
/// The sort is stable, so fully equal clues keep their input order.
pub fn rank_clues_for<F: AsRef<str>>(
    clues: &[CommunityClue],
    forbidden_words: &[F],
    limit: usize,
) -> Vec<CommunityClue> {
    let mut ranked: Vec<CommunityClue> = clues
        .iter()
        .filter(|c| c.approved && check_clue(&c.text, forbidden_words, &[] as &[&str]).is_ok())
        .cloned()
        .collect();

    ranked.sort_by(|a, b| {
        b.rank_score()
            .cmp(&a.rank_score())
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    ranked.truncate(limit);
    ranked
}
