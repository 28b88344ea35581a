//! Host Events
//!
//! Outward notifications for the host platform (leaderboards, clue
//! storage). Fire-and-forget from the engine's point of view.

use serde::{Deserialize, Serialize};

use crate::core::day::DayKey;
use crate::game::clue::CommunityClue;
use crate::game::state::PlayerId;

/// Event reported to the host integration channel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// A player solved the day's puzzle.
    PuzzleCompleted {
        /// Solving player.
        player_id: PlayerId,
        /// Day solved.
        day_key: DayKey,
        /// Final score.
        score: u32,
        /// Guesses used, including the correct one.
        guess_count: u32,
        /// Streak after this solve.
        streak: u32,
    },

    /// A player posted a clue.
    ClueSubmitted {
        /// Day the clue belongs to.
        day_key: DayKey,
        /// The new clue.
        clue: CommunityClue,
    },
}

impl HostEvent {
    /// Player who triggered the event.
    pub fn player_id(&self) -> &PlayerId {
        match self {
            HostEvent::PuzzleCompleted { player_id, .. } => player_id,
            HostEvent::ClueSubmitted { clue, .. } => &clue.author,
        }
    }

    /// Day the event belongs to.
    pub fn day_key(&self) -> DayKey {
        match self {
            HostEvent::PuzzleCompleted { day_key, .. } => *day_key,
            HostEvent::ClueSubmitted { day_key, .. } => *day_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_event_wire_shape() {
        let event = HostEvent::PuzzleCompleted {
            player_id: PlayerId::from("alice"),
            day_key: DayKey::from_ymd(2026, 2, 4).unwrap(),
            score: 97,
            guess_count: 2,
            streak: 3,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "puzzle_completed");
        assert_eq!(json["player_id"], "alice");
        assert_eq!(json["day_key"], "2026-02-04");
        assert_eq!(json["score"], 97);

        assert_eq!(event.player_id().as_str(), "alice");
    }
}
