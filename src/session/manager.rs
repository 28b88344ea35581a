//! Session Manager
//!
//! Owns every live daily session and serializes access to them.
//! Each (player, day) session sits behind its own mutex, so concurrent
//! requests for one player cannot double-count a guess or overrun the
//! guess cap. Clue-list mutations additionally take a per-day lock,
//! always before the session lock.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::core::day::DayKey;
use crate::game::clue::{rank_clues_for, CommunityClue};
use crate::game::puzzle::PuzzleBank;
use crate::game::state::PlayerId;
use crate::session::daily::{
    ClueSubmitRejection, DailySession, GuessOutcome, GuessRejection, HintRejection, SessionConfig,
};
use crate::session::host::HostChannel;
use crate::session::store::{self, KeyValueStore};

/// Key of one live session.
pub type SessionKey = (PlayerId, DayKey);

/// Manages all active sessions.
pub struct SessionManager {
    /// Immutable puzzle bank.
    bank: Arc<PuzzleBank>,
    /// Persistence port.
    store: Arc<dyn KeyValueStore>,
    /// Outward event channel.
    host: Arc<dyn HostChannel>,
    /// Per-session configuration.
    config: SessionConfig,
    /// Active sessions.
    sessions: RwLock<BTreeMap<SessionKey, Arc<Mutex<DailySession>>>>,
    /// Per-day clue list locks.
    day_locks: RwLock<BTreeMap<DayKey, Arc<Mutex<()>>>>,
}

impl SessionManager {
    /// Create new session manager.
    pub fn new(
        bank: Arc<PuzzleBank>,
        store: Arc<dyn KeyValueStore>,
        host: Arc<dyn HostChannel>,
        config: SessionConfig,
    ) -> Self {
        Self {
            bank,
            store,
            host,
            config,
            sessions: RwLock::new(BTreeMap::new()),
            day_locks: RwLock::new(BTreeMap::new()),
        }
    }

    /// Get the player's session for the day containing `now`, starting it if needed.
    pub async fn session(&self, player_id: &PlayerId, now: DateTime<Utc>) -> Arc<Mutex<DailySession>> {
        let key = (player_id.clone(), DayKey::from_instant(now));

        {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(&key) {
                return session.clone();
            }
        }

        // Started outside the map lock: start reads the store.
        let started = DailySession::start(
            player_id.clone(),
            now,
            &self.bank,
            self.store.clone(),
            self.host.clone(),
            self.config.clone(),
        );

        // Another task may have started it meanwhile; first insert wins.
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(started)))
            .clone()
    }

    /// Submit a guess for the player.
    pub async fn submit_guess(
        &self,
        player_id: &PlayerId,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<GuessOutcome, GuessRejection> {
        let session = self.session(player_id, now).await;
        let mut session = session.lock().await;
        session.submit_guess(text, now)
    }

    /// Reveal the player's next hint.
    pub async fn unlock_hint(&self, player_id: &PlayerId, now: DateTime<Utc>) -> Result<u8, HintRejection> {
        let session = self.session(player_id, now).await;
        let mut session = session.lock().await;
        session.unlock_hint()
    }

    /// Post a clue for the player.
    pub async fn submit_clue(
        &self,
        player_id: &PlayerId,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<CommunityClue, ClueSubmitRejection> {
        let day_lock = self.day_lock(DayKey::from_instant(now)).await;
        let _guard = day_lock.lock().await;

        let session = self.session(player_id, now).await;
        let mut session = session.lock().await;
        session.submit_clue(text, now)
    }

    /// Upvote a clue on behalf of the player.
    pub async fn upvote_clue(
        &self,
        player_id: &PlayerId,
        clue_id: &str,
        now: DateTime<Utc>,
    ) -> Result<u32, ClueSubmitRejection> {
        let day_lock = self.day_lock(DayKey::from_instant(now)).await;
        let _guard = day_lock.lock().await;

        let session = self.session(player_id, now).await;
        let mut session = session.lock().await;
        session.upvote_clue(clue_id)
    }

    /// Moderator: add boosts to a clue. Returns its new mod boost.
    pub async fn boost_clue(&self, day_key: DayKey, clue_id: &str, amount: u32) -> Result<u32, ClueSubmitRejection> {
        self.moderate(day_key, clue_id, |clue| {
            clue.boost(amount);
            clue.mod_boost
        })
        .await
    }

    /// Moderator: show or hide a clue.
    pub async fn set_clue_approved(
        &self,
        day_key: DayKey,
        clue_id: &str,
        approved: bool,
    ) -> Result<(), ClueSubmitRejection> {
        self.moderate(day_key, clue_id, |clue| clue.approved = approved).await
    }

    /// Ranked clues for a day, as players see them.
    pub async fn top_clues(&self, day_key: DayKey) -> Vec<CommunityClue> {
        let clues = match store::load_clues(self.store.as_ref(), day_key) {
            Ok(clues) => clues,
            Err(e) => {
                warn!(day = %day_key, error = %e, "Failed to load clues");
                return Vec::new();
            }
        };
        let answer = self.bank.selection_for(day_key).puzzle.answer.as_str();
        rank_clues_for(&clues, &[answer], self.config.clue_limit)
    }

    /// Get active session count.
    pub async fn session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }

    /// Drop sessions, locks and saved player state for days before `today`.
    pub async fn cleanup(&self, today: DayKey) {
        let removed = {
            let mut sessions = self.sessions.write().await;
            let before = sessions.len();
            sessions.retain(|(_, day), _| *day >= today);
            before - sessions.len()
        };

        {
            let mut day_locks = self.day_locks.write().await;
            day_locks.retain(|day, _| *day >= today);
        }

        if removed > 0 {
            info!(removed, today = %today, "Cleaned up stale sessions");
        }

        let backing = self.store.clone();
        match tokio::task::spawn_blocking(move || store::prune_progress_before(backing.as_ref(), today)).await {
            Ok(Ok(pruned)) if pruned > 0 => debug!(pruned, today = %today, "Pruned saved progress"),
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!(error = %e, "Failed to prune saved progress"),
            Err(e) => warn!(error = %e, "Progress pruning task failed"),
        }
    }

    async fn day_lock(&self, day_key: DayKey) -> Arc<Mutex<()>> {
        {
            let locks = self.day_locks.read().await;
            if let Some(lock) = locks.get(&day_key) {
                return lock.clone();
            }
        }
        let mut locks = self.day_locks.write().await;
        locks.entry(day_key).or_default().clone()
    }

    async fn moderate<T, F>(&self, day_key: DayKey, clue_id: &str, apply: F) -> Result<T, ClueSubmitRejection>
    where
        F: FnOnce(&mut CommunityClue) -> T,
    {
        let day_lock = self.day_lock(day_key).await;
        let _guard = day_lock.lock().await;

        let mut clues = store::load_clues(self.store.as_ref(), day_key).unwrap_or_else(|e| {
            warn!(day = %day_key, error = %e, "Failed to load clues for moderation");
            Vec::new()
        });
        let clue = clues
            .iter_mut()
            .find(|c| c.id == clue_id)
            .ok_or(ClueSubmitRejection::NotFound)?;
        let result = apply(clue);

        if let Err(e) = store::save_clues(self.store.as_ref(), day_key, &clues) {
            warn!(day = %day_key, error = %e, "Failed to save moderated clues");
        }
        debug!(day = %day_key, clue = clue_id, "Clue moderated");

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::PlayPhase;
    use crate::session::host::NullHost;
    use crate::session::store::MemoryStore;
    use crate::MAX_GUESSES;
    use chrono::TimeZone;

    fn feb4(minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 4, 12, minute, second).unwrap()
    }

    fn create_manager() -> SessionManager {
        SessionManager::new(
            Arc::new(PuzzleBank::builtin().unwrap()),
            Arc::new(MemoryStore::new()),
            Arc::new(NullHost),
            SessionConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_session_reused_within_day() {
        let manager = create_manager();
        let alice = PlayerId::from("alice");

        let a = manager.session(&alice, feb4(0, 0)).await;
        let b = manager.session(&alice, feb4(30, 0)).await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(manager.session_count().await, 1);

        let tomorrow = feb4(0, 0) + chrono::Duration::days(1);
        let c = manager.session(&alice, tomorrow).await;
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(manager.session_count().await, 2);
    }

    #[tokio::test]
    async fn test_guess_flow() {
        let manager = create_manager();
        let alice = PlayerId::from("alice");

        let miss = manager.submit_guess(&alice, "karma", feb4(0, 10)).await.unwrap();
        assert!(!miss.correct);
        assert_eq!(manager.unlock_hint(&alice, feb4(0, 20)).await, Ok(2));

        let hit = manager.submit_guess(&alice, "upvote", feb4(1, 0)).await.unwrap();
        assert!(hit.correct);
        assert_eq!(hit.phase, PlayPhase::Completed);
        // Started at 12:00:10, solved 50s later: 100 - 15 - 8 + 0
        assert_eq!(hit.score, 77);
    }

    #[tokio::test]
    async fn test_concurrent_guesses_respect_cap() {
        let manager = Arc::new(create_manager());
        let alice = PlayerId::from("alice");

        let mut handles = Vec::new();
        for i in 0..20 {
            let manager = manager.clone();
            let alice = alice.clone();
            handles.push(tokio::spawn(async move {
                manager.submit_guess(&alice, &format!("wrong{i}"), feb4(2, 0)).await
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, MAX_GUESSES);

        let session = manager.session(&alice, feb4(3, 0)).await;
        assert_eq!(session.lock().await.state().guesses.len(), MAX_GUESSES);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_guess_counted_once() {
        let manager = Arc::new(create_manager());
        let alice = PlayerId::from("alice");

        let a = {
            let (m, p) = (manager.clone(), alice.clone());
            tokio::spawn(async move { m.submit_guess(&p, "karma", feb4(0, 5)).await })
        };
        let b = {
            let (m, p) = (manager.clone(), alice.clone());
            tokio::spawn(async move { m.submit_guess(&p, "KARMA", feb4(0, 5)).await })
        };

        let results = [a.await.unwrap(), b.await.unwrap()];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.contains(&Err(GuessRejection::DuplicateGuess)));
    }

    #[tokio::test]
    async fn test_clues_shared_across_players() {
        let manager = create_manager();
        let alice = PlayerId::from("alice");
        let bob = PlayerId::from("bob");

        let clue = manager.submit_clue(&alice, "the happy arrow", feb4(1, 0)).await.unwrap();
        assert_eq!(
            manager.submit_clue(&alice, "a second attempt", feb4(2, 0)).await,
            Err(ClueSubmitRejection::AlreadySubmitted)
        );

        assert_eq!(manager.upvote_clue(&bob, &clue.id, feb4(3, 0)).await, Ok(2));

        let day = DayKey::from_instant(feb4(0, 0));
        let top = manager.top_clues(day).await;
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].upvotes, 2);
    }

    #[tokio::test]
    async fn test_moderation() {
        let manager = create_manager();
        let day = DayKey::from_instant(feb4(0, 0));

        let popular = manager
            .submit_clue(&PlayerId::from("alice"), "pointing toward the sky", feb4(1, 0))
            .await
            .unwrap();
        for voter in ["v1", "v2", "v3"] {
            manager.upvote_clue(&PlayerId::from(voter), &popular.id, feb4(2, 0)).await.unwrap();
        }
        let quiet = manager
            .submit_clue(&PlayerId::from("bob"), "a tiny act of approval", feb4(3, 0))
            .await
            .unwrap();

        assert_eq!(manager.top_clues(day).await[0].id, popular.id);

        // 1 + 2*3 = 7 > 4
        assert_eq!(manager.boost_clue(day, &quiet.id, 2).await, Ok(2));
        assert_eq!(manager.top_clues(day).await[0].id, quiet.id);

        manager.set_clue_approved(day, &quiet.id, false).await.unwrap();
        let top = manager.top_clues(day).await;
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].id, popular.id);

        assert_eq!(
            manager.boost_clue(day, "missing", 1).await,
            Err(ClueSubmitRejection::NotFound)
        );
    }

    #[tokio::test]
    async fn test_concurrent_clue_submissions_not_lost() {
        let manager = Arc::new(create_manager());

        let mut handles = Vec::new();
        for i in 0..8 {
            let manager = manager.clone();
            handles.push(tokio::spawn(async move {
                let player = PlayerId::new(format!("player{i}"));
                manager.submit_clue(&player, &format!("distinct clue number {i}"), feb4(4, i)).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let day = DayKey::from_instant(feb4(0, 0));
        let all = store::load_clues(manager.store.as_ref(), day).unwrap();
        assert_eq!(all.len(), 8);
        assert_eq!(manager.top_clues(day).await.len(), 5);
    }

    #[tokio::test]
    async fn test_cleanup_drops_old_days() {
        let manager = create_manager();
        let alice = PlayerId::from("alice");
        let yesterday = feb4(0, 0) - chrono::Duration::days(1);

        manager.session(&alice, yesterday).await;
        manager.session(&alice, feb4(0, 0)).await;
        assert_eq!(manager.session_count().await, 2);

        manager.cleanup(DayKey::from_instant(feb4(0, 0))).await;
        assert_eq!(manager.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_cleanup_prunes_old_progress() {
        let manager = create_manager();
        let alice = PlayerId::from("alice");
        let yesterday = feb4(0, 0) - chrono::Duration::days(1);
        let old_day = DayKey::from_instant(yesterday);
        let today = DayKey::from_instant(feb4(0, 0));

        manager.submit_guess(&alice, "karma", yesterday).await.unwrap();
        manager.submit_guess(&alice, "karma", feb4(0, 5)).await.unwrap();
        assert!(store::load_progress(manager.store.as_ref(), old_day, &alice).unwrap().is_some());

        manager.cleanup(today).await;
        assert_eq!(store::load_progress(manager.store.as_ref(), old_day, &alice).unwrap(), None);
        assert!(store::load_progress(manager.store.as_ref(), today, &alice).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_concurrent_first_access_shares_one_session() {
        let manager = Arc::new(create_manager());
        let alice = PlayerId::from("alice");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let (m, p) = (manager.clone(), alice.clone());
            handles.push(tokio::spawn(async move { m.session(&p, feb4(0, 0)).await }));
        }
        let mut sessions = Vec::new();
        for handle in handles {
            sessions.push(handle.await.unwrap());
        }

        assert_eq!(manager.session_count().await, 1);
        assert!(sessions.iter().all(|s| Arc::ptr_eq(s, &sessions[0])));
    }
}
