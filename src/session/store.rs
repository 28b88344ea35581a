//! Persistence Port
//!
//! Key-value storage for streak records, per-day clue lists and in-progress
//! player state. The session layer treats every call as best-effort.
//!
//! Keys:
//! - `streak/{player}`
//! - `clues/{day}`
//! - `progress/{day}/{player}`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::core::day::DayKey;
use crate::game::clue::CommunityClue;
use crate::game::state::{PlayerDailyState, PlayerId, StreakRecord};

/// Storage errors. Logged by callers, never fatal to gameplay.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backing file could not be read or written.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value could not be (de)serialized.
    #[error("Storage serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A lock around the store was poisoned.
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Minimal key-value surface the engine persists through.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove every key matching `predicate`. Returns how many were removed.
    fn remove_where(&self, predicate: &dyn Fn(&str) -> bool) -> Result<usize, StoreError>;
}

/// Key for a player's streak record.
pub fn streak_key(player_id: &PlayerId) -> String {
    format!("streak/{player_id}")
}

/// Key for a day's clue list.
pub fn clues_key(day_key: DayKey) -> String {
    format!("clues/{day_key}")
}

/// Key for a player's state on a day.
pub fn progress_key(day_key: DayKey, player_id: &PlayerId) -> String {
    format!("progress/{day_key}/{player_id}")
}

/// Read and deserialize a JSON value.
pub fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>, StoreError> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Serialize and write a JSON value.
pub fn save_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), StoreError> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)
}

/// Streak record for a player (default when absent).
pub fn load_streak(store: &dyn KeyValueStore, player_id: &PlayerId) -> Result<StreakRecord, StoreError> {
    Ok(load_json(store, &streak_key(player_id))?.unwrap_or_default())
}

/// Persist a player's streak record.
pub fn save_streak(store: &dyn KeyValueStore, player_id: &PlayerId, record: &StreakRecord) -> Result<(), StoreError> {
    save_json(store, &streak_key(player_id), record)
}

/// Every clue submitted for a day, in submission order.
pub fn load_clues(store: &dyn KeyValueStore, day_key: DayKey) -> Result<Vec<CommunityClue>, StoreError> {
    Ok(load_json(store, &clues_key(day_key))?.unwrap_or_default())
}

/// Persist a day's clue list.
pub fn save_clues(store: &dyn KeyValueStore, day_key: DayKey, clues: &[CommunityClue]) -> Result<(), StoreError> {
    save_json(store, &clues_key(day_key), &clues)
}

/// A player's saved state for a day, if any.
pub fn load_progress(
    store: &dyn KeyValueStore,
    day_key: DayKey,
    player_id: &PlayerId,
) -> Result<Option<PlayerDailyState>, StoreError> {
    load_json(store, &progress_key(day_key, player_id))
}

/// Persist a player's state for a day.
pub fn save_progress(
    store: &dyn KeyValueStore,
    player_id: &PlayerId,
    state: &PlayerDailyState,
) -> Result<(), StoreError> {
    save_json(store, &progress_key(state.day_key, player_id), state)
}

/// Drop saved player state for days before `today`. Streaks and clue
/// lists are kept.
pub fn prune_progress_before(store: &dyn KeyValueStore, today: DayKey) -> Result<usize, StoreError> {
    store.remove_where(&|key| {
        key.strip_prefix("progress/")
            .and_then(|rest| rest.split('/').next())
            .and_then(|day| day.parse::<DayKey>().ok())
            .is_some_and(|day| day < today)
    })
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// Volatile store for tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// True if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_where(&self, predicate: &dyn Fn(&str) -> bool) -> Result<usize, StoreError> {
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        let before = entries.len();
        entries.retain(|key, _| !predicate(key));
        Ok(before - entries.len())
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Durable store backed by a single JSON object on disk.
///
/// Every write rewrites the file through a temporary sibling and a rename,
/// so a crash leaves either the old or the new contents.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or create on first write) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw)?
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), keys = entries.len(), "Opened file store");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush(&entries) {
            // Keep memory in step with disk.
            match previous {
                Some(old) => entries.insert(key.to_string(), old),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    fn remove_where(&self, predicate: &dyn Fn(&str) -> bool) -> Result<usize, StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        let removed: BTreeMap<String, String> = entries
            .iter()
            .filter(|(key, _)| predicate(key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if removed.is_empty() {
            return Ok(0);
        }

        entries.retain(|key, _| !removed.contains_key(key));
        if let Err(e) = self.flush(&entries) {
            entries.extend(removed);
            return Err(e);
        }
        Ok(removed.len())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Store whose every call fails, for best-effort persistence tests.
    pub(crate) struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Poisoned)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Poisoned)
        }

        fn remove_where(&self, _predicate: &dyn Fn(&str) -> bool) -> Result<usize, StoreError> {
            Err(StoreError::Poisoned)
        }
    }

    /// Memory store whose clue-list reads fail while `fail_clue_reads` is set.
    #[derive(Default)]
    pub(crate) struct FlakyClueStore {
        pub(crate) inner: MemoryStore,
        pub(crate) fail_clue_reads: AtomicBool,
    }

    impl FlakyClueStore {
        pub(crate) fn set_failing(&self, failing: bool) {
            self.fail_clue_reads.store(failing, Ordering::SeqCst);
        }
    }

    impl KeyValueStore for FlakyClueStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            if key.starts_with("clues/") && self.fail_clue_reads.load(Ordering::SeqCst) {
                return Err(StoreError::Poisoned);
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.inner.set(key, value)
        }

        fn remove_where(&self, predicate: &dyn Fn(&str) -> bool) -> Result<usize, StoreError> {
            self.inner.remove_where(predicate)
        }
    }

    fn temp_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("threadpulse-store-{}", uuid::Uuid::new_v4()))
            .join("store.json")
    }

    #[test]
    fn test_memory_store_get_set() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_keys_are_namespaced() {
        let day = DayKey::from_ymd(2026, 2, 4).unwrap();
        let player = PlayerId::from("alice");
        assert_eq!(streak_key(&player), "streak/alice");
        assert_eq!(clues_key(day), "clues/2026-02-04");
        assert_eq!(progress_key(day, &player), "progress/2026-02-04/alice");
    }

    #[test]
    fn test_streak_defaults_when_missing() {
        let store = MemoryStore::new();
        let record = load_streak(&store, &PlayerId::from("nobody")).unwrap();
        assert_eq!(record, StreakRecord::default());
    }

    #[test]
    fn test_corrupt_value_is_error() {
        let store = MemoryStore::new();
        store.set("streak/alice", "not json").unwrap();
        assert!(matches!(
            load_streak(&store, &PlayerId::from("alice")),
            Err(StoreError::Serde(_))
        ));
    }

    #[test]
    fn test_clue_list_roundtrip() {
        let store = MemoryStore::new();
        let day = DayKey::from_ymd(2026, 2, 4).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 2, 4, 10, 0, 0).unwrap();
        let clue = CommunityClue::new(PlayerId::from("bob"), "the happy arrow", now);

        save_clues(&store, day, &[clue.clone()]).unwrap();
        assert_eq!(load_clues(&store, day).unwrap(), vec![clue]);
        assert!(load_clues(&store, day.next_day().unwrap()).unwrap().is_empty());
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let path = temp_path();

        {
            let store = FileStore::open(&path).unwrap();
            assert_eq!(store.get("streak/alice").unwrap(), None);
            store.set("streak/alice", "{\"streakDays\":3}").unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("streak/alice").unwrap().as_deref(),
            Some("{\"streakDays\":3}")
        );

        let record = load_streak(&reopened, &PlayerId::from("alice")).unwrap();
        assert_eq!(record.streak_days, 3);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_prune_progress_keeps_today_and_other_keys() {
        let store = MemoryStore::new();
        let feb3 = DayKey::from_ymd(2026, 2, 3).unwrap();
        let feb4 = DayKey::from_ymd(2026, 2, 4).unwrap();
        let alice = PlayerId::from("alice");
        let bob = PlayerId::from("bob");
        let started = Utc.with_ymd_and_hms(2026, 2, 3, 9, 0, 0).unwrap();

        save_progress(&store, &alice, &PlayerDailyState::new(feb3, "tp-001", started, 0)).unwrap();
        save_progress(&store, &bob, &PlayerDailyState::new(feb3, "tp-001", started, 0)).unwrap();
        save_progress(&store, &alice, &PlayerDailyState::new(feb4, "tp-002", started, 0)).unwrap();
        save_clues(&store, feb3, &[]).unwrap();
        store.set("streak/alice", "{}").unwrap();

        assert_eq!(prune_progress_before(&store, feb4).unwrap(), 2);
        assert_eq!(load_progress(&store, feb3, &alice).unwrap(), None);
        assert!(load_progress(&store, feb4, &alice).unwrap().is_some());
        assert!(store.get(&clues_key(feb3)).unwrap().is_some());
        assert!(store.get("streak/alice").unwrap().is_some());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_file_store_prune_survives_reopen() {
        let path = temp_path();
        let feb3 = DayKey::from_ymd(2026, 2, 3).unwrap();
        let feb4 = DayKey::from_ymd(2026, 2, 4).unwrap();

        {
            let store = FileStore::open(&path).unwrap();
            store.set(&progress_key(feb3, &PlayerId::from("alice")), "{}").unwrap();
            store.set(&progress_key(feb4, &PlayerId::from("alice")), "{}").unwrap();
            assert_eq!(prune_progress_before(&store, feb4).unwrap(), 1);
            assert_eq!(prune_progress_before(&store, feb4).unwrap(), 0);
        }

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(&progress_key(feb3, &PlayerId::from("alice"))).unwrap(), None);
        assert!(reopened.get(&progress_key(feb4, &PlayerId::from("alice"))).unwrap().is_some());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
