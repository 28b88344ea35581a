//! Engine Configuration
//!
//! Startup settings read from the environment.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::game::clue::DEFAULT_CLUE_LIMIT;
use crate::game::puzzle::PuzzleBank;
use crate::session::daily::SessionConfig;
use crate::session::store::{FileStore, KeyValueStore, MemoryStore, StoreError};
use crate::EngineError;

/// Engine configuration.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// JSON puzzle bank. The built-in bank is used when unset.
    pub bank_path: Option<PathBuf>,
    /// Durable JSON store. An in-memory store is used when unset.
    pub store_path: Option<PathBuf>,
    /// Number of community clues displayed.
    pub clue_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bank_path: None,
            store_path: None,
            clue_limit: DEFAULT_CLUE_LIMIT,
        }
    }
}

impl EngineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            bank_path: std::env::var("THREADPULSE_BANK_PATH").ok().map(PathBuf::from),
            store_path: std::env::var("THREADPULSE_STORE_PATH").ok().map(PathBuf::from),
            clue_limit: std::env::var("THREADPULSE_CLUE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&limit| limit > 0)
                .unwrap_or(DEFAULT_CLUE_LIMIT),
        }
    }

    /// Load the configured puzzle bank. Fatal on failure.
    pub fn load_bank(&self) -> Result<PuzzleBank, EngineError> {
        let bank = match &self.bank_path {
            Some(path) => PuzzleBank::load(path)?,
            None => PuzzleBank::builtin()?,
        };
        info!(puzzles = bank.len(), fingerprint = %bank.fingerprint_hex(), "Puzzle bank ready");
        Ok(bank)
    }

    /// Open the configured store.
    pub fn open_store(&self) -> Result<Arc<dyn KeyValueStore>, StoreError> {
        match &self.store_path {
            Some(path) => Ok(Arc::new(FileStore::open(path)?)),
            None => Ok(Arc::new(MemoryStore::new())),
        }
    }

    /// Session settings derived from this config.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            clue_limit: self.clue_limit,
            ..SessionConfig::default()
        }
    }
}
