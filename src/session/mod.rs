//! Session Layer
//!
//! Mutable per-player, per-day state on top of the pure game functions.
//! This layer is **non-deterministic**: it reads the caller's clock,
//! persists through the store and reports to the host.

pub mod daily;
pub mod host;
pub mod manager;
pub mod store;

pub use daily::{
    ClueSubmitRejection, DailySession, GuessOutcome, GuessRejection, HintRejection, SessionConfig,
};
pub use host::{BroadcastHost, HostChannel, NullHost};
pub use manager::{SessionKey, SessionManager};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
