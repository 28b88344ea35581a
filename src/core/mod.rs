//! Core deterministic primitives.
//!
//! All types in this module are designed for perfect cross-platform determinism.
//! They form the foundation of the daily puzzle schedule.

pub mod day;
pub mod hash;
pub mod rng;

// Re-export core types
pub use day::{DayKey, DayKeyParseError};
pub use hash::{fnv1a_32, Fingerprint, FingerprintHasher};
pub use rng::DailyRng;
