//! Deterministic Random Number Generator
//!
//! Uses the Mulberry32 algorithm for small, fast, deterministic randomness.
//! Given the same seed, produces identical sequence on all platforms.
//! Every step is 32-bit wrapping integer arithmetic; no floating point is
//! involved until the final division.

use serde::{Deserialize, Serialize};

/// Mulberry32 state increment.
pub const MULBERRY32_INCREMENT: u32 = 0x6D2B_79F5;

/// 2^32 as a float, the divisor for unit draws.
const TWO_POW_32: f64 = 4_294_967_296.0;

/// Deterministic PRNG using Mulberry32.
///
/// # Determinism Guarantee
///
/// Given the same seed, this RNG will produce the exact same sequence
/// of values on any platform.
///
/// # Example
///
/// ```
/// use threadpulse::core::rng::DailyRng;
///
/// let mut rng = DailyRng::new(0);
/// assert_eq!(rng.next_u32(), 1144304738); // Always the same!
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DailyRng {
    state: u32,
}

impl DailyRng {
    /// Create a new RNG from a 32-bit seed.
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Generate the next 32-bit output.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(MULBERRY32_INCREMENT);
        let t = self.state;
        let mut r = (t ^ (t >> 15)).wrapping_mul(t | 1);
        r ^= r.wrapping_add((r ^ (r >> 7)).wrapping_mul(r | 61));
        r ^ (r >> 14)
    }

    /// Generate a float in [0, 1).
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / TWO_POW_32
    }

    /// Generate an index in [0, len).
    ///
    /// Equal to `floor(next_f64() * len)`, computed in integers so the
    /// result is exact for any bank size.
    #[inline]
    pub fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.next_u32() as u64 * len as u64) >> 32) as usize
    }

    /// Get current state (for checkpointing/debugging).
    pub fn state(&self) -> u32 {
        self.state
    }

    /// Restore from saved state.
    pub fn set_state(&mut self, state: u32) {
        self.state = state;
    }
}

// =============================================================================
// TESTS
// =============================================================================
