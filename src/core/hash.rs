//! Hashing Primitives
//!
//! Provides deterministic hashing for:
//! - Day seed derivation (FNV-1a, 32-bit)
//! - Puzzle bank fingerprints (SHA-256) for operator verification

use sha2::{Digest, Sha256};

/// FNV-1a 32-bit offset basis.
pub const FNV_OFFSET_BASIS: u32 = 2166136261;

/// FNV-1a 32-bit prime.
pub const FNV_PRIME: u32 = 16777619;

/// Fingerprint output type (256 bits / 32 bytes)
pub type Fingerprint = [u8; 32];

/// FNV-1a over the Unicode code points of `input`.
///
/// Each step XORs the code point into the accumulator and multiplies by
/// the FNV prime with 32-bit wraparound.
#[inline]
pub fn fnv1a_32(input: &str) -> u32 {
    input.chars().fold(FNV_OFFSET_BASIS, |hash, c| {
        (hash ^ c as u32).wrapping_mul(FNV_PRIME)
    })
}

/// Deterministic hasher for fingerprinting ordered content.
///
/// Wraps SHA-256 with length-prefixed string updates so that
/// `["ab", "c"]` and `["a", "bc"]` never collide.
/// Order of updates is critical for determinism.
pub struct FingerprintHasher {
    hasher: Sha256,
}

impl FingerprintHasher {
    /// Create a new hasher with domain separator.
    pub fn new(domain: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(domain);
        Self { hasher }
    }

    /// Create hasher for a puzzle bank.
    pub fn for_puzzle_bank() -> Self {
        Self::new(b"THREADPULSE_BANK_V1")
    }

    /// Update with a u32 value (little-endian).
    #[inline]
    pub fn update_u32(&mut self, value: u32) {
        self.hasher.update(value.to_le_bytes());
    }

    /// Update with a length-prefixed string.
    #[inline]
    pub fn update_str(&mut self, value: &str) {
        self.update_u32(value.len() as u32);
        self.hasher.update(value.as_bytes());
    }

    /// Update with a length-prefixed list of strings.
    pub fn update_strs<S: AsRef<str>>(&mut self, values: &[S]) {
        self.update_u32(values.len() as u32);
        for value in values {
            self.update_str(value.as_ref());
        }
    }

    /// Finalize and return the fingerprint.
    pub fn finalize(self) -> Fingerprint {
        self.hasher.finalize().into()
    }
}
