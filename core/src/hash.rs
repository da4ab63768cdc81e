//! Deterministic structural hashing.
//!
//! [`HashCombiner`] folds a fixed sequence of integer fields into a single
//! `u64` using the polynomial `h = h * 23 + field`, starting from 17. The result
//! depends only on the field values and their order, so it is stable across
//! runs and processes (unlike `std::collections::hash_map::DefaultHasher`,
//! which is randomly seeded).
//!
//! The combination is not collision free: `(4, 24)` and `(5, 1)` fold to the
//! same value. Callers that use it as a lookup key must confirm a match with a
//! full field comparison.
//!
//! # Example
//!
//! ```
//! use rdg_core::hash::HashCombiner;
//!
//! let a = HashCombiner::new().add(256).add(256).finish();
//! let b = HashCombiner::new().add(256).add(256).finish();
//! let c = HashCombiner::new().add(256).add(128).finish();
//! assert_eq!(a, b);
//! assert_ne!(a, c);
//! ```

/// Seed value of an empty combination.
pub const HASH_SEED: u64 = 17;

/// Multiplier applied before each field is added.
pub const HASH_MULTIPLIER: u64 = 23;

/// Order-sensitive polynomial hash builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCombiner {
    state: u64,
}

impl HashCombiner {
    /// Start a new combination.
    pub const fn new() -> Self {
        Self { state: HASH_SEED }
    }

    /// Fold one field into the hash.
    #[must_use]
    pub const fn add(self, field: u64) -> Self {
        Self {
            state: self
                .state
                .wrapping_mul(HASH_MULTIPLIER)
                .wrapping_add(field),
        }
    }

    /// Get the combined hash value.
    pub const fn finish(self) -> u64 {
        self.state
    }
}

impl Default for HashCombiner {
    fn default() -> Self {
        Self::new()
    }
}
