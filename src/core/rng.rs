//! Deck Random Number Generator
//!
//! Uses Xorshift128+ for fast, reproducible shuffles. A deck dealt from a
//! given seed is identical on every platform, which makes games replayable
//! and tests exact. Seeds for normal play are derived from fresh entropy.

use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

/// Seedable PRNG using the Xorshift128+ algorithm.
///
/// A 64-bit seed selects one of at most 2^64 shuffles. Easy and medium
/// decks (up to 16 cards, 16! < 2^45) have far fewer orderings than that,
/// but a 24-card hard deck has about 2^79, so most of its orderings can
/// never be dealt. Index draws within a shuffle remain unbiased.
///
/// # Example
///
/// ```
/// use memory_match::core::rng::DeckRng;
///
/// let mut a = DeckRng::new(12345);
/// let mut b = DeckRng::new(12345);
/// assert_eq!(a.next_u64(), b.next_u64());
/// ```
#[derive(Clone, Debug)]
pub struct DeckRng {
    state: [u64; 2],
    seed: u64,
}

impl DeckRng {
    /// Create a new RNG from a 64-bit seed.
    ///
    /// SplitMix64 expands the seed so that small or sequential seeds
    /// still give well-mixed state.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // All-zero state is a fixed point of the generator
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state, seed }
    }

    /// Create an RNG seeded from fresh entropy.
    pub fn from_entropy() -> Self {
        Self::new(derive_deck_seed())
    }

    /// Create from an optional seed, falling back to fresh entropy.
    pub fn from_seed_or_entropy(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(seed),
            None => Self::from_entropy(),
        }
    }

    /// The seed this generator was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Generate a random integer in range [0, bound).
    ///
    /// Rejection sampling keeps every value equally likely.
    #[inline]
    pub fn next_below(&mut self, bound: u64) -> u64 {
        if bound <= 1 {
            return 0;
        }
        // Largest multiple of `bound` that fits in u64
        let zone = u64::MAX - (u64::MAX % bound);
        loop {
            let value = self.next_u64();
            if value < zone {
                return value % bound;
            }
        }
    }

    /// Shuffle a slice in place using the Fisher-Yates algorithm.
    ///
    /// Every permutation of the slice is equally likely.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        let len = slice.len();
        for i in (1..len).rev() {
            let j = self.next_below((i + 1) as u64) as usize;
            slice.swap(i, j);
        }
    }
}

/// SplitMix64 for seed initialization.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Derive a fresh deck seed.
///
/// Mixes a random v4 UUID with the wall clock through SHA-256, so two
/// deals started in the same nanosecond still diverge.
pub fn derive_deck_seed() -> u64 {
    let mut hasher = Sha256::new();

    // Domain separator
    hasher.update(b"MEMORY_MATCH_DECK_SEED_V1");
    hasher.update(uuid::Uuid::new_v4().as_bytes());

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    hasher.update(nanos.to_le_bytes());

    let hash = hasher.finalize();
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&hash[..8]);
    u64::from_le_bytes(seed)
}

// =============================================================================
// TESTS
// =============================================================================
