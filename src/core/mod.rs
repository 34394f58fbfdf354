//! Core primitives.
//!
//! Reproducible randomness shared by the game modules.

pub mod rng;

pub use rng::{derive_deck_seed, DeckRng};
