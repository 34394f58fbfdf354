//! Deck Generation
//!
//! Builds a shuffled sequence of paired cards. The deck's shape is fixed
//! by its inputs (which symbols, how many pairs); only the order is random.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::rng::DeckRng;
use crate::game::theme::Symbol;

/// Card faces of the theme-less deck.
pub const DEFAULT_DECK_SYMBOLS: [&str; 8] = ["🍎", "🍌", "🍇", "🍓", "🍊", "🥭", "🍍", "🥥"];

/// Pair count of the theme-less deck.
pub const DEFAULT_DECK_PAIRS: usize = 8;

/// A single card. Ids are only meaningful within one deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Sequential id, starting at 1.
    pub id: u32,
    /// Card face.
    pub symbol: Symbol,
}

/// Deck difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    /// 4 pairs.
    Easy,
    /// 8 pairs.
    #[default]
    Medium,
    /// 12 pairs.
    Hard,
}

impl Difficulty {
    /// Parse a difficulty label, case-insensitively.
    ///
    /// Unknown or missing labels fall back to [`Difficulty::Medium`].
    pub fn parse(label: Option<&str>) -> Self {
        match label.map(str::to_lowercase).as_deref() {
            Some("easy") => Difficulty::Easy,
            Some("medium") => Difficulty::Medium,
            Some("hard") => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }

    /// Requested number of pairs before clamping to the theme size.
    pub fn pair_count(self) -> usize {
        match self {
            Difficulty::Easy => 4,
            Difficulty::Medium => 8,
            Difficulty::Hard => 12,
        }
    }
}

/// Generate a shuffled deck.
///
/// Takes the first `min(pair_count, symbols.len())` symbols, emits two
/// cards for each with ids 1, 2, 3, ... in symbol order, then applies a
/// uniform permutation.
pub fn generate(symbols: &[Symbol], pair_count: usize, rng: &mut DeckRng) -> Vec<Card> {
    let pair_count = pair_count.min(symbols.len());

    let mut cards: Vec<Card> = symbols[..pair_count]
        .iter()
        .flat_map(|symbol| [symbol, symbol])
        .enumerate()
        .map(|(i, symbol)| Card {
            id: i as u32 + 1,
            symbol: symbol.clone(),
        })
        .collect();

    rng.shuffle(&mut cards);
    cards
}

/// Generate the theme-less deck: 8 fruit pairs, regardless of difficulty.
pub fn generate_default(rng: &mut DeckRng) -> Vec<Card> {
    let symbols: Vec<Symbol> = DEFAULT_DECK_SYMBOLS.iter().map(|s| s.to_string()).collect();
    let cards = generate(&symbols, DEFAULT_DECK_PAIRS, rng);
    debug!("Dealt default deck of {} cards (seed {})", cards.len(), rng.seed());
    cards
}
