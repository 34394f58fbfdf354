//! Game Mechanics
//!
//! ## Module Structure
//!
//! - `theme`: Theme catalog, default themes, themed deals
//! - `deck`: Card pairs, difficulty mapping, shuffling
//! - `leaderboard`: Score submission and ranking

pub mod theme;
pub mod deck;
pub mod leaderboard;

// Re-export key types
pub use theme::{Theme, ThemeId, Symbol, ThemeCatalog, CatalogError, DEFAULT_THEMES};
pub use deck::{Card, Difficulty, generate, generate_default};
pub use leaderboard::{Score, ScoreId, Leaderboard, LeaderboardError, TOP_SCORES_LIMIT};
