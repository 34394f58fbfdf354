//! Persistence Layer
//!
//! Themes and scores live behind two small store traits. The engine
//! only needs simple create/read calls; the store is responsible for
//! making each insert atomic and for enforcing theme name uniqueness.

pub mod memory;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::game::leaderboard::Score;
use crate::game::theme::{Symbol, Theme, ThemeId};

pub use memory::MemoryStore;

/// Store errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A theme with this name already exists.
    #[error("theme name already in use: {0}")]
    Conflict(String),

    /// The backing store could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Theme rows: id, unique name, ordered symbol list.
pub trait ThemeStore: Send + Sync {
    /// Number of stored themes.
    fn count_themes(&self) -> Result<usize, StoreError>;

    /// Insert a theme and assign its id.
    ///
    /// Fails with [`StoreError::Conflict`] when the name is taken. The
    /// uniqueness check and the insert happen as one step.
    fn insert_theme(&self, name: &str, symbols: &[Symbol]) -> Result<Theme, StoreError>;

    /// Look up a theme by id.
    fn find_theme(&self, id: ThemeId) -> Result<Option<Theme>, StoreError>;

    /// All themes in insertion order.
    fn all_themes(&self) -> Result<Vec<Theme>, StoreError>;
}

/// Score rows: id, moves, timestamp. Append-only.
pub trait ScoreStore: Send + Sync {
    /// Append a score and assign its id.
    fn insert_score(&self, moves: u32, recorded_at: DateTime<Utc>) -> Result<Score, StoreError>;

    /// Up to `limit` scores ordered by moves ascending, ties in insertion order.
    fn lowest_moves(&self, limit: usize) -> Result<Vec<Score>, StoreError>;
}

impl<T: ThemeStore + ?Sized> ThemeStore for Arc<T> {
    fn count_themes(&self) -> Result<usize, StoreError> {
        (**self).count_themes()
    }

    fn insert_theme(&self, name: &str, symbols: &[Symbol]) -> Result<Theme, StoreError> {
        (**self).insert_theme(name, symbols)
    }

    fn find_theme(&self, id: ThemeId) -> Result<Option<Theme>, StoreError> {
        (**self).find_theme(id)
    }

    fn all_themes(&self) -> Result<Vec<Theme>, StoreError> {
        (**self).all_themes()
    }
}

impl<T: ScoreStore + ?Sized> ScoreStore for Arc<T> {
    fn insert_score(&self, moves: u32, recorded_at: DateTime<Utc>) -> Result<Score, StoreError> {
        (**self).insert_score(moves, recorded_at)
    }

    fn lowest_moves(&self, limit: usize) -> Result<Vec<Score>, StoreError> {
        (**self).lowest_moves(limit)
    }
}
