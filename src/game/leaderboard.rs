//! Leaderboard
//!
//! Fewest moves wins. Scores are append-only; the board is just a
//! bounded, ordered read over everything submitted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::store::{ScoreStore, StoreError};

/// Score identifier assigned by the store.
pub type ScoreId = u64;

/// Maximum number of entries returned by [`Leaderboard::top_scores`].
pub const TOP_SCORES_LIMIT: usize = 10;

/// A recorded game result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    /// Store-assigned identifier.
    pub id: ScoreId,
    /// Moves taken to clear the board.
    pub moves: u32,
    /// When the score was submitted.
    pub recorded_at: DateTime<Utc>,
}

/// Leaderboard errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeaderboardError {
    /// Store failure, passed through unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Score submission and ranking over a [`ScoreStore`].
pub struct Leaderboard<S> {
    store: S,
}

impl<S: ScoreStore> Leaderboard<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Record a result. Any move count is accepted.
    pub fn submit(&self, moves: u32) -> Result<Score, LeaderboardError> {
        let score = self.store.insert_score(moves, Utc::now())?;
        debug!("Recorded score {} with {} moves", score.id, score.moves);
        Ok(score)
    }

    /// Best scores, fewest moves first. Ties keep submission order.
    pub fn top_scores(&self) -> Result<Vec<Score>, LeaderboardError> {
        Ok(self.store.lowest_moves(TOP_SCORES_LIMIT)?)
    }
}
