//! In-memory store.
//!
//! BTreeMaps keyed by sequential ids keep iteration in insertion order.
//! Each table sits behind its own lock so theme reads never wait on
//! score writes.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use super::{ScoreStore, StoreError, ThemeStore};
use crate::game::leaderboard::{Score, ScoreId};
use crate::game::theme::{Symbol, Theme, ThemeId};

#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<u64, T>,
    next_id: u64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Store backed by process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    themes: RwLock<Table<Theme>>,
    scores: RwLock<Table<Score>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn read<'a, T>(lock: &'a RwLock<T>, table: &str) -> Result<RwLockReadGuard<'a, T>, StoreError> {
    lock.read()
        .map_err(|_| StoreError::Unavailable(format!("{} lock poisoned", table)))
}

fn write<'a, T>(lock: &'a RwLock<T>, table: &str) -> Result<RwLockWriteGuard<'a, T>, StoreError> {
    lock.write()
        .map_err(|_| StoreError::Unavailable(format!("{} lock poisoned", table)))
}

impl ThemeStore for MemoryStore {
    fn count_themes(&self) -> Result<usize, StoreError> {
        Ok(read(&self.themes, "themes")?.rows.len())
    }

    fn insert_theme(&self, name: &str, symbols: &[Symbol]) -> Result<Theme, StoreError> {
        // Hold the write lock across check and insert
        let mut table = write(&self.themes, "themes")?;
        if table.rows.values().any(|t| t.name == name) {
            return Err(StoreError::Conflict(name.to_string()));
        }

        let id = table.allocate_id();
        let theme = Theme {
            id,
            name: name.to_string(),
            symbols: symbols.to_vec(),
        };
        table.rows.insert(id, theme.clone());
        Ok(theme)
    }

    fn find_theme(&self, id: ThemeId) -> Result<Option<Theme>, StoreError> {
        Ok(read(&self.themes, "themes")?.rows.get(&id).cloned())
    }

    fn all_themes(&self) -> Result<Vec<Theme>, StoreError> {
        Ok(read(&self.themes, "themes")?.rows.values().cloned().collect())
    }
}

impl ScoreStore for MemoryStore {
    fn insert_score(&self, moves: u32, recorded_at: DateTime<Utc>) -> Result<Score, StoreError> {
        let mut table = write(&self.scores, "scores")?;
        let id: ScoreId = table.allocate_id();
        let score = Score { id, moves, recorded_at };
        table.rows.insert(id, score.clone());
        Ok(score)
    }

    fn lowest_moves(&self, limit: usize) -> Result<Vec<Score>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let table = read(&self.scores, "scores")?;
        let mut scores: Vec<&Score> = table.rows.values().collect();
        // Ids follow insertion, so (moves, id) orders ties oldest first
        let rank = |s: &&Score| (s.moves, s.id);
        if scores.len() > limit {
            scores.select_nth_unstable_by_key(limit - 1, rank);
            scores.truncate(limit);
        }
        scores.sort_unstable_by_key(rank);
        Ok(scores.into_iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn symbols(list: &[&str]) -> Vec<Symbol> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_theme_ids_are_sequential() {
        let store = MemoryStore::new();
        let a = store.insert_theme("A", &symbols(&["x"])).unwrap();
        let b = store.insert_theme("B", &symbols(&["y"])).unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.count_themes().unwrap(), 2);
    }

    #[test]
    fn test_duplicate_theme_name_conflicts() {
        let store = MemoryStore::new();
        store.insert_theme("Frutas", &symbols(&["🍎"])).unwrap();

        let err = store.insert_theme("Frutas", &symbols(&["🍌"])).unwrap_err();
        assert_eq!(err, StoreError::Conflict("Frutas".to_string()));
        assert_eq!(store.count_themes().unwrap(), 1);
    }

    #[test]
    fn test_find_and_list_themes() {
        let store = MemoryStore::new();
        store.insert_theme("B", &symbols(&["1", "2"])).unwrap();
        store.insert_theme("A", &symbols(&["3"])).unwrap();

        let found = store.find_theme(1).unwrap().unwrap();
        assert_eq!(found.symbols, symbols(&["1", "2"]));
        assert!(store.find_theme(42).unwrap().is_none());

        let names: Vec<_> = store.all_themes().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_lowest_moves_stable_ties() {
        let store = MemoryStore::new();
        let now = Utc::now();
        for moves in [20, 10, 20, 5] {
            store.insert_score(moves, now).unwrap();
        }

        let top = store.lowest_moves(10).unwrap();
        let pairs: Vec<_> = top.iter().map(|s| (s.moves, s.id)).collect();
        assert_eq!(pairs, vec![(5, 4), (10, 2), (20, 1), (20, 3)]);

        let two: Vec<_> = store.lowest_moves(2).unwrap().iter().map(|s| s.id).collect();
        assert_eq!(two, vec![4, 2]);
        assert!(store.lowest_moves(0).unwrap().is_empty());
    }

    #[test]
    fn test_lowest_moves_from_large_history() {
        let store = MemoryStore::new();
        let now = Utc::now();
        // 500 scores cycling through 50 move counts
        for i in 0..500u32 {
            store.insert_score(50 - (i % 50), now).unwrap();
        }

        let top = store.lowest_moves(10).unwrap();
        let pairs: Vec<_> = top.iter().map(|s| (s.moves, s.id)).collect();
        let expected: Vec<_> = (0..10u64).map(|k| (1, 50 + k * 50)).collect();
        assert_eq!(pairs, expected);
    }

    #[test]
    fn test_concurrent_theme_inserts_keep_names_unique() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || store.insert_theme("Animais", &symbols(&["🐶"])).is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(store.count_themes().unwrap(), 1);
    }
}
