//! Theme Catalog
//!
//! Named symbol collections that decks are dealt from. A fresh catalog
//! is seeded with four default themes.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::rng::DeckRng;
use crate::game::deck::{self, Card, Difficulty};
use crate::store::{StoreError, ThemeStore};

/// One card face. Opaque to the engine.
pub type Symbol = String;

/// Theme identifier assigned by the store.
pub type ThemeId = u64;

/// A named, ordered collection of symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Store-assigned identifier.
    pub id: ThemeId,
    /// Unique display name.
    pub name: String,
    /// Card faces, in the order decks draw them.
    pub symbols: Vec<Symbol>,
}

/// Themes inserted into an empty catalog.
pub const DEFAULT_THEMES: [(&str, [&str; 8]); 4] = [
    ("Frutas", ["🍎", "🍌", "🍇", "🍓", "🍊", "🥭", "🍍", "🥥"]),
    ("Animais", ["🐶", "🐱", "🐭", "🐹", "🐰", "🦊", "🐻", "🐼"]),
    ("Esportes", ["⚽", "🏀", "🏈", "⚾", "🎾", "🏐", "🏉", "🎱"]),
    ("Expressões", ["😀", "😍", "🥳", "😎", "🙄", "😱", "🤔", "😴"]),
];

/// Catalog errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// No theme has this id.
    #[error("theme {0} not found")]
    NotFound(ThemeId),

    /// A theme needs at least one symbol.
    #[error("theme must have at least one symbol")]
    EmptyTheme,

    /// Theme names are unique.
    #[error("theme name already in use: {0}")]
    DuplicateName(String),

    /// Store failure.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CatalogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(name) => CatalogError::DuplicateName(name),
            other => CatalogError::Store(other),
        }
    }
}

/// Theme lookup and themed deck dealing over a [`ThemeStore`].
pub struct ThemeCatalog<S> {
    store: S,
}

impl<S: ThemeStore> ThemeCatalog<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Insert the default themes if the catalog is empty.
    ///
    /// Returns how many themes were inserted. A name conflict means a
    /// concurrent boot already seeded that theme and is skipped, so
    /// racing first starts never duplicate rows.
    pub fn seed_defaults(&self) -> Result<usize, CatalogError> {
        if self.store.count_themes()? > 0 {
            debug!("Theme catalog already populated, skipping defaults");
            return Ok(0);
        }

        let mut inserted = 0;
        for (name, symbols) in DEFAULT_THEMES {
            let symbols: Vec<Symbol> = symbols.iter().map(|s| s.to_string()).collect();
            match self.store.insert_theme(name, &symbols) {
                Ok(_) => inserted += 1,
                Err(StoreError::Conflict(_)) => {
                    debug!("Default theme {} already present", name);
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!("Seeded {} default themes", inserted);
        Ok(inserted)
    }

    /// All themes in insertion order.
    pub fn list_themes(&self) -> Result<Vec<Theme>, CatalogError> {
        Ok(self.store.all_themes()?)
    }

    /// Look up a theme by id.
    pub fn get_theme(&self, id: ThemeId) -> Result<Theme, CatalogError> {
        self.store.find_theme(id)?.ok_or(CatalogError::NotFound(id))
    }

    /// Create a new theme.
    pub fn create_theme(&self, name: &str, symbols: Vec<Symbol>) -> Result<Theme, CatalogError> {
        if symbols.is_empty() {
            return Err(CatalogError::EmptyTheme);
        }
        let theme = self.store.insert_theme(name, &symbols)?;
        info!("Created theme {} ({}) with {} symbols", theme.name, theme.id, theme.symbols.len());
        Ok(theme)
    }

    /// Deal a deck from a theme at the given difficulty.
    ///
    /// The theme is resolved before any card is generated.
    pub fn deal(
        &self,
        theme_id: ThemeId,
        difficulty: Difficulty,
        rng: &mut DeckRng,
    ) -> Result<Vec<Card>, CatalogError> {
        let theme = self.get_theme(theme_id)?;
        let cards = deck::generate(&theme.symbols, difficulty.pair_count(), rng);
        debug!(
            "Dealt {} cards from theme {} at {:?} (seed {})",
            cards.len(), theme_id, difficulty, rng.seed()
        );
        Ok(cards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn seeded_catalog() -> ThemeCatalog<Arc<MemoryStore>> {
        let catalog = ThemeCatalog::new(Arc::new(MemoryStore::new()));
        catalog.seed_defaults().unwrap();
        catalog
    }

    #[test]
    fn test_seed_defaults_inserts_four_themes() {
        let catalog = seeded_catalog();
        let themes = catalog.list_themes().unwrap();

        let names: Vec<_> = themes.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Frutas", "Animais", "Esportes", "Expressões"]);
        assert!(themes.iter().all(|t| t.symbols.len() == 8));
    }

    #[test]
    fn test_seed_defaults_is_idempotent() {
        let catalog = seeded_catalog();
        assert_eq!(catalog.seed_defaults().unwrap(), 0);
        assert_eq!(catalog.list_themes().unwrap().len(), 4);
    }

    #[test]
    fn test_seed_skipped_when_any_theme_exists() {
        let catalog = ThemeCatalog::new(Arc::new(MemoryStore::new()));
        catalog.create_theme("Custom", vec!["a".to_string()]).unwrap();

        assert_eq!(catalog.seed_defaults().unwrap(), 0);
        assert_eq!(catalog.list_themes().unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_seeding_never_duplicates() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let catalog = ThemeCatalog::new(store.clone());
                std::thread::spawn(move || catalog.seed_defaults().unwrap())
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let themes = ThemeCatalog::new(store).list_themes().unwrap();
        let mut by_name: BTreeMap<String, usize> = BTreeMap::new();
        for theme in &themes {
            *by_name.entry(theme.name.clone()).or_default() += 1;
        }
        assert_eq!(by_name.len(), 4);
        assert!(by_name.values().all(|count| *count == 1));
    }

    #[test]
    fn test_get_theme_returns_symbols_in_order() {
        let catalog = seeded_catalog();
        let fruits = catalog.get_theme(1).unwrap();

        assert_eq!(fruits.name, "Frutas");
        assert_eq!(
            fruits.symbols,
            vec!["🍎", "🍌", "🍇", "🍓", "🍊", "🥭", "🍍", "🥥"]
        );
    }

    #[test]
    fn test_get_unknown_theme_not_found() {
        let catalog = seeded_catalog();
        assert_eq!(catalog.get_theme(999), Err(CatalogError::NotFound(999)));
    }

    #[test]
    fn test_create_theme_validation() {
        let catalog = seeded_catalog();

        assert_eq!(catalog.create_theme("Vazio", vec![]), Err(CatalogError::EmptyTheme));
        assert_eq!(
            catalog.create_theme("Frutas", vec!["x".to_string()]),
            Err(CatalogError::DuplicateName("Frutas".to_string()))
        );

        let theme = catalog.create_theme("Cores", vec!["🔴".to_string(), "🔵".to_string()]).unwrap();
        assert_eq!(theme.id, 5);
    }

    #[test]
    fn test_deal_unknown_theme_fails_first() {
        let catalog = seeded_catalog();
        let mut rng = DeckRng::new(1);
        assert_eq!(
            catalog.deal(42, Difficulty::Easy, &mut rng),
            Err(CatalogError::NotFound(42))
        );
    }

    #[test]
    fn test_deal_by_difficulty() {
        let catalog = seeded_catalog();
        let mut rng = DeckRng::new(7);

        assert_eq!(catalog.deal(2, Difficulty::Easy, &mut rng).unwrap().len(), 8);
        assert_eq!(catalog.deal(2, Difficulty::Medium, &mut rng).unwrap().len(), 16);
        // Hard asks for 12 pairs but the theme only has 8
        assert_eq!(catalog.deal(2, Difficulty::Hard, &mut rng).unwrap().len(), 16);
    }

    #[test]
    fn test_deal_clamps_to_small_theme() {
        let catalog = ThemeCatalog::new(Arc::new(MemoryStore::new()));
        let theme = catalog
            .create_theme("Mini", vec!["a".into(), "b".into(), "c".into()])
            .unwrap();

        let cards = catalog.deal(theme.id, Difficulty::parse(Some("hard")), &mut DeckRng::new(3)).unwrap();
        assert_eq!(cards.len(), 6);
    }
}
