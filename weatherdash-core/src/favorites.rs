use anyhow::Result;

use crate::{
    model::FavoriteEntry,
    storage::{FAVORITES_KEY, LocalStore},
};

const ICONS: [&str; 6] = ["☀️", "🌧️", "⛈️", "❄️", "🌫️", "☁️"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

/// Favorited cities, keyed by exact city name. Every mutation is written
/// through to local storage.
#[derive(Debug)]
pub struct FavoritesStore {
    store: LocalStore,
    favorites: Vec<FavoriteEntry>,
}

impl FavoritesStore {
    pub fn load(store: LocalStore) -> Result<Self> {
        let favorites = store.read(FAVORITES_KEY)?;
        Ok(Self { store, favorites })
    }

    pub fn list(&self) -> &[FavoriteEntry] {
        &self.favorites
    }

    pub fn is_favorite(&self, city: &str) -> bool {
        self.favorites.iter().any(|f| f.city == city)
    }

    pub fn get(&self, city: &str) -> Option<&FavoriteEntry> {
        self.favorites.iter().find(|f| f.city == city)
    }

    pub fn toggle(&mut self, entry: FavoriteEntry) -> Result<Toggle> {
        let outcome = if self.is_favorite(&entry.city) {
            self.favorites.retain(|f| f.city != entry.city);
            Toggle::Removed
        } else {
            self.favorites.push(entry);
            Toggle::Added
        };

        self.persist()?;
        Ok(outcome)
    }

    /// Returns `false` when `city` was not a favorite.
    pub fn remove(&mut self, city: &str) -> Result<bool> {
        let before = self.favorites.len();
        self.favorites.retain(|f| f.city != city);
        if self.favorites.len() == before {
            return Ok(false);
        }

        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> Result<()> {
        self.store.write(FAVORITES_KEY, &self.favorites)?;
        tracing::info!(count = self.favorites.len(), "favorites saved");
        Ok(())
    }
}

/// Stable decorative icon for a favorite, picked from the first character.
pub fn icon_for(city: &str) -> &'static str {
    let code = city.encode_utf16().next().unwrap_or(0) as usize;
    ICONS[code % ICONS.len()]
}
