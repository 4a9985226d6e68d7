//! Search history: a local mirror of the backend's `history` resource.
//!
//! Searches are applied optimistically (replace the entry for the same city,
//! or append) and then reconciled by refetching the whole list. The last
//! fetched list is cached in local storage so history can be shown offline.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use crate::{
    error::ApiError,
    model::{HistoryEntry, NewHistoryEntry, WeatherRecord},
    storage::{HISTORY_KEY, LocalStore},
};

pub mod remote;

pub use remote::RemoteHistory;

/// Number of entries shown before "view more".
pub const COLLAPSED_LEN: usize = 5;

#[async_trait]
pub trait HistoryBackend: Send + Sync + Debug {
    async fn list(&self) -> Result<Vec<HistoryEntry>, ApiError>;

    async fn create(&self, entry: &NewHistoryEntry) -> Result<(), ApiError>;

    async fn update_city(&self, id: &str, city: &str) -> Result<(), ApiError>;

    async fn delete(&self, id: &str) -> Result<(), ApiError>;
}

#[derive(Debug)]
pub struct HistoryStore {
    backend: Box<dyn HistoryBackend>,
    store: LocalStore,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// Build a store primed with the cached list. A missing or unreadable
    /// cache starts empty; the next refresh rewrites it.
    pub fn new(backend: Box<dyn HistoryBackend>, store: LocalStore) -> Result<Self> {
        let mut history = Self { backend, store, entries: Vec::new() };
        if let Err(err) = history.load_cached() {
            tracing::warn!(error = %format!("{err:#}"), "ignoring unreadable history cache");
        }
        Ok(history)
    }

    /// Replace the in-memory list with the one mirrored by the last refresh.
    pub fn load_cached(&mut self) -> Result<&[HistoryEntry]> {
        self.entries = self.store.read(HISTORY_KEY)?;
        Ok(&self.entries)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id.as_deref() == Some(id))
    }

    pub fn visible(&self, show_all: bool) -> &[HistoryEntry] {
        if show_all {
            &self.entries
        } else {
            &self.entries[..self.entries.len().min(COLLAPSED_LEN)]
        }
    }

    pub fn has_more(&self) -> bool {
        self.entries.len() > COLLAPSED_LEN
    }

    /// Distinct searched city names in list order.
    pub fn recent_cities(&self) -> Vec<String> {
        let mut cities: Vec<String> = Vec::new();
        for entry in &self.entries {
            if !cities.iter().any(|c| c.eq_ignore_ascii_case(&entry.city)) {
                cities.push(entry.city.clone());
            }
        }
        cities
    }

    /// Replace the local list with the backend's. On failure the current list is kept.
    pub async fn refresh(&mut self) -> Result<&[HistoryEntry]> {
        match self.backend.list().await {
            Ok(entries) => {
                tracing::debug!(count = entries.len(), "history refreshed");
                self.entries = entries;
                self.mirror()?;
                Ok(&self.entries)
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch history; keeping previous list");
                Err(err).context("Failed to fetch history")
            }
        }
    }

    /// Record a successful search: optimistic upsert, save remotely, refetch.
    ///
    /// Errors only when the entry could not be saved. A failed refetch after
    /// a successful save keeps the optimistic list.
    pub async fn record_search(&mut self, record: &WeatherRecord, now: DateTime<Utc>) -> Result<()> {
        let new_entry = NewHistoryEntry::from_record(record, now);
        self.apply_optimistic(&new_entry);
        self.mirror()?;

        self.backend
            .create(&new_entry)
            .await
            .context("Failed to save weather history")?;
        tracing::info!(city = %new_entry.city, "history entry saved");

        if let Err(err) = self.refresh().await {
            tracing::warn!(error = %format!("{err:#}"), city = %new_entry.city, "history saved but not refetched");
        }
        Ok(())
    }

    fn apply_optimistic(&mut self, new_entry: &NewHistoryEntry) {
        let existing = self
            .entries
            .iter()
            .position(|e| e.city.to_lowercase() == new_entry.city.to_lowercase());

        match existing {
            Some(index) => {
                let id = self.entries[index].id.take();
                self.entries[index] = HistoryEntry { id, ..HistoryEntry::from(new_entry.clone()) };
            }
            None => self.entries.push(HistoryEntry::from(new_entry.clone())),
        }
    }

    pub async fn delete(&mut self, id: &str) -> Result<()> {
        self.backend
            .delete(id)
            .await
            .with_context(|| format!("Failed to delete history item {id}"))?;
        tracing::info!(id, "history entry deleted");

        self.refresh().await?;
        Ok(())
    }

    /// Rename the city of entry `id`. Returns the refreshed entry for the new
    /// name, if the backend now has one.
    pub async fn rename(&mut self, id: &str, city: &str) -> Result<Option<HistoryEntry>> {
        let city = city.trim();
        if city.is_empty() {
            return Err(ApiError::EmptyQuery.into());
        }

        self.backend
            .update_city(id, city)
            .await
            .with_context(|| format!("Failed to update history item {id}"))?;
        tracing::info!(id, city, "history entry renamed");

        let refreshed = self.refresh().await?;
        Ok(refreshed
            .iter()
            .find(|e| e.city.to_lowercase() == city.to_lowercase())
            .cloned())
    }

    fn mirror(&self) -> Result<()> {
        self.store.write(HISTORY_KEY, &self.entries)
    }
}
