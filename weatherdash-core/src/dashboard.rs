//! The search flow that ties providers, history, favorites and alerts together.

use chrono::{DateTime, Utc};

use crate::{
    advice::{ClothingAdvisor, rule_suggestion},
    alerts::{AlertStore, condition_alerts},
    error::ApiError,
    favorites::FavoritesStore,
    history::HistoryStore,
    model::{Forecast, HistoryEntry, Query, WeatherRecord},
    provider::WeatherSource,
};

/// Everything shown after a successful search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub record: WeatherRecord,
    pub user_alerts: Vec<String>,
    pub condition_alerts: Vec<&'static str>,
    pub advice: &'static str,
    pub is_favorite: bool,
}

#[derive(Debug)]
pub struct Dashboard {
    source: Box<dyn WeatherSource>,
    history: HistoryStore,
    favorites: FavoritesStore,
    alerts: AlertStore,
    advisor: Option<ClothingAdvisor>,
}

impl Dashboard {
    pub fn new(
        source: Box<dyn WeatherSource>,
        history: HistoryStore,
        favorites: FavoritesStore,
        alerts: AlertStore,
    ) -> Self {
        Self { source, history, favorites, alerts, advisor: None }
    }

    pub fn with_advisor(mut self, advisor: ClothingAdvisor) -> Self {
        self.advisor = Some(advisor);
        self
    }

    pub fn source(&self) -> &dyn WeatherSource {
        self.source.as_ref()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStore {
        &mut self.history
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    pub fn favorites_mut(&mut self) -> &mut FavoritesStore {
        &mut self.favorites
    }

    pub fn alerts(&self) -> &AlertStore {
        &self.alerts
    }

    pub fn alerts_mut(&mut self) -> &mut AlertStore {
        &mut self.alerts
    }

    pub async fn search(&mut self, input: &str, now: DateTime<Utc>) -> Result<SearchOutcome, ApiError> {
        let query = Query::parse(input).ok_or(ApiError::EmptyQuery)?;
        tracing::debug!(%query, "searching");

        let record = self.source.current(&query).await?;

        if let Err(err) = self.history.record_search(&record, now).await {
            tracing::warn!(error = %err, city = %record.city, "history not saved");
        }

        Ok(SearchOutcome {
            user_alerts: self.alerts.evaluate(&record),
            condition_alerts: condition_alerts(record.temperature, &record.description),
            advice: rule_suggestion(&record),
            is_favorite: self.favorites.is_favorite(&record.city),
            record,
        })
    }

    pub async fn forecast(&self, input: &str) -> Result<Forecast, ApiError> {
        let query = Query::parse(input).ok_or(ApiError::EmptyQuery)?;
        self.source.forecast(&query).await
    }

    /// Backend clothing suggestion, if an advisor is attached.
    pub async fn clothing_suggestion(&self, record: &WeatherRecord) -> Option<String> {
        let advisor = self.advisor.as_ref()?;
        Some(advisor.suggest(record.temperature, &record.description).await)
    }

    pub fn open_history(&self, id: &str) -> Option<&HistoryEntry> {
        self.history.get(id)
    }
}
