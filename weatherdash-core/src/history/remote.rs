use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::{
    error::ApiError,
    http,
    model::{HistoryEntry, NewHistoryEntry},
};

use super::HistoryBackend;

/// REST client for the `history` resource of the dashboard backend.
#[derive(Debug, Clone)]
pub struct RemoteHistory {
    base_url: String,
    http: Client,
}

#[derive(Debug, Serialize)]
struct CityUpdate<'a> {
    city: &'a str,
}

impl RemoteHistory {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            base_url: base_url.to_string(),
            http: http::client()?,
        })
    }
}

#[async_trait]
impl HistoryBackend for RemoteHistory {
    async fn list(&self) -> Result<Vec<HistoryEntry>, ApiError> {
        let url = http::endpoint(&self.base_url, &["history"])?;
        http::send_json(self.http.get(url), "history list").await
    }

    async fn create(&self, entry: &NewHistoryEntry) -> Result<(), ApiError> {
        let url = http::endpoint(&self.base_url, &["history"])?;
        http::send_text(self.http.post(url).json(entry), "history create").await?;
        Ok(())
    }

    async fn update_city(&self, id: &str, city: &str) -> Result<(), ApiError> {
        let url = http::endpoint(&self.base_url, &["history", id])?;
        http::send_text(self.http.put(url).json(&CityUpdate { city }), "history update").await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), ApiError> {
        let url = http::endpoint(&self.base_url, &["history", id])?;
        http::send_text(self.http.delete(url), "history delete").await?;
        Ok(())
    }
}
