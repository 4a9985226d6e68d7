use async_trait::async_trait;
use reqwest::Client;

use crate::{
    error::ApiError,
    http,
    model::{Forecast, Query, WeatherRecord},
};

use super::WeatherSource;

/// Weather served by the dashboard backend, which proxies the upstream API
/// and returns flat records.
#[derive(Debug, Clone)]
pub struct BackendWeather {
    base_url: String,
    http: Client,
}

impl BackendWeather {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            base_url: base_url.to_string(),
            http: http::client()?,
        })
    }

    async fn fetch_current(&self, query: &Query) -> Result<WeatherRecord, ApiError> {
        let key = query.to_string();
        let url = http::endpoint(&self.base_url, &[&key])?;
        tracing::debug!(%url, "fetching current weather from backend");

        let raw: serde_json::Value = http::send_json(self.http.get(url), "backend weather")
            .await
            .map_err(|e| http::not_found_as_city(e, &key))?;

        // The backend answers unknown places with an empty object on some deployments.
        let has_city = raw
            .get("city")
            .and_then(|c| c.as_str())
            .is_some_and(|c| !c.is_empty());
        if !has_city {
            return Err(ApiError::CityNotFound(key));
        }

        serde_json::from_value(raw).map_err(|e| ApiError::Decode(format!("backend weather: {e}")))
    }

    async fn fetch_forecast(&self, query: &Query) -> Result<Forecast, ApiError> {
        let key = query.to_string();
        let url = http::endpoint(&self.base_url, &["forecast", &key])?;
        tracing::debug!(%url, "fetching forecast from backend");

        http::send_json(self.http.get(url), "backend forecast")
            .await
            .map_err(|e| http::not_found_as_city(e, &key))
    }
}

#[async_trait]
impl WeatherSource for BackendWeather {
    async fn current(&self, query: &Query) -> Result<WeatherRecord, ApiError> {
        self.fetch_current(query).await
    }

    async fn forecast(&self, query: &Query) -> Result<Forecast, ApiError> {
        self.fetch_forecast(query).await
    }
}
