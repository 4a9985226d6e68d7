use crate::{
    Config,
    error::ApiError,
    model::{Forecast, Query, WeatherRecord},
    provider::{backend::BackendWeather, openweather::OpenWeatherSource},
};
use anyhow::Context;
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

pub mod backend;
pub mod openweather;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Backend,
    OpenWeather,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Backend => "backend",
            ProviderId::OpenWeather => "openweather",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Backend, ProviderId::OpenWeather]
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, ProviderId::OpenWeather)
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "backend" => Ok(ProviderId::Backend),
            "openweather" => Ok(ProviderId::OpenWeather),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: backend, openweather."
            )),
        }
    }
}

/// A source of current conditions and daily forecasts.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn current(&self, query: &Query) -> Result<WeatherRecord, ApiError>;

    async fn forecast(&self, query: &Query) -> Result<Forecast, ApiError>;
}

/// Construct a weather source from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherSource>> {
    let boxed: Box<dyn WeatherSource> = match id {
        ProviderId::Backend => Box::new(BackendWeather::new(config.backend_url())?),
        ProviderId::OpenWeather => {
            let api_key = config
                .provider_api_key(id)
                .ok_or(ApiError::MissingApiKey(id.as_str()))
                .with_context(|| {
                    format!(
                        "No API key configured for provider '{id}'.\n\
                         Hint: run `weatherdash configure {id}` and enter your API key."
                    )
                })?;
            Box::new(OpenWeatherSource::new(api_key.to_owned())?)
        }
    };

    Ok(boxed)
}

/// Construct the default weather source from config, using `default_provider` field.
/// Falls back to the backend when nothing has been configured yet.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherSource>> {
    let id = match config.default_provider {
        Some(_) => config.default_provider_id()?,
        None => ProviderId::Backend,
    };
    provider_from_config(id, config)
}
