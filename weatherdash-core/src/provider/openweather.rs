use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Timelike};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::{
    error::ApiError,
    http,
    model::{Forecast, ForecastDay, Query, WeatherRecord},
};

use super::WeatherSource;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const FORECAST_DAYS: usize = 5;
const MIDDAY_SECS: i64 = 12 * 3600;

#[derive(Debug, Clone)]
pub struct OpenWeatherSource {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherSource {
    pub fn new(api_key: String) -> Result<Self, ApiError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            api_key,
            base_url: base_url.to_string(),
            http: http::client()?,
        })
    }

    fn request(&self, resource: &str, query: &Query) -> Result<RequestBuilder, ApiError> {
        let url = http::endpoint(&self.base_url, &[resource])?;
        let req = self
            .http
            .get(url)
            .query(&[("appid", self.api_key.as_str()), ("units", "metric")]);

        Ok(match query {
            Query::City(name) => req.query(&[("q", name.as_str())]),
            Query::Coords { lat, lon } => {
                req.query(&[("lat", lat.to_string()), ("lon", lon.to_string())])
            }
        })
    }

    async fn fetch_current(&self, query: &Query) -> Result<WeatherRecord, ApiError> {
        let req = self.request("weather", query)?;
        let parsed: OwCurrentResponse = http::send_json(req, "OpenWeather current")
            .await
            .map_err(|e| http::not_found_as_city(e, &query.to_string()))?;

        let (description, _) = first_condition(&parsed.weather);

        Ok(WeatherRecord {
            city: parsed.name,
            country: parsed.sys.country.unwrap_or_default(),
            state: None,
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            temp_min: parsed.main.temp_min,
            temp_max: parsed.main.temp_max,
            description,
            wind_speed: parsed.wind.speed,
            wind_deg: parsed.wind.deg.unwrap_or_default(),
            humidity: parsed.main.humidity,
            sunrise: parsed.sys.sunrise.unwrap_or_default(),
            sunset: parsed.sys.sunset.unwrap_or_default(),
        })
    }

    async fn fetch_forecast(&self, query: &Query) -> Result<Forecast, ApiError> {
        let req = self.request("forecast", query)?;
        let parsed: OwForecastResponse = http::send_json(req, "OpenWeather forecast")
            .await
            .map_err(|e| http::not_found_as_city(e, &query.to_string()))?;

        if parsed.list.is_empty() {
            return Err(ApiError::Decode(
                "OpenWeather forecast response contained no data".to_string(),
            ));
        }

        Ok(Forecast {
            forecasts: daily_summary(&parsed.list, parsed.city.timezone),
            city: parsed.city.name,
            country: parsed.city.country,
        })
    }
}

/// Collapse 3-hourly entries into per-day min/max, taking the description and
/// icon from the slot closest to local midday.
fn daily_summary(entries: &[OwForecastEntry], tz_offset: i64) -> Vec<ForecastDay> {
    let mut days: BTreeMap<NaiveDate, Vec<(i64, &OwForecastEntry)>> = BTreeMap::new();

    for entry in entries {
        let Some(local) = DateTime::from_timestamp(entry.dt + tz_offset, 0) else {
            continue;
        };
        let secs_of_day = i64::from(local.num_seconds_from_midnight());
        days.entry(local.date_naive()).or_default().push((secs_of_day, entry));
    }

    days.into_iter()
        .take(FORECAST_DAYS)
        .filter_map(|(date, slots)| {
            let (_, rep) = slots.iter().min_by_key(|(secs, _)| (secs - MIDDAY_SECS).abs())?;
            let min_temp = slots.iter().map(|(_, e)| e.main.temp_min).fold(f64::INFINITY, f64::min);
            let max_temp = slots
                .iter()
                .map(|(_, e)| e.main.temp_max)
                .fold(f64::NEG_INFINITY, f64::max);
            let (description, icon) = first_condition(&rep.weather);

            Some(ForecastDay {
                date,
                icon,
                min_temp: min_temp.round(),
                max_temp: max_temp.round(),
                description,
            })
        })
        .collect()
}

fn first_condition(weather: &[OwWeather]) -> (String, String) {
    weather
        .first()
        .map(|w| (w.description.clone(), w.icon.clone().unwrap_or_default()))
        .unwrap_or_else(|| ("Unknown".to_string(), String::new()))
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    #[serde(default)]
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    name: String,
    country: String,
    #[serde(default)]
    timezone: i64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

#[async_trait]
impl WeatherSource for OpenWeatherSource {
    async fn current(&self, query: &Query) -> Result<WeatherRecord, ApiError> {
        self.fetch_current(query).await
    }

    async fn forecast(&self, query: &Query) -> Result<Forecast, ApiError> {
        self.fetch_forecast(query).await
    }
}
