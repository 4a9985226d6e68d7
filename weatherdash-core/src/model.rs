use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the user asked the weather source for: a city name or a coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    City(String),
    Coords { lat: f64, lon: f64 },
}

impl Query {
    /// Parse raw search input. `"lat,lon"` with two numbers becomes coordinates,
    /// anything else is treated as a city name. Returns `None` for blank input.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some((lat, lon)) = trimmed.split_once(',') {
            if let (Ok(lat), Ok(lon)) = (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) {
                return Some(Query::Coords { lat, lon });
            }
        }

        Some(Query::City(trimmed.to_string()))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::City(name) => f.write_str(name),
            Query::Coords { lat, lon } => write!(f, "{lat},{lon}"),
        }
    }
}

/// Current conditions for one place, as consumed by every dashboard view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub city: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub temperature: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub description: String,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub humidity: f64,
    /// Unix seconds.
    pub sunrise: i64,
    /// Unix seconds.
    pub sunset: i64,
}

impl WeatherRecord {
    pub fn location_label(&self) -> String {
        match &self.state {
            Some(state) if !state.is_empty() => format!("{}, {}, {}", self.city, state, self.country),
            _ => format!("{}, {}", self.city, self.country),
        }
    }
}

/// A persisted search. `id` is assigned by the history backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub city: String,
    pub temperature: f64,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f64>,
}

/// Body sent to the backend when a search succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    pub city: String,
    pub temperature: f64,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl NewHistoryEntry {
    pub fn from_record(record: &WeatherRecord, now: DateTime<Utc>) -> Self {
        Self {
            city: record.city.clone(),
            temperature: record.temperature,
            description: record.description.clone(),
            timestamp: now,
        }
    }
}

impl From<NewHistoryEntry> for HistoryEntry {
    fn from(entry: NewHistoryEntry) -> Self {
        Self {
            id: None,
            city: entry.city,
            temperature: entry.temperature,
            description: entry.description,
            timestamp: entry.timestamp,
            wind_speed: None,
        }
    }
}

/// A favorited city; keyed by `city`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub city: String,
    #[serde(default)]
    pub country: String,
    pub temperature: f64,
    pub description: String,
    #[serde(default)]
    pub humidity: f64,
    #[serde(default)]
    pub wind_speed: f64,
}

impl From<&WeatherRecord> for FavoriteEntry {
    fn from(record: &WeatherRecord) -> Self {
        Self {
            city: record.city.clone(),
            country: record.country.clone(),
            temperature: record.temperature,
            description: record.description.clone(),
            humidity: record.humidity,
            wind_speed: record.wind_speed,
        }
    }
}

impl From<&HistoryEntry> for FavoriteEntry {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            city: entry.city.clone(),
            country: String::new(),
            temperature: entry.temperature,
            description: entry.description.clone(),
            humidity: 0.0,
            wind_speed: entry.wind_speed.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub icon: String,
    pub min_temp: f64,
    pub max_temp: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub city: String,
    pub country: String,
    pub forecasts: Vec<ForecastDay>,
}
