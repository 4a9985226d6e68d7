//! Core library for the `weatherdash` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Weather sources (dashboard backend, OpenWeather) behind one trait
//! - City autocomplete with debouncing
//! - Search history synced with the backend, plus local favorites and alerts
//! - Derived views: comparison, map markers, analytics, themes
//!
//! It is used by `weatherdash-cli`, but can also be reused by other binaries or services.

pub mod advice;
pub mod alerts;
pub mod analytics;
pub mod compare;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod favorites;
pub mod format;
pub mod geocode;
pub mod history;
mod http;
pub mod map;
pub mod model;
pub mod provider;
pub mod storage;
pub mod theme;

pub use config::{Config, ProviderConfig};
pub use dashboard::{Dashboard, SearchOutcome};
pub use error::ApiError;
pub use model::{FavoriteEntry, Forecast, ForecastDay, HistoryEntry, Query, WeatherRecord};
pub use provider::{ProviderId, WeatherSource};
