use anyhow::{Result, anyhow};

use crate::{
    format::condition_icon,
    model::{Query, WeatherRecord},
    provider::WeatherSource,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapCity {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

pub const MAJOR_CITIES: [MapCity; 10] = [
    MapCity { name: "New York", lat: 40.7128, lon: -74.0060 },
    MapCity { name: "London", lat: 51.5074, lon: -0.1278 },
    MapCity { name: "Tokyo", lat: 35.6762, lon: 139.6503 },
    MapCity { name: "Paris", lat: 48.8566, lon: 2.3522 },
    MapCity { name: "Moscow", lat: 55.7558, lon: 37.6176 },
    MapCity { name: "Sydney", lat: -33.8688, lon: 151.2093 },
    MapCity { name: "Dubai", lat: 25.2048, lon: 55.2708 },
    MapCity { name: "Mumbai", lat: 19.0760, lon: 72.8777 },
    MapCity { name: "Beijing", lat: 39.9042, lon: 116.4074 },
    MapCity { name: "Rio de Janeiro", lat: -22.9068, lon: -43.1729 },
];

const QUICK_CITY_COUNT: usize = 6;

/// Cities offered as one-click buttons.
pub fn quick_cities() -> &'static [MapCity] {
    &MAJOR_CITIES[..QUICK_CITY_COUNT]
}

pub fn find_city(name: &str) -> Option<&'static MapCity> {
    MAJOR_CITIES.iter().find(|c| c.name.eq_ignore_ascii_case(name.trim()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: u64,
    pub city: &'static str,
    pub position: (f64, f64),
    pub weather: WeatherRecord,
}

impl Marker {
    pub fn icon(&self) -> &'static str {
        condition_icon(&self.weather.description)
    }
}

#[derive(Debug, Default)]
pub struct WeatherMap {
    markers: Vec<Marker>,
    next_id: u64,
}

impl WeatherMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Fetch weather for a catalog city and drop a marker on it.
    pub async fn fetch(&mut self, name: &str, source: &dyn WeatherSource) -> Result<&Marker> {
        let city = find_city(name).ok_or_else(|| anyhow!("{name} is not on the map"))?;

        let weather = source
            .current(&Query::City(city.name.to_string()))
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, city = city.name, "map fetch failed");
                anyhow!("Failed to fetch weather for {}", city.name)
            })?;

        self.next_id += 1;
        self.markers.push(Marker {
            id: self.next_id,
            city: city.name,
            position: (city.lat, city.lon),
            weather,
        });
        let last = self.markers.len() - 1;
        Ok(&self.markers[last])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ApiError, model::Forecast};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Knows Tokyo and Paris; counts every lookup.
    #[derive(Debug, Default)]
    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl WeatherSource for CountingSource {
        async fn current(&self, query: &Query) -> Result<WeatherRecord, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let name = query.to_string();
            let (temperature, description) = match name.as_str() {
                "Tokyo" => (22.0, "light rain"),
                "Paris" => (15.0, "clear sky"),
                _ => return Err(ApiError::Status { status: 503, body: String::new() }),
            };
            Ok(WeatherRecord {
                city: name,
                country: "XX".into(),
                state: None,
                temperature,
                feels_like: temperature,
                temp_min: temperature,
                temp_max: temperature,
                description: description.into(),
                wind_speed: 2.0,
                wind_deg: 0.0,
                humidity: 60.0,
                sunrise: 0,
                sunset: 0,
            })
        }

        async fn forecast(&self, query: &Query) -> Result<Forecast, ApiError> {
            Err(ApiError::CityNotFound(query.to_string()))
        }
    }

    #[tokio::test]
    async fn fetch_drops_markers_at_catalog_positions() {
        let source = CountingSource::default();
        let mut map = WeatherMap::new();

        let first = map.fetch("tokyo", &source).await.unwrap();
        assert_eq!(first.city, "Tokyo");
        assert_eq!(first.position, (35.6762, 139.6503));
        assert_eq!(first.weather.temperature, 22.0);
        let first_id = first.id;

        let second = map.fetch("Paris", &source).await.unwrap();
        assert!(second.id > first_id);
        assert_eq!(second.position, (48.8566, 2.3522));

        let ids: Vec<_> = map.markers().iter().map(|m| (m.id, m.city)).collect();
        assert_eq!(ids, vec![(first_id, "Tokyo"), (first_id + 1, "Paris")]);
    }

    #[tokio::test]
    async fn unknown_city_is_rejected_without_a_lookup() {
        let source = CountingSource::default();
        let mut map = WeatherMap::new();

        let err = map.fetch("Atlantis", &source).await.unwrap_err();
        assert_eq!(err.to_string(), "Atlantis is not on the map");
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert!(map.markers().is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_adds_no_marker() {
        let source = CountingSource::default();
        let mut map = WeatherMap::new();

        let err = map.fetch("Dubai", &source).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch weather for Dubai");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(map.markers().is_empty());
    }

    #[test]
    fn quick_cities_are_first_six() {
        let names: Vec<_> = quick_cities().iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["New York", "London", "Tokyo", "Paris", "Moscow", "Sydney"]);
    }

    #[test]
    fn find_city_ignores_case() {
        assert_eq!(find_city("rio de janeiro").map(|c| c.lat), Some(-22.9068));
        assert!(find_city("Atlantis").is_none());
    }
}
