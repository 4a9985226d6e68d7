use anyhow::{Result, anyhow, bail};

use crate::{
    model::{Query, WeatherRecord},
    provider::WeatherSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempBand {
    Hot,
    Warm,
    Mild,
    Cold,
}

impl TempBand {
    pub fn of(temperature: f64) -> Self {
        if temperature >= 30.0 {
            TempBand::Hot
        } else if temperature >= 20.0 {
            TempBand::Warm
        } else if temperature >= 10.0 {
            TempBand::Mild
        } else {
            TempBand::Cold
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSummary {
    pub hottest: WeatherRecord,
    pub coldest: WeatherRecord,
    pub average: f64,
    pub count: usize,
}

/// Side-by-side current conditions for several cities.
#[derive(Debug, Default)]
pub struct CityComparison {
    cities: Vec<WeatherRecord>,
}

impl CityComparison {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cities(&self) -> &[WeatherRecord] {
        &self.cities
    }

    fn contains(&self, city: &str) -> bool {
        self.cities.iter().any(|c| c.city.to_lowercase() == city.to_lowercase())
    }

    pub async fn add(&mut self, city: &str, source: &dyn WeatherSource) -> Result<&WeatherRecord> {
        let Some(query) = Query::parse(city) else {
            bail!("Please enter a city name");
        };
        if self.contains(city.trim()) {
            bail!("City already added");
        }

        let record = source.current(&query).await.map_err(|err| {
            tracing::warn!(error = %err, city, "comparison fetch failed");
            anyhow!("Failed to fetch weather data")
        })?;
        // The resolved name can differ from the typed one ("paris" -> "Paris").
        if self.contains(&record.city) {
            bail!("City already added");
        }

        self.cities.push(record);
        let last = self.cities.len() - 1;
        Ok(&self.cities[last])
    }

    pub fn remove(&mut self, city: &str) -> bool {
        let before = self.cities.len();
        self.cities.retain(|c| c.city != city);
        self.cities.len() != before
    }

    pub async fn refresh(&mut self, city: &str, source: &dyn WeatherSource) -> Result<&WeatherRecord> {
        let index = self
            .cities
            .iter()
            .position(|c| c.city == city)
            .ok_or_else(|| anyhow!("{city} is not in the comparison"))?;

        let record = source
            .current(&Query::City(city.to_string()))
            .await
            .map_err(|_| anyhow!("Failed to refresh weather data"))?;
        self.cities[index] = record;
        Ok(&self.cities[index])
    }

    /// Hottest, coldest and average; only meaningful with two or more cities.
    pub fn summary(&self) -> Option<ComparisonSummary> {
        if self.cities.len() < 2 {
            return None;
        }

        let mut hottest = &self.cities[0];
        let mut coldest = &self.cities[0];
        for c in &self.cities[1..] {
            if c.temperature > hottest.temperature {
                hottest = c;
            }
            if c.temperature < coldest.temperature {
                coldest = c;
            }
        }
        let total: f64 = self.cities.iter().map(|c| c.temperature).sum();

        Some(ComparisonSummary {
            hottest: hottest.clone(),
            coldest: coldest.clone(),
            average: total / self.cities.len() as f64,
            count: self.cities.len(),
        })
    }
}
