//! Statistics and trends derived from search history.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use std::fmt;

use crate::model::HistoryEntry;

const TOP_CITIES: usize = 5;
const RECENT_WINDOW: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    #[default]
    Week,
    Month,
    All,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::All => "all",
        }
    }

    fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            TimeRange::Week => Some(now - Duration::days(7)),
            TimeRange::Month => Some(now - Duration::days(30)),
            TimeRange::All => None,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TimeRange {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            "all" => Ok(TimeRange::All),
            _ => bail!("Unknown time range '{value}'. Use week, month or all."),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemperaturePoint {
    pub date: String,
    pub temperature: i64,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statistics {
    pub total_searches: usize,
    pub average_temperature: i64,
    pub max_temperature: i64,
    pub min_temperature: i64,
    pub unique_cities: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analytics {
    pub range: TimeRange,
    pub temperature_series: Vec<TemperaturePoint>,
    /// `(city, searches)` in order of first appearance.
    pub city_frequency: Vec<(String, usize)>,
    pub condition_frequency: Vec<(String, usize)>,
    pub statistics: Statistics,
    pub top_cities: Vec<(String, usize)>,
}

/// Math.round semantics: halves go up.
fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

fn round_to(x: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (x * factor).round() / factor
}

fn tally<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for key in keys {
        match counts.iter_mut().find(|(k, _)| k == key) {
            Some((_, n)) => *n += 1,
            None => counts.push((key.to_string(), 1)),
        }
    }
    counts
}

impl Analytics {
    /// `None` when there is no history at all.
    pub fn from_history(history: &[HistoryEntry], range: TimeRange, now: DateTime<Utc>) -> Option<Self> {
        if history.is_empty() {
            return None;
        }

        let cutoff = range.cutoff(now);
        let filtered: Vec<&HistoryEntry> = history
            .iter()
            .filter(|e| cutoff.is_none_or(|c| e.timestamp >= c))
            .collect();

        let temperature_series = filtered
            .iter()
            .map(|e| TemperaturePoint {
                date: e.timestamp.format("%b %d").to_string(),
                temperature: round_half_up(e.temperature),
                city: e.city.clone(),
            })
            .collect();

        let city_frequency = tally(filtered.iter().map(|e| e.city.as_str()));

        let conditions: Vec<String> = filtered
            .iter()
            .map(|e| {
                let c = e.description.trim().to_lowercase();
                if c.is_empty() { "unknown".to_string() } else { c }
            })
            .collect();
        let condition_frequency = tally(conditions.iter().map(String::as_str));

        // Zero readings are treated as missing, as the dashboard always did.
        let temps: Vec<f64> = filtered
            .iter()
            .map(|e| e.temperature)
            .filter(|t| *t != 0.0 && !t.is_nan())
            .collect();
        let average = if temps.is_empty() {
            0.0
        } else {
            temps.iter().sum::<f64>() / temps.len() as f64
        };
        let max = temps.iter().copied().fold(0.0, f64::max);
        let min = temps.iter().copied().fold(100.0, f64::min);

        let mut top_cities = city_frequency.clone();
        top_cities.sort_by(|a, b| b.1.cmp(&a.1));
        top_cities.truncate(TOP_CITIES);

        Some(Self {
            range,
            temperature_series,
            statistics: Statistics {
                total_searches: filtered.len(),
                average_temperature: round_half_up(average),
                max_temperature: round_half_up(max),
                min_temperature: round_half_up(min),
                unique_cities: city_frequency.len(),
            },
            city_frequency,
            condition_frequency,
            top_cities,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub date: String,
    pub city: String,
    pub temperature: f64,
    pub wind_speed: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trends {
    pub points: Vec<TrendPoint>,
    /// Rounded to two decimals; 0 when there are no points.
    pub average_temperature: f64,
    pub cities: Vec<String>,
}

/// Chronological temperature/wind series, optionally for one city.
pub fn trends(history: &[HistoryEntry], city: Option<&str>) -> Trends {
    let cities = tally(history.iter().map(|e| e.city.as_str()))
        .into_iter()
        .map(|(c, _)| c)
        .collect();

    let mut sorted: Vec<&HistoryEntry> = history.iter().collect();
    sorted.sort_by_key(|e| e.timestamp);

    let points: Vec<TrendPoint> = sorted
        .into_iter()
        .filter(|e| city.is_none_or(|c| e.city == c))
        .map(|e| TrendPoint {
            date: e.timestamp.format("%b %-d").to_string(),
            city: e.city.clone(),
            temperature: e.temperature,
            wind_speed: e.wind_speed.unwrap_or_default(),
        })
        .collect();

    let average_temperature = if points.is_empty() {
        0.0
    } else {
        round_to(points.iter().map(|p| p.temperature).sum::<f64>() / points.len() as f64, 2)
    };

    Trends { points, average_temperature, cities }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecentStats {
    pub average_temperature: f64,
    pub average_wind_speed: f64,
    pub entries: usize,
}

/// Averages over the last seven entries, one decimal.
pub fn recent_stats(history: &[HistoryEntry]) -> Option<RecentStats> {
    let start = history.len().saturating_sub(RECENT_WINDOW);
    let last = &history[start..];
    if last.is_empty() {
        return None;
    }

    let n = last.len() as f64;
    let temp: f64 = last.iter().map(|e| e.temperature).sum();
    let wind: f64 = last.iter().map(|e| e.wind_speed.unwrap_or_default()).sum();

    Some(RecentStats {
        average_temperature: round_to(temp / n, 1),
        average_wind_speed: round_to(wind / n, 1),
        entries: last.len(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

pub fn export_file_name(range: TimeRange, format: ExportFormat) -> String {
    format!("weather-analytics-{}.{}", range, format.extension())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn export(history: &[HistoryEntry], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Csv => {
            let mut out = String::from("City,Temperature,Description,Timestamp\n");
            for e in history {
                out.push_str(&format!(
                    "{},{},{},{}\n",
                    csv_field(&e.city),
                    e.temperature,
                    csv_field(&e.description),
                    e.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
                ));
            }
            Ok(out)
        }
        ExportFormat::Json => {
            serde_json::to_string_pretty(history).context("Failed to serialize history to JSON")
        }
    }
}
