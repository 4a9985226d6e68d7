use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    model::WeatherRecord,
    storage::{ALERTS_KEY, LocalStore},
};

const MPS_TO_KMH: f64 = 3.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertKind {
    Temperature,
    Humidity,
    WindSpeed,
    Rain,
}

impl AlertKind {
    pub fn label(&self) -> &'static str {
        match self {
            AlertKind::Temperature => "Temperature",
            AlertKind::Humidity => "Humidity",
            AlertKind::WindSpeed => "Wind Speed",
            AlertKind::Rain => "Rain",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            AlertKind::Temperature => "°C",
            AlertKind::Humidity => "%",
            AlertKind::WindSpeed => " km/h",
            AlertKind::Rain => "",
        }
    }

    pub fn needs_value(&self) -> bool {
        !matches!(self, AlertKind::Rain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    #[default]
    Above,
    Below,
}

impl Comparison {
    fn holds(&self, actual: f64, threshold: f64) -> bool {
        match self {
            Comparison::Above => actual > threshold,
            Comparison::Below => actual < threshold,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Comparison::Above => "above",
            Comparison::Below => "below",
        })
    }
}

/// A user-defined alert, persisted under the `weatherAlerts` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub condition: Comparison,
    pub value: Option<f64>,
    pub city: String,
    pub enabled: bool,
}

impl AlertRule {
    pub fn summary(&self) -> String {
        match (self.kind, self.value) {
            (AlertKind::Rain, _) => format!("{} rain", self.condition),
            (kind, Some(v)) => format!("{} {}{}", self.condition, v, kind.unit()),
            (_, None) => format!("{}", self.condition),
        }
    }

    /// Message for `record` if this rule fires for it.
    pub fn check(&self, record: &WeatherRecord) -> Option<String> {
        if !self.enabled || self.city != record.city {
            return None;
        }
        let city = &record.city;

        match self.kind {
            AlertKind::Rain => record
                .description
                .to_lowercase()
                .contains("rain")
                .then(|| format!("Rain alert: It's raining in {city}")),
            AlertKind::Temperature => {
                let v = self.value?;
                let t = record.temperature;
                self.condition.holds(t, v).then(|| {
                    format!("Temperature alert: {t}°C is {} {v}°C in {city}", self.condition)
                })
            }
            AlertKind::Humidity => {
                let v = self.value?;
                let h = record.humidity;
                self.condition
                    .holds(h, v)
                    .then(|| format!("Humidity alert: {h}% is {} {v}% in {city}", self.condition))
            }
            AlertKind::WindSpeed => {
                let v = self.value?;
                let w = (record.wind_speed * MPS_TO_KMH * 10.0).round() / 10.0;
                self.condition
                    .holds(w, v)
                    .then(|| format!("Wind alert: {w} km/h is {} {v} km/h in {city}", self.condition))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAlert {
    pub kind: AlertKind,
    pub condition: Comparison,
    pub value: Option<f64>,
    pub city: String,
}

#[derive(Debug)]
pub struct AlertStore {
    store: LocalStore,
    alerts: Vec<AlertRule>,
}

impl AlertStore {
    pub fn load(store: LocalStore) -> Result<Self> {
        let alerts = store.read(ALERTS_KEY)?;
        Ok(Self { store, alerts })
    }

    pub fn list(&self) -> &[AlertRule] {
        &self.alerts
    }

    pub fn add(&mut self, new: NewAlert, now: DateTime<Utc>) -> Result<&AlertRule> {
        let city = new.city.trim();
        if city.is_empty() || (new.kind.needs_value() && new.value.is_none()) {
            bail!("Please fill in all fields");
        }

        let mut id = now.timestamp_millis();
        if let Some(max) = self.alerts.iter().map(|a| a.id).max() {
            if id <= max {
                id = max + 1;
            }
        }

        self.alerts.push(AlertRule {
            id,
            kind: new.kind,
            condition: new.condition,
            value: if new.kind.needs_value() { new.value } else { None },
            city: city.to_string(),
            enabled: true,
        });
        self.persist()?;
        tracing::info!(id, "alert added");

        let last = self.alerts.len() - 1;
        Ok(&self.alerts[last])
    }

    /// Flip `enabled`; returns the new state, or `None` if `id` is unknown.
    pub fn toggle(&mut self, id: i64) -> Result<Option<bool>> {
        let Some(alert) = self.alerts.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        alert.enabled = !alert.enabled;
        let enabled = alert.enabled;

        self.persist()?;
        Ok(Some(enabled))
    }

    pub fn delete(&mut self, id: i64) -> Result<bool> {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != id);
        if self.alerts.len() == before {
            return Ok(false);
        }

        self.persist()?;
        tracing::info!(id, "alert deleted");
        Ok(true)
    }

    /// Messages for every enabled rule that fires for `record`.
    pub fn evaluate(&self, record: &WeatherRecord) -> Vec<String> {
        self.alerts.iter().filter_map(|a| a.check(record)).collect()
    }

    fn persist(&self) -> Result<()> {
        self.store.write(ALERTS_KEY, &self.alerts)
    }
}

/// Built-in warnings shown with every weather display.
pub fn condition_alerts(temperature: f64, description: &str) -> Vec<&'static str> {
    let desc = description.to_lowercase();
    let mut alerts = Vec::new();

    if temperature >= 38.0 {
        alerts.push("🥵 Heat Alert: Stay hydrated!");
    }
    if temperature <= 5.0 {
        alerts.push("🥶 Cold Alert: Bundle up!");
    }
    if desc.contains("storm") {
        alerts.push("⚠️ Storm Warning: Stay indoors!");
    }
    if desc.contains("rain") {
        alerts.push("🌧️ Rain Alert: Carry an umbrella!");
    }
    if desc.contains("snow") {
        alerts.push("❄️ Snow Alert: Drive safely!");
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(city: &str, temperature: f64, description: &str) -> WeatherRecord {
        WeatherRecord {
            city: city.into(),
            country: "XX".into(),
            state: None,
            temperature,
            feels_like: temperature,
            temp_min: temperature,
            temp_max: temperature,
            description: description.into(),
            wind_speed: 5.0,
            wind_deg: 0.0,
            humidity: 85.0,
            sunrise: 0,
            sunset: 0,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn store() -> (AlertStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (AlertStore::load(LocalStore::new(dir.path())).unwrap(), dir)
    }

    fn new_alert(kind: AlertKind, condition: Comparison, value: Option<f64>, city: &str) -> NewAlert {
        NewAlert { kind, condition, value, city: city.into() }
    }

    #[test]
    fn add_requires_city_and_value() {
        let (mut alerts, _dir) = store();
        let err = alerts
            .add(new_alert(AlertKind::Temperature, Comparison::Above, None, "Rome"), now())
            .unwrap_err();
        assert_eq!(err.to_string(), "Please fill in all fields");

        assert!(alerts.add(new_alert(AlertKind::Rain, Comparison::Above, None, " "), now()).is_err());
        assert!(alerts.add(new_alert(AlertKind::Rain, Comparison::Above, None, "Rome"), now()).is_ok());
    }

    #[test]
    fn ids_are_unique_within_the_same_millisecond() {
        let (mut alerts, _dir) = store();
        let a = alerts
            .add(new_alert(AlertKind::Rain, Comparison::Above, None, "Rome"), now())
            .unwrap()
            .id;
        let b = alerts
            .add(new_alert(AlertKind::Rain, Comparison::Above, None, "Oslo"), now())
            .unwrap()
            .id;
        assert_eq!(b, a + 1);
    }

    #[test]
    fn evaluate_matches_city_and_threshold() {
        let (mut alerts, _dir) = store();
        alerts
            .add(new_alert(AlertKind::Temperature, Comparison::Above, Some(30.0), "Cairo"), now())
            .unwrap();
        alerts
            .add(new_alert(AlertKind::Humidity, Comparison::Below, Some(50.0), "Cairo"), now())
            .unwrap();
        alerts
            .add(new_alert(AlertKind::Temperature, Comparison::Above, Some(30.0), "Giza"), now())
            .unwrap();

        let messages = alerts.evaluate(&record("Cairo", 35.5, "clear sky"));
        assert_eq!(messages, vec!["Temperature alert: 35.5°C is above 30°C in Cairo"]);
    }

    #[test]
    fn thresholds_are_strict() {
        let rule = AlertRule {
            id: 1,
            kind: AlertKind::Temperature,
            condition: Comparison::Above,
            value: Some(30.0),
            city: "Cairo".into(),
            enabled: true,
        };
        assert_eq!(rule.check(&record("Cairo", 30.0, "clear")), None);
    }

    #[test]
    fn disabled_rules_do_not_fire() {
        let (mut alerts, _dir) = store();
        let id = alerts
            .add(new_alert(AlertKind::Rain, Comparison::Above, None, "Bergen"), now())
            .unwrap()
            .id;
        let rainy = record("Bergen", 9.0, "Light Rain");
        assert_eq!(alerts.evaluate(&rainy), vec!["Rain alert: It's raining in Bergen"]);

        assert_eq!(alerts.toggle(id).unwrap(), Some(false));
        assert!(alerts.evaluate(&rainy).is_empty());
        assert_eq!(alerts.toggle(999).unwrap(), None);
    }

    #[test]
    fn wind_alert_compares_in_kmh() {
        let rule = AlertRule {
            id: 1,
            kind: AlertKind::WindSpeed,
            condition: Comparison::Above,
            value: Some(15.0),
            city: "Perth".into(),
            enabled: true,
        };
        // 5 m/s = 18 km/h
        assert_eq!(
            rule.check(&record("Perth", 20.0, "clear")).as_deref(),
            Some("Wind alert: 18 km/h is above 15 km/h in Perth")
        );
    }

    #[test]
    fn alerts_persist_with_dashboard_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut alerts = AlertStore::load(LocalStore::new(dir.path())).unwrap();
        alerts
            .add(new_alert(AlertKind::WindSpeed, Comparison::Below, Some(3.0), "Lima"), now())
            .unwrap();

        let raw = std::fs::read_to_string(dir.path().join("weatherAlerts.json")).unwrap();
        assert!(raw.contains("\"type\": \"windSpeed\""));
        assert!(raw.contains("\"condition\": \"below\""));

        let mut reloaded = AlertStore::load(LocalStore::new(dir.path())).unwrap();
        let id = reloaded.list()[0].id;
        assert!(reloaded.delete(id).unwrap());
        assert!(!reloaded.delete(id).unwrap());
    }

    #[test]
    fn builtin_condition_alerts() {
        assert_eq!(condition_alerts(40.0, "clear sky"), vec!["🥵 Heat Alert: Stay hydrated!"]);
        assert_eq!(
            condition_alerts(2.0, "Thunderstorm with rain and snow"),
            vec![
                "🥶 Cold Alert: Bundle up!",
                "⚠️ Storm Warning: Stay indoors!",
                "🌧️ Rain Alert: Carry an umbrella!",
                "❄️ Snow Alert: Drive safely!",
            ]
        );
        assert!(condition_alerts(20.0, "few clouds").is_empty());
    }
}
