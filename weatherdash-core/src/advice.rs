//! What to do / wear for the current conditions.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, http, model::WeatherRecord};

pub const SUGGESTION_FALLBACK: &str = "Unable to get suggestion.";
const DEFAULT_ADVICE: &str = "Enjoy the weather! 🌤️";

/// All rule-based suggestions for `record`, most relevant first.
pub fn all_suggestions(record: &WeatherRecord) -> Vec<&'static str> {
    let t = record.temperature;
    let desc = record.description.to_lowercase();
    let mut out = Vec::new();

    out.push(if t >= 30.0 {
        "It's hot today ☀️ (stay hydrated and seek shade!)"
    } else if t >= 20.0 {
        "Perfect weather ☀️ (great for outdoor activities!)"
    } else if t >= 10.0 {
        "Mild weather 🌤️ (comfortable for most activities.)"
    } else if t >= 0.0 {
        "Cool weather 🧥 (wear a light jacket.)"
    } else {
        "Cold weather ❄️ (bundle up and stay warm!)"
    });

    if desc.contains("rain") || desc.contains("drizzle") {
        out.push("Rain expected 🌧️ (carry an umbrella!)");
    }
    if desc.contains("snow") {
        out.push("Snow expected ❄️ (drive carefully!)");
    }
    if desc.contains("storm") || desc.contains("thunder") {
        out.push("Storm warning ⛈️ (stay indoors if possible!)");
    }
    if record.wind_speed > 10.0 {
        out.push("Windy conditions 💨 (be cautious outdoors!)");
    }
    if record.humidity > 80.0 {
        out.push("High humidity 💧 (it may feel warmer than it is.)");
    }

    out
}

/// The single most relevant suggestion.
pub fn rule_suggestion(record: &WeatherRecord) -> &'static str {
    all_suggestions(record).first().copied().unwrap_or(DEFAULT_ADVICE)
}

#[derive(Debug, Serialize)]
struct SuggestRequest<'a> {
    temp: f64,
    desc: &'a str,
}

#[derive(Debug, Deserialize)]
struct SuggestResponse {
    suggestion: String,
}

/// Free-text clothing advice from the backend's suggestion endpoint.
#[derive(Debug, Clone)]
pub struct ClothingAdvisor {
    base_url: String,
    http: Client,
}

impl ClothingAdvisor {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            base_url: base_url.to_string(),
            http: http::client()?,
        })
    }

    pub async fn try_suggest(&self, temp: f64, desc: &str) -> Result<String, ApiError> {
        let url = http::endpoint(&self.base_url, &["suggest"])?;
        let req = self.http.post(url).json(&SuggestRequest { temp, desc });
        let res: SuggestResponse = http::send_json(req, "clothing suggestion").await?;
        Ok(res.suggestion)
    }

    /// Like [`Self::try_suggest`], but never fails.
    pub async fn suggest(&self, temp: f64, desc: &str) -> String {
        match self.try_suggest(temp, desc).await {
            Ok(s) => s,
            Err(err) => {
                tracing::warn!(error = %err, "suggestion request failed");
                SUGGESTION_FALLBACK.to_string()
            }
        }
    }
}
