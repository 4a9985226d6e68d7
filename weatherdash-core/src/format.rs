//! Display helpers shared by the views.

use chrono::{DateTime, Days, NaiveDate, TimeZone};
use std::fmt::Display;

/// `"Mar 30, 2025 at 14:32"`
pub fn format_timestamp<Tz: TimeZone>(ts: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    ts.format("%b %-d, %Y at %H:%M").to_string()
}

/// "Today", "Tomorrow", or the short weekday name.
pub fn day_label(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if today.checked_add_days(Days::new(1)) == Some(date) {
        "Tomorrow".to_string()
    } else {
        date.format("%a").to_string()
    }
}

/// Unix seconds rendered as `HH:MM` in `tz`.
pub fn clock_time<Tz: TimeZone>(unix: i64, tz: &Tz) -> Option<String>
where
    Tz::Offset: Display,
{
    DateTime::from_timestamp(unix, 0).map(|utc| utc.with_timezone(tz).format("%H:%M").to_string())
}

pub fn condition_icon(description: &str) -> &'static str {
    let desc = description.to_lowercase();
    if desc.contains("storm") || desc.contains("thunder") {
        "⛈️"
    } else if desc.contains("clear") || desc.contains("sun") {
        "☀️"
    } else if desc.contains("cloud") {
        "☁️"
    } else if desc.contains("rain") || desc.contains("drizzle") {
        "🌧️"
    } else if desc.contains("snow") {
        "❄️"
    } else if desc.contains("fog") || desc.contains("mist") {
        "🌫️"
    } else {
        "🌤️"
    }
}

/// Emoji for an OpenWeather icon code such as `"10d"`.
pub fn forecast_icon(code: &str) -> &'static str {
    match code.get(..2) {
        Some("01") => "☀️",
        Some("02" | "03" | "04") => "☁️",
        Some("09" | "10") => "🌧️",
        Some("11") => "⛈️",
        Some("13") => "❄️",
        Some("50") => "🌫️",
        _ => "☀️",
    }
}
