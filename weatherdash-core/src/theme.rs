use chrono::{DateTime, TimeZone, Timelike};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const THEMES: [Theme; 8] = [
    Theme { id: "auto", name: "Auto", description: "Based on time & weather" },
    Theme { id: "day-clear", name: "Day - Clear", description: "Bright sunny day" },
    Theme { id: "day-cloudy", name: "Day - Cloudy", description: "Overcast day" },
    Theme { id: "day-rainy", name: "Day - Rainy", description: "Wet and gloomy" },
    Theme { id: "night-clear", name: "Night - Clear", description: "Starry night" },
    Theme { id: "night-cloudy", name: "Night - Cloudy", description: "Dark overcast" },
    Theme { id: "night-rainy", name: "Night - Rainy", description: "Stormy night" },
    Theme { id: "snowy", name: "Snowy", description: "Winter wonderland" },
];

pub fn find(id: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.id == id)
}

pub fn is_night(hour: u32) -> bool {
    !(6..18).contains(&hour)
}

/// Theme id for the "auto" setting: `day`/`night` plus a weather suffix.
/// The result is not always one of [`THEMES`] (e.g. `night-snowy`, plain `day`).
pub fn resolve_auto(hour: u32, description: &str) -> String {
    let base = if is_night(hour) { "night" } else { "day" };
    let desc = description.to_lowercase();

    let suffix = if desc.contains("rain") || desc.contains("storm") {
        "-rainy"
    } else if desc.contains("cloud") {
        "-cloudy"
    } else if desc.contains("snow") {
        "-snowy"
    } else if desc.contains("clear") || desc.contains("sun") {
        "-clear"
    } else {
        ""
    };

    format!("{base}{suffix}")
}

/// Resolve the configured theme: `auto` follows the clock and weather,
/// anything else is returned as is.
pub fn active_theme<Tz: TimeZone>(selected: &str, now: &DateTime<Tz>, description: Option<&str>) -> String {
    match (selected, description) {
        ("auto", Some(desc)) => resolve_auto(now.hour(), desc),
        (other, _) => other.to_string(),
    }
}
