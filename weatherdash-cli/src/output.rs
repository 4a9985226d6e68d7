//! Plain-text rendering of core types.

use chrono::Local;
use weatherdash_core::{
    FavoriteEntry, Forecast, HistoryEntry, SearchOutcome, WeatherRecord,
    alerts::AlertRule,
    analytics::{Analytics, RecentStats, Trends},
    compare::{ComparisonSummary, TempBand},
    favorites::icon_for,
    format::{clock_time, condition_icon, day_label, format_timestamp, forecast_icon},
    map::Marker,
};

pub fn weather(record: &WeatherRecord) {
    println!("{} {}", condition_icon(&record.description), record.location_label());
    println!("  {:.1}°C, {}", record.temperature, record.description);
    println!(
        "  feels like {:.1}°C | min {:.1}°C | max {:.1}°C",
        record.feels_like, record.temp_min, record.temp_max
    );
    println!(
        "  humidity {}% | wind {} m/s at {}°",
        record.humidity, record.wind_speed, record.wind_deg
    );
    if let (Some(rise), Some(set)) = (clock_time(record.sunrise, &Local), clock_time(record.sunset, &Local)) {
        println!("  sunrise {rise} | sunset {set}");
    }
}

pub fn search_outcome(outcome: &SearchOutcome) {
    weather(&outcome.record);
    if outcome.is_favorite {
        println!("  ★ favorite");
    }
    for alert in &outcome.condition_alerts {
        println!("  {alert}");
    }
    for alert in &outcome.user_alerts {
        println!("  🔔 {alert}");
    }
    println!("  {}", outcome.advice);
}

pub fn forecast(forecast: &Forecast) {
    let today = Local::now().date_naive();
    println!("5-day forecast for {}, {}", forecast.city, forecast.country);
    for day in &forecast.forecasts {
        println!(
            "  {:<9} {} {:>4}° / {:>4}°  {}",
            day_label(day.date, today),
            forecast_icon(&day.icon),
            day.max_temp,
            day.min_temp,
            day.description
        );
    }
}

fn history_line(entry: &HistoryEntry) -> String {
    format!(
        "{:<26} {:<18} {:>6.1}°C  {:<20} {}",
        entry.id.as_deref().unwrap_or("(pending)"),
        entry.city,
        entry.temperature,
        entry.description,
        format_timestamp(&entry.timestamp.with_timezone(&Local)),
    )
}

pub fn history(entries: &[HistoryEntry], hidden: usize) {
    if entries.is_empty() {
        println!("No search history yet.");
        return;
    }
    for entry in entries {
        println!("{}", history_line(entry));
    }
    if hidden > 0 {
        println!("… {hidden} more (use --all)");
    }
}

pub fn history_entry(entry: &HistoryEntry) {
    println!("{} {}", condition_icon(&entry.description), entry.city);
    println!("  {:.1}°C, {}", entry.temperature, entry.description);
    if let Some(wind) = entry.wind_speed {
        println!("  wind {wind} m/s");
    }
    println!("  searched {}", format_timestamp(&entry.timestamp.with_timezone(&Local)));
}

pub fn favorites(favorites: &[FavoriteEntry]) {
    if favorites.is_empty() {
        println!("No favorites yet.");
        return;
    }
    for fav in favorites {
        let place = if fav.country.is_empty() {
            fav.city.clone()
        } else {
            format!("{}, {}", fav.city, fav.country)
        };
        println!(
            "{} {:<24} {:>6.1}°C  {:<20} humidity {}%  wind {} m/s",
            icon_for(&fav.city),
            place,
            fav.temperature,
            fav.description,
            fav.humidity,
            fav.wind_speed
        );
    }
}

pub fn alerts(alerts: &[AlertRule]) {
    if alerts.is_empty() {
        println!("No alerts configured.");
        return;
    }
    for alert in alerts {
        println!(
            "{:<14} [{}] {:<12} {:<18} {}",
            alert.id,
            if alert.enabled { "on " } else { "off" },
            alert.kind.label(),
            alert.summary(),
            alert.city
        );
    }
}

fn band(temperature: f64) -> &'static str {
    match TempBand::of(temperature) {
        TempBand::Hot => "hot",
        TempBand::Warm => "warm",
        TempBand::Mild => "mild",
        TempBand::Cold => "cold",
    }
}

pub fn comparison(cities: &[WeatherRecord], summary: Option<&ComparisonSummary>) {
    for c in cities {
        println!(
            "{} {:<24} {:>6.1}°C ({:<4})  {:<20} humidity {}%  wind {} m/s",
            condition_icon(&c.description),
            c.location_label(),
            c.temperature,
            band(c.temperature),
            c.description,
            c.humidity,
            c.wind_speed
        );
    }
    if let Some(s) = summary {
        println!();
        println!("Hottest: {} ({:.1}°C)", s.hottest.city, s.hottest.temperature);
        println!("Coldest: {} ({:.1}°C)", s.coldest.city, s.coldest.temperature);
        println!("Average: {:.1}°C over {} cities", s.average, s.count);
    }
}

pub fn marker(marker: &Marker) {
    let (lat, lon) = marker.position;
    println!("{} {} ({lat:.4}, {lon:.4})", marker.icon(), marker.city);
    println!("  {:.1}°C, {}", marker.weather.temperature, marker.weather.description);
    println!("  humidity {}% | wind {} m/s", marker.weather.humidity, marker.weather.wind_speed);
}

pub fn analytics(a: &Analytics) {
    let s = &a.statistics;
    println!("Analytics ({})", a.range);
    println!("  searches: {}  unique cities: {}", s.total_searches, s.unique_cities);
    println!(
        "  avg {}°C | max {}°C | min {}°C",
        s.average_temperature, s.max_temperature, s.min_temperature
    );

    if !a.top_cities.is_empty() {
        println!("Top cities:");
        for (i, (city, count)) in a.top_cities.iter().enumerate() {
            println!("  {}. {city} ({count})", i + 1);
        }
    }
    if !a.condition_frequency.is_empty() {
        println!("Conditions:");
        for (condition, count) in &a.condition_frequency {
            println!("  {condition:<24} {count}");
        }
    }
    if !a.temperature_series.is_empty() {
        println!("Temperatures:");
        for p in &a.temperature_series {
            println!("  {:<7} {:<18} {:>4}°C", p.date, p.city, p.temperature);
        }
    }
}

pub fn trends(t: &Trends) {
    if t.points.is_empty() {
        println!("No data for the selected city.");
        return;
    }
    for p in &t.points {
        println!("  {:<7} {:<18} {:>6.1}°C  wind {} m/s", p.date, p.city, p.temperature, p.wind_speed);
    }
    println!("Average: {}°C", t.average_temperature);
}

pub fn recent_stats(stats: &RecentStats) {
    println!("Last {} searches", stats.entries);
    println!("  average temperature {}°C", stats.average_temperature);
    println!("  average wind speed {} m/s", stats.average_wind_speed);
}
