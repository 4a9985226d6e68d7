//! Integration tests for the weather, geocoding and suggestion clients using wiremock.

use weatherdash_core::{
    ApiError, Query, WeatherSource,
    advice::{ClothingAdvisor, SUGGESTION_FALLBACK},
    geocode::{CitySearch, OpenCageGeocoder},
    provider::{backend::BackendWeather, openweather::OpenWeatherSource},
};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn paris_record() -> serde_json::Value {
    serde_json::json!({
        "city": "Paris",
        "country": "FR",
        "temperature": 18.5,
        "feels_like": 17.9,
        "temp_min": 16.0,
        "temp_max": 20.0,
        "description": "scattered clouds",
        "wind_speed": 4.1,
        "wind_deg": 250.0,
        "humidity": 62.0,
        "sunrise": 1743312000,
        "sunset": 1743358000
    })
}

#[tokio::test]
async fn test_backend_current_weather() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/weather/Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paris_record()))
        .mount(&mock_server)
        .await;

    let source = BackendWeather::new(&format!("{}/api/weather", mock_server.uri())).unwrap();
    let record = source.current(&Query::City("Paris".into())).await.unwrap();

    assert_eq!(record.city, "Paris");
    assert_eq!(record.country, "FR");
    assert_eq!(record.state, None);
    assert_eq!(record.temperature, 18.5);
    assert_eq!(record.description, "scattered clouds");
}

#[tokio::test]
async fn test_backend_404_is_city_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/weather/Atlantis"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&mock_server)
        .await;

    let source = BackendWeather::new(&format!("{}/api/weather", mock_server.uri())).unwrap();
    let err = source.current(&Query::City("Atlantis".into())).await.unwrap_err();

    assert!(matches!(err, ApiError::CityNotFound(ref c) if c == "Atlantis"));
    assert_eq!(err.user_message(), "City not found");
}

#[tokio::test]
async fn test_backend_body_without_city_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/weather/Nowhere"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let source = BackendWeather::new(&format!("{}/api/weather", mock_server.uri())).unwrap();
    let err = source.current(&Query::City("Nowhere".into())).await.unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_backend_server_error_is_fetch_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/weather/Paris"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let source = BackendWeather::new(&format!("{}/api/weather", mock_server.uri())).unwrap();
    let err = source.current(&Query::City("Paris".into())).await.unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 500, .. }));
    assert_eq!(err.user_message(), "Failed to fetch weather data");
}

#[tokio::test]
async fn test_backend_forecast() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/weather/forecast/Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "city": "Paris",
            "country": "FR",
            "forecasts": [
                { "date": "2025-03-30", "icon": "01d", "min_temp": 8.0, "max_temp": 17.0, "description": "clear sky" },
                { "date": "2025-03-31", "icon": "10d", "min_temp": 9.0, "max_temp": 14.0, "description": "light rain" }
            ]
        })))
        .mount(&mock_server)
        .await;

    let source = BackendWeather::new(&format!("{}/api/weather", mock_server.uri())).unwrap();
    let forecast = source.forecast(&Query::City("Paris".into())).await.unwrap();

    assert_eq!(forecast.city, "Paris");
    assert_eq!(forecast.forecasts.len(), 2);
    assert_eq!(forecast.forecasts[1].icon, "10d");
    assert_eq!(forecast.forecasts[1].max_temp, 14.0);
}

#[tokio::test]
async fn test_openweather_current_by_city() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Oslo"))
        .and(query_param("appid", "KEY"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "Oslo",
            "main": { "temp": -2.5, "feels_like": -6.0, "temp_min": -4.0, "temp_max": -1.0, "humidity": 85.0 },
            "weather": [ { "description": "light snow", "icon": "13d" } ],
            "wind": { "speed": 3.2, "deg": 180.0 },
            "sys": { "country": "NO", "sunrise": 1743310000, "sunset": 1743357000 }
        })))
        .mount(&mock_server)
        .await;

    let source =
        OpenWeatherSource::with_base_url("KEY".into(), &format!("{}/data/2.5", mock_server.uri())).unwrap();
    let record = source.current(&Query::City("Oslo".into())).await.unwrap();

    assert_eq!(record.city, "Oslo");
    assert_eq!(record.country, "NO");
    assert_eq!(record.temperature, -2.5);
    assert_eq!(record.humidity, 85.0);
    assert_eq!(record.description, "light snow");
    assert_eq!(record.wind_deg, 180.0);
}

#[tokio::test]
async fn test_openweather_forecast_collapses_to_days() {
    let mock_server = MockServer::start().await;

    // 2025-03-30 09:00, 12:00 and 2025-03-31 12:00 UTC
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("lat", "59.9"))
        .and(query_param("lon", "10.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "city": { "name": "Oslo", "country": "NO", "timezone": 0 },
            "list": [
                { "dt": 1743325200, "main": { "temp": 1.0, "temp_min": 0.6, "temp_max": 1.2, "humidity": 80.0 },
                  "weather": [ { "description": "fog", "icon": "50d" } ] },
                { "dt": 1743336000, "main": { "temp": 4.0, "temp_min": 3.0, "temp_max": 4.6, "humidity": 70.0 },
                  "weather": [ { "description": "few clouds", "icon": "02d" } ] },
                { "dt": 1743422400, "main": { "temp": 6.0, "temp_min": 5.0, "temp_max": 6.4, "humidity": 60.0 },
                  "weather": [ { "description": "clear sky", "icon": "01d" } ] }
            ]
        })))
        .mount(&mock_server)
        .await;

    let source =
        OpenWeatherSource::with_base_url("KEY".into(), &format!("{}/data/2.5", mock_server.uri())).unwrap();
    let forecast = source.forecast(&Query::Coords { lat: 59.9, lon: 10.7 }).await.unwrap();

    assert_eq!(forecast.city, "Oslo");
    assert_eq!(forecast.forecasts.len(), 2);
    assert_eq!(forecast.forecasts[0].description, "few clouds");
    assert_eq!(forecast.forecasts[0].min_temp, 1.0);
    assert_eq!(forecast.forecasts[0].max_temp, 5.0);
    assert_eq!(forecast.forecasts[1].icon, "01d");
}

#[tokio::test]
async fn test_opencage_suggestions_filtered_by_prefix() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geocode/v1/json"))
        .and(query_param("q", "Lon"))
        .and(query_param("key", "GEO"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [
                { "components": { "city": "London", "country": "United Kingdom" } },
                { "components": { "town": "Londrina", "country": "Brazil" } },
                { "components": { "city": "Paris", "country": "France" } },
                { "components": { "city": "London", "country": "United Kingdom" } },
                { "components": { "country": "Nowhere" } }
            ]
        })))
        .mount(&mock_server)
        .await;

    let geocoder =
        OpenCageGeocoder::with_url("GEO".into(), &format!("{}/geocode/v1/json", mock_server.uri())).unwrap();
    let found = geocoder.suggest("Lon").await.unwrap();

    assert_eq!(found, vec!["London, United Kingdom", "Londrina, Brazil"]);
}

#[tokio::test]
async fn test_clothing_suggestion() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/suggest"))
        .and(body_json(serde_json::json!({ "temp": 21.0, "desc": "clear sky" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "suggestion": "A T-shirt and sunglasses."
        })))
        .mount(&mock_server)
        .await;

    let advisor = ClothingAdvisor::new(&format!("{}/api", mock_server.uri())).unwrap();

    assert_eq!(advisor.suggest(21.0, "clear sky").await, "A T-shirt and sunglasses.");
}

#[tokio::test]
async fn test_clothing_suggestion_falls_back_on_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/suggest"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let advisor = ClothingAdvisor::new(&format!("{}/api", mock_server.uri())).unwrap();

    assert!(advisor.try_suggest(5.0, "rain").await.is_err());
    assert_eq!(advisor.suggest(5.0, "rain").await, SUGGESTION_FALLBACK);
}
