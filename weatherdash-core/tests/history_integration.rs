//! Integration tests for the history client and the search flow using wiremock.

use chrono::{TimeZone, Utc};
use weatherdash_core::{
    Dashboard, HistoryEntry,
    alerts::AlertStore,
    favorites::FavoritesStore,
    history::{HistoryBackend, HistoryStore, RemoteHistory},
    model::NewHistoryEntry,
    provider::backend::BackendWeather,
    storage::{HISTORY_KEY, LocalStore},
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn history_row(id: &str, city: &str, temperature: f64) -> serde_json::Value {
    serde_json::json!({
        "_id": id,
        "city": city,
        "temperature": temperature,
        "description": "clear sky",
        "timestamp": "2025-03-30T12:00:00Z"
    })
}

fn base(server: &MockServer) -> String {
    format!("{}/api/weather", server.uri())
}

#[tokio::test]
async fn test_list_history() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/weather/history"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            history_row("a1", "Paris", 18.0),
            history_row("b2", "Oslo", -3.0),
        ])))
        .mount(&mock_server)
        .await;

    let client = RemoteHistory::new(&base(&mock_server)).unwrap();
    let rows = client.list().await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].id.as_deref(), Some("a1"));
    assert_eq!(rows[1].city, "Oslo");
    assert_eq!(rows[1].wind_speed, None);
}

#[tokio::test]
async fn test_create_history_posts_entry() {
    let mock_server = MockServer::start().await;
    let timestamp = Utc.with_ymd_and_hms(2025, 3, 30, 12, 0, 0).unwrap();

    Mock::given(method("POST"))
        .and(path("/api/weather/history"))
        .and(body_json(serde_json::json!({
            "city": "Paris",
            "temperature": 18.0,
            "description": "clear sky",
            "timestamp": "2025-03-30T12:00:00Z"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(history_row("a1", "Paris", 18.0)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = RemoteHistory::new(&base(&mock_server)).unwrap();
    let entry = NewHistoryEntry {
        city: "Paris".into(),
        temperature: 18.0,
        description: "clear sky".into(),
        timestamp,
    };

    client.create(&entry).await.unwrap();
}

#[tokio::test]
async fn test_update_history_city() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/weather/history/a1"))
        .and(body_json(serde_json::json!({ "city": "Berlin" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(history_row("a1", "Berlin", 18.0)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = RemoteHistory::new(&base(&mock_server)).unwrap();
    client.update_city("a1", "Berlin").await.unwrap();
}

#[tokio::test]
async fn test_delete_history_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/weather/history/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = RemoteHistory::new(&base(&mock_server)).unwrap();
    let err = client.delete("missing").await.unwrap_err();

    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_store_refresh_is_mirrored_locally() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/weather/history"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([history_row("a1", "Paris", 18.0)])),
        )
        .mount(&mock_server)
        .await;

    let local = LocalStore::new(dir.path());
    let mut store = HistoryStore::new(Box::new(RemoteHistory::new(&base(&mock_server)).unwrap()), local.clone()).unwrap();
    store.refresh().await.unwrap();

    let cached: Vec<HistoryEntry> = local.read(HISTORY_KEY).unwrap();
    assert_eq!(cached, store.entries());
    assert_eq!(store.get("a1").map(|e| e.city.as_str()), Some("Paris"));
}

#[tokio::test]
async fn test_search_records_history_and_refetches() {
    let mock_server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/api/weather/Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "city": "Paris",
            "country": "FR",
            "temperature": 18.0,
            "feels_like": 17.0,
            "temp_min": 15.0,
            "temp_max": 20.0,
            "description": "clear sky",
            "wind_speed": 3.0,
            "wind_deg": 90.0,
            "humidity": 50.0,
            "sunrise": 0,
            "sunset": 0
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/weather/history"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/weather/history"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([history_row("srv-1", "Paris", 18.0)])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let local = LocalStore::new(dir.path());
    let mut dash = Dashboard::new(
        Box::new(BackendWeather::new(&base(&mock_server)).unwrap()),
        HistoryStore::new(Box::new(RemoteHistory::new(&base(&mock_server)).unwrap()), local.clone()).unwrap(),
        FavoritesStore::load(local.clone()).unwrap(),
        AlertStore::load(local).unwrap(),
    );

    let outcome = dash
        .search("Paris", Utc.with_ymd_and_hms(2025, 3, 30, 12, 0, 0).unwrap())
        .await
        .unwrap();

    assert_eq!(outcome.record.city, "Paris");
    assert!(outcome.condition_alerts.is_empty());
    assert_eq!(dash.history().entries().len(), 1);
    assert_eq!(dash.open_history("srv-1").map(|e| e.temperature), Some(18.0));
}
