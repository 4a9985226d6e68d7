//! City autocomplete: forward geocoding of partial input into "City, Country" strings.
//! Uses OpenCage; requires an API key.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{
    fmt::Debug,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use tokio::sync::Mutex;

use crate::{error::ApiError, http};

const OPENCAGE_URL: &str = "https://api.opencagedata.com/geocode/v1/json";
const RESULT_LIMIT: &str = "10";

/// Inputs shorter than this are not worth a lookup.
pub const MIN_QUERY_LEN: usize = 2;
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

#[async_trait]
pub trait CitySearch: Send + Sync + Debug {
    async fn suggest(&self, query: &str) -> Result<Vec<String>, ApiError>;
}

#[derive(Debug, Deserialize)]
struct OcResponse {
    #[serde(default)]
    results: Vec<OcResult>,
}

#[derive(Debug, Deserialize)]
struct OcResult {
    components: OcComponents,
}

#[derive(Debug, Deserialize)]
struct OcComponents {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    country: Option<String>,
}

impl OcComponents {
    fn place(&self) -> Option<&str> {
        self.city
            .as_deref()
            .or(self.town.as_deref())
            .or(self.village.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct OpenCageGeocoder {
    api_key: String,
    url: String,
    http: Client,
}

impl OpenCageGeocoder {
    pub fn new(api_key: String) -> Result<Self, ApiError> {
        Self::with_url(api_key, OPENCAGE_URL)
    }

    pub fn with_url(api_key: String, url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            api_key,
            url: url.to_string(),
            http: http::client()?,
        })
    }
}

#[async_trait]
impl CitySearch for OpenCageGeocoder {
    async fn suggest(&self, query: &str) -> Result<Vec<String>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let req = self.http.get(&self.url).query(&[
            ("key", self.api_key.as_str()),
            ("q", query),
            ("limit", RESULT_LIMIT),
            ("language", "en"),
        ]);
        let body: OcResponse = http::send_json(req, "OpenCage geocode").await?;
        tracing::debug!(query, results = body.results.len(), "geocode results");

        Ok(city_candidates(query, &body.results))
    }
}

/// Keep places whose name starts with `query`, format them, drop duplicates.
fn city_candidates(query: &str, results: &[OcResult]) -> Vec<String> {
    let needle = query.to_lowercase();
    let mut out: Vec<String> = Vec::new();

    for result in results {
        let comp = &result.components;
        let Some(place) = comp.place() else {
            continue;
        };
        if !place.to_lowercase().starts_with(&needle) {
            continue;
        }

        let label = format!("{}, {}", place, comp.country.as_deref().unwrap_or_default());
        if !out.contains(&label) {
            out.push(label);
        }
    }

    out
}

/// Collapses bursts of keystrokes into one lookup.
///
/// Every call waits for the quiet period; a call that has been superseded by a
/// newer one in the meantime resolves to `None` so a stale answer can never
/// overwrite a fresh one. The last answer is cached per query.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: AtomicU64,
    last: Mutex<Option<(String, Vec<String>)>>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_DELAY)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: AtomicU64::new(0),
            last: Mutex::new(None),
        }
    }

    pub async fn suggest(
        &self,
        search: &dyn CitySearch,
        query: &str,
    ) -> Result<Option<Vec<String>>, ApiError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        if self.generation.load(Ordering::SeqCst) != ticket {
            return Ok(None);
        }

        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Some(Vec::new()));
        }

        if let Some((cached_query, cached)) = self.last.lock().await.as_ref() {
            if cached_query == query {
                return Ok(Some(cached.clone()));
            }
        }

        let found = search.suggest(query).await?;
        if self.generation.load(Ordering::SeqCst) != ticket {
            return Ok(None);
        }
        *self.last.lock().await = Some((query.to_string(), found.clone()));
        Ok(Some(found))
    }
}
