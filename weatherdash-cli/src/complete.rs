//! City autocomplete for the interactive search prompt.
//!
//! inquire asks for suggestions synchronously on every keystroke. Lookups are
//! handed to the core [`Debouncer`] on the runtime and whatever arrived last is
//! shown, so a burst of typing ends in a single geocoder request.

use std::sync::{Arc, Mutex};

use inquire::{
    CustomUserError,
    autocompletion::{Autocomplete, Replacement},
};
use tokio::runtime::Handle;
use weatherdash_core::geocode::{CitySearch, Debouncer, MIN_QUERY_LEN};

#[derive(Clone)]
pub struct CityCompleter {
    runtime: Handle,
    debouncer: Arc<Debouncer>,
    search: Option<Arc<dyn CitySearch>>,
    latest: Arc<Mutex<Vec<String>>>,
    recent: Vec<String>,
}

impl CityCompleter {
    /// `recent` is offered first; `search` may be absent when no geocoder key is set.
    pub fn new(runtime: Handle, search: Option<Arc<dyn CitySearch>>, recent: Vec<String>) -> Self {
        Self {
            runtime,
            debouncer: Arc::new(Debouncer::default()),
            search,
            latest: Arc::new(Mutex::new(Vec::new())),
            recent,
        }
    }

    fn request(&self, input: &str) {
        let Some(search) = self.search.clone() else {
            return;
        };
        let debouncer = Arc::clone(&self.debouncer);
        let latest = Arc::clone(&self.latest);
        let query = input.to_string();

        self.runtime.spawn(async move {
            match debouncer.suggest(search.as_ref(), &query).await {
                Ok(Some(found)) => {
                    if let Ok(mut slot) = latest.lock() {
                        *slot = found;
                    }
                }
                Ok(None) => {}
                Err(err) => tracing::debug!(error = %err, query, "autocomplete lookup failed"),
            }
        });
    }

    pub(crate) fn matching(&self, input: &str) -> Vec<String> {
        let needle = input.trim().to_lowercase();
        let mut out: Vec<String> = self
            .recent
            .iter()
            .filter(|c| c.to_lowercase().starts_with(&needle))
            .cloned()
            .collect();

        if needle.chars().count() >= MIN_QUERY_LEN {
            if let Ok(latest) = self.latest.lock() {
                for candidate in latest.iter() {
                    if candidate.to_lowercase().starts_with(&needle) && !out.contains(candidate) {
                        out.push(candidate.clone());
                    }
                }
            }
        }
        out
    }
}

impl Autocomplete for CityCompleter {
    fn get_suggestions(&mut self, input: &str) -> Result<Vec<String>, CustomUserError> {
        if input.trim().chars().count() >= MIN_QUERY_LEN {
            self.request(input);
        }
        Ok(self.matching(input))
    }

    fn get_completion(
        &mut self,
        _input: &str,
        highlighted_suggestion: Option<String>,
    ) -> Result<Replacement, CustomUserError> {
        Ok(highlighted_suggestion)
    }
}
