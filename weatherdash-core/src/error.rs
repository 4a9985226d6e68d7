use thiserror::Error;

/// Errors returned by the HTTP clients (weather, geocoding, history, suggestion).
///
/// `Display` carries the technical detail for logs; [`ApiError::user_message`]
/// is what the dashboard shows to the user.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Please enter a city name.")]
    EmptyQuery,

    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("No API key configured for {0}")]
    MissingApiKey(&'static str),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::CityNotFound(_) => "City not found",
            ApiError::EmptyQuery => "Please enter a city name.",
            ApiError::Status { .. } | ApiError::Network(_) | ApiError::Decode(_) => {
                "Failed to fetch weather data"
            }
            ApiError::MissingApiKey(_) => "API key missing. Run `weatherdash configure`.",
            ApiError::InvalidUrl(_) => "Invalid service URL. Check your configuration.",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::CityNotFound(_))
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_user_message() {
        let err = ApiError::CityNotFound("Atlantis".into());
        assert_eq!(err.user_message(), "City not found");
        assert!(err.is_not_found());
        assert!(err.to_string().contains("Atlantis"));
    }

    #[test]
    fn status_error_maps_to_fetch_failure() {
        let err = ApiError::Status { status: 500, body: "boom".into() };
        assert_eq!(err.user_message(), "Failed to fetch weather data");
        assert!(!err.is_not_found());
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(150);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 203);
    }
}
