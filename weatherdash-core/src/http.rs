//! Small helpers shared by every HTTP client in this crate.

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{ApiError, truncate_body};

const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("weatherdash/", env!("CARGO_PKG_VERSION"));

pub(crate) fn client() -> Result<Client, ApiError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Join `segments` onto `base`, percent-encoding each one.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url, ApiError> {
    let mut url = Url::parse(base).map_err(|e| ApiError::InvalidUrl(format!("{base}: {e}")))?;

    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(format!("{base}: cannot be a base URL")))?;
        path.pop_if_empty();
        path.extend(segments);
    }

    Ok(url)
}

/// Send the request and return the body, turning non-2xx statuses into
/// [`ApiError::Status`].
pub(crate) async fn send_text(req: RequestBuilder, what: &str) -> Result<String, ApiError> {
    let res = req.send().await?;
    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        tracing::debug!(%status, what, "request failed");
        return Err(ApiError::Status {
            status: status.as_u16(),
            body: truncate_body(&body),
        });
    }

    Ok(body)
}

pub(crate) async fn send_json<T: DeserializeOwned>(
    req: RequestBuilder,
    what: &str,
) -> Result<T, ApiError> {
    let body = send_text(req, what).await?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(format!("{what}: {e}")))
}

/// Map a 404 from a weather endpoint to [`ApiError::CityNotFound`].
pub(crate) fn not_found_as_city(err: ApiError, query: &str) -> ApiError {
    match err {
        ApiError::Status { status: 404, .. } => ApiError::CityNotFound(query.to_string()),
        other => other,
    }
}
