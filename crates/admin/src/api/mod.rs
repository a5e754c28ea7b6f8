//! Pharmacy REST API client.
//!
//! Persistence lives entirely behind the pharmacy API; the dashboard talks
//! to it through [`ApiClient`]. Every resource (`/admin`, `/category`,
//! `/customer`, `/product`, `/store`) exposes the same endpoint shape, so
//! one generic [`ResourceService`] covers them all.
//!
//! # API Reference
//!
//! - Base URL: `API_BASE_URL` (default `http://localhost:3333`)
//! - Authentication: `Authorization: Bearer <token>` from `POST /admin/auth/login`
//! - Bodies: JSON envelopes `{ status, message?, data }`

mod auth;
mod resource;

pub use auth::{ApiToken, LoginSession, token_expiry};
pub use resource::{
    Admins, Categories, Customers, PasswordReset, Products, ResetPasswordPath, Resource,
    ResourceService, Stores,
};

use std::sync::Arc;

use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::ApiConfig;

/// Errors that can occur when talking to the pharmacy API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Token missing, invalid, or expired.
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// API answered 2xx but reported a failure in its envelope.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A request URL could not be built from the base URL.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Whether the failure means the session's token is no longer accepted.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// The `{ status, message?, data }` wrapper around every response.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// A missing status counts as success; only an explicit non-`success`
    /// value is a rejection.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.as_deref().is_none_or(|s| s.eq_ignore_ascii_case("success"))
    }
}

/// Pharmacy API client.
///
/// Cheap to clone; all clones share one connection pool. The bearer token is
/// not stored here; each call takes it from the caller's session.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build or the base URL cannot
    /// carry path segments.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        if config.base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("pharmacy-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Service for one resource, authenticated with `token` when present.
    #[must_use]
    pub const fn resource<'a, R: Resource>(
        &'a self,
        token: Option<&'a ApiToken>,
    ) -> ResourceService<'a, R> {
        ResourceService::new(self, token)
    }

    /// Build `base/seg1/seg2/...`. Each segment is percent-encoded; an empty
    /// trailing segment yields a trailing slash.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    fn request(
        &self,
        method: reqwest::Method,
        url: Url,
        token: Option<&ApiToken>,
    ) -> reqwest::RequestBuilder {
        let mut builder = self
            .inner
            .client
            .request(method, url)
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, token.bearer());
        }
        builder
    }

    /// Check that the API answers. Any HTTP status counts as reachable.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` on connect failure or timeout.
    pub async fn ping(&self) -> Result<(), ApiError> {
        self.inner
            .client
            .get(self.inner.base_url.clone())
            .send()
            .await?;
        Ok(())
    }

    /// Send a request and return the decoded body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = builder.send().await?;
        self.handle_response(response).await
    }

    /// Send a request whose response body is not needed.
    pub(crate) async fn send_empty(&self, builder: reqwest::RequestBuilder) -> Result<(), ApiError> {
        let response = builder.send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(self.parse_error(response).await)
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        if response.status().is_success() {
            return response
                .json()
                .await
                .map_err(|e| ApiError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(self.parse_error(response).await)
    }

    /// Parse error response from the API.
    async fn parse_error(&self, response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();

        if status == 401 {
            return ApiError::Unauthorized;
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);

        if status == 404 {
            return ApiError::NotFound(message);
        }

        ApiError::Status { status, message }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Pull `message` out of an error envelope, falling back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Envelope<serde_json::Value>>(body)
        .ok()
        .and_then(|env| env.message)
        .unwrap_or_else(|| {
            if body.is_empty() {
                "Unknown error".to_string()
            } else {
                body.chars().take(200).collect()
            }
        })
}

/// Strip the envelope from a JSON body, if there is one.
///
/// A body with a `data` key is an envelope; anything else is taken as the
/// payload itself.
pub(crate) fn unwrap_data(value: serde_json::Value) -> Result<serde_json::Value, ApiError> {
    match value {
        serde_json::Value::Object(mut map) if map.contains_key("data") => {
            if let Some(serde_json::Value::String(status)) = map.get("status")
                && !status.eq_ignore_ascii_case("success")
            {
                let message = map
                    .get("message")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or(status)
                    .to_string();
                return Err(ApiError::Rejected(message));
            }
            Ok(map.remove("data").unwrap_or(serde_json::Value::Null))
        }
        other => Ok(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig::new(base, Duration::from_secs(5)).unwrap()).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let api = client("http://localhost:3333");
        assert_eq!(
            api.endpoint(&["product", "5"]).unwrap().as_str(),
            "http://localhost:3333/product/5"
        );
        assert_eq!(
            api.endpoint(&["category", ""]).unwrap().as_str(),
            "http://localhost:3333/category/"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = client("https://api.example.vn/v1/");
        assert_eq!(
            api.endpoint(&["store", "status", "3"]).unwrap().as_str(),
            "https://api.example.vn/v1/store/status/3"
        );
    }

    #[test]
    fn test_unwrap_data_envelope_and_bare() {
        let wrapped = json!({"status": "success", "data": {"id": 1}});
        assert_eq!(unwrap_data(wrapped).unwrap(), json!({"id": 1}));

        let bare = json!({"id": 2, "name": "x"});
        assert_eq!(unwrap_data(bare.clone()).unwrap(), bare);
    }

    #[test]
    fn test_unwrap_data_rejected_status() {
        let failed = json!({"status": "error", "message": "Tên đã tồn tại", "data": null});
        let err = unwrap_data(failed).unwrap_err();
        assert!(matches!(err, ApiError::Rejected(ref m) if m == "Tên đã tồn tại"));
    }

    #[test]
    fn test_error_message_prefers_envelope() {
        assert_eq!(error_message(r#"{"status":"error","message":"boom"}"#), "boom");
        assert_eq!(error_message("plain text"), "plain text");
        assert_eq!(error_message(""), "Unknown error");
    }

    #[test]
    fn test_envelope_success() {
        let ok: Envelope<()> = serde_json::from_value(json!({"data": null})).unwrap();
        assert!(ok.is_success());
        let bad: Envelope<()> = serde_json::from_value(json!({"status": "fail"})).unwrap();
        assert!(!bad.is_success());
    }
}
