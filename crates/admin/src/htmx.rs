//! HTMX request and response headers.
//!
//! Tables, switches and row forms are swapped in place by HTMX. These helpers
//! detect HTMX requests and attach the response headers that steer the swap.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderName, HeaderValue, request::Parts},
};

pub const HX_REQUEST: HeaderName = HeaderName::from_static("hx-request");
pub const HX_REDIRECT: HeaderName = HeaderName::from_static("hx-redirect");
pub const HX_RESWAP: HeaderName = HeaderName::from_static("hx-reswap");
pub const HX_TRIGGER: HeaderName = HeaderName::from_static("hx-trigger");
pub const HX_PUSH_URL: HeaderName = HeaderName::from_static("hx-push-url");

/// Whether the request was issued by HTMX.
#[must_use]
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get(HX_REQUEST)
        .is_some_and(|v| v.as_bytes().eq_ignore_ascii_case(b"true"))
}

/// Extractor flag for HTMX requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HxRequest(pub bool);

impl<S: Send + Sync> FromRequestParts<S> for HxRequest {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(is_htmx(&parts.headers)))
    }
}

/// `HX-Reswap: none` - keep the current DOM untouched.
#[must_use]
pub fn no_swap() -> (HeaderName, HeaderValue) {
    (HX_RESWAP, HeaderValue::from_static("none"))
}

/// `HX-Trigger: <event>` - fire a client-side event after the swap.
#[must_use]
pub fn trigger(event: &'static str) -> (HeaderName, HeaderValue) {
    (HX_TRIGGER, HeaderValue::from_static(event))
}
