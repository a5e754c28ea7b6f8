//! Toast notifications.
//!
//! HTMX fragment responses carry their toast as an out-of-band swap into the
//! `#toasts` container. Full-page redirects store a one-shot flash toast in
//! the session, shown by the next page render.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::htmx;
use crate::models::session_keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    /// CSS modifier class.
    #[must_use]
    pub const fn class(self) -> &'static str {
        match self {
            Self::Success => "toast-success",
            Self::Error => "toast-error",
        }
    }
}

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

impl Toast {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.kind, ToastKind::Error)
    }
}

#[derive(Template)]
#[template(path = "partials/toast_oob.html")]
struct ToastOobTemplate<'a> {
    toast: &'a Toast,
}

/// Render `toast` as an out-of-band swap appended to `#toasts`.
#[must_use]
pub fn render_oob(toast: &Toast) -> String {
    ToastOobTemplate { toast }.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        String::new()
    })
}

/// Store a toast for the next full page render.
pub async fn set_flash(session: &Session, toast: &Toast) {
    if let Err(e) = session.insert(session_keys::FLASH, toast).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

/// Remove and return the pending flash toast.
pub async fn take_flash(session: &Session) -> Option<Toast> {
    session
        .remove::<Toast>(session_keys::FLASH)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read flash message");
            None
        })
}

/// An HTMX fragment response: HTML to swap plus an optional toast.
#[derive(Debug)]
pub struct Fragment {
    html: String,
    toast: Option<Toast>,
    headers: Vec<(axum::http::HeaderName, axum::http::HeaderValue)>,
    swap: bool,
}

impl Fragment {
    /// Swap `html` into the request's target.
    #[must_use]
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            toast: None,
            headers: Vec::new(),
            swap: true,
        }
    }

    /// Swap the target with nothing (e.g. a deleted row).
    #[must_use]
    pub fn empty() -> Self {
        Self::new(String::new())
    }

    /// Leave the target untouched and show an error toast.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            html: String::new(),
            toast: Some(Toast::error(message)),
            headers: Vec::new(),
            swap: false,
        }
    }

    /// Leave the target untouched and show a success toast.
    #[must_use]
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            html: String::new(),
            toast: Some(Toast::success(message)),
            headers: Vec::new(),
            swap: false,
        }
    }

    #[must_use]
    pub fn with_toast(mut self, toast: Toast) -> Self {
        self.toast = Some(toast);
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: axum::http::HeaderName, value: axum::http::HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }
}

impl IntoResponse for Fragment {
    fn into_response(self) -> Response {
        let mut body = self.html;
        if let Some(toast) = &self.toast {
            body.push_str(&render_oob(toast));
        }

        let mut response = (StatusCode::OK, Html(body)).into_response();
        let headers = response.headers_mut();
        if !self.swap {
            let (name, value) = htmx::no_swap();
            headers.insert(name, value);
        }
        for (name, value) in self.headers {
            headers.insert(name, value);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_does_not_swap() {
        let response = Fragment::failure("Xóa sản phẩm thất bại!").into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(htmx::HX_RESWAP).unwrap(), "none");
    }

    #[test]
    fn test_success_fragment_swaps() {
        let response = Fragment::empty()
            .with_toast(Toast::success("Xóa sản phẩm thành công!"))
            .into_response();
        assert!(response.headers().get(htmx::HX_RESWAP).is_none());
    }

    #[test]
    fn test_oob_markup_targets_toasts() {
        let html = render_oob(&Toast::error("Cập nhật thất bại!"));
        assert!(html.contains(r#"id="toasts""#));
        assert!(html.contains("hx-swap-oob"));
        assert!(html.contains("toast-error"));
        assert!(html.contains("Cập nhật thất bại!"));
    }

    #[test]
    fn test_toast_message_is_escaped() {
        let html = render_oob(&Toast::success("<script>"));
        assert!(!html.contains("<script>"));
    }
}
