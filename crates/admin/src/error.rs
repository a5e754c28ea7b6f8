//! Handler error type.
//!
//! Most API failures never reach here: manage pages turn them into toasts.
//! What does arrive is either a dead session (redirect to login) or something
//! the dashboard cannot recover from (plain-text error page, reported to Sentry).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;

use crate::api::ApiError;
use crate::middleware::auth::{LOGIN_PATH, SessionRevoked};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The API no longer accepts the session's token.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Session store error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error ends the admin's session.
    #[must_use]
    pub const fn ends_session(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::Api(ApiError::Unauthorized))
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::Api(ApiError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Api(_) => StatusCode::BAD_GATEWAY,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Session(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text shown to the admin. Never includes upstream details.
    const fn public_message(&self) -> &'static str {
        match self {
            Self::Api(ApiError::NotFound(_)) => "Không tìm thấy dữ liệu",
            Self::Api(_) => "Máy chủ dữ liệu không phản hồi, vui lòng thử lại sau.",
            Self::Unauthorized => "Phiên đăng nhập không hợp lệ",
            Self::Session(_) | Self::Internal(_) => "Đã xảy ra lỗi, vui lòng thử lại sau.",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.ends_session() {
            tracing::info!(error = %self, "Ending admin session");
            let mut response = Redirect::to(LOGIN_PATH).into_response();
            response.extensions_mut().insert(SessionRevoked);
            return response;
        }

        let status = self.status();
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request failed");
        }

        (status, self.public_message()).into_response()
    }
}

/// Tag Sentry reports from the current request with the logged-in admin.
///
/// Each request runs on its own hub, so this has to happen per request.
pub fn set_sentry_user(username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}
