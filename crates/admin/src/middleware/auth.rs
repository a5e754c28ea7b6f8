//! Login gate.
//!
//! A session is authenticated while it holds a [`CurrentAdmin`] whose token
//! has not expired. Sessions end on logout, on expiry, or when the pharmacy
//! API rejects the token.

use axum::{
    extract::{FromRequestParts, Request},
    http::{HeaderValue, StatusCode, header::LOCATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::components::toast::{Toast, set_flash};
use crate::error::set_sentry_user;
use crate::htmx::{HX_REDIRECT, is_htmx};
use crate::models::{CurrentAdmin, session_keys};

pub const LOGIN_PATH: &str = "/login";

const EXPIRED: &str = "Phiên đăng nhập đã hết hạn, vui lòng đăng nhập lại.";

/// The logged-in admin. Rejects with a redirect to [`LOGIN_PATH`].
///
/// ```rust,ignore
/// async fn handler(RequireAdminAuth(admin): RequireAdminAuth) -> String {
///     format!("Xin chào, {}!", admin.username)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

#[derive(Debug)]
pub enum AdminAuthRejection {
    RedirectToLogin,
    /// The router was built without the session layer.
    NoSession,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to(LOGIN_PATH).into_response(),
            Self::NoSession => {
                tracing::error!("Session layer missing from router");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AdminAuthRejection::NoSession)?;

        let admin = match session.get::<CurrentAdmin>(session_keys::CURRENT_ADMIN).await {
            Ok(Some(admin)) => admin,
            Ok(None) => return Err(AdminAuthRejection::RedirectToLogin),
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable session; treating as logged out");
                return Err(AdminAuthRejection::RedirectToLogin);
            }
        };

        if admin.is_expired() {
            tracing::info!(username = %admin.username, "Admin session expired");
            if let Err(e) = clear_current_admin(&session).await {
                tracing::warn!(error = %e, "Failed to clear expired session");
            }
            set_flash(&session, &Toast::error(EXPIRED)).await;
            return Err(AdminAuthRejection::RedirectToLogin);
        }

        set_sentry_user(&admin.username);
        Ok(Self(admin))
    }
}

/// Response extension: the API rejected this session's token.
///
/// [`session_guard`] flushes the session when it sees this marker.
#[derive(Debug, Clone, Copy)]
pub struct SessionRevoked;

/// Runs after every handler.
///
/// Flushes sessions marked [`SessionRevoked`], and answers HTMX requests that
/// were redirected with `HX-Redirect` so the browser navigates instead of
/// swapping the login page into a table.
pub async fn session_guard(session: Session, request: Request, next: Next) -> Response {
    let htmx = is_htmx(request.headers());
    let response = next.run(request).await;

    if response.extensions().get::<SessionRevoked>().is_some() {
        tracing::info!("API rejected session token; logging out");
        if let Err(e) = session.flush().await {
            tracing::warn!(error = %e, "Failed to flush revoked session");
        }
    }

    if !(htmx && response.status().is_redirection()) {
        return response;
    }
    let location = response
        .headers()
        .get(LOCATION)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(LOGIN_PATH));
    (StatusCode::OK, [(HX_REDIRECT, location)]).into_response()
}

/// Store the admin after a successful login, under a fresh session id.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// # Errors
///
/// Returns an error if the session store fails.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        .map(drop)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request as HttpRequest;
    use chrono::{Duration, Utc};
    use tower_sessions::MemoryStore;
    use uuid::Uuid;

    use super::*;
    use crate::api::ApiToken;

    fn admin(username: &str, expires_in: Duration) -> CurrentAdmin {
        CurrentAdmin {
            username: username.to_string(),
            token: ApiToken::new("t"),
            expires_at: Utc::now() + expires_in,
            login_id: Uuid::new_v4(),
        }
    }

    async fn extract(stored: Option<CurrentAdmin>) -> Result<RequireAdminAuth, AdminAuthRejection> {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        if let Some(stored) = stored {
            session.insert(session_keys::CURRENT_ADMIN, &stored).await.unwrap();
        }
        let (mut parts, ()) = HttpRequest::new(()).into_parts();
        parts.extensions.insert(session);
        RequireAdminAuth::from_request_parts(&mut parts, &()).await
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[test]
    fn test_reports_carry_the_authenticated_admin() {
        let events = sentry::test::with_captured_events(|| {
            let RequireAdminAuth(current) = block_on(extract(Some(admin("linh", Duration::hours(1))))).unwrap();
            assert_eq!(current.username, "linh");
            sentry::capture_message("Không thể tải danh sách!", sentry::Level::Error);
        });
        assert_eq!(events.len(), 1);
        let user = events.first().unwrap().user.as_ref().unwrap();
        assert_eq!(user.username.as_deref(), Some("linh"));
    }

    #[test]
    fn test_rejected_request_leaves_reports_anonymous() {
        let events = sentry::test::with_captured_events(|| {
            let rejected = block_on(extract(Some(admin("linh", Duration::hours(-1)))));
            assert!(matches!(rejected, Err(AdminAuthRejection::RedirectToLogin)));
            sentry::capture_message("Không thể tải danh sách!", sentry::Level::Error);
        });
        assert!(events.first().unwrap().user.is_none());
    }

    #[test]
    fn test_missing_admin_redirects() {
        let rejected = block_on(extract(None));
        assert!(matches!(rejected, Err(AdminAuthRejection::RedirectToLogin)));
    }
}
