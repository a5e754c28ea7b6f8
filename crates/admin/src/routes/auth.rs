//! Authentication route handlers for admin.
//!
//! Provides the login page and logout. Credentials are checked by the
//! pharmacy API; the dashboard only keeps the returned token in the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::ApiError;
use crate::components::Toast;
use crate::components::toast::take_flash;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{LOGIN_PATH, clear_current_admin, set_current_admin};
use crate::models::{CurrentAdmin, session_keys};
use crate::state::AppState;

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginPageTemplate {
    pub username: String,
    pub flash: Option<Toast>,
}

/// Login form body.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
}

/// Render the login page, or skip it for a live session.
///
/// GET /login
async fn login_page(session: Session) -> Response {
    let logged_in = session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
        .is_some_and(|admin| !admin.is_expired());
    if logged_in {
        return Redirect::to("/").into_response();
    }

    LoginPageTemplate {
        username: String::new(),
        flash: take_flash(&session).await,
    }
    .into_response()
}

/// Log in with username and password.
///
/// POST /login
#[instrument(skip(state, session, form), fields(username = %form.username))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let failed = |message: &str| {
        LoginPageTemplate {
            username: form.username.clone(),
            flash: Some(Toast::error(message)),
        }
        .into_response()
    };

    if form.username.trim().is_empty() || form.password.is_empty() {
        return Ok(failed("Vui lòng nhập đầy đủ thông tin!"));
    }

    let password = SecretString::from(form.password.clone());
    let login = match state.api().login(&form.username, &password).await {
        Ok(login) => login,
        Err(ApiError::Rejected(message)) => {
            tracing::info!(message = %message, "Login rejected");
            let message = if message.is_empty() {
                "Đăng nhập thất bại!".to_string()
            } else {
                message
            };
            return Ok(failed(&message));
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            return Ok(failed("Đăng nhập thất bại!"));
        }
    };

    let fallback_ttl = chrono::Duration::from_std(state.config().session_ttl)
        .unwrap_or_else(|_| chrono::Duration::hours(24));
    let admin = CurrentAdmin::from_login(form.username.trim(), login, fallback_ttl);

    set_current_admin(&session, &admin).await?;
    tracing::info!(expires_at = %admin.expires_at, "Admin logged in");

    Ok(Redirect::to("/").into_response())
}

/// Logout and clear session.
///
/// POST /logout
async fn logout(session: Session) -> impl IntoResponse {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::warn!(error = %e, "Failed to clear admin from session");
    }
    if let Err(e) = session.flush().await {
        tracing::warn!(error = %e, "Failed to flush session");
    }

    Redirect::to(LOGIN_PATH)
}
