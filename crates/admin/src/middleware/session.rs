//! In-memory session store for the dashboard.
//!
//! Sessions hold the admin's API token, so they never leave the server. A
//! restart logs everyone out, which matches the token-only contract with the
//! backend.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer, cookie::SameSite};

use crate::config::AdminConfig;

/// Session cookie name for admin.
pub const SESSION_COOKIE_NAME: &str = "pharmacy_admin_session";

/// Create the session layer.
///
/// Sessions expire after the configured lifetime of inactivity; the token's
/// own expiry is enforced separately by [`super::RequireAdminAuth`].
#[must_use]
pub fn create_session_layer(config: &AdminConfig) -> SessionManagerLayer<MemoryStore> {
    let inactivity = i64::try_from(config.session_ttl.as_secs()).unwrap_or(i64::MAX);

    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(inactivity),
        ))
        .with_secure(config.is_https())
        .with_same_site(SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}
