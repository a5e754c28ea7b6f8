//! Session-stored login state.
//!
//! The API token lives only in the server-side session; the browser holds
//! an opaque session cookie.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{ApiToken, LoginSession};

/// The logged-in administrator.
///
/// Passed explicitly to every API call as the request's credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Username typed at login.
    pub username: String,
    /// Bearer token for the pharmacy API.
    pub token: ApiToken,
    /// When the session stops being accepted.
    pub expires_at: DateTime<Utc>,
    /// Unique per login; scopes per-session caches such as request fences.
    pub login_id: Uuid,
}

impl CurrentAdmin {
    /// Build from a login reply. Tokens without an `exp` claim expire after
    /// `fallback_ttl`.
    #[must_use]
    pub fn from_login(username: impl Into<String>, login: LoginSession, fallback_ttl: Duration) -> Self {
        Self {
            username: username.into(),
            expires_at: login.expires_at.unwrap_or_else(|| Utc::now() + fallback_ttl),
            token: login.token,
            login_id: Uuid::new_v4(),
        }
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Credentials for an API call.
    #[must_use]
    pub const fn token(&self) -> Option<&ApiToken> {
        Some(&self.token)
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for a one-shot notification shown on the next full page.
    pub const FLASH: &str = "flash";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn login(expires_at: Option<DateTime<Utc>>) -> LoginSession {
        LoginSession {
            token: ApiToken::new("tok"),
            expires_at,
            message: None,
        }
    }

    #[test]
    fn test_jwt_expiry_wins_over_fallback() {
        let exp = Utc::now() + Duration::minutes(5);
        let admin = CurrentAdmin::from_login("lan", login(Some(exp)), Duration::hours(24));
        assert_eq!(admin.expires_at, exp);
        assert!(!admin.is_expired());
        assert!(admin.is_expired_at(exp));
    }

    #[test]
    fn test_fallback_ttl_for_opaque_token() {
        let admin = CurrentAdmin::from_login("lan", login(None), Duration::hours(2));
        assert!(!admin.is_expired());
        assert!(admin.is_expired_at(Utc::now() + Duration::hours(3)));
    }

    #[test]
    fn test_each_login_is_distinct() {
        let a = CurrentAdmin::from_login("lan", login(None), Duration::hours(1));
        let b = CurrentAdmin::from_login("lan", login(None), Duration::hours(1));
        assert_ne!(a.login_id, b.login_id);
    }

    #[test]
    fn test_debug_hides_token() {
        let admin = CurrentAdmin::from_login("lan", login(None), Duration::hours(1));
        let mut with_secret = admin;
        with_secret.token = ApiToken::new("super-secret-token");
        assert!(!format!("{with_secret:?}").contains("super-secret-token"));
    }
}
