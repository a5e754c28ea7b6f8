//! Admin login and API tokens.
//!
//! `POST /admin/auth/login` exchanges a username and password for a bearer
//! token. When the token is a JWT its `exp` claim is used as the session
//! expiry; opaque tokens fall back to the configured session lifetime.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{ApiClient, ApiError, Envelope};

/// A bearer token issued by the pharmacy API.
///
/// Serializable so it can live in the server-side session. `Debug` never
/// prints the token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiToken(String);

impl ApiToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// `Authorization` header value.
    ///
    /// Falls back to an empty header if the token contains bytes that are
    /// not valid in a header; the API then answers 401.
    #[must_use]
    pub fn bearer(&self) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {}", self.0)).unwrap_or_else(|_| HeaderValue::from_static(""))
    }

    /// The raw token, for handing to another client.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken([REDACTED])")
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginSession {
    pub token: ApiToken,
    /// From the JWT `exp` claim, when the token has one.
    pub expires_at: Option<DateTime<Utc>>,
    pub message: Option<String>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginData {
    token: String,
}

#[derive(Deserialize)]
struct JwtClaims {
    exp: Option<i64>,
}

/// Read the `exp` claim of a JWT without verifying its signature.
///
/// Returns `None` for opaque tokens or tokens without `exp`.
#[must_use]
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut parts = token.split('.');
    let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: JwtClaims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp?, 0)
}

impl ApiClient {
    /// Log in as an administrator.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` when the API answers with a non-success
    /// envelope or no token, `ApiError::Unauthorized` for bad credentials, and
    /// transport errors otherwise.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<LoginSession, ApiError> {
        let url = self.endpoint(&["admin", "auth", "login"])?;
        let body = LoginRequest {
            username,
            password: password.expose_secret(),
        };
        let builder = self.request(reqwest::Method::POST, url, None).json(&body);
        let reply: Envelope<LoginData> = self.send_json(builder).await?;

        if !reply.is_success() {
            return Err(ApiError::Rejected(
                reply.message.unwrap_or_else(|| "login rejected".to_string()),
            ));
        }
        let Some(data) = reply.data else {
            return Err(ApiError::Rejected("login response carried no token".to_string()));
        };

        tracing::info!("Admin logged in");
        Ok(LoginSession {
            expires_at: token_expiry(&data.token),
            token: ApiToken::new(data.token),
            message: reply.message,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn jwt(payload: &str) -> String {
        format!(
            "{}.{}.signature",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(payload)
        )
    }

    #[test]
    fn test_token_expiry_from_jwt() {
        let token = jwt(r#"{"id":1,"exp":1767225600}"#);
        let exp = token_expiry(&token).unwrap();
        assert_eq!(exp.timestamp(), 1_767_225_600);
    }

    #[test]
    fn test_token_expiry_opaque_or_missing_claim() {
        assert!(token_expiry("opaque-token").is_none());
        assert!(token_expiry(&jwt(r#"{"id":1}"#)).is_none());
        assert!(token_expiry("a.b.c.d").is_none());
        assert!(token_expiry("a.!!!.c").is_none());
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let token = ApiToken::new("eyJ-very-secret");
        assert!(!format!("{token:?}").contains("very-secret"));
        assert_eq!(token.bearer().to_str().unwrap(), "Bearer eyJ-very-secret");
    }
}
