//! Dashboard settings, read from the process environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `ADMIN_HOST` | `127.0.0.1` |
//! | `ADMIN_PORT` | `3001` |
//! | `ADMIN_BASE_URL` | `http://localhost:{ADMIN_PORT}` |
//! | `API_BASE_URL` | `http://localhost:3333` |
//! | `API_TIMEOUT_SECS` | `30` |
//! | `ADMIN_PAGE_SIZE` | `5` |
//! | `ADMIN_SESSION_TTL_HOURS` | `24`, used when the API token has no `exp` |
//! | `SENTRY_DSN`, `SENTRY_ENVIRONMENT` | unset |
//! | `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE` | `1.0` |
//! | `ADMIN_TLS_CERT`, `ADMIN_TLS_KEY` | unset; HTTPS when both are PEM strings |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3333";
pub const DEFAULT_PAGE_SIZE: u32 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} has an invalid value: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Externally visible dashboard URL; `https://` turns on secure cookies
    pub base_url: String,
    pub api: ApiConfig,
    /// Rows per manage-page table
    pub page_size: u32,
    /// Session lifetime when the login token does not say
    pub session_ttl: Duration,
    pub sentry: SentryConfig,
    pub tls: Option<TlsConfig>,
}

/// Where the pharmacy API lives and how long to wait for it.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API root; resource paths (`/admin`, `/product`, ...) are joined onto it
    pub base_url: Url,
    pub timeout: Duration,
}

impl ApiConfig {
    /// Parse an API root URL, rejecting anything that is not http(s).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the URL does not parse or has
    /// a non-HTTP scheme.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("API_BASE_URL".to_string(), e.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEnvVar(
                "API_BASE_URL".to_string(),
                format!("unsupported scheme '{}'", base_url.scheme()),
            ));
        }
        Ok(Self { base_url, timeout })
    }
}

/// Error reporting. Reporting is off while `dsn` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl SentryConfig {
    fn from_vars(vars: &impl Fn(&str) -> Option<String>) -> Self {
        let rate = |key: &str| vars(key).and_then(|s| s.trim().parse::<f32>().ok()).unwrap_or(1.0);
        Self {
            dsn: vars("SENTRY_DSN").filter(|s| !s.is_empty()),
            environment: vars("SENTRY_ENVIRONMENT"),
            sample_rate: rate("SENTRY_SAMPLE_RATE"),
            traces_sample_rate: rate("SENTRY_TRACES_SAMPLE_RATE"),
        }
    }
}

/// Certificate chain and private key, both PEM.
#[derive(Clone)]
pub struct TlsConfig {
    pub cert_pem: String,
    pub key_pem: SecretString,
}

impl std::fmt::Debug for TlsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsConfig")
            .field("cert_pem", &format_args!("<{} bytes>", self.cert_pem.len()))
            .field("key_pem", &"[REDACTED]")
            .finish()
    }
}

impl TlsConfig {
    fn from_vars(vars: &impl Fn(&str) -> Option<String>) -> Result<Option<Self>, ConfigError> {
        let cert = vars("ADMIN_TLS_CERT");
        let key = vars("ADMIN_TLS_KEY");
        if cert.is_some() != key.is_some() {
            return Err(ConfigError::InvalidEnvVar(
                "ADMIN_TLS_CERT/ADMIN_TLS_KEY".to_string(),
                "set both or neither".to_string(),
            ));
        }
        Ok(cert.zip(key).map(|(cert_pem, key)| Self {
            cert_pem,
            key_pem: SecretString::from(key),
        }))
    }
}

impl AdminConfig {
    /// Read `.env` (when present) and then the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // a missing .env is normal outside development
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_vars(vars: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = parse_or(&vars, "ADMIN_HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?;
        let port = parse_or(&vars, "ADMIN_PORT", 3001_u16)?;
        let base_url = vars("ADMIN_BASE_URL").unwrap_or_else(|| format!("http://localhost:{port}"));

        let timeout_secs = parse_or(&vars, "API_TIMEOUT_SECS", 30_u64)?;
        let api = ApiConfig::new(
            &vars("API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            Duration::from_secs(timeout_secs),
        )?;

        let page_size = parse_or(&vars, "ADMIN_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "ADMIN_PAGE_SIZE".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let ttl_hours = parse_or(&vars, "ADMIN_SESSION_TTL_HOURS", 24_u64)?;

        Ok(Self {
            host,
            port,
            base_url,
            api,
            page_size,
            session_ttl: Duration::from_secs(ttl_hours * 3600),
            sentry: SentryConfig::from_vars(&vars),
            tls: TlsConfig::from_vars(&vars)?,
        })
    }

    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the dashboard is served over HTTPS (secure cookies).
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

/// Parse `key` if set, otherwise fall back to `default`.
fn parse_or<T>(vars: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    vars(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<AdminConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AdminConfig::from_vars(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3001");
        assert_eq!(config.base_url, "http://localhost:3001");
        assert_eq!(config.api.base_url.as_str(), "http://localhost:3333/");
        assert_eq!(config.api.timeout, Duration::from_secs(30));
        assert_eq!(config.page_size, 5);
        assert_eq!(config.session_ttl, Duration::from_secs(24 * 3600));
        assert!(config.tls.is_none());
        assert!(!config.is_https());
        assert_eq!(config.sentry.dsn, None);
        assert!((config.sentry.sample_rate - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_sentry_settings() {
        let config = load(&[
            ("SENTRY_DSN", ""),
            ("SENTRY_ENVIRONMENT", "staging"),
            ("SENTRY_TRACES_SAMPLE_RATE", "0.25"),
        ])
        .unwrap();
        assert_eq!(config.sentry.dsn, None);
        assert_eq!(config.sentry.environment.as_deref(), Some("staging"));
        assert!((config.sentry.traces_sample_rate - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("ADMIN_HOST", "0.0.0.0"),
            ("ADMIN_PORT", "8080"),
            ("ADMIN_BASE_URL", "https://admin.pharmacy.vn"),
            ("API_BASE_URL", "https://api.pharmacy.vn/v1"),
            ("ADMIN_PAGE_SIZE", "20"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.is_https());
        assert_eq!(config.api.base_url.path(), "/v1");
        assert_eq!(config.page_size, 20);
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("ADMIN_PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "ADMIN_PORT"));
    }

    #[test]
    fn test_api_base_url_must_be_http() {
        let err = load(&[("API_BASE_URL", "ftp://files.example.com")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == "API_BASE_URL"));
        assert!(load(&[("API_BASE_URL", "not a url")]).is_err());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        assert!(load(&[("ADMIN_PAGE_SIZE", "0")]).is_err());
    }

    #[test]
    fn test_tls_requires_both_halves() {
        assert!(load(&[("ADMIN_TLS_CERT", "cert")]).is_err());
        assert!(load(&[("ADMIN_TLS_KEY", "key")]).is_err());
        let config = load(&[("ADMIN_TLS_CERT", "cert"), ("ADMIN_TLS_KEY", "key")]).unwrap();
        assert!(config.tls.is_some());
    }

    #[test]
    fn test_tls_config_debug_redacts_key() {
        let tls = TlsConfig {
            cert_pem: "-----BEGIN CERTIFICATE-----".to_string(),
            key_pem: SecretString::from("super_secret_private_key"),
        };
        let rendered = format!("{tls:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(rendered.contains("<27 bytes>"));
        assert!(!rendered.contains("super_secret_private_key"));
    }
}
