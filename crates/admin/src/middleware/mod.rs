//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors and transactions)
//! 2. `TraceLayer` (request span with method, uri, status, latency)
//! 3. Request ID (add unique ID to each request and its span)
//! 4. Security headers (CSP, frame and caching policy)
//! 5. Session layer (tower-sessions, in-memory store)
//! 6. Session guard (flush revoked sessions, HTMX-aware redirects)
//!
//! Authentication is enforced per handler with [`RequireAdminAuth`].

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    AdminAuthRejection, LOGIN_PATH, RequireAdminAuth, SessionRevoked, clear_current_admin,
    session_guard, set_current_admin,
};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
