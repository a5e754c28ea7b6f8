//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                      - Liveness check
//! GET  /health/ready                - Readiness check (API reachable)
//!
//! # Auth
//! GET  /login                       - Login page
//! POST /login                       - Log in against the pharmacy API
//! POST /logout                      - Logout
//!
//! # Dashboard
//! GET  /                            - Dashboard overview
//!
//! # Manage pages ({res} = admins, categories, customers, products, stores)
//! GET    /{res}                     - Manage page
//! GET    /{res}/table               - Table fragment (HTMX)
//! PATCH  /{res}/{id}/status         - Toggle status flag
//! DELETE /{res}/{id}                - Delete
//! POST   /{res}/{id}/reset-password - Reset password (admins, customers, stores)
//! GET    /{res}/new                 - Create form (admins, categories, products, stores)
//! POST   /{res}                     - Create
//!
//! # Inline edit (admins, categories)
//! GET  /{res}/{id}/row              - View-mode row
//! GET  /{res}/{id}/edit             - Edit-mode row
//! PUT  /{res}/{id}                  - Save row
//!
//! # Detail pages
//! GET  /customers/{id}              - Customer detail
//! GET  /products/{id}               - Product edit page
//! POST /products/{id}               - Update product
//! GET  /stores/{id}                 - Store edit page
//! POST /stores/{id}                 - Update store
//! GET  /categories/options          - Category picker options (HTMX)
//! ```

pub mod admins;
pub mod auth;
pub mod categories;
pub mod customers;
pub mod dashboard;
pub mod manage;
pub mod products;
pub mod stores;

use askama::Template;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use tower_sessions::Session;

use crate::components::Toast;
use crate::components::toast::take_flash;
use crate::models::CurrentAdmin;
use crate::state::AppState;

pub use dashboard::AdminUserView;

/// Render a template, logging failures.
///
/// A render failure yields `"Internal Server Error"` as the body.
pub fn render(template: &impl Template) -> String {
    template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    })
}

/// A sidebar link.
#[derive(Debug, Clone)]
pub struct NavItem {
    pub href: &'static str,
    pub label: &'static str,
    pub active: bool,
}

const NAV: [(&str, &str); 6] = [
    ("/", "Trang chủ"),
    ("/admins", "Tài khoản"),
    ("/categories", "Danh mục"),
    ("/customers", "Khách hàng"),
    ("/products", "Sản phẩm"),
    ("/stores", "Cửa hàng"),
];

/// Data every full page passes to `base.html`.
#[derive(Debug, Clone)]
pub struct Layout {
    pub admin_user: AdminUserView,
    pub nav: Vec<NavItem>,
    /// Toast shown once when the page loads.
    pub flash: Option<Toast>,
}

impl Layout {
    /// Layout for `current_path`, consuming the session's pending flash.
    pub async fn new(admin: &CurrentAdmin, session: &Session, current_path: &str) -> Self {
        Self {
            admin_user: AdminUserView::from(admin),
            nav: nav_items(current_path),
            flash: take_flash(session).await,
        }
    }

    /// Replace the pending flash with `toast`.
    #[must_use]
    pub fn with_toast(mut self, toast: Toast) -> Self {
        self.flash = Some(toast);
        self
    }
}

fn nav_items(current_path: &str) -> Vec<NavItem> {
    NAV.iter()
        .map(|&(href, label)| NavItem {
            href,
            label,
            active: if href == "/" {
                current_path == "/"
            } else {
                current_path.starts_with(href)
            },
        })
        .collect()
}

/// Build the router with every dashboard route.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/", get(dashboard::dashboard))
        .merge(auth::router())
        .merge(admins::router())
        .merge(categories::router())
        .merge(customers::router())
        .merge(products::router())
        .merge(stores::router())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies the pharmacy API answers at all; any HTTP status counts, since
/// unauthenticated calls are expected to be refused.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.api().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Pharmacy API unreachable");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nav_marks_current_section() {
        let items = nav_items("/products/12");
        let active: Vec<_> = items.iter().filter(|i| i.active).map(|i| i.href).collect();
        assert_eq!(active, ["/products"]);
    }

    #[test]
    fn test_nav_home_only_on_root() {
        let items = nav_items("/");
        let active: Vec<_> = items.iter().filter(|i| i.active).map(|i| i.href).collect();
        assert_eq!(active, ["/"]);
    }
}
